use rand::Rng;
use serde::Serialize;

use super::bands::{above_warning_threshold, arrival_range, queue_range, status_for};
use crate::zones::{CrowdStatus, RecommendedArrival, StatusColor};

/// Result of one classification pass over a single zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub status: CrowdStatus,
    pub queue_time_minutes: u32,
    pub recommended_arrival: RecommendedArrival,
    /// Input for the warning controller; the classifier itself never touches
    /// warning state.
    pub warning_candidate: bool,
}

impl Classification {
    pub fn color(&self) -> StatusColor {
        self.status.color()
    }
}

/// Classifies a zone from its counts.
///
/// Status and `warning_candidate` depend only on the inputs. Queue time and
/// recommended arrival are drawn fresh from the band's range on every call.
pub fn classify<R: Rng + ?Sized>(
    visitors: u32,
    capacity: u32,
    warning_eligible: bool,
    rng: &mut R,
) -> Classification {
    let status = status_for(visitors, capacity);
    let queue_time_minutes = rng.gen_range(queue_range(status));
    let recommended_arrival = match arrival_range(status) {
        Some(range) => RecommendedArrival::InMinutes(rng.gen_range(range)),
        None => RecommendedArrival::Now,
    };
    Classification {
        status,
        queue_time_minutes,
        recommended_arrival,
        warning_candidate: warning_eligible && above_warning_threshold(visitors, capacity),
    }
}
