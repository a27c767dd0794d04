use std::ops::RangeInclusive;

use crate::config::{COMFORTABLE_BELOW_PCT, NORMAL_UP_TO_PCT, WARNING_ABOVE_PCT};
use crate::zones::CrowdStatus;

// =============================================================================
// Band ranges
// =============================================================================

/// Simulated queue estimate per band, in minutes.
pub const COMFORTABLE_QUEUE_MINUTES: RangeInclusive<u32> = 1..=5;
pub const NORMAL_QUEUE_MINUTES: RangeInclusive<u32> = 5..=14;
pub const CROWDED_QUEUE_MINUTES: RangeInclusive<u32> = 10..=24;

/// Suggested delay before arriving, in minutes. Comfortable zones always
/// read "now".
pub const NORMAL_ARRIVAL_MINUTES: RangeInclusive<u32> = 10..=19;
pub const CROWDED_ARRIVAL_MINUTES: RangeInclusive<u32> = 20..=39;

pub fn queue_range(status: CrowdStatus) -> RangeInclusive<u32> {
    match status {
        CrowdStatus::Comfortable => COMFORTABLE_QUEUE_MINUTES,
        CrowdStatus::Normal => NORMAL_QUEUE_MINUTES,
        CrowdStatus::Crowded => CROWDED_QUEUE_MINUTES,
    }
}

/// `None` means the zone is recommended right away.
pub fn arrival_range(status: CrowdStatus) -> Option<RangeInclusive<u32>> {
    match status {
        CrowdStatus::Comfortable => None,
        CrowdStatus::Normal => Some(NORMAL_ARRIVAL_MINUTES),
        CrowdStatus::Crowded => Some(CROWDED_ARRIVAL_MINUTES),
    }
}

// =============================================================================
// Thresholds
// =============================================================================

// Percent comparisons are done as `visitors * 100` against `capacity * pct`
// in u64, so exact boundaries like 95.0% never land on the wrong side.

/// Band for a visitor count. `capacity` must be non-zero.
pub fn status_for(visitors: u32, capacity: u32) -> CrowdStatus {
    let scaled = visitors as u64 * 100;
    let capacity = capacity as u64;
    if scaled < capacity * COMFORTABLE_BELOW_PCT {
        CrowdStatus::Comfortable
    } else if scaled <= capacity * NORMAL_UP_TO_PCT {
        CrowdStatus::Normal
    } else {
        CrowdStatus::Crowded
    }
}

/// Strictly above the warning threshold. Eligibility is checked by the
/// caller.
pub fn above_warning_threshold(visitors: u32, capacity: u32) -> bool {
    visitors as u64 * 100 > capacity as u64 * WARNING_ABOVE_PCT
}
