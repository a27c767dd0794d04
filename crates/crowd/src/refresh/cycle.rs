use rand::Rng;

use super::drift::perturb_visitors;
use crate::error::CrowdError;
use crate::occupancy::classify;
use crate::timers::TimerSchedule;
use crate::warning::{WarningController, WarningTransition};
use crate::zones::{ZoneId, ZoneRegistry};

/// What one refresh cycle changed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RefreshOutcome {
    pub transitions: Vec<WarningTransition>,
    /// Per-zone failures. A failing zone never stops the others.
    pub errors: Vec<(ZoneId, CrowdError)>,
}

/// Classifies one zone, stores the result and returns its warning candidacy.
fn classify_zone<R: Rng + ?Sized>(
    registry: &mut ZoneRegistry,
    id: &ZoneId,
    rng: &mut R,
) -> Result<bool, CrowdError> {
    let zone = registry.get(id)?;
    let classification = classify(
        zone.visitors(),
        zone.capacity(),
        zone.warning_eligible(),
        rng,
    );
    registry.apply_classification(id, &classification)?;
    Ok(classification.warning_candidate)
}

fn perturb_zone<R: Rng + ?Sized>(
    registry: &mut ZoneRegistry,
    id: &ZoneId,
    rng: &mut R,
) -> Result<(), CrowdError> {
    let zone = registry.get(id)?;
    let next = perturb_visitors(zone.visitors(), zone.capacity(), zone.drift(), rng);
    registry.set_visitors(id, next as i64)?;
    Ok(())
}

/// One full refresh over every zone.
///
/// Each step runs for all zones before the next one starts: perturb visitor
/// counts (skipped when `perturb` is false), classify, then feed every
/// candidacy to the warning controller.
pub fn run_refresh_cycle<R: Rng + ?Sized>(
    registry: &mut ZoneRegistry,
    controller: &WarningController,
    timers: &mut TimerSchedule,
    rng: &mut R,
    now: u64,
    perturb: bool,
) -> RefreshOutcome {
    let ids = registry.ids();
    let mut outcome = RefreshOutcome::default();

    if perturb {
        for id in &ids {
            if let Err(err) = perturb_zone(registry, id, rng) {
                outcome.errors.push((id.clone(), err));
            }
        }
    }

    let mut candidacy = Vec::with_capacity(ids.len());
    for id in &ids {
        match classify_zone(registry, id, rng) {
            Ok(candidate) => candidacy.push((id, candidate)),
            Err(err) => outcome.errors.push((id.clone(), err)),
        }
    }

    for (id, candidate) in candidacy {
        match controller.observe(registry, timers, id, candidate, now) {
            Ok(Some(transition)) => outcome.transitions.push(transition),
            Ok(None) => {}
            Err(err) => outcome.errors.push((id.clone(), err)),
        }
    }

    outcome
}

/// Reclassifies a single zone and runs the controller on it, for when one
/// zone's count changed outside a refresh.
pub fn reclassify_zone<R: Rng + ?Sized>(
    registry: &mut ZoneRegistry,
    controller: &WarningController,
    timers: &mut TimerSchedule,
    rng: &mut R,
    id: &ZoneId,
    now: u64,
) -> Result<Option<WarningTransition>, CrowdError> {
    let candidate = classify_zone(registry, id, rng)?;
    controller.observe(registry, timers, id, candidate, now)
}
