//! Runtime invariant validation for zone state.
//!
//! Runs once per simulated second and logs a warning for every violation.
//! What can be repaired in place is repaired:
//! 1. **Zone state**: visitor counts above capacity are clamped, colours
//!    realigned with status, countdowns without a warning zeroed.
//! 2. **Countdown timers**: a zone under warning always has exactly one live
//!    countdown timer and a zone without one has none.

use bevy::prelude::*;

use crate::config::TICKS_PER_SECOND;
use crate::timers::{TimerKey, TimerSchedule};
use crate::zones::ZoneRegistry;
use crate::{CrowdSet, TickCounter};

// ---------------------------------------------------------------------------
// Violation counter
// ---------------------------------------------------------------------------

/// Violations found by the last validation pass, plus a running total.
/// Integration tests assert these stay at zero.
#[derive(Resource, Default, Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolations {
    pub zone_state: u32,
    pub fields_repaired: u32,
    pub timer_mismatch: u32,
    pub total: u64,
}

fn validation_due(tick: u64) -> bool {
    tick.is_multiple_of(TICKS_PER_SECOND)
}

// ---------------------------------------------------------------------------
// System: validate_zone_state
// ---------------------------------------------------------------------------

pub fn validate_zone_state(
    tick: Res<TickCounter>,
    mut registry: ResMut<ZoneRegistry>,
    mut violations: ResMut<InvariantViolations>,
) {
    if !validation_due(tick.0) {
        return;
    }

    // Shared borrow only; a clean pass leaves change detection untouched.
    let errors = registry.check_invariants();
    violations.zone_state = errors.len() as u32;
    violations.fields_repaired = 0;
    if errors.is_empty() {
        return;
    }
    for err in &errors {
        warn!("{err}. Repairing.");
    }
    violations.fields_repaired = registry.repair();
    violations.total += errors.len() as u64;
}

// ---------------------------------------------------------------------------
// System: validate_countdown_timers
// ---------------------------------------------------------------------------

pub fn validate_countdown_timers(
    tick: Res<TickCounter>,
    registry: Res<ZoneRegistry>,
    mut timers: ResMut<TimerSchedule>,
    mut violations: ResMut<InvariantViolations>,
) {
    if !validation_due(tick.0) {
        return;
    }

    violations.timer_mismatch = 0;
    for zone in registry.iter() {
        let key = TimerKey::Countdown(zone.id().clone());
        match (zone.warning_active(), timers.is_active(&key)) {
            (true, false) => {
                warn!(
                    "Invariant violation: zone {} is under warning without a countdown timer. Re-arming.",
                    zone.id()
                );
                timers.schedule_repeating(key, tick.0, TICKS_PER_SECOND);
                violations.timer_mismatch += 1;
            }
            (false, true) => {
                warn!(
                    "Invariant violation: zone {} has a countdown timer but no warning. Cancelling.",
                    zone.id()
                );
                timers.cancel(&key);
                violations.timer_mismatch += 1;
            }
            _ => {}
        }
    }
    violations.total += violations.timer_mismatch as u64;
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct ZoneInvariantsPlugin;

impl Plugin for ZoneInvariantsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InvariantViolations>().add_systems(
            FixedUpdate,
            (validate_zone_state, validate_countdown_timers)
                .chain()
                .in_set(CrowdSet::PostSim),
        );
    }
}
