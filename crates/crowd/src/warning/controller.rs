use bevy::prelude::*;
use serde::Serialize;

use crate::config::TICKS_PER_SECOND;
use crate::error::CrowdError;
use crate::timers::{TimerKey, TimerSchedule};
use crate::zones::{ZoneId, ZoneRegistry};

/// A change of a zone's warning state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WarningTransition {
    /// Idle → Warning.
    Entered { zone: ZoneId, countdown_secs: u32 },
    /// Warning → Idle because occupancy dropped.
    Recovered { zone: ZoneId },
    /// Warning → Idle because the countdown ran out.
    Expired { zone: ZoneId },
}

impl WarningTransition {
    pub fn zone(&self) -> &ZoneId {
        match self {
            WarningTransition::Entered { zone, .. }
            | WarningTransition::Recovered { zone }
            | WarningTransition::Expired { zone } => zone,
        }
    }
}

/// Per-zone `Idle → Warning → Idle` state machine.
///
/// The state itself lives in the registry (`warning_active`,
/// `countdown_remaining_secs`); the controller owns the rules and the
/// zone's `Countdown` timer. Each zone's timer is independent.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningController {
    recovery_secs: u32,
}

impl WarningController {
    pub fn new(recovery_secs: u32) -> Self {
        Self { recovery_secs }
    }

    pub fn recovery_secs(&self) -> u32 {
        self.recovery_secs
    }

    /// Feeds one classification result for `id` into the state machine.
    ///
    /// | state   | candidate | effect                                      |
    /// |---------|-----------|---------------------------------------------|
    /// | Idle    | true      | enter warning, arm the one-second timer      |
    /// | Warning | true      | keep counting down (re-arm only if missing) |
    /// | Warning | false     | recover, cancel the timer                   |
    /// | Idle    | false     | nothing (a stray timer is cancelled)        |
    pub fn observe(
        &self,
        registry: &mut ZoneRegistry,
        timers: &mut TimerSchedule,
        id: &ZoneId,
        warning_candidate: bool,
        now: u64,
    ) -> Result<Option<WarningTransition>, CrowdError> {
        let zone = registry.get(id)?;
        let active = zone.warning_active();
        let remaining = zone.countdown_remaining_secs();
        let key = TimerKey::Countdown(id.clone());

        match (active, warning_candidate) {
            (false, true) => {
                let countdown_secs = if remaining == 0 {
                    self.recovery_secs
                } else {
                    remaining
                };
                registry.activate_warning(id, countdown_secs)?;
                timers.schedule_repeating(key, now, TICKS_PER_SECOND);
                Ok(Some(WarningTransition::Entered {
                    zone: id.clone(),
                    countdown_secs,
                }))
            }
            (true, true) => {
                if !timers.is_active(&key) {
                    timers.schedule_repeating(key, now, TICKS_PER_SECOND);
                }
                Ok(None)
            }
            (true, false) => {
                registry.clear_warning(id)?;
                timers.cancel(&key);
                Ok(Some(WarningTransition::Recovered { zone: id.clone() }))
            }
            (false, false) => {
                timers.cancel(&key);
                Ok(None)
            }
        }
    }

    /// One elapsed second of a zone's countdown. Reaching zero clears the
    /// warning and cancels the timer in the same step.
    pub fn tick_second(
        &self,
        registry: &mut ZoneRegistry,
        timers: &mut TimerSchedule,
        id: &ZoneId,
    ) -> Result<Option<WarningTransition>, CrowdError> {
        let zone = registry.get(id)?;
        let key = TimerKey::Countdown(id.clone());
        if !zone.warning_active() {
            timers.cancel(&key);
            return Err(CrowdError::InvariantViolation(format!(
                "countdown tick for zone {id} without an active warning"
            )));
        }

        let remaining = zone.countdown_remaining_secs().saturating_sub(1);
        if remaining == 0 {
            registry.clear_warning(id)?;
            timers.cancel(&key);
            Ok(Some(WarningTransition::Expired { zone: id.clone() }))
        } else {
            registry.set_countdown(id, remaining)?;
            Ok(None)
        }
    }

    /// Leaves every zone idle and cancels every countdown timer.
    pub fn clear_all(&self, registry: &mut ZoneRegistry, timers: &mut TimerSchedule) {
        for id in registry.ids() {
            timers.cancel(&TimerKey::Countdown(id.clone()));
            // Ids come from the registry itself.
            let _ = registry.clear_warning(&id);
        }
    }
}

/// `MM:SS`, the way the countdown is shown to visitors.
pub fn format_countdown(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
