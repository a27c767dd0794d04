use bevy::prelude::*;

use super::controller::{format_countdown, WarningController, WarningTransition};
use crate::activity_log::ActivityLog;
use crate::refresh::handle_refresh_timer;
use crate::snapshot::{SnapshotChanged, SnapshotReason};
use crate::timers::{TimerFired, TimerKey, TimerSchedule};
use crate::zones::ZoneRegistry;
use crate::{CrowdSet, TickCounter};

/// Logs a transition and journals it in the activity log.
pub(crate) fn record_transition(
    transition: &WarningTransition,
    registry: &ZoneRegistry,
    activity: &mut ActivityLog,
    tick: u64,
) {
    let zone = transition.zone();
    let name = registry
        .get(zone)
        .map(|z| z.name().to_string())
        .unwrap_or_else(|_| zone.to_string());
    match transition {
        WarningTransition::Entered { countdown_secs, .. } => {
            info!(
                "{name} ({zone}) at capacity, recovery countdown {}",
                format_countdown(*countdown_secs)
            );
            activity.warning(
                tick,
                format!(
                    "{name} at capacity, estimated recovery in {}",
                    format_countdown(*countdown_secs)
                ),
            );
        }
        WarningTransition::Recovered { .. } => {
            info!("{name} ({zone}) recovered below the warning threshold");
            activity.success(tick, format!("{name} back below capacity"));
        }
        WarningTransition::Expired { .. } => {
            info!("{name} ({zone}) warning countdown expired");
            activity.info(tick, format!("{name} warning period ended"));
        }
    }
}

/// Applies one second to every zone whose countdown timer fired this tick.
///
/// Firings cancelled or replaced earlier in the tick (a refresh recovering
/// the zone, say) are skipped. A failing zone is logged and its timer
/// cancelled; the other zones still tick.
pub fn handle_countdown_ticks(
    mut fired: EventReader<TimerFired>,
    controller: Res<WarningController>,
    mut registry: ResMut<ZoneRegistry>,
    mut timers: ResMut<TimerSchedule>,
    mut activity: ResMut<ActivityLog>,
    mut changed: EventWriter<SnapshotChanged>,
    tick: Res<TickCounter>,
) {
    let mut any_transition = false;
    for event in fired.read() {
        let TimerKey::Countdown(zone) = &event.key else {
            continue;
        };
        if !timers.is_current(&event.key, event.id) {
            continue;
        }
        match controller.tick_second(&mut registry, &mut timers, zone) {
            Ok(Some(transition)) => {
                record_transition(&transition, &registry, &mut activity, tick.0);
                any_transition = true;
            }
            Ok(None) => {}
            Err(err) => {
                warn!("Countdown tick for zone {zone} failed: {err}");
                timers.cancel(&event.key);
            }
        }
    }
    if any_transition {
        changed.send(SnapshotChanged {
            reason: SnapshotReason::CountdownTransition,
            tick: tick.0,
        });
    }
}

/// `recovery_secs` is the countdown armed on a fresh warning.
pub struct WarningPlugin {
    pub recovery_secs: u32,
}

impl Plugin for WarningPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(WarningController::new(self.recovery_secs))
            .add_systems(
                FixedUpdate,
                handle_countdown_ticks
                    .after(handle_refresh_timer)
                    .in_set(CrowdSet::Simulation),
            );
    }
}
