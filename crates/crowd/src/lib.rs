use bevy::ecs::event::Events;
use bevy::prelude::*;

pub mod activity_log;
pub mod agent_protocol;
pub mod commands;
pub mod config;
pub mod error;
pub mod notifications;
pub mod occupancy;
pub mod refresh;
pub mod sim_rng;
pub mod simulation_sets;
pub mod site_stats;
pub mod snapshot;
pub mod timers;
pub mod warning;
pub mod zone_invariants;
pub mod zones;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use config::{SiteConfig, ZoneConfig};
pub use error::{ConfigError, CrowdError};
pub use simulation_sets::CrowdSet;
pub use zones::{CrowdStatus, StatusColor, ZoneId, ZoneRegistry, ZoneState};

use activity_log::ActivityLog;
use commands::CommandsPlugin;
use config::TICKS_PER_SECOND;
use notifications::{NotificationEvent, NotificationsPlugin};
use refresh::RefreshPlugin;
use sim_rng::SimRng;
use site_stats::SiteStatsPlugin;
use snapshot::SnapshotChanged;
use timers::{poll_timers, TimerFired, TimersPlugin};
use warning::WarningPlugin;
use zone_invariants::ZoneInvariantsPlugin;

// ---------------------------------------------------------------------------
// Core resources
// ---------------------------------------------------------------------------

/// Fixed ticks since startup. Every timer due time is expressed in these.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickCounter(pub u64);

pub fn advance_tick(mut tick: ResMut<TickCounter>) {
    tick.0 = tick.0.wrapping_add(1);
}

/// Runs one fixed tick without the app runner (agent mode, test harness).
///
/// `First` never runs on this path, so the engine's event buffers are
/// rotated here. Every reader runs inside the tick, so an event lives for at
/// most two ticks.
pub fn run_fixed_tick(world: &mut World) {
    world.run_schedule(FixedUpdate);
    rotate_events::<TimerFired>(world);
    rotate_events::<SnapshotChanged>(world);
    rotate_events::<NotificationEvent>(world);
}

fn rotate_events<E: Event>(world: &mut World) {
    if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
        events.update();
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// The whole engine. Built from a validated [`SiteConfig`], so a plugin that
/// exists always has a usable registry.
pub struct CrowdPlugin {
    config: SiteConfig,
    registry: ZoneRegistry,
}

impl CrowdPlugin {
    pub fn from_config(config: SiteConfig) -> Result<Self, ConfigError> {
        let registry = ZoneRegistry::from_config(&config)?;
        Ok(Self { config, registry })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }
}

impl Plugin for CrowdPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(TICKS_PER_SECOND as f64))
            .configure_sets(
                FixedUpdate,
                (CrowdSet::PreSim, CrowdSet::Simulation, CrowdSet::PostSim).chain(),
            );

        app.init_resource::<TickCounter>()
            .init_resource::<ActivityLog>()
            .insert_resource(self.config.clone())
            .insert_resource(self.registry.clone())
            .insert_resource(SimRng::from_optional_seed(self.config.seed))
            .add_event::<SnapshotChanged>()
            .add_systems(
                FixedUpdate,
                advance_tick.before(poll_timers).in_set(CrowdSet::PreSim),
            );

        app.add_plugins((
            TimersPlugin,
            NotificationsPlugin {
                display_ticks: self.config.notification_ticks(),
            },
            WarningPlugin {
                recovery_secs: self.config.warning_duration_secs,
            },
            RefreshPlugin,
            CommandsPlugin,
            SiteStatsPlugin,
            ZoneInvariantsPlugin,
        ));
    }
}
