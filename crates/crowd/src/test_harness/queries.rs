//! Query and simulation-tick methods for `TestSite`.

use bevy::prelude::*;

use crate::activity_log::ActivityLog;
use crate::commands::{CommandHistory, CommandQueue, CommandResult, CommandSource, CrowdCommand};
use crate::config::TICKS_PER_SECOND;
use crate::notifications::{Notification, NotificationCenter};
use crate::site_stats::SiteStats;
use crate::timers::TimerSchedule;
use crate::zone_invariants::InvariantViolations;
use crate::zones::{ZoneId, ZoneRegistry, ZoneState};
use crate::{run_fixed_tick, TickCounter};

use super::TestSite;

impl TestSite {
    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run N fixed ticks through [`run_fixed_tick`]. This bypasses Bevy's
    /// time system, so tests are independent of wall clock and frame pacing.
    pub fn tick(&mut self, n: u64) {
        for _ in 0..n {
            run_fixed_tick(self.app.world_mut());
        }
    }

    /// Run whole simulated seconds.
    pub fn tick_seconds(&mut self, seconds: u64) {
        self.tick(seconds * TICKS_PER_SECOND);
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Queue a command as the operator. It executes on the next tick.
    pub fn push_command(&mut self, command: CrowdCommand) {
        self.push_command_from(CommandSource::Operator, command);
    }

    pub fn push_command_from(&mut self, source: CommandSource, command: CrowdCommand) {
        let world = self.app.world_mut();
        let tick = world.resource::<TickCounter>().0;
        world
            .resource_mut::<CommandQueue>()
            .push(tick, source, command);
    }

    /// Queue a command, run one tick and return its result.
    pub fn run_command(&mut self, command: CrowdCommand) -> CommandResult {
        self.push_command(command);
        self.tick(1);
        match self.latest_result() {
            Some(result) => result,
            None => panic!("command produced no result"),
        }
    }

    pub fn latest_result(&self) -> Option<CommandResult> {
        self.resource::<CommandHistory>()
            .latest()
            .map(|record| record.result.clone())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Access the ECS world mutably.
    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn registry(&self) -> &ZoneRegistry {
        self.resource::<ZoneRegistry>()
    }

    /// Panics if the zone does not exist.
    pub fn zone(&self, id: &str) -> &ZoneState {
        match self.registry().get(&ZoneId::from(id)) {
            Ok(zone) => zone,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn current_tick(&self) -> u64 {
        self.resource::<TickCounter>().0
    }

    pub fn timers(&self) -> &TimerSchedule {
        self.resource::<TimerSchedule>()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.resource::<NotificationCenter>().current()
    }

    pub fn activity(&self) -> &ActivityLog {
        self.resource::<ActivityLog>()
    }

    pub fn stats(&self) -> &SiteStats {
        self.resource::<SiteStats>()
    }

    pub fn violations(&self) -> &InvariantViolations {
        self.resource::<InvariantViolations>()
    }
}
