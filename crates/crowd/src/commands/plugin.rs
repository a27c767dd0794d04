use bevy::prelude::*;

use super::executor::execute_queued_commands;
use super::history::CommandHistory;
use super::CommandQueue;
use crate::timers::poll_timers;
use crate::{advance_tick, CrowdSet};

/// Registers the command queue, command history and executor.
pub struct CommandsPlugin;

impl Plugin for CommandsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CommandQueue>();
        app.init_resource::<CommandHistory>();

        app.add_systems(
            FixedUpdate,
            execute_queued_commands
                .after(advance_tick)
                .before(poll_timers)
                .in_set(CrowdSet::PreSim),
        );
    }
}
