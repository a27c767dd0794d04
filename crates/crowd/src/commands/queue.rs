use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::CrowdCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandSource {
    /// Someone at the dashboard.
    Operator,
    /// The JSON line protocol.
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedCommand {
    pub tick: u64,
    pub source: CommandSource,
    pub command: CrowdCommand,
}

/// Commands waiting for the next tick. Drained in FIFO order at the start
/// of `PreSim`.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct CommandQueue {
    pending: Vec<QueuedCommand>,
}

impl CommandQueue {
    pub fn push(&mut self, tick: u64, source: CommandSource, command: CrowdCommand) {
        self.pending.push(QueuedCommand {
            tick,
            source,
            command,
        });
    }

    pub fn drain(&mut self) -> Vec<QueuedCommand> {
        self.pending.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
