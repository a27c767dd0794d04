//! Recent command outcomes, keyed by the tick each command was queued at.
//!
//! A caller that queued a command at tick `t` finds its outcome with
//! [`CommandHistory::outcome_for`] once the next tick has run, without
//! assuming nothing else was queued in between.

use std::collections::VecDeque;

use bevy::prelude::*;
use serde::Serialize;

use super::{CommandResult, CommandSource, CrowdCommand};

/// Outcomes older than this many commands are forgotten.
pub const COMMAND_HISTORY_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandRecord {
    pub queued_tick: u64,
    pub executed_tick: u64,
    pub source: CommandSource,
    pub command: CrowdCommand,
    pub result: CommandResult,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct CommandHistory {
    records: VecDeque<CommandRecord>,
    failures: u64,
}

impl CommandHistory {
    pub fn record(&mut self, record: CommandRecord) {
        if !record.result.is_success() {
            self.failures += 1;
        }
        if self.records.len() == COMMAND_HISTORY_CAPACITY {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn latest(&self) -> Option<&CommandRecord> {
        self.records.back()
    }

    /// The last command from `source` queued at `queued_tick`, if it has
    /// executed and is still retained.
    pub fn outcome_for(&self, source: CommandSource, queued_tick: u64) -> Option<&CommandRecord> {
        self.records
            .iter()
            .rev()
            .find(|r| r.source == source && r.queued_tick == queued_tick)
    }

    /// Everything executed during `tick`, in execution order.
    pub fn executed_at(&self, tick: u64) -> impl Iterator<Item = &CommandRecord> {
        self.records.iter().filter(move |r| r.executed_tick == tick)
    }

    /// Failed commands since startup, including ones already evicted.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CrowdError;
    use crate::zones::ZoneId;

    fn record(queued_tick: u64, source: CommandSource, result: CommandResult) -> CommandRecord {
        CommandRecord {
            queued_tick,
            executed_tick: queued_tick + 1,
            source,
            command: CrowdCommand::RefreshNow,
            result,
        }
    }

    #[test]
    fn test_outcome_lookup_by_source_and_tick() {
        let mut history = CommandHistory::default();
        history.record(record(4, CommandSource::Operator, CommandResult::Refreshed));
        history.record(record(4, CommandSource::Agent, CommandResult::Reset));
        history.record(record(9, CommandSource::Agent, CommandResult::Refreshed));

        let found = history.outcome_for(CommandSource::Agent, 4).unwrap();
        assert_eq!(found.result, CommandResult::Reset);
        assert_eq!(
            history.outcome_for(CommandSource::Operator, 4).unwrap().result,
            CommandResult::Refreshed
        );
        assert!(history.outcome_for(CommandSource::Agent, 5).is_none());
        assert_eq!(history.executed_at(5).count(), 2);
    }

    #[test]
    fn test_capacity_drops_oldest_but_counts_failures() {
        let mut history = CommandHistory::default();
        let missing = CommandResult::Error(CrowdError::NotFound(ZoneId::from("Q")));
        for tick in 0..(COMMAND_HISTORY_CAPACITY as u64 + 6) {
            history.record(record(tick, CommandSource::Agent, missing.clone()));
        }
        assert_eq!(history.len(), COMMAND_HISTORY_CAPACITY);
        assert!(history.outcome_for(CommandSource::Agent, 5).is_none());
        assert!(history.outcome_for(CommandSource::Agent, 6).is_some());
        assert_eq!(history.failures(), COMMAND_HISTORY_CAPACITY as u64 + 6);
        assert_eq!(history.latest().map(|r| r.queued_tick), Some(69));
    }
}
