//! Capped journal of what happened on the site, newest last.

use bevy::prelude::*;
use serde::Serialize;

/// Oldest entries are dropped beyond this.
pub const MAX_ACTIVITY_ENTRIES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActivityKind {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub tick: u64,
    pub kind: ActivityKind,
    pub message: String,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct ActivityLog {
    entries: Vec<ActivityEntry>,
}

impl ActivityLog {
    pub fn push(&mut self, tick: u64, kind: ActivityKind, message: impl Into<String>) {
        self.entries.push(ActivityEntry {
            tick,
            kind,
            message: message.into(),
        });
        if self.entries.len() > MAX_ACTIVITY_ENTRIES {
            let excess = self.entries.len() - MAX_ACTIVITY_ENTRIES;
            self.entries.drain(0..excess);
        }
    }

    pub fn info(&mut self, tick: u64, message: impl Into<String>) {
        self.push(tick, ActivityKind::Info, message);
    }

    pub fn success(&mut self, tick: u64, message: impl Into<String>) {
        self.push(tick, ActivityKind::Success, message);
    }

    pub fn warning(&mut self, tick: u64, message: impl Into<String>) {
        self.push(tick, ActivityKind::Warning, message);
    }

    pub fn last_n(&self, n: usize) -> &[ActivityEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn latest(&self) -> Option<&ActivityEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn count_kind(&self, kind: ActivityKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
