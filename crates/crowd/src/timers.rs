//! Keyed, cancellable timers driven by the fixed tick.
//!
//! Every asynchronous boundary of the engine is a [`TimerHandle`] stored under
//! a [`TimerKey`]: the automatic refresh, the notification expiry and one
//! countdown per zone. A key holds at most one handle, so scheduling a key
//! again replaces the previous timer instead of adding a second one.
//!
//! `poll_timers` turns due handles into [`TimerFired`] events at the end of
//! `PreSim`; handler systems compare the event id with the key's current
//! handle and drop stale firings.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::Serialize;

use crate::zones::ZoneId;
use crate::{CrowdSet, TickCounter};

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TimerKey {
    /// Automatic refresh cadence.
    Refresh,
    /// Expiry of the current notification.
    NotificationExpiry,
    /// One-second tick source of a zone's warning countdown.
    Countdown(ZoneId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerHandle {
    /// Unique for the lifetime of the schedule; never reused.
    pub id: u64,
    pub due_tick: u64,
    /// `Some` for repeating timers.
    pub period_ticks: Option<u64>,
}

/// Emitted once per due timer per tick.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct TimerFired {
    pub key: TimerKey,
    pub id: u64,
    pub tick: u64,
}

// =============================================================================
// TimerSchedule resource
// =============================================================================

#[derive(Resource, Debug, Default)]
pub struct TimerSchedule {
    timers: BTreeMap<TimerKey, TimerHandle>,
    next_id: u64,
}

impl TimerSchedule {
    fn insert(&mut self, key: TimerKey, due_tick: u64, period_ticks: Option<u64>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.timers.insert(
            key,
            TimerHandle {
                id,
                due_tick,
                period_ticks,
            },
        );
        id
    }

    /// Fires once, `delay_ticks` after `now` (at least one tick later).
    /// Replaces any timer already stored under `key`.
    pub fn schedule_once(&mut self, key: TimerKey, now: u64, delay_ticks: u64) -> u64 {
        self.insert(key, now + delay_ticks.max(1), None)
    }

    /// Fires every `period_ticks`, first at `now + period_ticks`. Replaces any
    /// timer already stored under `key`.
    pub fn schedule_repeating(&mut self, key: TimerKey, now: u64, period_ticks: u64) -> u64 {
        let period = period_ticks.max(1);
        self.insert(key, now + period, Some(period))
    }

    /// Idempotent. Returns whether a timer was actually removed.
    pub fn cancel(&mut self, key: &TimerKey) -> bool {
        self.timers.remove(key).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_active(&self, key: &TimerKey) -> bool {
        self.timers.contains_key(key)
    }

    /// True when `id` is still the live handle for `key`.
    pub fn is_current(&self, key: &TimerKey, id: u64) -> bool {
        self.timers.get(key).is_some_and(|h| h.id == id)
    }

    pub fn get(&self, key: &TimerKey) -> Option<&TimerHandle> {
        self.timers.get(key)
    }

    pub fn ticks_until(&self, key: &TimerKey, now: u64) -> Option<u64> {
        self.timers
            .get(key)
            .map(|h| h.due_tick.saturating_sub(now))
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Number of live countdown timers.
    pub fn countdown_count(&self) -> usize {
        self.timers
            .keys()
            .filter(|k| matches!(k, TimerKey::Countdown(_)))
            .count()
    }

    /// Collects every timer due at `now`, ordered by due tick and then key.
    /// One-shot timers are removed; repeating timers move to their next due
    /// tick after `now`.
    pub fn poll(&mut self, now: u64) -> Vec<TimerFired> {
        let mut due: Vec<(u64, TimerKey)> = self
            .timers
            .iter()
            .filter(|(_, h)| h.due_tick <= now)
            .map(|(k, h)| (h.due_tick, k.clone()))
            .collect();
        due.sort();

        let mut fired = Vec::with_capacity(due.len());
        for (_, key) in due {
            let Some(handle) = self.timers.get_mut(&key) else {
                continue;
            };
            fired.push(TimerFired {
                key: key.clone(),
                id: handle.id,
                tick: now,
            });
            let period_ticks = handle.period_ticks;
            match period_ticks {
                Some(period) => {
                    while handle.due_tick <= now {
                        handle.due_tick += period;
                    }
                }
                None => {
                    self.timers.remove(&key);
                }
            }
        }
        fired
    }
}

// =============================================================================
// Systems
// =============================================================================

pub(crate) fn poll_timers(
    tick: Res<TickCounter>,
    mut timers: ResMut<TimerSchedule>,
    mut fired: EventWriter<TimerFired>,
) {
    for event in timers.poll(tick.0) {
        fired.send(event);
    }
}

/// Drops every outstanding timer once the app is asked to exit.
fn cancel_timers_on_exit(mut exits: EventReader<AppExit>, mut timers: ResMut<TimerSchedule>) {
    if exits.read().next().is_some() && !timers.is_empty() {
        info!("Shutting down: cancelling {} timers", timers.len());
        timers.cancel_all();
    }
}

/// Cancels all timers of a world driven without an app runner (agent mode,
/// tests).
pub fn shutdown(world: &mut World) {
    if let Some(mut timers) = world.get_resource_mut::<TimerSchedule>() {
        timers.cancel_all();
    }
}

// =============================================================================
// Plugin
// =============================================================================

pub struct TimersPlugin;

impl Plugin for TimersPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TimerSchedule>()
            .add_event::<TimerFired>()
            .add_systems(FixedUpdate, poll_timers.in_set(CrowdSet::PreSim))
            .add_systems(Last, cancel_timers_on_exit);
    }
}
