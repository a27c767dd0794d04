//! Transient user-facing messages.
//!
//! At most one notification is current. A new post pre-empts the previous one
//! immediately (no queueing) and arms a one-shot `NotificationExpiry` timer;
//! since that key holds a single handle, the old message's expiry is replaced
//! along with the message. Expiry checks the timer id, so a stale firing can
//! never remove a newer message.
//!
//! Other systems send [`NotificationEvent`]s; `collect_notifications` posts
//! them in `PostSim`, in send order.

use bevy::prelude::*;
use serde::Serialize;

use crate::timers::{TimerFired, TimerKey, TimerSchedule};
use crate::{CrowdSet, TickCounter};

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    pub posted_tick: u64,
    /// Handle of the expiry timer that removes this message.
    #[serde(skip)]
    pub timer_id: u64,
}

/// Request to show a message.
///
/// ```ignore
/// fn my_system(mut events: EventWriter<NotificationEvent>) {
///     events.send(NotificationEvent::success("Data refreshed"));
/// }
/// ```
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub message: String,
    pub kind: NotificationKind,
}

impl NotificationEvent {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Error,
        }
    }
}

// =============================================================================
// NotificationCenter resource
// =============================================================================

#[derive(Resource, Debug)]
pub struct NotificationCenter {
    current: Option<Notification>,
    display_ticks: u64,
    next_id: u64,
    posted_total: u64,
}

impl NotificationCenter {
    pub fn new(display_ticks: u64) -> Self {
        Self {
            current: None,
            display_ticks,
            next_id: 1,
            posted_total: 0,
        }
    }

    /// Replaces the current message and schedules its expiry. Returns the
    /// new notification id.
    pub fn post(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        timers: &mut TimerSchedule,
        now: u64,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.posted_total += 1;
        let timer_id = timers.schedule_once(TimerKey::NotificationExpiry, now, self.display_ticks);
        self.current = Some(Notification {
            id,
            message: message.into(),
            kind,
            posted_tick: now,
            timer_id,
        });
        id
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    /// Removes the current message if `timer_id` is its expiry timer.
    /// Anything else (already expired, replaced) is a no-op.
    pub fn expire(&mut self, timer_id: u64) -> bool {
        if self.current.as_ref().is_some_and(|n| n.timer_id == timer_id) {
            self.current = None;
            true
        } else {
            false
        }
    }

    /// Drops the current message and its expiry timer.
    pub fn dismiss(&mut self, timers: &mut TimerSchedule) {
        if self.current.take().is_some() {
            timers.cancel(&TimerKey::NotificationExpiry);
        }
    }

    pub fn display_ticks(&self) -> u64 {
        self.display_ticks
    }

    /// Messages posted since startup.
    pub fn posted_total(&self) -> u64 {
        self.posted_total
    }
}

// =============================================================================
// Systems
// =============================================================================

pub(crate) fn expire_notifications(
    mut fired: EventReader<TimerFired>,
    mut center: ResMut<NotificationCenter>,
) {
    for event in fired.read() {
        if event.key == TimerKey::NotificationExpiry {
            center.expire(event.id);
        }
    }
}

pub(crate) fn collect_notifications(
    mut events: EventReader<NotificationEvent>,
    mut center: ResMut<NotificationCenter>,
    mut timers: ResMut<TimerSchedule>,
    tick: Res<TickCounter>,
) {
    for event in events.read() {
        center.post(event.message.clone(), event.kind, &mut timers, tick.0);
    }
}

// =============================================================================
// Plugin
// =============================================================================

/// `display_ticks` is how long a posted message stays current.
pub struct NotificationsPlugin {
    pub display_ticks: u64,
}

impl Plugin for NotificationsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(NotificationCenter::new(self.display_ticks))
            .add_event::<NotificationEvent>()
            .add_systems(
                FixedUpdate,
                (expire_notifications, collect_notifications)
                    .chain()
                    .in_set(CrowdSet::PostSim),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_sets_current() {
        let mut timers = TimerSchedule::default();
        let mut center = NotificationCenter::new(30);
        center.post("Data refreshed", NotificationKind::Success, &mut timers, 5);
        let current = center.current().expect("message posted");
        assert_eq!(current.message, "Data refreshed");
        assert_eq!(current.kind, NotificationKind::Success);
        assert_eq!(current.posted_tick, 5);
        assert_eq!(timers.ticks_until(&TimerKey::NotificationExpiry, 5), Some(30));
    }

    #[test]
    fn test_second_post_preempts_first() {
        let mut timers = TimerSchedule::default();
        let mut center = NotificationCenter::new(30);
        center.post("A", NotificationKind::Success, &mut timers, 0);
        center.post("B", NotificationKind::Error, &mut timers, 0);
        let current = center.current().unwrap();
        assert_eq!(current.message, "B");
        assert_eq!(current.kind, NotificationKind::Error);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_stale_expiry_ignored() {
        let mut timers = TimerSchedule::default();
        let mut center = NotificationCenter::new(30);
        center.post("A", NotificationKind::Success, &mut timers, 0);
        let stale = center.current().unwrap().timer_id;
        center.post("B", NotificationKind::Success, &mut timers, 10);
        assert!(!center.expire(stale));
        assert_eq!(center.current().unwrap().message, "B");
    }

    #[test]
    fn test_expiry_is_idempotent() {
        let mut timers = TimerSchedule::default();
        let mut center = NotificationCenter::new(30);
        center.post("A", NotificationKind::Success, &mut timers, 0);
        let fired = timers.poll(30);
        assert_eq!(fired.len(), 1);
        assert!(center.expire(fired[0].id));
        assert!(center.current().is_none());
        assert!(!center.expire(fired[0].id));
    }

    #[test]
    fn test_dismiss_cancels_timer() {
        let mut timers = TimerSchedule::default();
        let mut center = NotificationCenter::new(30);
        center.post("A", NotificationKind::Success, &mut timers, 0);
        center.dismiss(&mut timers);
        assert!(center.current().is_none());
        assert!(timers.is_empty());
        assert_eq!(center.posted_total(), 1);
    }
}
