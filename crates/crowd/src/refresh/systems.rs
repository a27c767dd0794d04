use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::cycle::{reclassify_zone, run_refresh_cycle, RefreshOutcome};
use crate::activity_log::ActivityLog;
use crate::config::SiteConfig;
use crate::error::CrowdError;
use crate::notifications::NotificationEvent;
use crate::sim_rng::SimRng;
use crate::snapshot::{SnapshotChanged, SnapshotReason};
use crate::timers::{TimerFired, TimerKey, TimerSchedule};
use crate::warning::{record_transition, WarningController};
use crate::zones::{ZoneId, ZoneRegistry};
use crate::{CrowdSet, TickCounter};

/// Everything a refresh-shaped operation touches. Shared by the timer
/// handler, the command executor and startup.
#[derive(SystemParam)]
pub struct RefreshContext<'w> {
    pub registry: ResMut<'w, ZoneRegistry>,
    pub controller: Res<'w, WarningController>,
    pub timers: ResMut<'w, TimerSchedule>,
    pub rng: ResMut<'w, SimRng>,
    pub config: Res<'w, SiteConfig>,
    pub activity: ResMut<'w, ActivityLog>,
    pub tick: Res<'w, TickCounter>,
    pub notifications: EventWriter<'w, NotificationEvent>,
    pub changed: EventWriter<'w, SnapshotChanged>,
}

impl RefreshContext<'_> {
    fn record_outcome(&mut self, outcome: &RefreshOutcome) {
        let now = self.tick.0;
        for transition in &outcome.transitions {
            record_transition(transition, &self.registry, &mut self.activity, now);
        }
        for (zone, err) in &outcome.errors {
            warn!("Refresh of zone {zone} failed: {err}");
        }
    }

    fn announce(&mut self, reason: SnapshotReason) {
        self.changed.send(SnapshotChanged {
            reason,
            tick: self.tick.0,
        });
    }
}

/// Arms the automatic refresh a full interval from `now`, replacing any
/// previous refresh timer. Does nothing when automatic refresh is off.
pub fn schedule_next_refresh(timers: &mut TimerSchedule, config: &SiteConfig, now: u64) {
    if config.auto_refresh {
        timers.schedule_repeating(TimerKey::Refresh, now, config.refresh_interval_ticks());
    }
}

/// Perturb, classify, run the controller and post "Data refreshed".
///
/// A manual refresh also pushes the automatic timer a full interval out.
pub(crate) fn perform_refresh(ctx: &mut RefreshContext, reason: SnapshotReason) {
    let now = ctx.tick.0;
    let outcome = run_refresh_cycle(
        &mut ctx.registry,
        &ctx.controller,
        &mut ctx.timers,
        &mut ctx.rng.0,
        now,
        true,
    );
    ctx.record_outcome(&outcome);

    if reason == SnapshotReason::ManualRefresh {
        schedule_next_refresh(&mut ctx.timers, &ctx.config, now);
        ctx.activity.success(now, "Manual refresh");
    } else {
        ctx.activity.success(now, "Automatic refresh");
    }
    debug!(
        "Refresh at tick {now} ({}): {} visitors on site",
        reason.label(),
        ctx.registry.total_visitors()
    );

    ctx.notifications
        .send(NotificationEvent::success("Data refreshed"));
    ctx.announce(reason);
}

/// Restores the configured visitor counts, drops every warning and starts
/// the refresh cadence over.
pub(crate) fn perform_reset(ctx: &mut RefreshContext) {
    let now = ctx.tick.0;
    ctx.controller.clear_all(&mut ctx.registry, &mut ctx.timers);
    ctx.registry.restore_initial();
    let outcome = run_refresh_cycle(
        &mut ctx.registry,
        &ctx.controller,
        &mut ctx.timers,
        &mut ctx.rng.0,
        now,
        false,
    );
    ctx.record_outcome(&outcome);
    schedule_next_refresh(&mut ctx.timers, &ctx.config, now);

    info!("Site data reset to defaults");
    ctx.activity.info(now, "Data reset to defaults");
    ctx.notifications
        .send(NotificationEvent::success("Data reset to defaults"));
    ctx.announce(SnapshotReason::Reset);
}

/// External visitor count for one zone: clamp, reclassify, run the
/// controller. Returns the stored count.
pub(crate) fn ingest_visitors(
    ctx: &mut RefreshContext,
    id: &ZoneId,
    visitors: i64,
) -> Result<u32, CrowdError> {
    let now = ctx.tick.0;
    let stored = ctx.registry.set_visitors(id, visitors)?;
    let transition = reclassify_zone(
        &mut ctx.registry,
        &ctx.controller,
        &mut ctx.timers,
        &mut ctx.rng.0,
        id,
        now,
    )?;
    if let Some(transition) = &transition {
        record_transition(transition, &ctx.registry, &mut ctx.activity, now);
    }
    let name = ctx.registry.get(id)?.name().to_string();
    ctx.activity
        .info(now, format!("{name} visitor count set to {stored}"));
    ctx.announce(SnapshotReason::VisitorsIngested);
    Ok(stored)
}

// =============================================================================
// Systems
// =============================================================================

/// Startup pass: classify the configured counts (no perturbation), run the
/// controller and arm the automatic refresh.
pub fn initialize_site(mut ctx: RefreshContext) {
    let now = ctx.tick.0;
    let outcome = run_refresh_cycle(
        &mut ctx.registry,
        &ctx.controller,
        &mut ctx.timers,
        &mut ctx.rng.0,
        now,
        false,
    );
    ctx.record_outcome(&outcome);
    schedule_next_refresh(&mut ctx.timers, &ctx.config, now);

    let zones = ctx.registry.len();
    if ctx.config.auto_refresh {
        info!(
            "Crowd engine started: {zones} zones, refresh every {}s",
            ctx.config.refresh_interval_secs
        );
    } else {
        info!("Crowd engine started: {zones} zones, automatic refresh off");
    }
    ctx.activity
        .info(now, format!("Dashboard started with {zones} zones"));
    ctx.announce(SnapshotReason::Startup);
}

/// Runs a refresh when the live `Refresh` timer fired this tick.
pub fn handle_refresh_timer(mut fired: EventReader<TimerFired>, mut ctx: RefreshContext) {
    let mut due = false;
    for event in fired.read() {
        if event.key == TimerKey::Refresh && ctx.timers.is_current(&event.key, event.id) {
            due = true;
        }
    }
    if due {
        perform_refresh(&mut ctx, SnapshotReason::AutomaticRefresh);
    }
}

pub struct RefreshPlugin;

impl Plugin for RefreshPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, initialize_site).add_systems(
            FixedUpdate,
            handle_refresh_timer.in_set(CrowdSet::Simulation),
        );
    }
}
