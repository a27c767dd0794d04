//! Drains the [`CommandQueue`] at the start of each tick and records every
//! outcome in the [`CommandHistory`].
//!
//! Runs before timer polling, so a manual refresh re-arms the automatic timer
//! before that timer could fire in the same tick.

use bevy::prelude::*;

use super::history::{CommandHistory, CommandRecord};
use super::{CommandQueue, CommandResult, CrowdCommand};
use crate::notifications::NotificationEvent;
use crate::refresh::{ingest_visitors, perform_refresh, perform_reset, RefreshContext};
use crate::snapshot::{zone_detail, SnapshotReason};

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

pub fn execute_queued_commands(
    mut queue: ResMut<CommandQueue>,
    mut history: ResMut<CommandHistory>,
    mut ctx: RefreshContext,
) {
    for queued in queue.drain() {
        let result = execute_single(&queued.command, &mut ctx);
        if let CommandResult::Error(err) = &result {
            warn!("Command {:?} from {:?} failed: {err}", queued.command, queued.source);
            ctx.notifications.send(NotificationEvent::error(err.to_string()));
        }
        history.record(CommandRecord {
            queued_tick: queued.tick,
            executed_tick: ctx.tick.0,
            source: queued.source,
            command: queued.command,
            result,
        });
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

fn execute_single(command: &CrowdCommand, ctx: &mut RefreshContext) -> CommandResult {
    match command {
        CrowdCommand::RefreshNow => {
            perform_refresh(ctx, SnapshotReason::ManualRefresh);
            CommandResult::Refreshed
        }
        CrowdCommand::SelectZone { zone } => match zone_detail(&ctx.registry, zone) {
            Ok(detail) => CommandResult::Selected(detail),
            Err(err) => CommandResult::Error(err),
        },
        CrowdCommand::SetVisitors { zone, visitors } => {
            match ingest_visitors(ctx, zone, *visitors) {
                Ok(stored) => CommandResult::VisitorsSet {
                    zone: zone.clone(),
                    visitors: stored,
                },
                Err(err) => CommandResult::Error(err),
            }
        }
        CrowdCommand::Reset => {
            perform_reset(ctx);
            CommandResult::Reset
        }
    }
}
