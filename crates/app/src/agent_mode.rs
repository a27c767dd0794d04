//! Headless `--agent` mode: a blocking synchronous loop that reads JSON
//! commands from stdin and writes JSON responses to stdout.
//!
//! The fixed tick only advances when a command asks for it (`step`, or one
//! tick per queued command), so a driver sees fully deterministic timing.
//!
//! ## Protocol
//!
//! Each line of stdin is a JSON object with a `"cmd"` discriminator.
//! Each line of stdout is a JSON response with `"protocol_version"` and
//! `"type"` fields. See [`crowd::agent_protocol`] for the full schema.

use std::io::{BufRead, Write};

use bevy::log::LogPlugin;
use bevy::prelude::*;

use crowd::activity_log::ActivityLog;
use crowd::agent_protocol::{
    make_response, AgentCommand, AgentResponse, ResponsePayload, PROTOCOL_VERSION,
};
use crowd::commands::{CommandHistory, CommandQueue, CommandSource, CrowdCommand};
use crowd::config::TICKS_PER_SECOND;
use crowd::notifications::NotificationCenter;
use crowd::site_stats::SiteStats;
use crowd::timers::{self, TimerKey, TimerSchedule};
use crowd::{run_fixed_tick, CrowdPlugin, TickCounter, ZoneRegistry};

/// Upper bound for one `step`, to keep a typo from stalling the driver.
const MAX_STEP_SECONDS: u64 = 24 * 60 * 60;

pub fn run_agent_mode(plugin: CrowdPlugin) {
    // -- Build a minimal Bevy App: no runner, ticks are driven by commands ---
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    // LogPlugin writes to stderr, so it never interleaves with the protocol.
    app.add_plugins(LogPlugin::default());
    app.add_plugins(plugin);

    // Initial update so Startup systems classify the site and arm timers.
    app.update();

    // -- I/O setup -----------------------------------------------------------
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();

    let zones = app.world().resource::<ZoneRegistry>().len();
    emit(&mut stdout, &make_response(ResponsePayload::Ready { zones }));
    eprintln!("scenic-crowd agent mode v{PROTOCOL_VERSION} ready, waiting for commands on stdin");

    // -- Main command loop ---------------------------------------------------
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("stdin read error: {e}");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let cmd: AgentCommand = match serde_json::from_str(&line) {
            Ok(c) => c,
            Err(e) => {
                emit(
                    &mut stdout,
                    &make_response(ResponsePayload::Error {
                        message: format!("Parse error: {e}"),
                    }),
                );
                continue;
            }
        };

        let response = process_command(cmd, &mut app);
        let is_goodbye = matches!(response.payload, ResponsePayload::Goodbye);
        emit(&mut stdout, &response);

        if is_goodbye {
            break;
        }
    }

    // Covers EOF without an explicit `quit`.
    timers::shutdown(app.world_mut());
    eprintln!("scenic-crowd agent mode shutting down");
}

fn emit(out: &mut impl Write, response: &AgentResponse) {
    match serde_json::to_string(response) {
        Ok(json) => {
            let _ = writeln!(out, "{json}");
            let _ = out.flush();
        }
        Err(e) => eprintln!("failed to encode response: {e}"),
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

fn step(app: &mut App, ticks: u64) {
    for _ in 0..ticks {
        run_fixed_tick(app.world_mut());
    }
}

fn current_tick(app: &App) -> u64 {
    app.world().resource::<TickCounter>().0
}

/// Queues one engine command, runs the tick that executes it and reports the
/// recorded outcome of that command.
fn run_engine_command(app: &mut App, command: CrowdCommand) -> AgentResponse {
    let tick = current_tick(app);
    app.world_mut()
        .resource_mut::<CommandQueue>()
        .push(tick, CommandSource::Agent, command);
    step(app, 1);

    let history = app.world().resource::<CommandHistory>();
    match history.outcome_for(CommandSource::Agent, tick) {
        Some(record) => make_response(ResponsePayload::CommandResult {
            result: record.result.clone(),
        }),
        None => make_response(ResponsePayload::Error {
            message: "command produced no result".to_string(),
        }),
    }
}

fn process_command(cmd: AgentCommand, app: &mut App) -> AgentResponse {
    match cmd {
        AgentCommand::Snapshot => {
            let tick = current_tick(app);
            let zones = app.world().resource::<ZoneRegistry>().snapshot();
            let next_refresh_secs = app
                .world()
                .resource::<TimerSchedule>()
                .ticks_until(&TimerKey::Refresh, tick)
                .map(|ticks| ticks.div_ceil(TICKS_PER_SECOND));
            make_response(ResponsePayload::Snapshot {
                tick,
                zones,
                next_refresh_secs,
            })
        }

        AgentCommand::Step { seconds } => {
            let seconds = seconds.min(MAX_STEP_SECONDS);
            step(app, seconds * TICKS_PER_SECOND);
            make_response(ResponsePayload::StepComplete {
                tick: current_tick(app),
            })
        }

        AgentCommand::Refresh => run_engine_command(app, CrowdCommand::RefreshNow),

        AgentCommand::Select { zone } => run_engine_command(app, CrowdCommand::SelectZone { zone }),

        AgentCommand::SetVisitors { zone, visitors } => {
            run_engine_command(app, CrowdCommand::SetVisitors { zone, visitors })
        }

        AgentCommand::Reset => run_engine_command(app, CrowdCommand::Reset),

        AgentCommand::Notification => {
            let notification = app
                .world()
                .resource::<NotificationCenter>()
                .current()
                .cloned();
            make_response(ResponsePayload::Notification { notification })
        }

        AgentCommand::Stats => make_response(ResponsePayload::Stats {
            stats: app.world().resource::<SiteStats>().clone(),
        }),

        AgentCommand::Log { count } => make_response(ResponsePayload::Log {
            entries: app.world().resource::<ActivityLog>().last_n(count).to_vec(),
        }),

        AgentCommand::Quit => {
            timers::shutdown(app.world_mut());
            make_response(ResponsePayload::Goodbye)
        }
    }
}
