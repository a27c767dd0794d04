//! JSON line protocol for the `--agent` headless mode.
//!
//! External programs (scripts, kiosks, test drivers) send one command per line
//! on stdin and read one response per line on stdout. The types live in the
//! library so they can be unit-tested without the binary; the I/O loop is in
//! `crates/app/src/agent_mode.rs`.

use serde::{Deserialize, Serialize};

use crate::activity_log::ActivityEntry;
use crate::commands::CommandResult;
use crate::notifications::Notification;
use crate::site_stats::SiteStats;
use crate::zones::{ZoneId, ZoneState};

// ---------------------------------------------------------------------------
// Commands (stdin → engine)
// ---------------------------------------------------------------------------

/// One line of stdin. The `cmd` field is the discriminator.
#[derive(Debug, Deserialize)]
#[serde(tag = "cmd")]
pub enum AgentCommand {
    /// Current state of every zone.
    #[serde(rename = "snapshot")]
    Snapshot,

    /// Advance the engine by whole simulated seconds.
    #[serde(rename = "step")]
    Step { seconds: u64 },

    /// Manual refresh.
    #[serde(rename = "refresh")]
    Refresh,

    /// Detail of one zone.
    #[serde(rename = "select")]
    Select { zone: ZoneId },

    /// External visitor count for one zone.
    #[serde(rename = "set_visitors")]
    SetVisitors { zone: ZoneId, visitors: i64 },

    /// Restore the configured starting counts.
    #[serde(rename = "reset")]
    Reset,

    /// The message currently shown, if any.
    #[serde(rename = "notification")]
    Notification,

    /// Site-wide figures.
    #[serde(rename = "stats")]
    Stats,

    /// Most recent activity entries.
    #[serde(rename = "log")]
    Log {
        #[serde(default = "default_log_count")]
        count: usize,
    },

    /// End the session.
    #[serde(rename = "quit")]
    Quit,
}

fn default_log_count() -> usize {
    20
}

// ---------------------------------------------------------------------------
// Responses (engine → stdout)
// ---------------------------------------------------------------------------

/// Every response carries the protocol version and a tagged payload.
#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub protocol_version: u32,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ResponsePayload {
    /// The engine is ready to accept commands.
    #[serde(rename = "ready")]
    Ready { zones: usize },

    #[serde(rename = "snapshot")]
    Snapshot {
        tick: u64,
        zones: Vec<ZoneState>,
        /// Seconds until the automatic refresh; absent when it is off.
        next_refresh_secs: Option<u64>,
    },

    /// The engine advanced; reports the current tick.
    #[serde(rename = "step_complete")]
    StepComplete { tick: u64 },

    /// Outcome of a queued command (refresh, select, set_visitors, reset).
    #[serde(rename = "command_result")]
    CommandResult { result: CommandResult },

    #[serde(rename = "notification")]
    Notification { notification: Option<Notification> },

    #[serde(rename = "stats")]
    Stats { stats: SiteStats },

    #[serde(rename = "log")]
    Log { entries: Vec<ActivityEntry> },

    #[serde(rename = "error")]
    Error { message: String },

    /// Response to `quit`; all timers have been cancelled.
    #[serde(rename = "goodbye")]
    Goodbye,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Bump when the command/response schema changes.
pub const PROTOCOL_VERSION: u32 = 1;

pub fn make_response(payload: ResponsePayload) -> AgentResponse {
    AgentResponse {
        protocol_version: PROTOCOL_VERSION,
        payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CrowdError;

    #[test]
    fn deserialize_snapshot_command() {
        let cmd: AgentCommand = serde_json::from_str(r#"{"cmd":"snapshot"}"#).unwrap();
        assert!(matches!(cmd, AgentCommand::Snapshot));
    }

    #[test]
    fn deserialize_step_command() {
        let cmd: AgentCommand = serde_json::from_str(r#"{"cmd":"step","seconds":30}"#).unwrap();
        if let AgentCommand::Step { seconds } = cmd {
            assert_eq!(seconds, 30);
        } else {
            panic!("expected Step");
        }
    }

    #[test]
    fn deserialize_select_command() {
        let cmd: AgentCommand = serde_json::from_str(r#"{"cmd":"select","zone":"B"}"#).unwrap();
        if let AgentCommand::Select { zone } = cmd {
            assert_eq!(zone, ZoneId::from("B"));
        } else {
            panic!("expected Select");
        }
    }

    #[test]
    fn deserialize_set_visitors_negative() {
        let json = r#"{"cmd":"set_visitors","zone":"A","visitors":-5}"#;
        let cmd: AgentCommand = serde_json::from_str(json).unwrap();
        if let AgentCommand::SetVisitors { zone, visitors } = cmd {
            assert_eq!(zone, ZoneId::from("A"));
            assert_eq!(visitors, -5);
        } else {
            panic!("expected SetVisitors");
        }
    }

    #[test]
    fn deserialize_log_default_count() {
        let cmd: AgentCommand = serde_json::from_str(r#"{"cmd":"log"}"#).unwrap();
        assert!(matches!(cmd, AgentCommand::Log { count: 20 }));
        let cmd: AgentCommand = serde_json::from_str(r#"{"cmd":"log","count":3}"#).unwrap();
        assert!(matches!(cmd, AgentCommand::Log { count: 3 }));
    }

    #[test]
    fn deserialize_unit_commands() {
        let parse = |json: &str| serde_json::from_str::<AgentCommand>(json).unwrap();
        assert!(matches!(parse(r#"{"cmd":"refresh"}"#), AgentCommand::Refresh));
        assert!(matches!(parse(r#"{"cmd":"reset"}"#), AgentCommand::Reset));
        assert!(matches!(
            parse(r#"{"cmd":"notification"}"#),
            AgentCommand::Notification
        ));
        assert!(matches!(parse(r#"{"cmd":"stats"}"#), AgentCommand::Stats));
        assert!(matches!(parse(r#"{"cmd":"quit"}"#), AgentCommand::Quit));
    }

    #[test]
    fn serialize_ready_response() {
        let json = serde_json::to_string(&make_response(ResponsePayload::Ready { zones: 4 })).unwrap();
        assert!(json.contains("\"protocol_version\":1"));
        assert!(json.contains("\"type\":\"ready\""));
        assert!(json.contains("\"zones\":4"));
    }

    #[test]
    fn serialize_command_result_response() {
        let resp = make_response(ResponsePayload::CommandResult {
            result: CommandResult::Error(CrowdError::NotFound(ZoneId::from("Q"))),
        });
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"type\":\"command_result\""));
        assert!(json.contains("\"NotFound\":\"Q\""), "got: {json}");
    }

    #[test]
    fn serialize_empty_notification_response() {
        let resp = make_response(ResponsePayload::Notification { notification: None });
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"notification\":null"));
    }

    #[test]
    fn serialize_error_and_goodbye() {
        let json = serde_json::to_string(&make_response(ResponsePayload::Error {
            message: "bad line".to_string(),
        }))
        .unwrap();
        assert!(json.contains("\"type\":\"error\""));
        assert!(json.contains("bad line"));
        let json = serde_json::to_string(&make_response(ResponsePayload::Goodbye)).unwrap();
        assert!(json.contains("\"type\":\"goodbye\""));
    }

    #[test]
    fn invalid_command_returns_parse_error() {
        assert!(serde_json::from_str::<AgentCommand>(r#"{"cmd":"nonexistent"}"#).is_err());
        assert!(serde_json::from_str::<AgentCommand>(r#"{not valid json"#).is_err());
        assert!(serde_json::from_str::<AgentCommand>(r#"{"cmd":"select"}"#).is_err());
    }
}
