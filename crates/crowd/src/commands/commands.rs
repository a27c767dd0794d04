use serde::{Deserialize, Serialize};

use crate::zones::ZoneId;

/// Manual triggers from the presentation layer or an external feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrowdCommand {
    /// Same cycle as the automatic refresh, run now.
    RefreshNow,
    /// Detail request for one zone (a click on the map).
    SelectZone { zone: ZoneId },
    /// External visitor count for one zone; clamped on store.
    SetVisitors { zone: ZoneId, visitors: i64 },
    /// Back to the configured starting counts.
    Reset,
}
