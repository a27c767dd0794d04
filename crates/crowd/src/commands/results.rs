use serde::Serialize;

use crate::error::CrowdError;
use crate::snapshot::ZoneDetail;
use crate::zones::ZoneId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CommandResult {
    Refreshed,
    Selected(ZoneDetail),
    VisitorsSet { zone: ZoneId, visitors: u32 },
    Reset,
    Error(CrowdError),
}

impl CommandResult {
    pub fn is_success(&self) -> bool {
        !matches!(self, CommandResult::Error(_))
    }

    pub fn error(&self) -> Option<&CrowdError> {
        match self {
            CommandResult::Error(err) => Some(err),
            _ => None,
        }
    }
}
