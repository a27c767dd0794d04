// ---------------------------------------------------------------------------
// Error types for the crowd-state engine
// ---------------------------------------------------------------------------

use std::fmt;

use serde::Serialize;

use crate::zones::ZoneId;

/// Runtime errors surfaced to the immediate caller.
///
/// These never stop the tick loop: command results carry them back to the
/// requester and timer handlers log them and carry on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CrowdError {
    /// The referenced zone id is not registered.
    NotFound(ZoneId),
    /// A zone broke one of its state invariants.
    InvariantViolation(String),
}

impl fmt::Display for CrowdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrowdError::NotFound(id) => write!(f, "Unknown zone: {id}"),
            CrowdError::InvariantViolation(msg) => write!(f, "Invariant violation: {msg}"),
        }
    }
}

impl std::error::Error for CrowdError {}

/// Startup configuration errors. All of them are fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration lists no zones at all.
    NoZones,
    /// A zone id is empty or whitespace.
    EmptyZoneId,
    /// Two zones share the same id.
    DuplicateZone(String),
    /// A zone was configured with zero capacity.
    ZeroCapacity(String),
    /// A zone names itself as its alternative.
    SelfAlternative(String),
    /// A zone's alternative is not a registered zone.
    UnknownAlternative { zone: String, alternative: String },
    /// A drift range with `min > max`.
    InvalidDrift { zone: String, min: i32, max: i32 },
    /// A duration tunable was set to zero.
    ZeroDuration(&'static str),
    /// The configuration text could not be parsed.
    Parse(String),
    /// The configuration file could not be read.
    Io(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoZones => write!(f, "configuration defines no zones"),
            ConfigError::EmptyZoneId => write!(f, "zone id must not be empty"),
            ConfigError::DuplicateZone(id) => write!(f, "zone '{id}' is defined twice"),
            ConfigError::ZeroCapacity(id) => {
                write!(f, "zone '{id}' must have a capacity greater than zero")
            }
            ConfigError::SelfAlternative(id) => {
                write!(f, "zone '{id}' cannot be its own alternative")
            }
            ConfigError::UnknownAlternative { zone, alternative } => write!(
                f,
                "zone '{zone}' names unknown alternative zone '{alternative}'"
            ),
            ConfigError::InvalidDrift { zone, min, max } => write!(
                f,
                "zone '{zone}' has an inverted drift range ({min} > {max})"
            ),
            ConfigError::ZeroDuration(field) => write!(f, "{field} must be greater than zero"),
            ConfigError::Parse(msg) => write!(f, "invalid configuration: {msg}"),
            ConfigError::Io(msg) => write!(f, "cannot read configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
