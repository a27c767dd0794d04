//! Engine constants and the startup site configuration.
//!
//! Constants describe the fixed contract of the dashboard (tick rate,
//! occupancy bands, reference durations). [`SiteConfig`] is the runtime input
//! handed over by whoever embeds the engine: the ordered list of zones plus a
//! handful of tunables. It is validated once, when the [`crate::CrowdPlugin`]
//! is built; see [`crate::zones::ZoneRegistry::from_config`].

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// =============================================================================
// Timing
// =============================================================================

/// FixedUpdate rate. Every timer in the engine is expressed in these ticks.
pub const TICKS_PER_SECOND: u64 = 10;

/// Reference cadence of the automatic refresh.
pub const REFRESH_INTERVAL_SECS: u32 = 30;

/// Reference recovery countdown armed when a zone enters the warning state.
pub const WARNING_DURATION_SECS: u32 = 20 * 60;

/// How long a transient notification stays visible.
pub const NOTIFICATION_DISPLAY_SECS: u32 = 3;

// =============================================================================
// Occupancy bands (percent of capacity)
// =============================================================================

/// Below this percentage a zone is Comfortable.
pub const COMFORTABLE_BELOW_PCT: u64 = 70;

/// Up to and including this percentage a zone is Normal; above it, Crowded.
pub const NORMAL_UP_TO_PCT: u64 = 85;

/// Strictly above this percentage a warning-eligible zone becomes a warning
/// candidate.
pub const WARNING_ABOVE_PCT: u64 = 95;

// =============================================================================
// Simulated feed
// =============================================================================

/// A simulated refresh never drops a zone below this many visitors.
pub const VISITOR_FLOOR: u32 = 10;

/// Default per-refresh visitor drift, inclusive on both ends.
///
/// [`SiteConfig::reference`] leaves every zone on this uniform range, matching
/// the browser feed. Sites that want per-area volatility (a busy deck at
/// `-10..=15`, a quiet garden at `-5..=8`) set it per zone with
/// [`ZoneConfig::with_drift`] or the `drift` field of the JSON layout.
pub const DEFAULT_DRIFT: DriftRange = DriftRange { min: -15, max: 15 };

/// Inclusive range of the random visitor delta applied on each simulated
/// refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftRange {
    pub min: i32,
    pub max: i32,
}

impl Default for DriftRange {
    fn default() -> Self {
        DEFAULT_DRIFT
    }
}

// =============================================================================
// Runtime configuration
// =============================================================================

/// One zone as described by the startup configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub id: String,
    pub name: String,
    pub capacity: u32,
    /// Clamped into `[0, capacity]` at startup, never rejected.
    #[serde(default)]
    pub initial_visitors: i64,
    #[serde(default)]
    pub warning_eligible: bool,
    /// Zone recommended as a substitute while this one is crowded.
    #[serde(default)]
    pub alternative: Option<String>,
    #[serde(default)]
    pub drift: Option<DriftRange>,
}

impl ZoneConfig {
    pub fn new(id: &str, name: &str, capacity: u32, initial_visitors: i64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            capacity,
            initial_visitors,
            warning_eligible: false,
            alternative: None,
            drift: None,
        }
    }

    pub fn warning_eligible(mut self) -> Self {
        self.warning_eligible = true;
        self
    }

    pub fn with_alternative(mut self, alternative: &str) -> Self {
        self.alternative = Some(alternative.to_string());
        self
    }

    pub fn with_drift(mut self, min: i32, max: i32) -> Self {
        self.drift = Some(DriftRange { min, max });
        self
    }
}

/// Everything the engine needs at startup.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Zones in registration (display) order.
    pub zones: Vec<ZoneConfig>,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u32,
    #[serde(default = "default_warning_duration")]
    pub warning_duration_secs: u32,
    #[serde(default = "default_notification_secs")]
    pub notification_secs: u32,
    /// When false only manual refreshes perturb the data.
    #[serde(default = "default_auto_refresh")]
    pub auto_refresh: bool,
    /// Fixed RNG seed; `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_refresh_interval() -> u32 {
    REFRESH_INTERVAL_SECS
}

fn default_warning_duration() -> u32 {
    WARNING_DURATION_SECS
}

fn default_notification_secs() -> u32 {
    NOTIFICATION_DISPLAY_SECS
}

fn default_auto_refresh() -> bool {
    true
}

impl SiteConfig {
    /// The four-zone layout the dashboard ships with.
    pub fn reference() -> Self {
        Self {
            zones: vec![
                ZoneConfig::new("A", "Plaza", 300, 120).with_alternative("C"),
                ZoneConfig::new("B", "Observation Deck", 200, 190)
                    .warning_eligible()
                    .with_alternative("C"),
                ZoneConfig::new("C", "Garden", 250, 120),
                ZoneConfig::new("D", "Trail", 180, 150),
            ],
            refresh_interval_secs: REFRESH_INTERVAL_SECS,
            warning_duration_secs: WARNING_DURATION_SECS,
            notification_secs: NOTIFICATION_DISPLAY_SECS,
            auto_refresh: true,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn without_auto_refresh(mut self) -> Self {
        self.auto_refresh = false;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    pub fn refresh_interval_ticks(&self) -> u64 {
        self.refresh_interval_secs as u64 * TICKS_PER_SECOND
    }

    pub fn notification_ticks(&self) -> u64 {
        self.notification_secs as u64 * TICKS_PER_SECOND
    }

    /// Checks the scalar tunables. Zone-level checks live in the registry.
    pub(crate) fn validate_timing(&self) -> Result<(), ConfigError> {
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::ZeroDuration("refresh_interval_secs"));
        }
        if self.warning_duration_secs == 0 {
            return Err(ConfigError::ZeroDuration("warning_duration_secs"));
        }
        if self.notification_secs == 0 {
            return Err(ConfigError::ZeroDuration("notification_secs"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_layout() {
        let config = SiteConfig::reference();
        let ids: Vec<&str> = config.zones.iter().map(|z| z.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C", "D"]);
        let eligible: Vec<&str> = config
            .zones
            .iter()
            .filter(|z| z.warning_eligible)
            .map(|z| z.id.as_str())
            .collect();
        assert_eq!(eligible, vec!["B"]);
        assert_eq!(config.refresh_interval_secs, 30);
        assert_eq!(config.warning_duration_secs, 1200);
        assert_eq!(config.notification_secs, 3);
        assert!(config.zones.iter().all(|z| z.drift.is_none()));
    }

    #[test]
    fn test_drift_override_reaches_zone_state() {
        let mut config = SiteConfig::reference();
        config.zones[1] = config.zones[1].clone().with_drift(-10, 15);
        let registry = crate::ZoneRegistry::from_config(&config).unwrap();
        let deck = registry.get(&"B".into()).unwrap();
        assert_eq!(deck.drift(), DriftRange { min: -10, max: 15 });
        let plaza = registry.get(&"A".into()).unwrap();
        assert_eq!(plaza.drift(), DEFAULT_DRIFT);
    }

    #[test]
    fn test_json_defaults_fill_optional_fields() {
        let json = r#"{
            "zones": [
                { "id": "N", "name": "North Gate", "capacity": 80 }
            ]
        }"#;
        let config = SiteConfig::from_json_str(json).expect("valid json");
        assert_eq!(config.refresh_interval_secs, REFRESH_INTERVAL_SECS);
        assert_eq!(config.warning_duration_secs, WARNING_DURATION_SECS);
        assert!(config.auto_refresh);
        assert_eq!(config.seed, None);
        let zone = &config.zones[0];
        assert_eq!(zone.initial_visitors, 0);
        assert!(!zone.warning_eligible);
        assert_eq!(zone.alternative, None);
        assert_eq!(zone.drift, None);
    }

    #[test]
    fn test_json_full_zone() {
        let json = r#"{
            "zones": [
                { "id": "S", "name": "Summit", "capacity": 40, "initial_visitors": 12,
                  "warning_eligible": true, "alternative": "T",
                  "drift": { "min": -5, "max": 8 } },
                { "id": "T", "name": "Terrace", "capacity": 60 }
            ],
            "refresh_interval_secs": 120,
            "seed": 7
        }"#;
        let config = SiteConfig::from_json_str(json).expect("valid json");
        assert_eq!(config.refresh_interval_secs, 120);
        assert_eq!(config.seed, Some(7));
        let summit = &config.zones[0];
        assert!(summit.warning_eligible);
        assert_eq!(summit.alternative.as_deref(), Some("T"));
        assert_eq!(summit.drift, Some(DriftRange { min: -5, max: 8 }));
    }

    #[test]
    fn test_json_parse_error() {
        let err = SiteConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got: {err:?}");
    }

    #[test]
    fn test_negative_capacity_is_a_parse_error() {
        let json = r#"{ "zones": [ { "id": "X", "name": "X", "capacity": -3 } ] }"#;
        assert!(matches!(
            SiteConfig::from_json_str(json),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_zero_durations_rejected() {
        let mut config = SiteConfig::reference();
        config.refresh_interval_secs = 0;
        assert_eq!(
            config.validate_timing(),
            Err(ConfigError::ZeroDuration("refresh_interval_secs"))
        );

        let mut config = SiteConfig::reference();
        config.warning_duration_secs = 0;
        assert_eq!(
            config.validate_timing(),
            Err(ConfigError::ZeroDuration("warning_duration_secs"))
        );

        let mut config = SiteConfig::reference();
        config.notification_secs = 0;
        assert_eq!(
            config.validate_timing(),
            Err(ConfigError::ZeroDuration("notification_secs"))
        );
    }

    #[test]
    fn test_tick_conversions() {
        let config = SiteConfig::reference();
        assert_eq!(config.refresh_interval_ticks(), 300);
        assert_eq!(config.notification_ticks(), 30);
    }
}
