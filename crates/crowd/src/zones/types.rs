use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{DriftRange, ZoneConfig};
use crate::error::CrowdError;
use crate::occupancy::status_for;

/// Stable zone identifier (a short code such as `"B"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ZoneId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ZoneId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Crowding level of a zone, from least to most crowded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CrowdStatus {
    #[default]
    Comfortable,
    Normal,
    Crowded,
}

impl CrowdStatus {
    /// The only valid colour for this status.
    pub fn color(self) -> StatusColor {
        match self {
            CrowdStatus::Comfortable => StatusColor::Green,
            CrowdStatus::Normal => StatusColor::Yellow,
            CrowdStatus::Crowded => StatusColor::Red,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CrowdStatus::Comfortable => "Comfortable",
            CrowdStatus::Normal => "Normal",
            CrowdStatus::Crowded => "Crowded",
        }
    }
}

/// Map colour of a zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusColor {
    #[default]
    Green,
    Yellow,
    Red,
}

impl StatusColor {
    pub fn label(self) -> &'static str {
        match self {
            StatusColor::Green => "green",
            StatusColor::Yellow => "yellow",
            StatusColor::Red => "red",
        }
    }

    /// RGBA fill for map overlays.
    pub fn rgba(self) -> [f32; 4] {
        match self {
            StatusColor::Green => [0.18, 0.80, 0.44, 0.7],
            StatusColor::Yellow => [0.95, 0.77, 0.06, 0.7],
            StatusColor::Red => [0.91, 0.30, 0.24, 0.7],
        }
    }
}

/// When visitors are advised to head to a zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendedArrival {
    #[default]
    Now,
    InMinutes(u32),
}

impl fmt::Display for RecommendedArrival {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendedArrival::Now => f.write_str("now"),
            RecommendedArrival::InMinutes(n) => write!(f, "in {n} minutes"),
        }
    }
}

/// Live state of one physical zone.
///
/// Owned by [`super::ZoneRegistry`]; everything outside the `zones` module
/// only gets read access. Classification fields are rewritten on every
/// refresh, warning fields by the warning controller (through the registry).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneState {
    pub(super) id: ZoneId,
    pub(super) name: String,
    pub(super) capacity: u32,
    pub(super) visitors: u32,
    pub(super) status: CrowdStatus,
    pub(super) color: StatusColor,
    pub(super) queue_time_minutes: u32,
    pub(super) recommended_arrival: RecommendedArrival,
    pub(super) warning_eligible: bool,
    pub(super) warning_active: bool,
    pub(super) countdown_remaining_secs: u32,
    pub(super) alternative: Option<ZoneId>,
    #[serde(skip)]
    pub(super) initial_visitors: u32,
    #[serde(skip)]
    pub(super) drift: DriftRange,
}

impl ZoneState {
    /// Builds a zone from an already validated config entry. The initial
    /// visitor count is clamped into `[0, capacity]`.
    pub(super) fn from_config(config: &ZoneConfig) -> Self {
        let visitors = config.initial_visitors.clamp(0, config.capacity as i64) as u32;
        let status = status_for(visitors, config.capacity);
        Self {
            id: ZoneId::from(config.id.trim()),
            name: config.name.clone(),
            capacity: config.capacity,
            visitors,
            status,
            color: status.color(),
            queue_time_minutes: 0,
            recommended_arrival: RecommendedArrival::Now,
            warning_eligible: config.warning_eligible,
            warning_active: false,
            countdown_remaining_secs: 0,
            alternative: config.alternative.as_deref().map(|a| ZoneId::from(a.trim())),
            initial_visitors: visitors,
            drift: config.drift.unwrap_or_default(),
        }
    }

    pub fn id(&self) -> &ZoneId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn visitors(&self) -> u32 {
        self.visitors
    }

    pub fn status(&self) -> CrowdStatus {
        self.status
    }

    pub fn color(&self) -> StatusColor {
        self.color
    }

    pub fn queue_time_minutes(&self) -> u32 {
        self.queue_time_minutes
    }

    pub fn recommended_arrival(&self) -> RecommendedArrival {
        self.recommended_arrival
    }

    pub fn warning_eligible(&self) -> bool {
        self.warning_eligible
    }

    pub fn warning_active(&self) -> bool {
        self.warning_active
    }

    pub fn countdown_remaining_secs(&self) -> u32 {
        self.countdown_remaining_secs
    }

    pub fn alternative(&self) -> Option<&ZoneId> {
        self.alternative.as_ref()
    }

    pub fn initial_visitors(&self) -> u32 {
        self.initial_visitors
    }

    pub fn drift(&self) -> DriftRange {
        self.drift
    }

    /// `visitors / capacity`, in `[0.0, 1.0]`.
    pub fn occupancy_ratio(&self) -> f64 {
        self.visitors as f64 / self.capacity as f64
    }

    pub fn percentage(&self) -> f64 {
        self.occupancy_ratio() * 100.0
    }

    /// Percentage rounded to the nearest whole number, for display.
    pub fn rounded_percentage(&self) -> u32 {
        self.percentage().round() as u32
    }

    /// Status text shown to visitors. A zone under warning reads
    /// "At capacity" instead of its plain band label.
    pub fn status_label(&self) -> &'static str {
        if self.warning_active {
            "At capacity"
        } else {
            self.status.label()
        }
    }

    /// Checks the invariants that only involve this zone.
    pub fn check_invariants(&self) -> Result<(), CrowdError> {
        if self.visitors > self.capacity {
            return Err(CrowdError::InvariantViolation(format!(
                "zone {} has {} visitors but capacity {}",
                self.id, self.visitors, self.capacity
            )));
        }
        if self.color != self.status.color() {
            return Err(CrowdError::InvariantViolation(format!(
                "zone {} is {:?} but coloured {:?}",
                self.id, self.status, self.color
            )));
        }
        if self.warning_active && self.status != CrowdStatus::Crowded {
            return Err(CrowdError::InvariantViolation(format!(
                "zone {} is under warning while {:?}",
                self.id, self.status
            )));
        }
        if self.countdown_remaining_secs > 0 && !self.warning_active {
            return Err(CrowdError::InvariantViolation(format!(
                "zone {} has a {}s countdown without an active warning",
                self.id, self.countdown_remaining_secs
            )));
        }
        if self.alternative.as_ref() == Some(&self.id) {
            return Err(CrowdError::InvariantViolation(format!(
                "zone {} names itself as alternative",
                self.id
            )));
        }
        Ok(())
    }
}
