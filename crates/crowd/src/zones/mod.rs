//! Zone model and the zone registry.

mod registry;
mod types;

pub use registry::ZoneRegistry;
pub use types::{CrowdStatus, RecommendedArrival, StatusColor, ZoneId, ZoneState};
