//! Change notifications and read-only views for the presentation layer.

use bevy::prelude::*;
use serde::Serialize;

use crate::error::CrowdError;
use crate::zones::{CrowdStatus, ZoneId, ZoneRegistry, ZoneState};

/// Why the zone data changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SnapshotReason {
    Startup,
    AutomaticRefresh,
    ManualRefresh,
    /// A warning was entered, recovered or expired outside a refresh.
    CountdownTransition,
    VisitorsIngested,
    Reset,
}

impl SnapshotReason {
    pub fn label(&self) -> &'static str {
        match self {
            SnapshotReason::Startup => "startup",
            SnapshotReason::AutomaticRefresh => "automatic refresh",
            SnapshotReason::ManualRefresh => "manual refresh",
            SnapshotReason::CountdownTransition => "countdown",
            SnapshotReason::VisitorsIngested => "visitors ingested",
            SnapshotReason::Reset => "reset",
        }
    }
}

/// Sent whenever a consistent new state is available; consumers re-read
/// [`ZoneRegistry::snapshot`].
///
/// Countdown seconds ticking down inside a warning do not produce this event;
/// only transitions do.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotChanged {
    pub reason: SnapshotReason,
    pub tick: u64,
}

/// Name and status of a zone's recommended alternative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativeSummary {
    pub id: ZoneId,
    pub name: String,
    pub status: CrowdStatus,
    pub status_label: &'static str,
    pub percentage: u32,
}

/// Everything the detail view of a selected zone shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneDetail {
    pub zone: ZoneState,
    pub percentage: u32,
    pub status_label: &'static str,
    pub alternative: Option<AlternativeSummary>,
}

/// Builds the detail view of one zone.
pub fn zone_detail(registry: &ZoneRegistry, id: &ZoneId) -> Result<ZoneDetail, CrowdError> {
    let zone = registry.get(id)?;
    let alternative = match zone.alternative() {
        Some(alt_id) => {
            let alt = registry.get(alt_id)?;
            Some(AlternativeSummary {
                id: alt.id().clone(),
                name: alt.name().to_string(),
                status: alt.status(),
                status_label: alt.status_label(),
                percentage: alt.rounded_percentage(),
            })
        }
        None => None,
    };
    Ok(ZoneDetail {
        zone: zone.clone(),
        percentage: zone.rounded_percentage(),
        status_label: zone.status_label(),
        alternative,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    fn registry() -> ZoneRegistry {
        ZoneRegistry::from_config(&SiteConfig::reference()).unwrap()
    }

    #[test]
    fn test_detail_includes_alternative() {
        let detail = zone_detail(&registry(), &ZoneId::from("B")).unwrap();
        assert_eq!(detail.percentage, 95);
        assert_eq!(detail.status_label, "Crowded");
        let alt = detail.alternative.expect("B has an alternative");
        assert_eq!(alt.id, ZoneId::from("C"));
        assert_eq!(alt.name, "Garden");
        assert_eq!(alt.status, CrowdStatus::Comfortable);
        assert_eq!(alt.percentage, 48);
    }

    #[test]
    fn test_detail_without_alternative() {
        let detail = zone_detail(&registry(), &ZoneId::from("D")).unwrap();
        assert!(detail.alternative.is_none());
        assert_eq!(detail.zone.name(), "Trail");
    }

    #[test]
    fn test_detail_unknown_zone() {
        assert_eq!(
            zone_detail(&registry(), &ZoneId::from("Q")).unwrap_err(),
            CrowdError::NotFound(ZoneId::from("Q"))
        );
    }

    #[test]
    fn test_detail_serializes() {
        let detail = zone_detail(&registry(), &ZoneId::from("A")).unwrap();
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["zone"]["id"], "A");
        assert_eq!(json["zone"]["status"], "Comfortable");
        assert_eq!(json["status_label"], "Comfortable");
        assert_eq!(json["alternative"]["name"], "Garden");
    }
}
