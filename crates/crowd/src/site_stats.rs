//! Site-wide figures for the dashboard header.
//!
//! Recomputed from the registry whenever a [`SnapshotChanged`] event arrives,
//! so [`SiteStats::revision`] doubles as a change counter for pollers.

use bevy::prelude::*;
use serde::Serialize;

use crate::snapshot::{SnapshotChanged, SnapshotReason};
use crate::zones::{CrowdStatus, ZoneRegistry};
use crate::CrowdSet;

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize)]
pub struct SiteStats {
    pub zone_count: usize,
    pub total_visitors: u64,
    pub total_capacity: u64,
    pub comfortable_zones: usize,
    pub normal_zones: usize,
    pub crowded_zones: usize,
    /// Zones that are Crowded or under warning.
    pub alert_zones: usize,
    pub warning_zones: usize,
    pub automatic_refreshes: u64,
    pub manual_refreshes: u64,
    pub last_refresh_tick: Option<u64>,
    /// Incremented once per observed change event.
    pub revision: u64,
    pub last_reason: Option<SnapshotReason>,
}

impl SiteStats {
    /// Recounts every zone-derived figure. Refresh counters and the revision
    /// are left alone.
    pub fn recount(&mut self, registry: &ZoneRegistry) {
        self.zone_count = registry.len();
        self.total_visitors = registry.total_visitors();
        self.total_capacity = registry.total_capacity();
        self.comfortable_zones = 0;
        self.normal_zones = 0;
        self.crowded_zones = 0;
        self.alert_zones = 0;
        self.warning_zones = 0;
        for zone in registry.iter() {
            match zone.status() {
                CrowdStatus::Comfortable => self.comfortable_zones += 1,
                CrowdStatus::Normal => self.normal_zones += 1,
                CrowdStatus::Crowded => self.crowded_zones += 1,
            }
            if zone.warning_active() {
                self.warning_zones += 1;
            }
            if zone.status() == CrowdStatus::Crowded || zone.warning_active() {
                self.alert_zones += 1;
            }
        }
    }

    /// Counts one change event.
    pub fn observe(&mut self, event: &SnapshotChanged) {
        self.revision += 1;
        self.last_reason = Some(event.reason);
        match event.reason {
            SnapshotReason::AutomaticRefresh => {
                self.automatic_refreshes += 1;
                self.last_refresh_tick = Some(event.tick);
            }
            SnapshotReason::ManualRefresh => {
                self.manual_refreshes += 1;
                self.last_refresh_tick = Some(event.tick);
            }
            _ => {}
        }
    }

    /// Site-wide occupancy, 0..=100.
    pub fn occupancy_pct(&self) -> f64 {
        if self.total_capacity == 0 {
            return 0.0;
        }
        self.total_visitors as f64 / self.total_capacity as f64 * 100.0
    }
}

pub fn update_site_stats(
    mut events: EventReader<SnapshotChanged>,
    registry: Res<ZoneRegistry>,
    mut stats: ResMut<SiteStats>,
) {
    let mut changed = false;
    for event in events.read() {
        stats.observe(event);
        changed = true;
    }
    if changed {
        stats.recount(&registry);
    }
}

pub struct SiteStatsPlugin;

impl Plugin for SiteStatsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SiteStats>()
            .add_systems(FixedUpdate, update_site_stats.in_set(CrowdSet::PostSim));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_recount_reference_site() {
        let registry = ZoneRegistry::from_config(&SiteConfig::reference()).unwrap();
        let mut stats = SiteStats::default();
        stats.recount(&registry);
        assert_eq!(stats.zone_count, 4);
        assert_eq!(stats.total_visitors, 580);
        assert_eq!(stats.total_capacity, 930);
        // A and C comfortable, D normal, B crowded.
        assert_eq!(stats.comfortable_zones, 2);
        assert_eq!(stats.normal_zones, 1);
        assert_eq!(stats.crowded_zones, 1);
        assert_eq!(stats.alert_zones, 1);
        assert_eq!(stats.warning_zones, 0);
        assert!((stats.occupancy_pct() - 580.0 / 930.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_observe_counts_refreshes() {
        let mut stats = SiteStats::default();
        stats.observe(&SnapshotChanged {
            reason: SnapshotReason::Startup,
            tick: 0,
        });
        stats.observe(&SnapshotChanged {
            reason: SnapshotReason::AutomaticRefresh,
            tick: 300,
        });
        stats.observe(&SnapshotChanged {
            reason: SnapshotReason::ManualRefresh,
            tick: 320,
        });
        assert_eq!(stats.revision, 3);
        assert_eq!(stats.automatic_refreshes, 1);
        assert_eq!(stats.manual_refreshes, 1);
        assert_eq!(stats.last_refresh_tick, Some(320));
        assert_eq!(stats.last_reason, Some(SnapshotReason::ManualRefresh));
    }

    #[test]
    fn test_empty_site_occupancy() {
        assert_eq!(SiteStats::default().occupancy_pct(), 0.0);
    }
}
