//! Console view of the dashboard for the interactive (non-agent) run.
//!
//! Prints one line per zone whenever the site state changes and every new
//! notification once. All text goes through the log, so it lands on stderr
//! next to the engine's own messages.

use bevy::prelude::*;

use crowd::config::TICKS_PER_SECOND;
use crowd::notifications::{NotificationCenter, NotificationKind};
use crowd::site_stats::SiteStats;
use crowd::timers::{TimerKey, TimerSchedule};
use crowd::warning::format_countdown;
use crowd::zones::ZoneState;
use crowd::{TickCounter, ZoneRegistry};

fn zone_line(zone: &ZoneState) -> String {
    let mut line = format!(
        "{:<4} {:<20} {:>3}% {:<12} queue ~{} min, arrive {}",
        zone.id().as_str(),
        zone.name(),
        zone.rounded_percentage(),
        zone.status_label(),
        zone.queue_time_minutes(),
        zone.recommended_arrival(),
    );
    if zone.warning_active() {
        line.push_str(&format!(
            ", recovery in {}",
            format_countdown(zone.countdown_remaining_secs())
        ));
    }
    line
}

fn print_dashboard(
    registry: Res<ZoneRegistry>,
    stats: Res<SiteStats>,
    timers: Res<TimerSchedule>,
    tick: Res<TickCounter>,
) {
    let next = match timers.ticks_until(&TimerKey::Refresh, tick.0) {
        Some(ticks) => format!("next update in {}s", ticks.div_ceil(TICKS_PER_SECOND)),
        None => "automatic updates off".to_string(),
    };
    info!(
        "{} visitors on site ({:.0}% full), {} zones need attention, {next}",
        stats.total_visitors,
        stats.occupancy_pct(),
        stats.alert_zones
    );
    for zone in registry.iter() {
        info!("{}", zone_line(zone));
        if let Some(alt) = zone.alternative().filter(|_| zone.warning_active()) {
            if let Ok(alt_zone) = registry.get(alt) {
                info!("     try {} instead ({})", alt_zone.name(), alt_zone.status_label());
            }
        }
    }
}

fn print_notification(center: Res<NotificationCenter>, mut last_shown: Local<u64>) {
    let Some(notification) = center.current() else {
        return;
    };
    if notification.id == *last_shown {
        return;
    }
    *last_shown = notification.id;
    match notification.kind {
        NotificationKind::Success => info!("[{}] {}", notification.kind.label(), notification.message),
        NotificationKind::Error => warn!("[{}] {}", notification.kind.label(), notification.message),
    }
}

pub struct PresentationPlugin;

impl Plugin for PresentationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                print_dashboard.run_if(resource_changed::<SiteStats>),
                print_notification,
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowd::config::SiteConfig;

    #[test]
    fn test_zone_line_reference_zone() {
        let registry = ZoneRegistry::from_config(&SiteConfig::reference()).unwrap();
        let deck = registry.get(&"B".into()).unwrap();
        let line = zone_line(deck);
        assert!(line.contains("Observation Deck"));
        assert!(line.contains("95%"));
        assert!(line.contains("Crowded"));
        assert!(!line.contains("recovery"));
    }
}
