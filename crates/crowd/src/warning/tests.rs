use super::*;
use crate::config::SiteConfig;
use crate::error::CrowdError;
use crate::timers::{TimerKey, TimerSchedule};
use crate::zones::{ZoneId, ZoneRegistry};

const RECOVERY: u32 = 1200;

fn setup() -> (ZoneRegistry, TimerSchedule, WarningController) {
    let registry = ZoneRegistry::from_config(&SiteConfig::reference()).unwrap();
    (registry, TimerSchedule::default(), WarningController::new(RECOVERY))
}

fn b() -> ZoneId {
    ZoneId::from("B")
}

fn countdown_key() -> TimerKey {
    TimerKey::Countdown(b())
}

/// Puts B above 95% so the warning invariants hold once it is entered.
fn saturate(registry: &mut ZoneRegistry) {
    registry.set_visitors(&b(), 196).unwrap();
}

#[test]
fn test_idle_to_warning_sets_full_countdown() {
    let (mut registry, mut timers, controller) = setup();
    saturate(&mut registry);
    let transition = controller
        .observe(&mut registry, &mut timers, &b(), true, 0)
        .unwrap();
    assert_eq!(
        transition,
        Some(WarningTransition::Entered {
            zone: b(),
            countdown_secs: RECOVERY,
        })
    );
    let zone = registry.get(&b()).unwrap();
    assert!(zone.warning_active());
    assert_eq!(zone.countdown_remaining_secs(), RECOVERY);
    assert_eq!(timers.get(&countdown_key()).unwrap().period_ticks, Some(10));
}

#[test]
fn test_still_high_keeps_countdown() {
    let (mut registry, mut timers, controller) = setup();
    saturate(&mut registry);
    controller
        .observe(&mut registry, &mut timers, &b(), true, 0)
        .unwrap();
    for _ in 0..5 {
        controller.tick_second(&mut registry, &mut timers, &b()).unwrap();
    }
    let timer_id = timers.get(&countdown_key()).unwrap().id;

    let transition = controller
        .observe(&mut registry, &mut timers, &b(), true, 50)
        .unwrap();
    assert_eq!(transition, None);
    assert_eq!(
        registry.get(&b()).unwrap().countdown_remaining_secs(),
        RECOVERY - 5
    );
    // Same timer, not a replacement.
    assert!(timers.is_current(&countdown_key(), timer_id));
    assert_eq!(timers.countdown_count(), 1);
}

#[test]
fn test_recovery_clears_warning_and_timer() {
    let (mut registry, mut timers, controller) = setup();
    saturate(&mut registry);
    controller
        .observe(&mut registry, &mut timers, &b(), true, 0)
        .unwrap();
    let transition = controller
        .observe(&mut registry, &mut timers, &b(), false, 10)
        .unwrap();
    assert_eq!(transition, Some(WarningTransition::Recovered { zone: b() }));
    let zone = registry.get(&b()).unwrap();
    assert!(!zone.warning_active());
    assert_eq!(zone.countdown_remaining_secs(), 0);
    assert!(!timers.is_active(&countdown_key()));
}

#[test]
fn test_idle_not_candidate_is_noop() {
    let (mut registry, mut timers, controller) = setup();
    let transition = controller
        .observe(&mut registry, &mut timers, &b(), false, 0)
        .unwrap();
    assert_eq!(transition, None);
    assert!(timers.is_empty());
}

#[test]
fn test_reentry_after_recovery_resets_countdown() {
    let (mut registry, mut timers, controller) = setup();
    saturate(&mut registry);
    controller
        .observe(&mut registry, &mut timers, &b(), true, 0)
        .unwrap();
    for _ in 0..100 {
        controller.tick_second(&mut registry, &mut timers, &b()).unwrap();
    }
    controller
        .observe(&mut registry, &mut timers, &b(), false, 1000)
        .unwrap();
    controller
        .observe(&mut registry, &mut timers, &b(), true, 1300)
        .unwrap();
    assert_eq!(
        registry.get(&b()).unwrap().countdown_remaining_secs(),
        RECOVERY
    );
}

#[test]
fn test_countdown_monotonic_until_expiry() {
    let controller = WarningController::new(30);
    let (mut registry, mut timers, _) = setup();
    saturate(&mut registry);
    controller
        .observe(&mut registry, &mut timers, &b(), true, 0)
        .unwrap();

    let mut previous = registry.get(&b()).unwrap().countdown_remaining_secs();
    let mut expired = None;
    for second in 1..=30 {
        let transition = controller
            .tick_second(&mut registry, &mut timers, &b())
            .unwrap();
        let zone = registry.get(&b()).unwrap();
        assert!(zone.countdown_remaining_secs() <= previous);
        previous = zone.countdown_remaining_secs();
        if let Some(t) = transition {
            assert_eq!(t, WarningTransition::Expired { zone: b() });
            // Reaching zero clears the warning in the same step.
            assert!(!zone.warning_active());
            assert_eq!(zone.countdown_remaining_secs(), 0);
            expired = Some(second);
        } else {
            assert!(zone.warning_active());
        }
    }
    assert_eq!(expired, Some(30));
    assert!(!timers.is_active(&countdown_key()));
}

#[test]
fn test_tick_without_warning_is_error() {
    let (mut registry, mut timers, controller) = setup();
    timers.schedule_repeating(countdown_key(), 0, 10);
    let err = controller
        .tick_second(&mut registry, &mut timers, &b())
        .unwrap_err();
    assert!(matches!(err, CrowdError::InvariantViolation(_)));
    assert!(!timers.is_active(&countdown_key()));
}

#[test]
fn test_unknown_zone_not_found() {
    let (mut registry, mut timers, controller) = setup();
    let q = ZoneId::from("Q");
    assert_eq!(
        controller
            .observe(&mut registry, &mut timers, &q, true, 0)
            .unwrap_err(),
        CrowdError::NotFound(q.clone())
    );
    assert!(controller.tick_second(&mut registry, &mut timers, &q).is_err());
}

#[test]
fn test_candidate_on_ineligible_zone_rejected() {
    let (mut registry, mut timers, controller) = setup();
    let a = ZoneId::from("A");
    registry.set_visitors(&a, 300).unwrap();
    assert!(controller
        .observe(&mut registry, &mut timers, &a, true, 0)
        .is_err());
    assert!(!registry.get(&a).unwrap().warning_active());
}

#[test]
fn test_clear_all_cancels_every_countdown() {
    let (mut registry, mut timers, controller) = setup();
    saturate(&mut registry);
    controller
        .observe(&mut registry, &mut timers, &b(), true, 0)
        .unwrap();
    timers.schedule_repeating(TimerKey::Refresh, 0, 300);
    controller.clear_all(&mut registry, &mut timers);
    assert_eq!(timers.countdown_count(), 0);
    assert!(timers.is_active(&TimerKey::Refresh));
    assert!(!registry.get(&b()).unwrap().warning_active());
}

#[test]
fn test_format_countdown() {
    assert_eq!(format_countdown(1200), "20:00");
    assert_eq!(format_countdown(61), "01:01");
    assert_eq!(format_countdown(0), "00:00");
}
