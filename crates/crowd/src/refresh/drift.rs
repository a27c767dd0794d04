use rand::Rng;

use crate::config::{DriftRange, VISITOR_FLOOR};

/// Applies one random delta from `drift` to a visitor count.
///
/// The result stays within `[min(VISITOR_FLOOR, capacity), capacity]`, so a
/// simulated zone never looks completely empty. `drift` must be ordered,
/// which the registry guarantees.
pub fn perturb_visitors<R: Rng + ?Sized>(
    current: u32,
    capacity: u32,
    drift: DriftRange,
    rng: &mut R,
) -> u32 {
    let delta = rng.gen_range(drift.min..=drift.max) as i64;
    let floor = VISITOR_FLOOR.min(capacity) as i64;
    (current as i64 + delta).clamp(floor, capacity as i64) as u32
}
