//! Ordered phases of the fixed tick.
//!
//! ```text
//! PreSim  →  Simulation  →  PostSim
//! ```
//!
//! * **PreSim** – Tick counter, queued commands, timer polling. Produces the
//!   `TimerFired` events the rest of the tick reacts to.
//! * **Simulation** – Refresh cycles and countdown ticks. The only phase that
//!   changes zone state on a timer.
//! * **PostSim** – Notifications, statistics, activity log and invariant
//!   validation. Reads what the earlier phases produced.
//!
//! Every engine system in `FixedUpdate` is in one of these sets.

use bevy::prelude::*;

/// Configured as a chain: `PreSim` → `Simulation` → `PostSim`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CrowdSet {
    PreSim,
    Simulation,
    PostSim,
}
