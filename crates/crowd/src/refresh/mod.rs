//! Simulated live feed: periodic perturbation and reclassification of every
//! zone.
//!
//! One repeating `Refresh` timer drives the automatic cadence; its due tick is
//! the "next update" time shown to visitors. A manual refresh runs the same
//! cycle and re-arms that timer a full interval out, so the two never stack.

mod cycle;
mod drift;
mod systems;

pub use cycle::{reclassify_zone, run_refresh_cycle, RefreshOutcome};
pub use drift::perturb_visitors;
pub(crate) use systems::{ingest_visitors, perform_refresh, perform_reset};
pub use systems::{
    handle_refresh_timer, initialize_site, schedule_next_refresh, RefreshContext, RefreshPlugin,
};
