//! At-capacity warning and recovery countdown.

mod controller;
mod systems;

pub use controller::{format_countdown, WarningController, WarningTransition};
pub(crate) use systems::record_transition;
pub use systems::{handle_countdown_ticks, WarningPlugin};

#[cfg(test)]
mod tests;
