//! Threshold-based crowding classification.
//!
//! Pure functions only: nothing here reads or writes the registry.

mod bands;
mod classify;

pub use bands::{
    above_warning_threshold, arrival_range, queue_range, status_for, COMFORTABLE_QUEUE_MINUTES,
    CROWDED_ARRIVAL_MINUTES, CROWDED_QUEUE_MINUTES, NORMAL_ARRIVAL_MINUTES, NORMAL_QUEUE_MINUTES,
};
pub use classify::{classify, Classification};
