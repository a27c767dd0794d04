//! Integration tests for the crowd engine using the `TestSite` harness.
//!
//! These tests spin up a headless Bevy App with `CrowdPlugin`, drive the
//! fixed tick directly and verify behavior across systems working together.
