//! # TestSite: headless integration test harness for the crowd engine
//!
//! Wraps `bevy::app::App` + `CrowdPlugin` so tests can drive the fixed tick
//! directly, push commands the way an operator or agent would, and inspect
//! the resulting resources.

mod queries;

use bevy::app::App;
use bevy::prelude::*;

use crate::config::SiteConfig;
use crate::CrowdPlugin;

/// Seed used by [`TestSite::new`], so refresh draws are reproducible.
pub const TEST_SEED: u64 = 42;

/// A headless Bevy App wrapping `CrowdPlugin` for integration testing.
pub struct TestSite {
    app: App,
}

impl TestSite {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// The reference four-zone site with a fixed seed.
    pub fn new() -> Self {
        Self::with_config(SiteConfig::reference().with_seed(TEST_SEED))
    }

    /// A site built from `config`. Panics on an invalid config, which is a
    /// bug in the test rather than something to recover from.
    pub fn with_config(config: SiteConfig) -> Self {
        let plugin = match CrowdPlugin::from_config(config) {
            Ok(plugin) => plugin,
            Err(err) => panic!("invalid test site config: {err}"),
        };
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(plugin);

        // Run one update so Startup systems classify the site and arm timers.
        app.update();

        Self { app }
    }
}

impl Default for TestSite {
    fn default() -> Self {
        Self::new()
    }
}
