//! Read-only state shared by every tool call.

use std::sync::Arc;

use crate::config::Config;
use crate::search::SearchOptions;
use crate::viewer::{Launcher, Platform, SystemLauncher, ViewerResolver};

/// Configuration, viewer resolution and process launching.
///
/// Built once at startup and never mutated; cloning is cheap.
#[derive(Clone)]
pub struct ServerState {
    config: Arc<Config>,
    resolver: ViewerResolver,
    launcher: Arc<dyn Launcher>,
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl ServerState {
    /// State for the current platform that launches real processes.
    pub fn new(config: Config) -> Self {
        Self::with_launcher(config, Platform::current(), Arc::new(SystemLauncher))
    }

    /// State with an explicit platform and launcher.
    pub fn with_launcher(config: Config, platform: Platform, launcher: Arc<dyn Launcher>) -> Self {
        let resolver = ViewerResolver::new(&config, platform);
        Self {
            config: Arc::new(config),
            resolver,
            launcher,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resolver(&self) -> &ViewerResolver {
        &self.resolver
    }

    pub fn launcher(&self) -> &dyn Launcher {
        self.launcher.as_ref()
    }

    /// Search options derived from the configuration.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions::from_config(&self.config)
    }
}
