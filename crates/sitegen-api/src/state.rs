//! Shared application state for the site API.
//!
//! [`AppState`] bundles the injected site registry, the generator, and
//! the directories served as static content. The binary builds it once
//! and the router shares it between handlers behind an [`Arc`].

use std::path::PathBuf;
use std::sync::Arc;

use sitegen_core::{Generator, ServerConfig, SiteRegistry};

/// Shared state for the Axum application.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The site registry (a clonable handle).
    pub registry: SiteRegistry,
    /// Renders documents and opens generation streams.
    pub generator: Arc<Generator>,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// Directory served for every path no API route matches.
    pub frontend_dir: PathBuf,
}

impl AppState {
    /// Create application state with the default asset directories.
    pub fn new(registry: SiteRegistry, generator: Generator) -> Self {
        let defaults = ServerConfig::default();
        Self {
            registry,
            generator: Arc::new(generator),
            static_dir: PathBuf::from(defaults.static_dir),
            frontend_dir: PathBuf::from(defaults.frontend_dir),
        }
    }

    /// Replace the asset directories with the ones from `config`.
    #[must_use]
    pub fn with_assets(mut self, config: &ServerConfig) -> Self {
        self.static_dir = PathBuf::from(&config.static_dir);
        self.frontend_dir = PathBuf::from(&config.frontend_dir);
        self
    }
}
