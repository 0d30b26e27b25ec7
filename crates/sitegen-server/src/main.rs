//! Site generator backend binary.
//!
//! Wires together configuration, logging, the site registry, the
//! generator, and the HTTP API, then serves until interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `sitegen-config.yaml` (or `SITEGEN_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the site registry and the generator
//! 4. Serve the HTTP API until `Ctrl-C` / `SIGTERM`

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use sitegen_api::AppState;
use sitegen_core::{Generator, LoggingConfig, SiteGenConfig, SiteRegistry};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Config file used when `SITEGEN_CONFIG` is not set.
const DEFAULT_CONFIG_PATH: &str = "sitegen-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, template loading, or the server
/// fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so report where the
    //    config came from once it is.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(config = %source, "sitegen starting");
    info!(
        host = config.server.host,
        port = config.server.port,
        chunk_size = config.generation.chunk_size,
        chunk_delay_ms = config.generation.chunk_delay_ms,
        template = config.generation.template_path.as_deref().unwrap_or("builtin"),
        "Configuration loaded"
    );

    // 3. Create registry and generator.
    let registry = SiteRegistry::new();
    let generator = Generator::new(config.generation.clone()).map_err(AppError::from)?;
    let state = Arc::new(AppState::new(registry, generator).with_assets(&config.server));
    info!(
        static_dir = %state.static_dir.display(),
        frontend_dir = %state.frontend_dir.display(),
        "Application state assembled"
    );

    // 4. Serve.
    sitegen_api::start_server(&config.server, state)
        .await
        .map_err(AppError::from)?;

    info!("sitegen shutdown complete");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Load configuration from `SITEGEN_CONFIG` or `sitegen-config.yaml`.
///
/// A missing file yields defaults (plus environment overrides).
fn load_config() -> Result<(SiteGenConfig, String), AppError> {
    let config_path = std::env::var("SITEGEN_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        let config = SiteGenConfig::from_file(&config_path)?;
        Ok((config, config_path.display().to_string()))
    } else {
        let config = SiteGenConfig::parse("")?;
        Ok((config, String::from("defaults")))
    }
}
