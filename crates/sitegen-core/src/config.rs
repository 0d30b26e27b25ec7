//! Configuration loading and typed config structures for the site generator.
//!
//! The configuration lives in `sitegen-config.yaml` next to the binary's
//! working directory. Every field has a default, so an empty file (or no
//! file at all) yields a runnable server.
//!
//! Environment variables override YAML values after parsing:
//! - `SITEGEN_HOST` overrides `server.host`
//! - `SITEGEN_PORT` overrides `server.port`
//! - `SITEGEN_CHUNK_DELAY_MS` overrides `generation.chunk_delay_ms`

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SiteGenConfig {
    /// HTTP listener and static asset settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Chunking and pacing of generation streams.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SiteGenConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string and apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a mapping.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides looked up by environment variable name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an override is not a number where
    /// one is required.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SITEGEN_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SITEGEN_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("SITEGEN_PORT={port}: {e}")))?;
        }
        if let Some(delay) = lookup("SITEGEN_CHUNK_DELAY_MS") {
            self.generation.chunk_delay_ms = delay.parse().map_err(|e| {
                ConfigError::Invalid(format!("SITEGEN_CHUNK_DELAY_MS={delay}: {e}"))
            })?;
        }
        Ok(())
    }

    /// Reject values that parse but cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `generation.chunk_size` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.chunk_size == 0 {
            return Err(ConfigError::Invalid(String::from(
                "generation.chunk_size must be at least 1",
            )));
        }
        Ok(())
    }
}

/// HTTP listener and static asset settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served under `/static`.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Directory served as the frontend for every unmatched path.
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            frontend_dir: default_frontend_dir(),
        }
    }
}

/// Chunking and pacing of generation streams.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerationConfig {
    /// Bytes per chunk. Every chunk but the last has exactly this size.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Artificial pause between two chunks, in milliseconds. Zero still
    /// yields to the scheduler between chunks.
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,

    /// Optional template file replacing the built-in document template.
    #[serde(default)]
    pub template_path: Option<String>,
}

impl GenerationConfig {
    /// The pause between chunks as a [`Duration`].
    pub const fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_delay_ms: default_chunk_delay_ms(),
            template_path: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8000
}

fn default_static_dir() -> String {
    "static".to_owned()
}

fn default_frontend_dir() -> String {
    "frontend".to_owned()
}

const fn default_chunk_size() -> usize {
    100
}

const fn default_chunk_delay_ms() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_owned()
}
