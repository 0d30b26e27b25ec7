//! Core of the site generator backend.
//!
//! - [`registry`] -- in-memory store of [`Site`](sitegen_types::Site) records
//! - [`template`] -- renders the HTML document for a prompt
//! - [`generator`] -- turns a rendered document into a chunked, cancellable
//!   stream and drives the site lifecycle while it is consumed
//! - [`config`] -- typed configuration loaded from `sitegen-config.yaml`
//!
//! Nothing here knows about HTTP; the API crate adapts these pieces to
//! axum.

pub mod config;
pub mod error;
pub mod generator;
pub mod registry;
pub mod template;

pub use config::{ConfigError, GenerationConfig, LoggingConfig, ServerConfig, SiteGenConfig};
pub use error::SiteError;
pub use generator::{DocumentChunks, GenerationStream, Generator};
pub use registry::{NewSite, SiteRegistry};
pub use template::DocumentRenderer;
