//! Shared type definitions for the site generator backend.
//!
//! This crate is the single source of truth for the records served by the
//! site API. Types flow downstream to `TypeScript` via `ts-rs` for the
//! frontend.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifier wrappers
//! - [`enums`] -- Site lifecycle status
//! - [`structs`] -- Site record and the stub user profile

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::SiteStatus;
pub use ids::SiteId;
pub use structs::{CurrentUser, Site};
