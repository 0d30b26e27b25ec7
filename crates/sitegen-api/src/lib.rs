//! HTTP API for the site generator backend.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Site endpoints** for creating, listing and fetching site records
//! - **Generation endpoint** (`POST /sites/{id}/generate`) streaming the
//!   rendered document as a chunked `text/html` body
//! - **Stub user endpoint** (`GET /users/me`)
//! - **Static hosting** for `/static` assets and the frontend bundle
//!
//! # Architecture
//!
//! Handlers hold no state of their own. Everything lives in [`AppState`]:
//! the injected [`SiteRegistry`](sitegen_core::SiteRegistry) and the
//! [`Generator`](sitegen_core::Generator). Generation streams own a clone
//! of the registry handle, so a response body outlives the handler that
//! created it without borrowing from it.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
