//! Error types for registry and generation operations.

use sitegen_types::{SiteId, SiteStatus};

/// Errors raised by the site registry and the generator.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// No site with this identifier exists.
    #[error("site {0} not found")]
    NotFound(SiteId),

    /// A status change would move the lifecycle backwards.
    #[error("site {id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// The site whose status was being changed.
        id: SiteId,
        /// Status at the time of the request.
        from: SiteStatus,
        /// Requested status.
        to: SiteStatus,
    },

    /// The identifier sequence is exhausted.
    #[error("site identifier space exhausted")]
    IdExhausted,

    /// The document template could not be loaded or rendered.
    #[error("template error: {0}")]
    Template(String),
}
