//! Enumeration types for the site lifecycle.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Lifecycle status of a site.
///
/// Declaration order is lifecycle order: a site only ever moves forward
/// through these states, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SiteStatus {
    /// Recorded, nothing generated yet.
    Created,
    /// A generation stream has started producing the document.
    Generating,
    /// A full document has been delivered.
    Ready,
}

impl SiteStatus {
    /// Whether moving from `self` to `next` keeps the lifecycle monotone.
    ///
    /// Staying in the same status counts as allowed (it is a no-op).
    pub fn can_advance_to(self, next: Self) -> bool {
        next >= self
    }

    /// Lowercase name as it appears on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Generating => "generating",
            Self::Ready => "ready",
        }
    }
}

impl core::fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
