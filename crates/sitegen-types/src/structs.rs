//! Core entity structs served by the site API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::SiteStatus;
use crate::ids::SiteId;

// ---------------------------------------------------------------------------
// Site
// ---------------------------------------------------------------------------

/// A generated website as tracked by the registry.
///
/// Created on a creation request and afterwards mutated only by the
/// generation stream (status, `updated_at`, `html_url`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Site {
    /// Unique site identifier, assigned in creation order.
    pub id: SiteId,
    /// Optional display title.
    pub title: Option<String>,
    /// The prompt the site was created from.
    pub prompt: String,
    /// Current lifecycle status.
    pub status: SiteStatus,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the status last changed.
    pub updated_at: DateTime<Utc>,
    /// Where the finished document can be fetched (`None` until ready).
    pub html_url: Option<String>,
    /// Where a screenshot of the site can be fetched. Never rendered by
    /// this backend.
    pub screenshot_url: Option<String>,
}

impl Site {
    /// Relative URL at which the finished document of site `id` is served.
    pub fn html_path(id: SiteId) -> String {
        format!("/sites/{id}/html")
    }

    /// Whether a complete document has been delivered for this site.
    pub fn is_ready(&self) -> bool {
        self.status == SiteStatus::Ready
    }
}

// ---------------------------------------------------------------------------
// CurrentUser
// ---------------------------------------------------------------------------

/// Seconds since the epoch of `2025-06-15T18:29:56Z`, the fixed timestamp
/// carried by the stub user.
const STUB_USER_TIMESTAMP: i64 = 1_750_012_196;

/// Profile of the signed-in user.
///
/// There is no authentication; the API always answers with
/// [`CurrentUser::stub`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CurrentUser {
    /// Contact e-mail address.
    pub email: String,
    /// Whether the account is enabled.
    pub is_active: bool,
    /// Identifier of the user's profile.
    pub profile_id: String,
    /// Registration time.
    pub registered_at: DateTime<Utc>,
    /// Last profile update time.
    pub updated_at: DateTime<Utc>,
    /// Login name.
    pub username: String,
}

impl CurrentUser {
    /// The fixed user every `GET /users/me` returns.
    pub fn stub() -> Self {
        let at = DateTime::<Utc>::from_timestamp(STUB_USER_TIMESTAMP, 0).unwrap_or_default();
        Self {
            email: String::from("example@example.com"),
            is_active: true,
            profile_id: String::from("1"),
            registered_at: at,
            updated_at: at,
            username: String::from("user123"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn site_serializes_with_snake_case_fields() {
        let now = Utc::now();
        let site = Site {
            id: SiteId(3),
            title: None,
            prompt: String::from("fan site"),
            status: SiteStatus::Created,
            created_at: now,
            updated_at: now,
            html_url: None,
            screenshot_url: None,
        };

        let json = serde_json::to_value(&site).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["status"], "created");
        assert_eq!(json["prompt"], "fan site");
        assert!(json["html_url"].is_null());
        assert!(json.get("screenshot_url").is_some());
    }

    #[test]
    fn only_ready_sites_are_ready() {
        let now = Utc::now();
        let mut site = Site {
            id: SiteId(1),
            title: None,
            prompt: String::from("fan site"),
            status: SiteStatus::Generating,
            created_at: now,
            updated_at: now,
            html_url: None,
            screenshot_url: None,
        };
        assert!(!site.is_ready());
        site.status = SiteStatus::Ready;
        assert!(site.is_ready());
    }

    #[test]
    fn html_path_embeds_id() {
        assert_eq!(Site::html_path(SiteId(12)), "/sites/12/html");
    }

    #[test]
    fn stub_user_matches_fixture() {
        let user = CurrentUser::stub();
        assert_eq!(user.username, "user123");
        assert_eq!(user.profile_id, "1");
        assert_eq!(user.registered_at.to_rfc3339(), "2025-06-15T18:29:56+00:00");
        assert_eq!(user.registered_at, user.updated_at);
    }
}
