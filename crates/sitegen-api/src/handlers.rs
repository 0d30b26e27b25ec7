//! REST API endpoint handlers for the site API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness and site count |
//! | `GET` | `/users/me` | Stub current user |
//! | `GET` | `/sites` | List sites in creation order |
//! | `POST` | `/sites` | Create a site |
//! | `GET` | `/sites/{id}` | Get a single site |
//! | `POST` | `/sites/{id}/generate` | Stream the generated document |
//! | `GET` | `/sites/{id}/html` | Last generated document |

use std::convert::Infallible;
use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse};
use futures::StreamExt;
use serde::Deserialize;
use sitegen_core::NewSite;
use sitegen_types::{CurrentUser, SiteId};
use tracing::info;
use validator::{Validate, ValidationError};

use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /sites`.
///
/// `prompt` is limited to 4000 characters and `title`, when present, to
/// between 1 and 128.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSiteRequest {
    /// What the site should be about.
    #[validate(length(min = 1, max = 4000), custom(function = "not_blank"))]
    pub prompt: String,
    /// Optional display title.
    #[validate(length(min = 1, max = 128))]
    pub title: Option<String>,
}

/// Body of `POST /sites/{id}/generate`.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateRequest {
    /// Prompt the document is rendered from.
    #[validate(length(min = 1, max = 4000), custom(function = "not_blank"))]
    pub prompt: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Report liveness and the number of recorded sites.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "sites": state.registry.len().await,
    }))
}

// ---------------------------------------------------------------------------
// GET /users/me
// ---------------------------------------------------------------------------

/// Return the stub user. There is no authentication.
pub async fn current_user() -> Json<CurrentUser> {
    Json(CurrentUser::stub())
}

// ---------------------------------------------------------------------------
// GET /sites -- list sites
// ---------------------------------------------------------------------------

/// List all sites in creation order.
pub async fn list_sites(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sites = state.registry.list().await;
    Json(serde_json::json!({
        "count": sites.len(),
        "sites": sites,
    }))
}

// ---------------------------------------------------------------------------
// POST /sites -- create a site
// ---------------------------------------------------------------------------

/// Record a new site with status `created`.
pub async fn create_site(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateSiteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let site = state
        .registry
        .create(NewSite {
            prompt: request.prompt,
            title: request.title,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(site)))
}

// ---------------------------------------------------------------------------
// GET /sites/{id} -- single site
// ---------------------------------------------------------------------------

/// Return a single site record.
pub async fn get_site(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_site_id(&id_str)?;
    let site = state.registry.get(id).await?;
    Ok(Json(site))
}

// ---------------------------------------------------------------------------
// POST /sites/{id}/generate -- stream the document
// ---------------------------------------------------------------------------

/// Stream the generated document as a chunked `text/html` body.
///
/// The site is looked up before the body is checked, so an unknown id is
/// a plain 404 whatever the body holds. Once streaming, the site moves to `generating`, and to
/// `ready` after the last chunk has been handed to the connection. If the
/// client disconnects first, axum drops the body and the site is never
/// marked ready.
pub async fn generate_site(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    body: Result<ValidatedJson<GenerateRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_site_id(&id_str)?;
    state.registry.get(id).await?;
    let ValidatedJson(request) = body?;
    let stream = state
        .generator
        .start(&state.registry, id, &request.prompt)
        .await?;

    let config = state.generator.config();
    info!(
        site_id = %id,
        chunk_size = config.chunk_size,
        chunk_delay_ms = config.chunk_delay_ms,
        "streaming generated site"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(stream.map(Ok::<_, Infallible>)),
    ))
}

// ---------------------------------------------------------------------------
// GET /sites/{id}/html -- last generated document
// ---------------------------------------------------------------------------

/// Serve the document delivered by the last completed generation.
pub async fn get_site_html(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_site_id(&id_str)?;
    let document = state
        .registry
        .document(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("site {id} has no generated document")))?;
    Ok(Html(document.to_string()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a site id from a path segment, returning an [`ApiError`] on failure.
fn parse_site_id(s: &str) -> Result<SiteId, ApiError> {
    s.parse::<SiteId>()
        .map_err(|e| ApiError::InvalidId(format!("{s}: {e}")))
}
