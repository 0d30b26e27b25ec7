//! Axum router construction for the site API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for cross-origin frontend access and request tracing.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the site API.
///
/// The router includes:
/// - `GET /health` -- liveness
/// - `GET /users/me` -- stub current user
/// - `GET /sites`, `POST /sites` -- list and create
/// - `GET /sites/{id}` -- single site
/// - `POST /sites/{id}/generate` -- chunked HTML stream
/// - `GET /sites/{id}/html` -- last generated document
/// - `/static/*` -- files from the static directory
/// - everything else -- the frontend directory (`index.html` for folders)
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_files = ServeDir::new(&state.static_dir);
    let frontend = ServeDir::new(&state.frontend_dir).append_index_html_on_directories(true);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/users/me", get(handlers::current_user))
        // Sites
        .route("/sites", get(handlers::list_sites).post(handlers::create_site))
        .route("/sites/{id}", get(handlers::get_site))
        .route("/sites/{id}/generate", post(handlers::generate_site))
        .route("/sites/{id}/html", get(handlers::get_site_html))
        // Static hosting
        .nest_service("/static", static_files)
        .fallback_service(frontend)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
