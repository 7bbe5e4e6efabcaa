//! Route handlers for the summary web service.

pub mod dashboard;
pub mod health;
pub mod summaries;

use std::path::Path;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // HTML pages
        .route("/", get(dashboard::dashboard_page))
        // Health check
        .route("/health", get(health::health))
        // API endpoints
        .route("/summaries", get(summaries::list_summaries))
        .route("/summaries/rebuild", post(summaries::rebuild_summary))
}

/// The full application: routes, static assets and HTTP layers.
pub fn app(state: AppState, static_dir: &Path) -> Router {
    router()
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
