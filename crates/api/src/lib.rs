//! Recipe API library.
//!
//! A JSON API for users to manage their own recipes, tags and ingredients.
//! The router is exposed as a library so it can be served by the binary,
//! driven in-process by tests, or embedded elsewhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::DefaultBodyLimit, extract::State, http::StatusCode, routing::get};
use tower_http::{services::ServeDir, trace::TraceLayer};

use db::Store;
use state::AppState;

/// URL prefix for uploaded media.
pub const MEDIA_PREFIX: &str = "/media";

/// Build the full application router.
pub fn app<S: Store>(state: AppState<S>) -> Router {
    let media = ServeDir::new(state.config().media_root.clone());
    let body_limit = state.config().max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness::<S>))
        .merge(routes::routes())
        .nest_service(MEDIA_PREFIX, media)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness<S: Store>(State(state): State<AppState<S>>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
