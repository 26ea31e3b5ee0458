use crate::AppState;
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints that carry no board semantics.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Used by load balancers and container probes.
        .route("/health", get(|| async { "ok" }))
}
