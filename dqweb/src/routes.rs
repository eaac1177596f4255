//! Router construction.

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(allowed)
    }
}

pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route(
            "/api/check-domain",
            post(handlers::check_domains).fallback(handlers::method_not_allowed),
        )
        .route("/api/extensions", get(handlers::extensions))
        .route("/health", get(handlers::health))
        .layer(build_cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
