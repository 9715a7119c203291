//! services/api/src/web/mod.rs
//!
//! The HTTP edge: router assembly, auth middleware, rate limiting, and the
//! REST handlers.

pub mod middleware;
pub mod rate_limit;
pub mod rest;
pub mod state;

pub use middleware::require_auth;
pub use rest::ApiDoc;
pub use state::AppState;

use crate::config::Environment;
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

/// Builds the CORS layer for the configured posture: the explicit
/// allow-list in production, the local dev servers otherwise.
fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = match state.config.environment {
        Environment::Production => state
            .config
            .cors_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    warn!(origin = %o, "ignoring unparsable CORS origin");
                    None
                }
            })
            .collect(),
        Environment::Development => vec![
            HeaderValue::from_static("http://localhost:5173"),
            HeaderValue::from_static("http://localhost:3000"),
        ],
    };
    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
}

/// Assembles the full application router around the given state. Kept
/// separate from `main` so the integration tests can drive the exact same
/// router with mock ports.
pub fn build_router(state: Arc<AppState>) -> Router {
    // The generation endpoint gets its own stricter limiter, checked
    // before the token is verified.
    let generate_route = Router::new()
        .route("/api/generate", post(rest::generate_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit::generate_limit,
        ));

    let story_routes = Router::new()
        .route(
            "/api/stories",
            get(rest::list_stories_handler).post(rest::create_story_handler),
        )
        .route("/api/stories/{id}", delete(rest::delete_story_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .route("/", get(rest::root_handler))
        .route("/health", get(rest::health_handler))
        .merge(generate_route)
        .merge(story_routes)
        .fallback(rest::not_found_handler)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit::global_limit,
        ))
        .layer(cors_layer(&state))
        .with_state(state)
}
