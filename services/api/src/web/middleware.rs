//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use storygen_core::ports::PortError;
use tracing::warn;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Middleware that verifies the bearer token with the identity provider and
/// extracts the caller's identity.
///
/// Verification happens on every request; there is no session cache. On
/// success the `AuthUser` is inserted into request extensions for handlers
/// to use.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extract the Authorization header.
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(PortError::MissingToken)?;

    // 2. It must be a non-empty bearer token.
    let token = auth_header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or(PortError::MissingToken)?;

    // 3. Resolve the token to a user via the identity provider.
    let user = state.verifier.verify(token).await.map_err(|e| {
        warn!("token verification failed: {e}");
        e
    })?;

    // 4. Insert the identity into request extensions.
    req.extensions_mut().insert(user);

    // 5. Continue to the handler.
    Ok(next.run(req).await)
}
