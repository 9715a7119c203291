//! services/api/src/web/rate_limit.rs
//!
//! Per-client-address request throttling. Two budgets: a global one across
//! the whole API, and a stricter one on the generation endpoint.

use crate::error::ErrorBody;
use crate::web::state::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use governor::{clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota, RateLimiter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

type IpLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// The two per-IP limiters shared across all requests.
pub struct RateLimits {
    global: IpLimiter,
    generate: IpLimiter,
}

impl RateLimits {
    pub fn new() -> Self {
        // 100 requests per 15 minutes across the API: a burst of 100,
        // replenishing one permit every 9 seconds.
        let global_quota = Quota::with_period(Duration::from_secs(9))
            .expect("non-zero period")
            .allow_burst(NonZeroU32::new(100).expect("non-zero burst"));
        // 5 generations per minute: a burst of 5, one permit every 12 seconds.
        let generate_quota = Quota::with_period(Duration::from_secs(12))
            .expect("non-zero period")
            .allow_burst(NonZeroU32::new(5).expect("non-zero burst"));
        Self {
            global: RateLimiter::keyed(global_quota),
            generate: RateLimiter::keyed(generate_quota),
        }
    }
}

impl Default for RateLimits {
    fn default() -> Self {
        Self::new()
    }
}

/// The client address used as the throttling key. Requests arriving without
/// connection info (e.g. behind a unix socket) share one bucket.
fn client_ip(req: &Request) -> IpAddr {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn too_many_requests(message: &str) -> Response {
    (StatusCode::TOO_MANY_REQUESTS, Json(ErrorBody::new(message))).into_response()
}

/// Middleware enforcing the API-wide budget.
pub async fn global_limit(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&req);
    if state.limits.global.check_key(&ip).is_err() {
        warn!(%ip, "global rate limit exceeded");
        return too_many_requests("Too many requests from this IP, please try again later.");
    }
    next.run(req).await
}

/// Middleware enforcing the stricter budget on the generation endpoint.
pub async fn generate_limit(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&req);
    if state.limits.generate.check_key(&ip).is_err() {
        warn!(%ip, "generation rate limit exceeded");
        return too_many_requests(
            "Story generation rate limit exceeded. Please wait before generating another story.",
        );
    }
    next.run(req).await
}
