//! services/api/src/web/state.rs
//!
//! Defines the shared application state handed to every handler.

use crate::config::Config;
use crate::web::rate_limit::RateLimits;
use std::sync::Arc;
use storygen_core::ports::{StoryStore, TextCompletionService, TokenVerifier};

/// The shared application state, created once at startup and passed to all
/// handlers. Requests are otherwise independent; the rate-limiter key
/// stores are the only cross-request mutable state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn StoryStore>,
    pub completer: Arc<dyn TextCompletionService>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub limits: Arc<RateLimits>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn StoryStore>,
        completer: Arc<dyn TextCompletionService>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            config,
            store,
            completer,
            verifier,
            limits: Arc::new(RateLimits::new()),
        }
    }
}
