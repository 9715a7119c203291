//! services/api/src/adapters/identity.rs
//!
//! This module contains the adapter for the external identity provider. It
//! implements the `TokenVerifier` port by asking the provider to resolve a
//! bearer token into a user, once per request.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use storygen_core::domain::AuthUser;
use storygen_core::ports::{PortError, PortResult, TokenVerifier};
use tracing::warn;
use uuid::Uuid;

/// The user payload returned by the identity provider.
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: Uuid,
    email: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

/// An adapter that verifies bearer tokens against a hosted identity
/// provider over HTTP. No caching; every request re-verifies.
#[derive(Clone)]
pub struct HttpTokenVerifier {
    http: reqwest::Client,
    user_endpoint: String,
    service_key: String,
}

impl HttpTokenVerifier {
    /// Creates a new `HttpTokenVerifier` for the provider at `base_url`.
    pub fn new(http: reqwest::Client, base_url: &str, service_key: String) -> Self {
        Self {
            http,
            user_endpoint: format!("{}/auth/v1/user", base_url.trim_end_matches('/')),
            service_key,
        }
    }
}

#[async_trait]
impl TokenVerifier for HttpTokenVerifier {
    async fn verify(&self, token: &str) -> PortResult<AuthUser> {
        let response = self
            .http
            .get(&self.user_endpoint)
            .bearer_auth(token)
            .header("apikey", &self.service_key)
            .send()
            .await
            .map_err(|e| {
                warn!("identity provider unreachable: {e}");
                PortError::InvalidToken
            })?;

        if !response.status().is_success() {
            return Err(PortError::InvalidToken);
        }

        let user: ProviderUser = response.json().await.map_err(|e| {
            warn!("identity provider returned an unreadable user payload: {e}");
            PortError::InvalidToken
        })?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
        })
    }
}
