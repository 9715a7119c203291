//! crates/storygen_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases,
//! identity providers, or text-completion APIs.

use crate::domain::{AuthUser, NewStory, Story};
use async_trait::async_trait;
use uuid::Uuid;

//=========================================================================================
// Port Error and Result Types
//=========================================================================================

/// The error taxonomy shared by all ports. The display strings are the
/// user-facing messages; the HTTP layer maps variants to status codes.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// Bad input, rejected before any external call is made.
    #[error("{0}")]
    Validation(String),

    /// The Authorization header is absent or not a bearer token.
    #[error("Authorization header with Bearer token is required")]
    MissingToken,

    /// The identity provider rejected the token or returned no user.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The upstream model reported quota exhaustion.
    #[error("AI service quota exceeded. Please try again later.")]
    QuotaExceeded,

    /// The upstream model rejected our credentials.
    #[error("AI service configuration error.")]
    InvalidApiKey,

    /// The upstream model's safety filters rejected the prompt.
    #[error("Content safety filters were triggered. Please try a different, family-friendly prompt.")]
    SafetyBlocked,

    /// The upstream call timed out.
    #[error("Request timed out. Please try again.")]
    Timeout,

    /// Any other upstream model failure, carrying the original message.
    #[error("Story generation failed: {0}")]
    Upstream(String),

    /// A store operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// The requested item does not exist.
    #[error("Item not found: {0}")]
    NotFound(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Classifies a raw upstream error message into the matching `PortError`
/// variant by inspecting it for the provider's known marker substrings.
/// Unrecognized messages are carried through verbatim as `Upstream`.
pub fn classify_upstream(message: &str) -> PortError {
    if message.contains("QUOTA_EXCEEDED") {
        PortError::QuotaExceeded
    } else if message.contains("API_KEY_INVALID") {
        PortError::InvalidApiKey
    } else if message.contains("SAFETY") {
        PortError::SafetyBlocked
    } else if message.contains("timeout") {
        PortError::Timeout
    } else {
        PortError::Upstream(message.to_string())
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// A black-box text-completion service. One call per request, no retries;
/// a failure surfaces the upstream error classified via `classify_upstream`.
#[async_trait]
pub trait TextCompletionService: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> PortResult<String>;
}

/// Resolves a bearer token to a user identity by calling the external
/// identity provider. Verification happens on every request; no cache.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> PortResult<AuthUser>;
}

/// Persistence for stories, always scoped by the verified owner id.
#[async_trait]
pub trait StoryStore: Send + Sync {
    /// All stories owned by the user, newest-created first.
    async fn list_for_user(&self, user_id: Uuid) -> PortResult<Vec<Story>>;

    /// Inserts a story for the user and returns the persisted record,
    /// including the store-assigned id and creation timestamp.
    async fn insert(&self, user_id: Uuid, story: NewStory) -> PortResult<Story>;

    /// Deletes a story only if it is owned by the user. Deleting a missing
    /// or foreign-owned id is a silent no-op; no existence check is made.
    async fn delete(&self, user_id: Uuid, story_id: Uuid) -> PortResult<()>;
}
