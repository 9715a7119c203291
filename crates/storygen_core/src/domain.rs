//! crates/storygen_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP framework.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The requested size of a generated story. Embedded in the prompt as a
/// word-count target; also a column constraint on saved stories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryLength {
    Short,
    Medium,
    Long,
}

impl StoryLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryLength::Short => "short",
            StoryLength::Medium => "medium",
            StoryLength::Long => "long",
        }
    }
}

impl fmt::Display for StoryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid story length. Must be short, medium, or long")]
pub struct InvalidStoryLength;

impl FromStr for StoryLength {
    type Err = InvalidStoryLength;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(StoryLength::Short),
            "medium" => Ok(StoryLength::Medium),
            "long" => Ok(StoryLength::Long),
            _ => Err(InvalidStoryLength),
        }
    }
}

/// A persisted story record, owned by exactly one user.
#[derive(Debug, Clone, Serialize)]
pub struct Story {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub prompt: String,
    pub length: StoryLength,
    pub created_at: DateTime<Utc>,
}

/// The validated payload for saving a story. The owner is attached
/// server-side from the verified token, never taken from the client.
#[derive(Debug, Clone)]
pub struct NewStory {
    pub title: String,
    pub content: String,
    pub prompt: String,
    pub length: StoryLength,
}

/// The transient result of one generation call. Becomes a `Story` only
/// if the user explicitly saves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedStory {
    pub title: String,
    pub content: String,
    /// Rough character-based approximation, not an authoritative count.
    pub tokens_used: u32,
}

/// The identity resolved from a bearer token by the external identity
/// provider. Re-derived on every request; never stored locally.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
