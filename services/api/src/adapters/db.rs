//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `StoryStore` port from the `core` crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use storygen_core::domain::{NewStory, Story, StoryLength};
use storygen_core::ports::{PortError, PortResult, StoryStore};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `StoryStore` port.
#[derive(Clone)]
pub struct PgStoryStore {
    pool: PgPool,
}

impl PgStoryStore {
    /// Creates a new `PgStoryStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct StoryRecord {
    id: Uuid,
    user_id: Uuid,
    title: String,
    content: String,
    prompt: String,
    length: String,
    created_at: DateTime<Utc>,
}

impl StoryRecord {
    fn to_domain(self) -> PortResult<Story> {
        let length = self
            .length
            .parse::<StoryLength>()
            .map_err(|_| PortError::Database(format!("invalid length value '{}'", self.length)))?;
        Ok(Story {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            content: self.content,
            prompt: self.prompt,
            length,
            created_at: self.created_at,
        })
    }
}

//=========================================================================================
// `StoryStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl StoryStore for PgStoryStore {
    async fn list_for_user(&self, user_id: Uuid) -> PortResult<Vec<Story>> {
        let records = sqlx::query_as::<_, StoryRecord>(
            "SELECT id, user_id, title, content, prompt, length, created_at \
             FROM stories WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Database(e.to_string()))?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn insert(&self, user_id: Uuid, story: NewStory) -> PortResult<Story> {
        let record = sqlx::query_as::<_, StoryRecord>(
            "INSERT INTO stories (user_id, title, content, prompt, length) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, user_id, title, content, prompt, length, created_at",
        )
        .bind(user_id)
        .bind(&story.title)
        .bind(&story.content)
        .bind(&story.prompt)
        .bind(story.length.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Database(e.to_string()))?;

        record.to_domain()
    }

    async fn delete(&self, user_id: Uuid, story_id: Uuid) -> PortResult<()> {
        // Ownership is a filter condition, not a precondition: deleting a
        // missing or foreign-owned id affects zero rows and still succeeds.
        sqlx::query("DELETE FROM stories WHERE id = $1 AND user_id = $2")
            .bind(story_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Database(e.to_string()))?;
        Ok(())
    }
}
