//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification. Every response uses the
//! uniform envelope: `{success, data?, error?, message?}`.

use crate::error::{ApiError, ApiJson, ErrorBody};
use crate::web::state::AppState;
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storygen_core::domain::{AuthUser, NewStory, Story, StoryLength};
use storygen_core::generate::{generate_story, GenerateRequest};
use storygen_core::ports::PortError;
use tracing::info;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        generate_handler,
        list_stories_handler,
        create_story_handler,
        delete_story_handler,
    ),
    components(
        schemas(
            GenerateBody,
            SaveStoryBody,
            GeneratedStoryDto,
            StoryDto,
            GenerateResponse,
            StoriesResponse,
            StoryCreatedResponse,
            MessageResponse,
        )
    ),
    modifiers(&BearerToken),
    tags(
        (name = "AI Story Generator API", description = "Story generation and the saved-story library.")
    )
)]
pub struct ApiDoc;

struct BearerToken;

impl Modify for BearerToken {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

//=========================================================================================
// API Request and Response Payload Structs
//=========================================================================================

/// The request body for `POST /api/generate`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateBody {
    /// The story premise; at least 10 characters after trimming.
    #[serde(default)]
    pub prompt: String,
    /// One of `short`, `medium`, `long`. Defaults to `medium`.
    pub length: Option<String>,
    /// An optional suggested title.
    pub title: Option<String>,
}

/// The request body for `POST /api/stories`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveStoryBody {
    pub title: Option<String>,
    pub content: Option<String>,
    pub prompt: Option<String>,
    pub length: Option<String>,
}

/// A freshly generated story, not yet saved.
#[derive(Debug, Serialize, ToSchema)]
pub struct GeneratedStoryDto {
    pub title: String,
    pub content: String,
    #[serde(rename = "tokensUsed")]
    pub tokens_used: u32,
}

/// A persisted story as returned to the client.
#[derive(Debug, Serialize, ToSchema)]
pub struct StoryDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub prompt: String,
    /// One of `short`, `medium`, `long`.
    pub length: String,
    pub created_at: DateTime<Utc>,
}

impl From<Story> for StoryDto {
    fn from(story: Story) -> Self {
        Self {
            id: story.id,
            user_id: story.user_id,
            title: story.title,
            content: story.content,
            prompt: story.prompt,
            length: story.length.as_str().to_string(),
            created_at: story.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateResponse {
    pub success: bool,
    pub data: GeneratedStoryDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoriesResponse {
    pub success: bool,
    pub data: Vec<StoryDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoryCreatedResponse {
    pub success: bool,
    pub data: StoryDto,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

//=========================================================================================
// Liveness and Fallback Handlers
//=========================================================================================

/// Root endpoint describing the API.
pub async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "success": true,
        "message": "AI Story Generator API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "generate": "/api/generate",
            "stories": "/api/stories"
        },
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = MessageResponse))
)]
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "success": true,
        "message": "AI Story Generator API is healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Unmatched routes return a structured 404 body.
pub async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Endpoint not found")))
}

//=========================================================================================
// Story Generation Handler
//=========================================================================================

/// Generate a story from a prompt.
///
/// Validates the input, builds the prompts, makes a single call to the
/// upstream model, and parses the result resiliently. Nothing is persisted;
/// saving is a separate explicit call.
#[utoipa::path(
    post,
    path = "/api/generate",
    request_body = GenerateBody,
    responses(
        (status = 200, description = "Story generated", body = GenerateResponse),
        (status = 400, description = "Invalid prompt or length"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 429, description = "Generation rate limit exceeded"),
        (status = 500, description = "Upstream model failure")
    ),
    security(("bearer_token" = []))
)]
pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<GenerateBody>,
) -> Result<impl IntoResponse, ApiError> {
    let length = parse_length(body.length.as_deref())?;

    let story = generate_story(
        state.completer.as_ref(),
        GenerateRequest {
            prompt: body.prompt,
            length,
            title: body.title,
        },
    )
    .await?;

    info!(user_id = %user.id, tokens = story.tokens_used, "story generated");
    Ok(Json(GenerateResponse {
        success: true,
        data: GeneratedStoryDto {
            title: story.title,
            content: story.content,
            tokens_used: story.tokens_used,
        },
    }))
}

//=========================================================================================
// Story Library Handlers
//=========================================================================================

/// List the caller's saved stories, newest first.
#[utoipa::path(
    get,
    path = "/api/stories",
    responses(
        (status = 200, description = "The caller's stories", body = StoriesResponse),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer_token" = []))
)]
pub async fn list_stories_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let stories = state.store.list_for_user(user.id).await?;
    Ok(Json(StoriesResponse {
        success: true,
        data: stories.into_iter().map(StoryDto::from).collect(),
    }))
}

/// Save a generated story to the caller's library.
///
/// The owner is taken from the verified token; a client-supplied user id
/// is never accepted.
#[utoipa::path(
    post,
    path = "/api/stories",
    request_body = SaveStoryBody,
    responses(
        (status = 201, description = "Story saved", body = StoryCreatedResponse),
        (status = 400, description = "Missing fields or invalid length"),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer_token" = []))
)]
pub async fn create_story_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<SaveStoryBody>,
) -> Result<impl IntoResponse, ApiError> {
    let title = required_trimmed(body.title.as_deref());
    let content = required_trimmed(body.content.as_deref());
    let prompt = required_trimmed(body.prompt.as_deref());
    let (Some(title), Some(content), Some(prompt), Some(length)) =
        (title, content, prompt, body.length.as_deref())
    else {
        return Err(PortError::Validation(
            "Missing required fields: title, content, prompt, and length are required".to_string(),
        )
        .into());
    };
    let length = length
        .parse::<StoryLength>()
        .map_err(|_| PortError::Validation("Invalid length value".to_string()))?;

    let story = state
        .store
        .insert(
            user.id,
            NewStory {
                title,
                content,
                prompt,
                length,
            },
        )
        .await?;

    info!(user_id = %user.id, story_id = %story.id, "story saved");
    Ok((
        StatusCode::CREATED,
        Json(StoryCreatedResponse {
            success: true,
            data: story.into(),
            message: "Story saved successfully".to_string(),
        }),
    ))
}

/// Delete one of the caller's stories.
///
/// Ownership is a filter on the delete, not a precondition: a missing or
/// foreign-owned id deletes nothing and still reports success.
#[utoipa::path(
    delete,
    path = "/api/stories/{id}",
    params(("id" = Uuid, Path, description = "The story id")),
    responses(
        (status = 200, description = "Story deleted (or did not exist)", body = MessageResponse),
        (status = 400, description = "Malformed story id"),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer_token" = []))
)]
pub async fn delete_story_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let story_id = Uuid::parse_str(&id)
        .map_err(|_| PortError::Validation("Story ID is required".to_string()))?;

    state.store.delete(user.id, story_id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Story deleted successfully".to_string(),
    }))
}

//=========================================================================================
// Small Helpers
//=========================================================================================

fn required_trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parses the requested length, defaulting to `medium` when absent.
fn parse_length(value: Option<&str>) -> Result<StoryLength, ApiError> {
    match value {
        None => Ok(StoryLength::Medium),
        Some(raw) => raw
            .parse::<StoryLength>()
            .map_err(|e| ApiError::Port(PortError::Validation(e.to_string()))),
    }
}
