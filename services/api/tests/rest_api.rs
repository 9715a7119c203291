//! Integration tests for the HTTP edge: the real router and middleware
//! stack, with in-memory implementations of the three ports.

use api_lib::config::{Config, Environment};
use api_lib::web::{build_router, AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use storygen_core::domain::{AuthUser, NewStory, Story};
use storygen_core::ports::{
    PortError, PortResult, StoryStore, TextCompletionService, TokenVerifier,
};
use tower::ServiceExt;
use uuid::Uuid;

const ALICE_TOKEN: &str = "alice-token";
const BOB_TOKEN: &str = "bob-token";

fn alice() -> Uuid {
    Uuid::from_u128(0xA11CE)
}

fn bob() -> Uuid {
    Uuid::from_u128(0xB0B)
}

//=========================================================================================
// In-Memory Port Implementations
//=========================================================================================

/// Token verifier that knows exactly two accounts.
struct StaticVerifier;

#[async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> PortResult<AuthUser> {
        let id = match token {
            ALICE_TOKEN => alice(),
            BOB_TOKEN => bob(),
            _ => return Err(PortError::InvalidToken),
        };
        Ok(AuthUser {
            id,
            email: Some(format!("{token}@example.com")),
            created_at: Some(Utc::now()),
        })
    }
}

/// Completion service replying with one canned response.
struct CannedCompleter {
    raw: String,
}

#[async_trait]
impl TextCompletionService for CannedCompleter {
    async fn complete(&self, _system: &str, _user: &str) -> PortResult<String> {
        Ok(self.raw.clone())
    }
}

/// Story store backed by a Vec, newest-insertion-first on list.
#[derive(Default)]
struct MemoryStore {
    stories: Mutex<Vec<Story>>,
}

#[async_trait]
impl StoryStore for MemoryStore {
    async fn list_for_user(&self, user_id: Uuid) -> PortResult<Vec<Story>> {
        let stories = self.stories.lock().unwrap();
        Ok(stories
            .iter()
            .rev()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, user_id: Uuid, story: NewStory) -> PortResult<Story> {
        let record = Story {
            id: Uuid::new_v4(),
            user_id,
            title: story.title,
            content: story.content,
            prompt: story.prompt,
            length: story.length,
            created_at: Utc::now(),
        };
        self.stories.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn delete(&self, user_id: Uuid, story_id: Uuid) -> PortResult<()> {
        // Silent no-op when nothing matches both id and owner.
        self.stories
            .lock()
            .unwrap()
            .retain(|s| !(s.id == story_id && s.user_id == user_id));
        Ok(())
    }
}

/// Story store whose every operation fails the way a dead database does,
/// driver detail included.
struct BrokenStore;

impl BrokenStore {
    fn failure() -> PortError {
        PortError::Database(
            "error connecting to db.internal:5432: connection refused (os error 111)".to_string(),
        )
    }
}

#[async_trait]
impl StoryStore for BrokenStore {
    async fn list_for_user(&self, _user_id: Uuid) -> PortResult<Vec<Story>> {
        Err(Self::failure())
    }

    async fn insert(&self, _user_id: Uuid, _story: NewStory) -> PortResult<Story> {
        Err(Self::failure())
    }

    async fn delete(&self, _user_id: Uuid, _story_id: Uuid) -> PortResult<()> {
        Err(Self::failure())
    }
}

//=========================================================================================
// Test Harness
//=========================================================================================

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        environment: Environment::Development,
        database_url: String::new(),
        log_level: tracing::Level::INFO,
        identity_url: "http://identity.invalid".to_string(),
        identity_service_key: "service-key".to_string(),
        openai_api_key: "test-key".to_string(),
        story_model: "test-model".to_string(),
        cors_origins: Vec::new(),
    }
}

fn app_with(completer_raw: &str) -> Router {
    app_with_store(Arc::new(MemoryStore::default()), completer_raw)
}

fn app_with_store(store: Arc<dyn StoryStore>, completer_raw: &str) -> Router {
    let state = Arc::new(AppState::new(
        Arc::new(test_config()),
        store,
        Arc::new(CannedCompleter {
            raw: completer_raw.to_string(),
        }),
        Arc::new(StaticVerifier),
    ));
    build_router(state)
}

fn app() -> Router {
    app_with(r#"{"title": "Salt and Silence", "content": "The keeper waited. The seal spoke."}"#)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(path: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn delete(path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

//=========================================================================================
// Liveness and Routing
//=========================================================================================

#[tokio::test]
async fn health_is_public() {
    let (status, body) = send(&app(), get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn unknown_routes_return_a_structured_404() {
    let (status, body) = send(&app(), get("/api/nope", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Endpoint not found"));
}

//=========================================================================================
// Authentication
//=========================================================================================

#[tokio::test]
async fn missing_token_is_rejected_with_401() {
    let (status, body) = send(&app(), get("/api/stories", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["error"],
        json!("Authorization header with Bearer token is required")
    );
}

#[tokio::test]
async fn unknown_token_is_rejected_with_401() {
    let (status, body) = send(&app(), get("/api/stories", Some("not-a-real-token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("Invalid or expired token"));
}

#[tokio::test]
async fn non_bearer_authorization_header_counts_as_missing() {
    let request = Request::builder()
        .method("GET")
        .uri("/api/stories")
        .header("authorization", "Basic abc123")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

//=========================================================================================
// Generation
//=========================================================================================

#[tokio::test]
async fn generate_returns_the_parsed_story_and_token_estimate() {
    let prompt = "A lonely lighthouse keeper meets a talking seal";
    let content = "The keeper waited. The seal spoke.";
    let (status, body) = send(
        &app(),
        post_json(
            "/api/generate",
            Some(ALICE_TOKEN),
            &json!({"prompt": prompt, "length": "short"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["title"], json!("Salt and Silence"));
    assert_eq!(body["data"]["content"], json!(content));
    let expected = (prompt.chars().count() + content.chars().count()).div_ceil(4);
    assert_eq!(body["data"]["tokensUsed"], json!(expected));
}

#[tokio::test]
async fn generate_defaults_to_medium_length() {
    let (status, _) = send(
        &app(),
        post_json(
            "/api/generate",
            Some(ALICE_TOKEN),
            &json!({"prompt": "A heist in a floating city"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn generate_rejects_a_short_prompt() {
    let (status, body) = send(
        &app(),
        post_json(
            "/api/generate",
            Some(ALICE_TOKEN),
            &json!({"prompt": "too short", "length": "short"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        json!("Please provide a story prompt with at least 10 characters")
    );
}

#[tokio::test]
async fn generate_rejects_an_unknown_length() {
    let (status, body) = send(
        &app(),
        post_json(
            "/api/generate",
            Some(ALICE_TOKEN),
            &json!({"prompt": "A heist in a floating city", "length": "epic"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        json!("Invalid story length. Must be short, medium, or long")
    );
}

#[tokio::test]
async fn sixth_generation_in_a_minute_is_throttled() {
    let app = app();
    let body = json!({"prompt": "A heist in a floating city", "length": "short"});
    for _ in 0..5 {
        let (status, _) = send(&app, post_json("/api/generate", Some(ALICE_TOKEN), &body)).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, resp) = send(&app, post_json("/api/generate", Some(ALICE_TOKEN), &body)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp["success"], json!(false));
    assert_eq!(
        resp["error"],
        json!("Story generation rate limit exceeded. Please wait before generating another story.")
    );
}

//=========================================================================================
// Story Library
//=========================================================================================

fn save_body(title: &str) -> Value {
    json!({
        "title": title,
        "content": "Once there was a story.",
        "prompt": "A story about stories",
        "length": "short"
    })
}

#[tokio::test]
async fn saving_assigns_owner_and_id_server_side() {
    let app = app();
    // The client-supplied user_id must be ignored.
    let mut body = save_body("  The Tide  ");
    body["user_id"] = json!(bob().to_string());

    let (status, resp) = send(&app, post_json("/api/stories", Some(ALICE_TOKEN), &body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(resp["success"], json!(true));
    assert_eq!(resp["data"]["user_id"], json!(alice().to_string()));
    assert_eq!(resp["data"]["title"], json!("The Tide"));
    assert_eq!(resp["data"]["length"], json!("short"));
    assert!(resp["data"]["id"].as_str().is_some());
    assert!(resp["data"]["created_at"].as_str().is_some());
}

#[tokio::test]
async fn saving_with_missing_fields_is_rejected() {
    let (status, body) = send(
        &app(),
        post_json(
            "/api/stories",
            Some(ALICE_TOKEN),
            &json!({"title": "No content", "length": "short"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        json!("Missing required fields: title, content, prompt, and length are required")
    );
}

#[tokio::test]
async fn saving_with_an_invalid_length_is_rejected() {
    let mut body = save_body("The Tide");
    body["length"] = json!("novella");
    let (status, resp) = send(&app(), post_json("/api/stories", Some(ALICE_TOKEN), &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], json!("Invalid length value"));
}

#[tokio::test]
async fn listing_is_owner_scoped_and_newest_first() {
    let app = app();
    for title in ["First", "Second"] {
        let (status, _) =
            send(&app, post_json("/api/stories", Some(ALICE_TOKEN), &save_body(title))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    send(&app, post_json("/api/stories", Some(BOB_TOKEN), &save_body("Bob's"))).await;

    let (status, body) = send(&app, get("/api/stories", Some(ALICE_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    let stories = body["data"].as_array().unwrap();
    assert_eq!(stories.len(), 2);
    assert_eq!(stories[0]["title"], json!("Second"));
    assert_eq!(stories[1]["title"], json!("First"));

    let (_, bob_body) = send(&app, get("/api/stories", Some(BOB_TOKEN))).await;
    assert_eq!(bob_body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_a_foreign_story_is_a_silent_no_op() {
    let app = app();
    let (_, created) =
        send(&app, post_json("/api/stories", Some(ALICE_TOKEN), &save_body("Mine"))).await;
    let story_id = created["data"]["id"].as_str().unwrap().to_string();

    // Bob "deletes" Alice's story: reported as success, nothing removed.
    let (status, body) = send(&app, delete(&format!("/api/stories/{story_id}"), BOB_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let (_, alice_body) = send(&app, get("/api/stories", Some(ALICE_TOKEN))).await;
    assert_eq!(alice_body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_a_nonexistent_story_still_succeeds() {
    let missing = Uuid::new_v4();
    let (status, body) =
        send(&app(), delete(&format!("/api/stories/{missing}"), ALICE_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Story deleted successfully"));
}

#[tokio::test]
async fn deleting_by_owner_removes_the_story() {
    let app = app();
    let (_, created) =
        send(&app, post_json("/api/stories", Some(ALICE_TOKEN), &save_body("Mine"))).await;
    let story_id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, delete(&format!("/api/stories/{story_id}"), ALICE_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, get("/api/stories", Some(ALICE_TOKEN))).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn database_failures_return_a_sanitized_message() {
    let app = app_with_store(Arc::new(BrokenStore), "{}");
    let (status, body) = send(&app, get("/api/stories", Some(ALICE_TOKEN))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert_eq!(
        body["error"],
        json!("Database operation failed. Please try again.")
    );
    // The driver's host and port detail must never reach the client.
    assert!(!body.to_string().contains("db.internal"));
}

#[tokio::test]
async fn a_malformed_json_body_still_gets_the_envelope() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/generate")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {ALICE_TOKEN}"))
        .body(Body::from("{not valid json"))
        .unwrap();
    let (status, body) = send(&app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn a_malformed_story_id_is_a_validation_error() {
    let (status, _) = send(&app(), delete("/api/stories/not-a-uuid", ALICE_TOKEN)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
