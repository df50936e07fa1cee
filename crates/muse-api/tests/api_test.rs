use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use muse_api::{build_router, AppState, Config};
use muse_chat::{Generator, ResolvedModel};
use muse_llm::{EventStream, Message, StreamEvent};
use muse_persist::InMemoryPersistenceClient;
use serde_json::{json, Value};
use tower::ServiceExt;

struct CannedGenerator;

#[async_trait]
impl Generator for CannedGenerator {
    async fn generate(&self, _model: &ResolvedModel, _messages: Vec<Message>) -> anyhow::Result<EventStream> {
        let events: Vec<anyhow::Result<StreamEvent>> = vec![
            Ok(StreamEvent::Message { content: "Hi".to_string() }),
            Ok(StreamEvent::Message { content: " there".to_string() }),
            Ok(StreamEvent::Done { finish_reason: None }),
        ];
        Ok(Box::pin(futures::stream::iter(events)))
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.superusers = vec!["admin".to_string()];
    config.llm_api_key = "test-key".to_string();
    config
}

async fn app(seed_model: bool) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        test_config(),
        Arc::new(InMemoryPersistenceClient::new()),
        Arc::new(CannedGenerator),
    ));
    if seed_model {
        state.seed_chat_model().await.unwrap();
    }
    (build_router(state.clone()), state)
}

fn request(method: &str, uri: &str, user: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", user)
        .header("content-type", "application/json");
    match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn call_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = call(app, req).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap()
    };
    (status, value)
}

async fn create_agent(app: &Router, user: &str, name: &str, privacy: &str) -> Value {
    let (status, body) = call_json(
        app,
        request(
            "POST",
            "/api/agents",
            user,
            Some(json!({ "name": name, "personality": "Keeps receipts.", "privacy_level": privacy })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app(true).await;
    let (status, body) = call_json(&app, request("GET", "/health", "alice", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["storage"], "connected");
}

#[tokio::test]
async fn test_index_search_and_delete_content() {
    let (app, _) = app(true).await;

    let (status, body) = call_json(
        &app,
        request(
            "POST",
            "/api/content/index",
            "alice",
            Some(json!({ "files": [
                { "file_name": "notes.md", "content": "monthly budget for groceries" },
                { "file_name": "photo.png", "content": "binary" }
            ] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["indexed"].as_array().unwrap().len(), 1);
    assert_eq!(body["skipped"], json!(["photo.png"]));

    let (status, hits) = call_json(&app, request("GET", "/api/search?q=budget&n=3", "alice", None)).await;
    assert_eq!(status, StatusCode::OK);
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["source"], "markdown");
    assert_eq!(hits[0]["file"], "notes.md");

    // Other users do not see alice's entries
    let (_, hits) = call_json(&app, request("GET", "/api/search?q=budget", "bob", None)).await;
    assert!(hits.as_array().unwrap().is_empty());

    let (status, entries) = call_json(&app, request("GET", "/api/content/entries?file_type=markdown", "alice", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entries.as_array().unwrap().len(), 1);

    let (status, _) = call(&app, request("DELETE", "/api/content/index?file_name=notes.md", "alice", None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The repeated signature is served from the cache; a new one sees the deletion
    let (_, hits) = call_json(&app, request("GET", "/api/search?q=budget&n=3", "alice", None)).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
    let (_, hits) = call_json(&app, request("GET", "/api/search?q=budget&n=4", "alice", None)).await;
    assert!(hits.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_indexing_keeps_cached_results() {
    let (app, _) = app(true).await;
    let index = |user: &'static str, file_name: &'static str, content: &'static str| {
        request(
            "POST",
            "/api/content/index",
            user,
            Some(json!({ "files": [{ "file_name": file_name, "content": content }] })),
        )
    };

    let (status, _) = call_json(&app, index("alice", "notes.md", "budget notes")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, hits) = call_json(&app, request("GET", "/api/search?q=budget", "alice", None)).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);

    call_json(&app, index("bob", "x.md", "bob's budget")).await;
    call_json(&app, index("alice", "plan.txt", "budget plan")).await;

    let (_, hits) = call_json(&app, request("GET", "/api/search?q=budget", "alice", None)).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
    let (_, hits) = call_json(&app, request("GET", "/api/search?q=budget&n=10", "alice", None)).await;
    assert_eq!(hits.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_reindexing_a_file_replaces_its_entries() {
    let (app, _) = app(true).await;
    for content in ["first draft", "second draft"] {
        let (status, _) = call_json(
            &app,
            request(
                "POST",
                "/api/content/index",
                "alice",
                Some(json!({ "files": [{ "file_name": "plan.txt", "content": content }] })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, entries) = call_json(&app, request("GET", "/api/content/entries?file_name=plan.txt", "alice", None)).await;
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["raw"], "second draft");
}

#[tokio::test]
async fn test_unknown_search_type_is_rejected() {
    let (app, _) = app(true).await;
    let (status, body) = call_json(&app, request("GET", "/api/search?q=x&t=video", "alice", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unknown search type"));
}

#[tokio::test]
async fn test_agent_lifecycle_and_access() {
    let (app, _) = app(true).await;

    let agent = create_agent(&app, "alice", "Budget Helper", "private").await;
    let slug = agent["slug"].as_str().unwrap().to_string();
    let id = agent["id"].as_str().unwrap().to_string();
    assert!(slug.starts_with("budget-helper-"));
    assert!(agent["chat_model_id"].is_string());
    assert_eq!(agent["is_creator"], true);

    // Same creator, same name
    let (status, _) = call_json(
        &app,
        request("POST", "/api/agents", "alice", Some(json!({ "name": "Budget Helper" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call_json(&app, request("GET", &format!("/api/agents/{}", slug), "alice", None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call_json(&app, request("GET", &format!("/api/agents/{}", slug), "bob", None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call_json(&app, request("GET", "/api/agents/nobody-000000", "bob", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call_json(
        &app,
        request("PUT", &format!("/api/agents/{}", id), "bob", Some(json!({ "name": "Stolen" }))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = call_json(
        &app,
        request(
            "PUT",
            &format!("/api/agents/{}", id),
            "alice",
            Some(json!({ "name": "Budget Helper", "privacy_level": "public" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["privacy_level"], "public");

    let (status, _) = call_json(&app, request("GET", &format!("/api/agents/{}", slug), "bob", None)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, listed) = call_json(&app, request("GET", "/api/agents", "bob", None)).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = call(&app, request("DELETE", &format!("/api/agents/{}", id), "alice", None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, request("DELETE", &format!("/api/agents/{}", id), "alice", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_agent_names_are_unique() {
    let (app, _) = app(true).await;
    create_agent(&app, "alice", "Chef", "public").await;

    let (status, body) = call_json(
        &app,
        request("POST", "/api/agents", "bob", Some(json!({ "name": "Chef", "privacy_level": "public" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("public agent"));

    // A private agent of the same name is fine
    create_agent(&app, "bob", "Chef", "private").await;
}

#[tokio::test]
async fn test_superuser_manages_any_agent() {
    let (app, _) = app(true).await;
    let agent = create_agent(&app, "alice", "Scribe", "private").await;
    let id = agent["id"].as_str().unwrap();

    let (status, _) = call(&app, request("DELETE", &format!("/api/agents/{}", id), "admin", None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_creating_agent_without_models_is_a_config_error() {
    let (app, _) = app(false).await;
    let (status, body) = call_json(&app, request("POST", "/api/agents", "alice", Some(json!({ "name": "Lonely" })))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("No default chat model"));

    let (status, _) = call_json(&app, request("GET", "/api/chat/default-model", "alice", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_conversation_crud_is_owner_scoped() {
    let (app, _) = app(true).await;

    let (status, created) = call_json(
        &app,
        request("POST", "/api/chat/conversations", "alice", Some(json!({ "title": "Trip" }))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["conversation_id"].as_str().unwrap().to_string();
    assert_eq!(created["title"], "Trip");

    let (_, listed) = call_json(&app, request("GET", "/api/chat/conversations", "alice", None)).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    let (_, listed) = call_json(&app, request("GET", "/api/chat/conversations", "bob", None)).await;
    assert!(listed.as_array().unwrap().is_empty());

    let uri = format!("/api/chat/conversations/{}", id);
    let (status, _) = call_json(&app, request("GET", &uri, "bob", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, request("DELETE", &uri, "bob", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, request("DELETE", &uri, "alice", None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call_json(&app, request("GET", &uri, "alice", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_conversation_with_inaccessible_agent_is_forbidden() {
    let (app, _) = app(true).await;
    let agent = create_agent(&app, "alice", "Diary", "private").await;

    let (status, _) = call_json(
        &app,
        request("POST", "/api/chat/conversations", "bob", Some(json!({ "agent_id": agent["id"] }))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_conversation_update_checks_agent() {
    let (app, _) = app(true).await;
    let (_, created) = call_json(&app, request("POST", "/api/chat/conversations", "bob", Some(json!({})))).await;
    assert_eq!(created["slug"], Value::Null);
    assert_eq!(created["file_filters"], json!([]));
    let uri = format!("/api/chat/conversations/{}", created["conversation_id"].as_str().unwrap());

    let (status, _) = call_json(&app, request("PUT", &uri, "bob", Some(json!({ "agent_id": "missing" })))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let diary = create_agent(&app, "alice", "Diary", "private").await;
    let (status, _) = call_json(&app, request("PUT", &uri, "bob", Some(json!({ "agent_id": diary["id"] })))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let chef = create_agent(&app, "alice", "Chef", "public").await;
    let (status, updated) = call_json(
        &app,
        request(
            "PUT",
            &uri,
            "bob",
            Some(json!({
                "title": "Dinner",
                "slug": "dinner",
                "agent_id": chef["id"],
                "file_filters": ["recipes.md"]
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(updated["title"], "Dinner");
    assert_eq!(updated["slug"], "dinner");
    assert_eq!(updated["agent_id"], chef["id"]);
    assert_eq!(updated["file_filters"], json!(["recipes.md"]));

    let (_, transcript) = call_json(&app, request("GET", &uri, "bob", None)).await;
    assert_eq!(transcript["slug"], "dinner");

    let (status, _) = call_json(&app, request("PUT", &uri, "alice", Some(json!({ "title": "Mine" })))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_message_streams_and_records_turn() {
    let (app, _) = app(true).await;
    let (_, created) = call_json(&app, request("POST", "/api/chat/conversations", "alice", Some(json!({})))).await;
    let id = created["conversation_id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        request(
            "POST",
            &format!("/api/chat/conversations/{}/messages", id),
            "alice",
            Some(json!({ "message": "Hello" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("event: message"));
    assert!(body.contains(r#"{"message":"Hi"}"#));
    assert!(body.contains(r#"{"message":" there"}"#));
    assert!(body.contains("event: done"));
    assert!(body.contains("data: [DONE]"));

    let (_, transcript) = call_json(&app, request("GET", &format!("/api/chat/conversations/{}", id), "alice", None)).await;
    let turns = transcript["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0]["user"], "Hello");
    assert_eq!(turns[0]["assistant"], "Hi there");
    assert!(turns[0]["chat_model_id"].is_string());
}

#[tokio::test]
async fn test_empty_message_and_foreign_conversation_are_rejected() {
    let (app, _) = app(true).await;
    let (_, created) = call_json(&app, request("POST", "/api/chat/conversations", "alice", Some(json!({})))).await;
    let uri = format!("/api/chat/conversations/{}/messages", created["conversation_id"].as_str().unwrap());

    let (status, _) = call(&app, request("POST", &uri, "alice", Some(json!({ "message": "  " })))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = call(&app, request("POST", &uri, "bob", Some(json!({ "message": "hi" })))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_first_message_opens_conversation() {
    let (app, state) = app(true).await;

    let (status, body) = call(
        &app,
        request("POST", "/api/chat/messages", "alice", Some(json!({ "message": "Hello" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let conversation_at = body.find("event: conversation").unwrap();
    let message_at = body.find("event: message").unwrap();
    assert!(conversation_at < message_at);

    let conversations = state.conversations.list("alice", None, None).await.unwrap();
    assert_eq!(conversations.len(), 1);
    assert!(body.contains(&conversations[0].id));
    let turns = state.conversations.turns(&conversations[0].id).await.unwrap();
    assert_eq!(turns.len(), 1);
}

#[tokio::test]
async fn test_models_listing_hides_credentials() {
    let (app, _) = app(true).await;
    let (status, models) = call_json(&app, request("GET", "/api/chat/models", "alice", None)).await;
    assert_eq!(status, StatusCode::OK);
    let models = models.as_array().unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0]["name"], "gemini-2.0-flash");
    assert_eq!(models[0]["model_type"], "google");
    assert!(models[0].get("ai_model_api").is_none());

    let (status, default) = call_json(&app, request("GET", "/api/chat/default-model", "alice", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(default["id"], models[0]["id"]);
}

#[tokio::test]
async fn test_missing_user_header_uses_default_user() {
    let (app, state) = app(true).await;
    let req = Request::builder()
        .method("POST")
        .uri("/api/chat/conversations")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, _) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);

    let conversations = state.conversations.list("default", None, None).await.unwrap();
    assert_eq!(conversations.len(), 1);
}
