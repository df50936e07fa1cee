use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Config,
    docs::ApiDoc,
    middleware::logging,
    routes::{agents, content, conversations, health, messages, models, search},
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Search & content
        .route("/api/search", get(search::search))
        .route("/api/content/index", post(content::index_content).delete(content::delete_content))
        .route("/api/content/entries", get(content::list_entries))
        // Agents
        .route("/api/agents", get(agents::list_agents).post(agents::create_agent))
        .route(
            "/api/agents/:agent",
            get(agents::get_agent).put(agents::update_agent).delete(agents::delete_agent),
        )
        // Conversations
        .route(
            "/api/chat/conversations",
            get(conversations::list_conversations).post(conversations::create_conversation),
        )
        .route(
            "/api/chat/conversations/:conversation_id",
            get(conversations::get_conversation)
                .put(conversations::update_conversation)
                .delete(conversations::delete_conversation),
        )
        // Messages
        .route("/api/chat/conversations/:conversation_id/messages", post(messages::send_message))
        .route("/api/chat/messages", post(messages::send_first_message))
        // Chat models
        .route("/api/chat/models", get(models::list_models))
        .route("/api/chat/default-model", get(models::default_model));

    // Streams stay open for a whole generation
    let request_timeout = Duration::from_secs(state.config.chat.generation_timeout_secs + 60);

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors.allow_origin(Any)
        } else {
            let parsed_origins: Vec<axum::http::HeaderValue> = config
                .cors
                .origins
                .iter()
                .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
                .collect();

            cors.allow_origin(parsed_origins)
        }
    } else {
        CorsLayer::permissive()
    }
}
