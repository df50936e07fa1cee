use utoipa::OpenApi;

use crate::routes::{agents, content, conversations, health, messages, models, search};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        search::search,
        content::index_content,
        content::list_entries,
        content::delete_content,
        agents::list_agents,
        agents::get_agent,
        agents::create_agent,
        agents::update_agent,
        agents::delete_agent,
        conversations::create_conversation,
        conversations::list_conversations,
        conversations::get_conversation,
        conversations::update_conversation,
        conversations::delete_conversation,
        messages::send_message,
        messages::send_first_message,
        models::list_models,
        models::default_model,
    ),
    components(schemas(
        health::HealthResponse,
        search::SearchResultResponse,
        content::IndexRequest,
        content::IndexFile,
        content::IndexResponse,
        content::IndexedFile,
        content::EntryResponse,
        agents::AgentRequest,
        agents::AgentResponse,
        conversations::CreateConversationRequest,
        conversations::UpdateConversationRequest,
        conversations::ConversationResponse,
        conversations::TurnResponse,
        conversations::TranscriptResponse,
        messages::SendMessageRequest,
        models::ChatModelResponse,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "search", description = "Search over indexed content"),
        (name = "content", description = "Content indexing"),
        (name = "agents", description = "Agent management"),
        (name = "conversations", description = "Conversation management"),
        (name = "messages", description = "Streamed chat"),
        (name = "models", description = "Chat models")
    )
)]
pub struct ApiDoc;
