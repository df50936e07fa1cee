use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use muse_persist::{Conversation, ConversationUpdate, Turn};
use muse_types::Caller;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::Pagination;
use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateConversationRequest {
    pub title: Option<String>,
    pub agent_id: Option<String>,
}

/// Full replacement of a conversation's metadata
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateConversationRequest {
    pub title: Option<String>,
    /// Omit to keep the current slug
    pub slug: Option<String>,
    pub agent_id: Option<String>,
    #[serde(default)]
    pub file_filters: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationResponse {
    pub conversation_id: String,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub agent_id: Option<String>,
    pub file_filters: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TurnResponse {
    pub turn_id: String,
    pub user: String,
    /// Missing while the reply has not been recorded
    pub assistant: Option<String>,
    pub chat_model_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TranscriptResponse {
    #[serde(flatten)]
    pub conversation: ConversationResponse,
    pub turns: Vec<TurnResponse>,
}

pub(crate) fn conversation_to_response(conversation: Conversation) -> ConversationResponse {
    ConversationResponse {
        conversation_id: conversation.id,
        title: conversation.title,
        slug: conversation.slug,
        agent_id: conversation.agent_id,
        file_filters: conversation.file_filters,
        created_at: conversation.created_at,
        updated_at: conversation.updated_at,
    }
}

fn turn_to_response(turn: Turn) -> TurnResponse {
    let chat_model_id = turn
        .assistant
        .as_ref()
        .and_then(|e| e.assistant.as_ref())
        .and_then(|ctx| ctx.chat_model_id.clone());
    TurnResponse {
        turn_id: turn.turn_id,
        created_at: turn.user.created_at,
        user: turn.user.message,
        assistant: turn.assistant.map(|e| e.message),
        chat_model_id,
    }
}

/// The agent must exist (404) and be usable by the caller (403)
async fn check_agent(state: &AppState, caller: &Caller, agent_id: &str) -> ApiResult<()> {
    let agent = state
        .persist
        .get_agent(agent_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Agent {}", agent_id)))?;
    if !state.access.can_use_agent(&agent, caller) {
        return Err(ApiError::Forbidden(format!("agent {} is not accessible", agent.slug)));
    }
    Ok(())
}

/// Create a conversation, checking the agent it is bound to
pub(crate) async fn open_conversation(
    state: &AppState,
    caller: &Caller,
    req: CreateConversationRequest,
) -> ApiResult<Conversation> {
    if let Some(agent_id) = &req.agent_id {
        check_agent(state, caller, agent_id).await?;
    }

    let mut conversation = Conversation::new(caller.user_id.clone(), req.agent_id);
    if let Some(title) = req.title {
        conversation = conversation.with_title(title);
    }
    Ok(state.conversations.create(conversation).await?)
}

/// Create a new conversation
#[utoipa::path(
    post,
    path = "/api/chat/conversations",
    request_body = CreateConversationRequest,
    responses(
        (status = 201, description = "Conversation created", body = ConversationResponse),
        (status = 403, description = "Agent is not accessible"),
        (status = 404, description = "Agent not found")
    ),
    tag = "conversations"
)]
pub async fn create_conversation(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Json(req): Json<CreateConversationRequest>,
) -> ApiResult<(StatusCode, Json<ConversationResponse>)> {
    let conversation = open_conversation(&state, &caller, req).await?;
    Ok((StatusCode::CREATED, Json(conversation_to_response(conversation))))
}

/// List the caller's conversations, most recently active first
#[utoipa::path(
    get,
    path = "/api/chat/conversations",
    params(
        ("skip" = Option<usize>, Query, description = "Conversations to skip"),
        ("limit" = Option<usize>, Query, description = "Maximum conversations to return (default: 20)")
    ),
    responses(
        (status = 200, description = "Conversations", body = [ConversationResponse])
    ),
    tag = "conversations"
)]
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<ConversationResponse>>> {
    let conversations = state
        .conversations
        .list(&caller.user_id, Some(page.limit() as i64), Some(page.skip() as i64))
        .await?;
    Ok(Json(conversations.into_iter().map(conversation_to_response).collect()))
}

/// Get a conversation with its turns
#[utoipa::path(
    get,
    path = "/api/chat/conversations/{conversation_id}",
    params(
        ("conversation_id" = String, Path, description = "Conversation ID")
    ),
    responses(
        (status = 200, description = "Conversation transcript", body = TranscriptResponse),
        (status = 404, description = "Conversation not found")
    ),
    tag = "conversations"
)]
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(conversation_id): Path<String>,
) -> ApiResult<Json<TranscriptResponse>> {
    let conversation = owned(&state, &conversation_id, &caller).await?;
    let turns = state.conversations.turns(&conversation.id).await?;

    Ok(Json(TranscriptResponse {
        conversation: conversation_to_response(conversation),
        turns: turns.into_iter().map(turn_to_response).collect(),
    }))
}

/// Replace a conversation's title, slug, agent and file filters
#[utoipa::path(
    put,
    path = "/api/chat/conversations/{conversation_id}",
    params(
        ("conversation_id" = String, Path, description = "Conversation ID")
    ),
    request_body = UpdateConversationRequest,
    responses(
        (status = 200, description = "Conversation updated", body = ConversationResponse),
        (status = 403, description = "Agent is not accessible"),
        (status = 404, description = "Conversation or agent not found")
    ),
    tag = "conversations"
)]
pub async fn update_conversation(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(conversation_id): Path<String>,
    Json(req): Json<UpdateConversationRequest>,
) -> ApiResult<Json<ConversationResponse>> {
    let conversation = owned(&state, &conversation_id, &caller).await?;
    if let Some(agent_id) = &req.agent_id {
        check_agent(&state, &caller, agent_id).await?;
    }

    let update = ConversationUpdate {
        title: req.title,
        slug: req.slug,
        agent_id: req.agent_id,
        file_filters: req.file_filters,
    };
    let updated = state
        .conversations
        .update(&conversation.id, &caller.user_id, update)
        .await
        .map_err(|e| not_found_or_storage(e, &conversation_id))?;
    Ok(Json(conversation_to_response(updated)))
}

/// Delete a conversation and its messages
#[utoipa::path(
    delete,
    path = "/api/chat/conversations/{conversation_id}",
    params(
        ("conversation_id" = String, Path, description = "Conversation ID")
    ),
    responses(
        (status = 204, description = "Conversation deleted"),
        (status = 404, description = "Conversation not found")
    ),
    tag = "conversations"
)]
pub async fn delete_conversation(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(conversation_id): Path<String>,
) -> ApiResult<StatusCode> {
    let conversation = owned(&state, &conversation_id, &caller).await?;
    state.conversations.delete(&conversation.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Conversations of other users read as missing
pub(crate) async fn owned(state: &AppState, conversation_id: &str, caller: &Caller) -> ApiResult<Conversation> {
    state
        .conversations
        .get_owned(conversation_id, &caller.user_id)
        .await
        .map_err(|e| not_found_or_storage(e, conversation_id))
}

fn not_found_or_storage(err: muse_persist::PersistError, conversation_id: &str) -> ApiError {
    match err {
        muse_persist::PersistError::ConversationNotFound(_) => {
            ApiError::NotFound(format!("Conversation {}", conversation_id))
        }
        other => ApiError::Persist(other),
    }
}
