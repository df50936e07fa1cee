use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use muse_chat::SendMessage;
use muse_types::{Agent, Caller, RelayEvent};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use utoipa::ToSchema;

use super::conversations::{open_conversation, owned, CreateConversationRequest};
use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    /// Agent to answer as, overriding the conversation's own
    pub agent_id: Option<String>,
}

fn relay_event_to_sse(event: RelayEvent) -> Event {
    match event {
        RelayEvent::Chunk { text } => Event::default()
            .event("message")
            .data(json!({ "message": text }).to_string()),
        RelayEvent::Error { message } => Event::default()
            .event("error")
            .data(json!({ "error": message }).to_string()),
        RelayEvent::Done { .. } => Event::default().event("done").data("[DONE]"),
    }
}

async fn requested_agent(state: &AppState, caller: &Caller, agent_id: Option<&str>) -> ApiResult<Option<Agent>> {
    let Some(agent_id) = agent_id else {
        return Ok(None);
    };
    let agent = state
        .persist
        .get_agent(agent_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Agent {}", agent_id)))?;
    if !state.access.can_use_agent(&agent, caller) {
        return Err(ApiError::Forbidden(format!("agent {} is not accessible", agent.slug)));
    }
    Ok(Some(agent))
}

fn checked_message(req: SendMessageRequest) -> ApiResult<String> {
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }
    Ok(req.message)
}

/// Send a message and stream the reply using Server-Sent Events
#[utoipa::path(
    post,
    path = "/api/chat/conversations/{conversation_id}/messages",
    params(
        ("conversation_id" = String, Path, description = "Conversation ID"),
        ("agent_id" = Option<String>, Query, description = "Agent to answer as")
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Streaming response", content_type = "text/event-stream"),
        (status = 403, description = "Agent is not accessible"),
        (status = 404, description = "Conversation or agent not found")
    ),
    tag = "messages"
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(conversation_id): Path<String>,
    Query(query): Query<MessageQuery>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let message = checked_message(req)?;
    let conversation = owned(&state, &conversation_id, &caller).await?;
    let agent = requested_agent(&state, &caller, query.agent_id.as_deref()).await?;

    let events = state.relay.spawn_send(
        caller,
        SendMessage {
            conversation_id: conversation.id,
            message,
            agent,
        },
    );

    let sse_stream = ReceiverStream::new(events).map(|event| Ok::<Event, Infallible>(relay_event_to_sse(event)));
    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}

/// Start a conversation with its first message and stream the reply
///
/// The first event, `conversation`, carries the new conversation id.
#[utoipa::path(
    post,
    path = "/api/chat/messages",
    params(
        ("agent_id" = Option<String>, Query, description = "Agent the conversation is bound to")
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Streaming response", content_type = "text/event-stream"),
        (status = 403, description = "Agent is not accessible"),
        (status = 404, description = "Agent not found")
    ),
    tag = "messages"
)]
pub async fn send_first_message(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Query(query): Query<MessageQuery>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let message = checked_message(req)?;
    let conversation = open_conversation(
        &state,
        &caller,
        CreateConversationRequest {
            title: None,
            agent_id: query.agent_id,
        },
    )
    .await?;
    tracing::info!(conversation_id = %conversation.id, user = %caller.user_id, "conversation started");

    let conversation_id = conversation.id.clone();
    let mut events = ReceiverStream::new(state.relay.spawn_send(
        caller,
        SendMessage {
            conversation_id: conversation.id,
            message,
            agent: None,
        },
    ));

    let sse_stream = async_stream::stream! {
        yield Ok::<Event, Infallible>(
            Event::default()
                .event("conversation")
                .data(json!({ "conversation_id": conversation_id }).to_string()),
        );
        while let Some(event) = events.next().await {
            yield Ok(relay_event_to_sse(event));
        }
    };
    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}
