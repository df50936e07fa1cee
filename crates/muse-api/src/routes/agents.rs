use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use muse_types::{Agent, Caller, PrivacyLevel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::Pagination;
use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AgentRequest {
    pub name: String,
    pub personality: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "private")]
    pub privacy_level: Option<PrivacyLevel>,
    pub chat_model_id: Option<String>,
    #[serde(default)]
    pub input_tools: Vec<String>,
    #[serde(default)]
    pub output_modes: Vec<String>,
    pub style_color: Option<String>,
    pub style_icon: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AgentResponse {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub personality: Option<String>,
    pub privacy_level: String,
    pub creator_id: Option<String>,
    pub chat_model_id: Option<String>,
    pub input_tools: Vec<String>,
    pub output_modes: Vec<String>,
    pub style_color: Option<String>,
    pub style_icon: Option<String>,
    /// Whether the caller may edit or delete it
    pub is_creator: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn agent_to_response(agent: Agent, caller: &Caller) -> AgentResponse {
    let privacy_level = serde_json::to_value(agent.privacy_level)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    AgentResponse {
        is_creator: agent.creator_id.as_deref() == Some(caller.user_id.as_str()),
        id: agent.id,
        slug: agent.slug,
        name: agent.name,
        personality: agent.personality,
        privacy_level,
        creator_id: agent.creator_id,
        chat_model_id: agent.chat_model_id,
        input_tools: agent.input_tools,
        output_modes: agent.output_modes,
        style_color: agent.style_color,
        style_icon: agent.style_icon,
        created_at: agent.created_at,
        updated_at: agent.updated_at,
    }
}

/// Name clashes that block creating or renaming an agent
async fn check_name(
    state: &AppState,
    name: &str,
    privacy: PrivacyLevel,
    caller: &Caller,
    ignore_id: Option<&str>,
) -> ApiResult<()> {
    let same_name: Vec<Agent> = state
        .persist
        .find_agents_by_name(name)
        .await?
        .into_iter()
        .filter(|a| Some(a.id.as_str()) != ignore_id)
        .collect();

    if same_name
        .iter()
        .any(|a| a.creator_id.as_deref() == Some(caller.user_id.as_str()))
    {
        return Err(ApiError::BadRequest(format!("You already have an agent named {}", name)));
    }
    if privacy == PrivacyLevel::Public && same_name.iter().any(|a| a.privacy_level == PrivacyLevel::Public) {
        return Err(ApiError::BadRequest(format!("A public agent named {} already exists", name)));
    }
    Ok(())
}

async fn chat_model_for(state: &AppState, requested: Option<String>) -> ApiResult<String> {
    if let Some(id) = requested {
        return match state.persist.get_chat_model(&id).await? {
            Some(model) => Ok(model.id),
            None => Err(ApiError::BadRequest(format!("Unknown chat model {}", id))),
        };
    }
    match state.models.default_model().await? {
        Some(model) => Ok(model.id),
        None => Err(ApiError::Config("No default chat model configured".to_string())),
    }
}

async fn load_managed(state: &AppState, agent_id: &str, caller: &Caller) -> ApiResult<Agent> {
    let agent = state
        .persist
        .get_agent(agent_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Agent {}", agent_id)))?;
    if !state.access.can_manage_agent(&agent, caller) {
        return Err(ApiError::Forbidden("only the creator can change this agent".to_string()));
    }
    Ok(agent)
}

/// List agents the caller created plus public ones
#[utoipa::path(
    get,
    path = "/api/agents",
    params(
        ("skip" = Option<usize>, Query, description = "Agents to skip"),
        ("limit" = Option<usize>, Query, description = "Maximum agents to return (default: 20)")
    ),
    responses(
        (status = 200, description = "Visible agents", body = [AgentResponse])
    ),
    tag = "agents"
)]
pub async fn list_agents(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<AgentResponse>>> {
    let agents = state.persist.list_agents_visible_to(&caller.user_id).await?;
    Ok(Json(
        agents
            .into_iter()
            .skip(page.skip())
            .take(page.limit())
            .map(|a| agent_to_response(a, &caller))
            .collect(),
    ))
}

/// Get an agent by slug
#[utoipa::path(
    get,
    path = "/api/agents/{slug}",
    params(
        ("slug" = String, Path, description = "Agent slug")
    ),
    responses(
        (status = 200, description = "Agent details", body = AgentResponse),
        (status = 403, description = "Agent is not accessible"),
        (status = 404, description = "Agent not found")
    ),
    tag = "agents"
)]
pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(slug): Path<String>,
) -> ApiResult<Json<AgentResponse>> {
    let agent = state
        .persist
        .get_agent_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Agent {}", slug)))?;
    if !state.access.can_use_agent(&agent, &caller) {
        return Err(ApiError::Forbidden(format!("agent {} is not accessible", slug)));
    }
    Ok(Json(agent_to_response(agent, &caller)))
}

/// Create an agent owned by the caller
#[utoipa::path(
    post,
    path = "/api/agents",
    request_body = AgentRequest,
    responses(
        (status = 201, description = "Agent created", body = AgentResponse),
        (status = 400, description = "Name already taken or unknown chat model"),
        (status = 500, description = "No chat model configured")
    ),
    tag = "agents"
)]
pub async fn create_agent(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Json(req): Json<AgentRequest>,
) -> ApiResult<(StatusCode, Json<AgentResponse>)> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("agent name is required".to_string()));
    }
    let privacy = req.privacy_level.unwrap_or_default();
    check_name(&state, &name, privacy, &caller, None).await?;

    let mut agent = Agent::new(name, Some(caller.user_id.clone()));
    agent.personality = req.personality;
    agent.privacy_level = privacy;
    agent.chat_model_id = Some(chat_model_for(&state, req.chat_model_id).await?);
    agent.input_tools = req.input_tools;
    agent.output_modes = req.output_modes;
    agent.style_color = req.style_color;
    agent.style_icon = req.style_icon;

    state.persist.save_agent(&agent).await?;
    tracing::info!(agent = %agent.slug, user = %caller.user_id, "agent created");

    Ok((StatusCode::CREATED, Json(agent_to_response(agent, &caller))))
}

/// Update an agent the caller manages
#[utoipa::path(
    put,
    path = "/api/agents/{agent_id}",
    params(
        ("agent_id" = String, Path, description = "Agent ID")
    ),
    request_body = AgentRequest,
    responses(
        (status = 200, description = "Agent updated", body = AgentResponse),
        (status = 400, description = "Name already taken or unknown chat model"),
        (status = 403, description = "Caller does not manage the agent"),
        (status = 404, description = "Agent not found")
    ),
    tag = "agents"
)]
pub async fn update_agent(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(agent_id): Path<String>,
    Json(req): Json<AgentRequest>,
) -> ApiResult<Json<AgentResponse>> {
    let mut agent = load_managed(&state, &agent_id, &caller).await?;

    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("agent name is required".to_string()));
    }
    let privacy = req.privacy_level.unwrap_or(agent.privacy_level);
    if name != agent.name || privacy != agent.privacy_level {
        check_name(&state, &name, privacy, &caller, Some(&agent.id)).await?;
    }

    if let Some(model_id) = req.chat_model_id {
        agent.chat_model_id = Some(chat_model_for(&state, Some(model_id)).await?);
    }
    agent.name = name;
    agent.privacy_level = privacy;
    agent.personality = req.personality;
    agent.input_tools = req.input_tools;
    agent.output_modes = req.output_modes;
    agent.style_color = req.style_color;
    agent.style_icon = req.style_icon;
    agent.updated_at = Utc::now();

    state.persist.save_agent(&agent).await?;
    Ok(Json(agent_to_response(agent, &caller)))
}

/// Delete an agent the caller manages
#[utoipa::path(
    delete,
    path = "/api/agents/{agent_id}",
    params(
        ("agent_id" = String, Path, description = "Agent ID")
    ),
    responses(
        (status = 204, description = "Agent deleted"),
        (status = 403, description = "Caller does not manage the agent"),
        (status = 404, description = "Agent not found")
    ),
    tag = "agents"
)]
pub async fn delete_agent(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(agent_id): Path<String>,
) -> ApiResult<StatusCode> {
    let agent = load_managed(&state, &agent_id, &caller).await?;
    state.persist.delete_agent(&agent.id).await?;
    tracing::info!(agent = %agent.slug, user = %caller.user_id, "agent deleted");
    Ok(StatusCode::NO_CONTENT)
}
