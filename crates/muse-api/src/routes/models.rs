use axum::{extract::State, Json};
use muse_types::ChatModel;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Chat model as shown to clients; credentials stay server-side
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatModelResponse {
    pub id: String,
    pub name: String,
    pub model_type: String,
    pub price_tier: String,
    pub vision_enabled: bool,
    pub description: Option<String>,
}

impl From<ChatModel> for ChatModelResponse {
    fn from(model: ChatModel) -> Self {
        Self {
            model_type: format!("{:?}", model.model_type).to_lowercase(),
            id: model.id,
            name: model.name,
            price_tier: model.price_tier,
            vision_enabled: model.vision_enabled,
            description: model.description,
        }
    }
}

/// List available chat models
#[utoipa::path(
    get,
    path = "/api/chat/models",
    responses(
        (status = 200, description = "Chat models", body = [ChatModelResponse])
    ),
    tag = "models"
)]
pub async fn list_models(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ChatModelResponse>>> {
    let models = state.persist.list_chat_models().await?;
    Ok(Json(models.into_iter().map(ChatModelResponse::from).collect()))
}

/// The model used when an agent names none
#[utoipa::path(
    get,
    path = "/api/chat/default-model",
    responses(
        (status = 200, description = "Default chat model", body = ChatModelResponse),
        (status = 404, description = "No chat model configured")
    ),
    tag = "models"
)]
pub async fn default_model(State(state): State<Arc<AppState>>) -> ApiResult<Json<ChatModelResponse>> {
    let model = state
        .models
        .default_model()
        .await?
        .ok_or_else(|| ApiError::NotFound("Default chat model".to_string()))?;
    Ok(Json(model.into()))
}
