use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use muse_chat::RelayError;
use muse_persist::PersistError;
use muse_search::SearchError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::ConversationNotFound(id) => ApiError::NotFound(format!("Conversation {}", id)),
            RelayError::AgentNotFound(id) => ApiError::NotFound(format!("Agent {}", id)),
            RelayError::AgentForbidden(slug) => ApiError::Forbidden(format!("agent {} is not accessible", slug)),
            RelayError::Storage(e) => ApiError::Persist(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            ApiError::Persist(ref e) => {
                tracing::error!("Persistence error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            ApiError::Search(ref e) => {
                tracing::error!("Search error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Search error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
