use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use muse_types::Caller;
use std::sync::Arc;

use crate::{error::ApiError, state::AppState};

pub const USER_HEADER: &str = "x-user-id";

/// Identity of the requesting user.
///
/// Taken from the `x-user-id` header; requests without it act as the
/// configured default user. Superusers are listed in `auth.superusers`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Caller);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let auth = &state.config.auth;
        let user_id = match parts.headers.get(USER_HEADER) {
            Some(value) => value
                .to_str()
                .map_err(|_| ApiError::BadRequest(format!("{} header is not valid text", USER_HEADER)))?
                .trim()
                .to_string(),
            None => String::new(),
        };
        let user_id = if user_id.is_empty() {
            auth.default_user.clone()
        } else {
            user_id
        };

        let caller = if auth.is_superuser(&user_id) {
            Caller::superuser(user_id)
        } else {
            Caller::new(user_id)
        };
        Ok(CurrentUser(caller))
    }
}
