use thiserror::Error;

/// Non-success HTTP answer from a generation provider.
///
/// Returned inside `anyhow::Error` so callers can `downcast_ref` it and
/// classify the failure by status.
#[derive(Debug, Clone, Error)]
#[error("Provider API error ({status}): {body}")]
pub struct ProviderError {
    pub status: u16,
    pub body: String,
}

impl ProviderError {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429 || self.body.to_lowercase().contains("quota")
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}
