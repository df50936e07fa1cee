use serde::{Deserialize, Serialize};

/// What the response relay delivers to the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayEvent {
    /// Reply text fragment, forwarded as soon as it arrives
    Chunk { text: String },

    /// Generation failed; the message is user-visible
    Error { message: String },

    /// Exchange finished and persisted
    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        turn_id: Option<String>,
    },
}
