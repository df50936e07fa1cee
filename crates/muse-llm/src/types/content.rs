use serde::{Deserialize, Serialize};

/// Text carried by a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Content(String);

impl Content {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
