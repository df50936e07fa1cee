use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where an entry's content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Computer,
    Notion,
    Github,
    Web,
}

/// One indexed content chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub user_id: Option<String>,
    pub agent_id: Option<String>,
    pub file_object_id: Option<String>,
    pub raw: String,
    pub compiled: String,
    pub heading: Option<String>,
    /// sha256 hex of `raw`; assigned by the store on insert
    #[serde(default)]
    pub hashed_value: String,
    pub corpus_id: String,
    #[serde(default)]
    pub file_source: SourceType,
    pub file_type: String,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    pub fn new(user_id: Option<String>, raw: impl Into<String>, file_type: impl Into<String>) -> Self {
        let raw = raw.into();
        let now = Utc::now();
        Self {
            id: crate::new_id(),
            user_id,
            agent_id: None,
            file_object_id: None,
            compiled: raw.clone(),
            raw,
            heading: None,
            hashed_value: String::new(),
            corpus_id: crate::new_id(),
            file_source: SourceType::default(),
            file_type: file_type.into(),
            file_path: None,
            file_name: None,
            url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        self.file_path = Some(file_name.clone());
        self.file_name = Some(file_name);
        self
    }

    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }
}

/// Parent record of the entries produced from one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileObject {
    pub id: String,
    pub user_id: Option<String>,
    pub agent_id: Option<String>,
    pub file_name: String,
    pub raw_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileObject {
    pub fn new(user_id: Option<String>, file_name: impl Into<String>, raw_text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: crate::new_id(),
            user_id,
            agent_id: None,
            file_name: file_name.into(),
            raw_text: raw_text.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
