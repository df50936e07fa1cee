use std::sync::Arc;

use muse_types::{Entry, FileObject, SourceType};
use sha2::{Digest, Sha256};

use crate::error::{PersistError, Result};
use crate::models::EntryFilter;
use crate::trait_client::PersistenceClient;

/// Characters per indexed chunk
pub const CHUNK_SIZE: usize = 1000;

/// sha256 of the text, lowercase hex
pub fn hash_content(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteSummary {
    pub entries: u64,
    pub file_objects: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexOutcome {
    Indexed { file_object_id: String, entries: Vec<Entry> },
    /// Extension the indexer has no reader for
    Unsupported { file_name: String },
}

/// Content entries owned by users and agents
#[derive(Clone)]
pub struct EntryStore {
    client: Arc<dyn PersistenceClient>,
}

impl EntryStore {
    pub fn new(client: Arc<dyn PersistenceClient>) -> Self {
        Self { client }
    }

    /// Store an entry. The hash is always recomputed from `raw`; identical
    /// content stored twice yields two entries.
    pub async fn put(&self, entry: Entry) -> Result<Entry> {
        self.put_many(vec![entry])
            .await?
            .pop()
            .ok_or_else(|| PersistError::Internal("entry was not stored".to_string()))
    }

    pub async fn put_many(&self, mut entries: Vec<Entry>) -> Result<Vec<Entry>> {
        for entry in entries.iter_mut() {
            entry.hashed_value = hash_content(&entry.raw);
            entry.file_type = entry.file_type.to_lowercase();
        }
        self.client.insert_entries(entries.clone()).await?;
        tracing::debug!(count = entries.len(), "stored entries");
        Ok(entries)
    }

    /// Entries matching the filter, at most `limit` of them
    pub async fn find(&self, filter: &EntryFilter, limit: Option<usize>) -> Result<Vec<Entry>> {
        let mut entries = self.client.find_entries(filter).await?;
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    /// Delete matching entries together with the file objects they came from.
    ///
    /// Parent ids are collected before the entries go, since afterwards
    /// nothing links to them.
    pub async fn delete(&self, filter: &EntryFilter) -> Result<DeleteSummary> {
        let matched = self.client.find_entries(filter).await?;
        let mut parents: Vec<String> = matched
            .iter()
            .filter_map(|e| e.file_object_id.clone())
            .collect();
        parents.sort();
        parents.dedup();

        let entries = self.client.delete_entries(filter).await?;
        let file_objects = self.client.delete_file_objects(&parents).await?;

        tracing::info!(entries, file_objects, "deleted content");
        Ok(DeleteSummary { entries, file_objects })
    }

    /// Split a text file into fixed-size chunks and store each as an entry
    /// under a new file object.
    pub async fn index_text(&self, user_id: &str, file_name: &str, text: &str) -> Result<IndexOutcome> {
        let Some(file_type) = file_type_for(file_name) else {
            tracing::warn!(file_name, "skipping unsupported file type");
            return Ok(IndexOutcome::Unsupported { file_name: file_name.to_string() });
        };

        let file_object = FileObject::new(Some(user_id.to_string()), file_name, text);
        let file_object_id = file_object.id.clone();
        self.client.insert_file_object(file_object).await?;

        let entries: Vec<Entry> = chunk_text(text, CHUNK_SIZE)
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| {
                let mut entry = Entry::new(Some(user_id.to_string()), chunk, file_type)
                    .with_file_name(file_name)
                    .with_heading(format!("{} - Chunk {}", file_name, i + 1));
                entry.file_object_id = Some(file_object_id.clone());
                entry.file_source = SourceType::Computer;
                entry
            })
            .collect();

        let entries = self.put_many(entries).await?;
        tracing::info!(file_name, chunks = entries.len(), "indexed file");
        Ok(IndexOutcome::Indexed { file_object_id, entries })
    }
}

fn file_type_for(file_name: &str) -> Option<&'static str> {
    let extension = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "txt" => Some("plaintext"),
        "md" | "markdown" => Some("markdown"),
        "org" => Some("org"),
        _ => None,
    }
}

fn chunk_text(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(hash_content("budget"), hash_content("budget"));
        assert_ne!(hash_content("budget"), hash_content("budgets"));
        assert_eq!(hash_content("").len(), 64);
    }

    #[test]
    fn test_chunking_respects_char_boundaries() {
        let text = "é".repeat(2500);
        let chunks = chunk_text(&text, CHUNK_SIZE);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 1000);
        assert_eq!(chunks[2].chars().count(), 500);
        assert!(chunk_text("", CHUNK_SIZE).is_empty());
    }

    #[test]
    fn test_file_type_from_extension() {
        assert_eq!(file_type_for("notes.md"), Some("markdown"));
        assert_eq!(file_type_for("todo.ORG"), Some("org"));
        assert_eq!(file_type_for("a.txt"), Some("plaintext"));
        assert_eq!(file_type_for("scan.pdf"), None);
        assert_eq!(file_type_for("README"), None);
    }
}
