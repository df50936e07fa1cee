use async_trait::async_trait;
use muse_types::{Agent, ChatModel, Entry, FileObject};

use crate::error::Result;
use crate::models::{ChatEvent, Conversation, EntryFilter};

/// Trait for database persistence operations
///
/// Implementations provide backend-specific storage. Higher-level rules
/// (turn pairing, orphan cleanup, hashing) live in `ConversationLog` and
/// `EntryStore`.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    // Conversations

    async fn create_conversation(&self, conversation: Conversation) -> Result<Conversation>;

    async fn get_conversation(&self, conversation_id: &str) -> Result<Option<Conversation>>;

    /// Replace a stored conversation; `false` when it does not exist
    async fn update_conversation(&self, conversation: &Conversation) -> Result<bool>;

    /// Most recently updated first
    async fn list_conversations(
        &self,
        user_id: &str,
        limit: Option<i64>,
        skip: Option<i64>,
    ) -> Result<Vec<Conversation>>;

    async fn delete_conversation(&self, conversation_id: &str) -> Result<bool>;

    // Chat events

    /// Append an event, assigning its `seq`
    async fn append_event(&self, event: ChatEvent) -> Result<ChatEvent>;

    /// All events of a conversation in insertion order
    async fn list_events(&self, conversation_id: &str) -> Result<Vec<ChatEvent>>;

    async fn delete_events(&self, conversation_id: &str) -> Result<u64>;

    // Agents

    /// Insert or replace by id
    async fn save_agent(&self, agent: &Agent) -> Result<()>;

    async fn get_agent(&self, agent_id: &str) -> Result<Option<Agent>>;

    async fn get_agent_by_slug(&self, slug: &str) -> Result<Option<Agent>>;

    async fn find_agents_by_name(&self, name: &str) -> Result<Vec<Agent>>;

    /// Agents created by the user plus public, non-hidden ones
    async fn list_agents_visible_to(&self, user_id: &str) -> Result<Vec<Agent>>;

    async fn delete_agent(&self, agent_id: &str) -> Result<bool>;

    // Content

    async fn insert_entries(&self, entries: Vec<Entry>) -> Result<()>;

    async fn find_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>>;

    async fn delete_entries(&self, filter: &EntryFilter) -> Result<u64>;

    async fn insert_file_object(&self, file_object: FileObject) -> Result<()>;

    async fn get_file_object(&self, file_object_id: &str) -> Result<Option<FileObject>>;

    async fn delete_file_objects(&self, file_object_ids: &[String]) -> Result<u64>;

    // Chat models

    async fn save_chat_model(&self, model: &ChatModel) -> Result<()>;

    async fn get_chat_model(&self, model_id: &str) -> Result<Option<ChatModel>>;

    async fn list_chat_models(&self) -> Result<Vec<ChatModel>>;

    /// Server-wide default chat model id
    async fn get_default_chat_model_id(&self) -> Result<Option<String>>;

    async fn set_default_chat_model_id(&self, model_id: &str) -> Result<()>;
}
