use async_trait::async_trait;
use mongodb::Client;
use muse_types::{Agent, ChatModel, Entry, FileObject};

use crate::dbs::mongo::repositories::{
    MongoAgentRepository, MongoChatModelRepository, MongoContentRepository,
    MongoConversationRepository, MongoEventRepository,
};
use crate::error::{PersistError, Result};
use crate::models::{ChatEvent, Conversation, EntryFilter};
use crate::trait_client::PersistenceClient;

/// MongoDB backend. Records keep their uuid `id` field; Mongo's own `_id`
/// is left to the server.
pub struct MongoPersistenceClient {
    conversation_repo: MongoConversationRepository,
    event_repo: MongoEventRepository,
    agent_repo: MongoAgentRepository,
    content_repo: MongoContentRepository,
    chat_model_repo: MongoChatModelRepository,
}

impl MongoPersistenceClient {
    /// Connect to MongoDB and create client
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        tracing::info!(database, "connected to MongoDB");

        Ok(Self {
            conversation_repo: MongoConversationRepository::new(&client, database),
            event_repo: MongoEventRepository::new(&client, database),
            agent_repo: MongoAgentRepository::new(&client, database),
            content_repo: MongoContentRepository::new(&client, database),
            chat_model_repo: MongoChatModelRepository::new(&client, database),
        })
    }
}

#[async_trait]
impl PersistenceClient for MongoPersistenceClient {
    async fn create_conversation(&self, conversation: Conversation) -> Result<Conversation> {
        self.conversation_repo.insert(&conversation).await?;
        Ok(conversation)
    }

    async fn get_conversation(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        self.conversation_repo.get(conversation_id).await
    }

    async fn update_conversation(&self, conversation: &Conversation) -> Result<bool> {
        self.conversation_repo.replace(conversation).await
    }

    async fn list_conversations(
        &self,
        user_id: &str,
        limit: Option<i64>,
        skip: Option<i64>,
    ) -> Result<Vec<Conversation>> {
        self.conversation_repo.list(user_id, limit, skip).await
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<bool> {
        self.conversation_repo.delete(conversation_id).await
    }

    async fn append_event(&self, event: ChatEvent) -> Result<ChatEvent> {
        self.event_repo.append(event).await
    }

    async fn list_events(&self, conversation_id: &str) -> Result<Vec<ChatEvent>> {
        self.event_repo.list(conversation_id).await
    }

    async fn delete_events(&self, conversation_id: &str) -> Result<u64> {
        self.event_repo.delete_all(conversation_id).await
    }

    async fn save_agent(&self, agent: &Agent) -> Result<()> {
        self.agent_repo.upsert(agent).await
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Option<Agent>> {
        self.agent_repo.get(agent_id).await
    }

    async fn get_agent_by_slug(&self, slug: &str) -> Result<Option<Agent>> {
        self.agent_repo.get_by_slug(slug).await
    }

    async fn find_agents_by_name(&self, name: &str) -> Result<Vec<Agent>> {
        self.agent_repo.find_by_name(name).await
    }

    async fn list_agents_visible_to(&self, user_id: &str) -> Result<Vec<Agent>> {
        self.agent_repo.visible_to(user_id).await
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<bool> {
        self.agent_repo.delete(agent_id).await
    }

    async fn insert_entries(&self, entries: Vec<Entry>) -> Result<()> {
        self.content_repo.insert_entries(&entries).await
    }

    async fn find_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>> {
        self.content_repo.find_entries(filter).await
    }

    async fn delete_entries(&self, filter: &EntryFilter) -> Result<u64> {
        self.content_repo.delete_entries(filter).await
    }

    async fn insert_file_object(&self, file_object: FileObject) -> Result<()> {
        self.content_repo.insert_file_object(&file_object).await
    }

    async fn get_file_object(&self, file_object_id: &str) -> Result<Option<FileObject>> {
        self.content_repo.get_file_object(file_object_id).await
    }

    async fn delete_file_objects(&self, file_object_ids: &[String]) -> Result<u64> {
        self.content_repo.delete_file_objects(file_object_ids).await
    }

    async fn save_chat_model(&self, model: &ChatModel) -> Result<()> {
        self.chat_model_repo.upsert(model).await
    }

    async fn get_chat_model(&self, model_id: &str) -> Result<Option<ChatModel>> {
        self.chat_model_repo.get(model_id).await
    }

    async fn list_chat_models(&self) -> Result<Vec<ChatModel>> {
        self.chat_model_repo.list().await
    }

    async fn get_default_chat_model_id(&self) -> Result<Option<String>> {
        self.chat_model_repo.default_model_id().await
    }

    async fn set_default_chat_model_id(&self, model_id: &str) -> Result<()> {
        self.chat_model_repo.set_default_model_id(model_id).await
    }
}
