//! In-process backend. Everything lives in `HashMap`s behind tokio
//! `RwLock`s and disappears with the process.

use std::collections::HashMap;

use async_trait::async_trait;
use muse_types::{Agent, ChatModel, Entry, FileObject, PrivacyLevel};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{ChatEvent, Conversation, EntryFilter};
use crate::trait_client::PersistenceClient;

#[derive(Default)]
struct EventLog {
    next_seq: i64,
    by_conversation: HashMap<String, Vec<ChatEvent>>,
}

pub struct InMemoryPersistenceClient {
    conversations: RwLock<HashMap<String, Conversation>>,
    events: RwLock<EventLog>,
    agents: RwLock<HashMap<String, Agent>>,
    entries: RwLock<Vec<Entry>>,
    file_objects: RwLock<HashMap<String, FileObject>>,
    // Insertion order is kept so listing is stable
    chat_models: RwLock<Vec<ChatModel>>,
    default_chat_model: RwLock<Option<String>>,
}

impl InMemoryPersistenceClient {
    pub fn new() -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            events: RwLock::new(EventLog::default()),
            agents: RwLock::new(HashMap::new()),
            entries: RwLock::new(Vec::new()),
            file_objects: RwLock::new(HashMap::new()),
            chat_models: RwLock::new(Vec::new()),
            default_chat_model: RwLock::new(None),
        }
    }
}

impl Default for InMemoryPersistenceClient {
    fn default() -> Self {
        Self::new()
    }
}

fn page<T>(items: Vec<T>, limit: Option<i64>, skip: Option<i64>) -> Vec<T> {
    let skip = skip.unwrap_or(0).max(0) as usize;
    let iter = items.into_iter().skip(skip);
    match limit {
        Some(limit) if limit >= 0 => iter.take(limit as usize).collect(),
        _ => iter.collect(),
    }
}

#[async_trait]
impl PersistenceClient for InMemoryPersistenceClient {
    async fn create_conversation(&self, conversation: Conversation) -> Result<Conversation> {
        let mut conversations = self.conversations.write().await;
        conversations.insert(conversation.id.clone(), conversation.clone());
        Ok(conversation)
    }

    async fn get_conversation(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        Ok(self.conversations.read().await.get(conversation_id).cloned())
    }

    async fn update_conversation(&self, conversation: &Conversation) -> Result<bool> {
        let mut conversations = self.conversations.write().await;
        match conversations.get_mut(&conversation.id) {
            Some(stored) => {
                *stored = conversation.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_conversations(
        &self,
        user_id: &str,
        limit: Option<i64>,
        skip: Option<i64>,
    ) -> Result<Vec<Conversation>> {
        let mut owned: Vec<Conversation> = self
            .conversations
            .read()
            .await
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(page(owned, limit, skip))
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<bool> {
        Ok(self.conversations.write().await.remove(conversation_id).is_some())
    }

    async fn append_event(&self, mut event: ChatEvent) -> Result<ChatEvent> {
        let mut log = self.events.write().await;
        log.next_seq += 1;
        event.seq = log.next_seq;
        log.by_conversation
            .entry(event.conversation_id.clone())
            .or_default()
            .push(event.clone());
        Ok(event)
    }

    async fn list_events(&self, conversation_id: &str) -> Result<Vec<ChatEvent>> {
        let log = self.events.read().await;
        Ok(log.by_conversation.get(conversation_id).cloned().unwrap_or_default())
    }

    async fn delete_events(&self, conversation_id: &str) -> Result<u64> {
        let mut log = self.events.write().await;
        Ok(log
            .by_conversation
            .remove(conversation_id)
            .map(|events| events.len() as u64)
            .unwrap_or(0))
    }

    async fn save_agent(&self, agent: &Agent) -> Result<()> {
        self.agents.write().await.insert(agent.id.clone(), agent.clone());
        Ok(())
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Option<Agent>> {
        Ok(self.agents.read().await.get(agent_id).cloned())
    }

    async fn get_agent_by_slug(&self, slug: &str) -> Result<Option<Agent>> {
        Ok(self.agents.read().await.values().find(|a| a.slug == slug).cloned())
    }

    async fn find_agents_by_name(&self, name: &str) -> Result<Vec<Agent>> {
        Ok(self
            .agents
            .read()
            .await
            .values()
            .filter(|a| a.name == name)
            .cloned()
            .collect())
    }

    async fn list_agents_visible_to(&self, user_id: &str) -> Result<Vec<Agent>> {
        let mut visible: Vec<Agent> = self
            .agents
            .read()
            .await
            .values()
            .filter(|a| {
                a.creator_id.as_deref() == Some(user_id)
                    || (a.privacy_level == PrivacyLevel::Public && !a.is_hidden)
            })
            .cloned()
            .collect();
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(visible)
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<bool> {
        Ok(self.agents.write().await.remove(agent_id).is_some())
    }

    async fn insert_entries(&self, entries: Vec<Entry>) -> Result<()> {
        self.entries.write().await.extend(entries);
        Ok(())
    }

    async fn find_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    async fn delete_entries(&self, filter: &EntryFilter) -> Result<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| !filter.matches(e));
        Ok((before - entries.len()) as u64)
    }

    async fn insert_file_object(&self, file_object: FileObject) -> Result<()> {
        self.file_objects
            .write()
            .await
            .insert(file_object.id.clone(), file_object);
        Ok(())
    }

    async fn get_file_object(&self, file_object_id: &str) -> Result<Option<FileObject>> {
        Ok(self.file_objects.read().await.get(file_object_id).cloned())
    }

    async fn delete_file_objects(&self, file_object_ids: &[String]) -> Result<u64> {
        let mut file_objects = self.file_objects.write().await;
        let removed = file_object_ids
            .iter()
            .filter(|id| file_objects.remove(id.as_str()).is_some())
            .count();
        Ok(removed as u64)
    }

    async fn save_chat_model(&self, model: &ChatModel) -> Result<()> {
        let mut models = self.chat_models.write().await;
        match models.iter_mut().find(|m| m.id == model.id) {
            Some(stored) => *stored = model.clone(),
            None => models.push(model.clone()),
        }
        Ok(())
    }

    async fn get_chat_model(&self, model_id: &str) -> Result<Option<ChatModel>> {
        Ok(self
            .chat_models
            .read()
            .await
            .iter()
            .find(|m| m.id == model_id)
            .cloned())
    }

    async fn list_chat_models(&self) -> Result<Vec<ChatModel>> {
        Ok(self.chat_models.read().await.clone())
    }

    async fn get_default_chat_model_id(&self) -> Result<Option<String>> {
        Ok(self.default_chat_model.read().await.clone())
    }

    async fn set_default_chat_model_id(&self, model_id: &str) -> Result<()> {
        *self.default_chat_model.write().await = Some(model_id.to_string());
        Ok(())
    }
}
