use std::sync::Arc;

use chrono::Utc;
use muse_llm::Message;

use crate::error::{PersistError, Result};
use crate::models::{AssistantContext, ChatEvent, Conversation, ConversationUpdate, Speaker, Turn};
use crate::trait_client::PersistenceClient;

/// Complete turns fed back to the model by default
pub const DEFAULT_HISTORY_TURNS: usize = 5;

/// Append-only, turn-paired message log per conversation
#[derive(Clone)]
pub struct ConversationLog {
    client: Arc<dyn PersistenceClient>,
}

impl ConversationLog {
    pub fn new(client: Arc<dyn PersistenceClient>) -> Self {
        Self { client }
    }

    pub async fn create(&self, conversation: Conversation) -> Result<Conversation> {
        let conversation = self.client.create_conversation(conversation).await?;
        tracing::info!(conversation_id = %conversation.id, user_id = %conversation.user_id, "created conversation");
        Ok(conversation)
    }

    pub async fn get(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        self.client.get_conversation(conversation_id).await
    }

    /// The conversation, if it exists and belongs to `user_id`
    pub async fn get_owned(&self, conversation_id: &str, user_id: &str) -> Result<Conversation> {
        match self.client.get_conversation(conversation_id).await? {
            Some(conversation) if conversation.user_id == user_id => Ok(conversation),
            _ => Err(PersistError::ConversationNotFound(conversation_id.to_string())),
        }
    }

    /// Replace the caller's conversation metadata. Events are not touched.
    pub async fn update(&self, conversation_id: &str, user_id: &str, update: ConversationUpdate) -> Result<Conversation> {
        let mut conversation = self.get_owned(conversation_id, user_id).await?;
        update.apply(&mut conversation);
        if !self.client.update_conversation(&conversation).await? {
            return Err(PersistError::ConversationNotFound(conversation_id.to_string()));
        }
        tracing::info!(conversation_id, "updated conversation");
        Ok(conversation)
    }

    pub async fn list(&self, user_id: &str, limit: Option<i64>, skip: Option<i64>) -> Result<Vec<Conversation>> {
        self.client.list_conversations(user_id, limit, skip).await
    }

    /// Record a user message and open a new turn for it
    pub async fn append_user_turn(&self, conversation_id: &str, text: &str) -> Result<String> {
        self.require(conversation_id).await?;
        let turn_id = uuid::Uuid::new_v4().to_string();
        self.client
            .append_event(ChatEvent::user(conversation_id, &turn_id, text))
            .await?;
        self.touch(conversation_id).await?;
        Ok(turn_id)
    }

    /// Close a turn with the assistant's reply.
    ///
    /// Fails with `UnpairedTurn` when no user event carries `turn_id` or the
    /// turn already has a reply.
    pub async fn append_assistant_turn(
        &self,
        conversation_id: &str,
        turn_id: &str,
        text: &str,
        context: AssistantContext,
    ) -> Result<ChatEvent> {
        self.require(conversation_id).await?;
        let events = self.client.list_events(conversation_id).await?;

        let has_user = events.iter().any(|e| e.by == Speaker::User && e.turn_id == turn_id);
        let answered = events.iter().any(|e| e.by == Speaker::Assistant && e.turn_id == turn_id);
        if !has_user || answered {
            return Err(PersistError::UnpairedTurn {
                conversation_id: conversation_id.to_string(),
                turn_id: turn_id.to_string(),
            });
        }

        let event = self
            .client
            .append_event(ChatEvent::assistant(conversation_id, turn_id, text, context))
            .await?;
        self.touch(conversation_id).await?;
        Ok(event)
    }

    pub async fn events(&self, conversation_id: &str) -> Result<Vec<ChatEvent>> {
        self.client.list_events(conversation_id).await
    }

    /// Events grouped into turns, in the order the user messages arrived
    pub async fn turns(&self, conversation_id: &str) -> Result<Vec<Turn>> {
        let events = self.client.list_events(conversation_id).await?;
        let mut turns: Vec<Turn> = Vec::new();

        for event in events {
            match event.by {
                Speaker::User => turns.push(Turn {
                    turn_id: event.turn_id.clone(),
                    user: event,
                    assistant: None,
                }),
                Speaker::Assistant => {
                    if let Some(turn) = turns.iter_mut().find(|t| t.turn_id == event.turn_id) {
                        turn.assistant = Some(event);
                    }
                }
            }
        }

        Ok(turns)
    }

    /// The last `max_turns` answered turns as alternating user/assistant
    /// messages, oldest first. A trailing unanswered message is skipped.
    pub async fn history_for_prompt(&self, conversation_id: &str, max_turns: usize) -> Result<Vec<Message>> {
        let complete: Vec<Turn> = self
            .turns(conversation_id)
            .await?
            .into_iter()
            .filter(Turn::is_complete)
            .collect();

        let start = complete.len().saturating_sub(max_turns);
        let mut messages = Vec::with_capacity((complete.len() - start) * 2);
        for turn in &complete[start..] {
            messages.push(Message::human(turn.user.message.clone()));
            if let Some(reply) = &turn.assistant {
                messages.push(Message::ai(reply.message.clone()));
            }
        }
        Ok(messages)
    }

    /// Remove the conversation and every event in it
    pub async fn delete(&self, conversation_id: &str) -> Result<bool> {
        let events = self.client.delete_events(conversation_id).await?;
        let existed = self.client.delete_conversation(conversation_id).await?;
        tracing::info!(conversation_id, events, existed, "deleted conversation");
        Ok(existed)
    }

    async fn require(&self, conversation_id: &str) -> Result<Conversation> {
        self.client
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| PersistError::ConversationNotFound(conversation_id.to_string()))
    }

    async fn touch(&self, conversation_id: &str) -> Result<()> {
        if let Some(mut conversation) = self.client.get_conversation(conversation_id).await? {
            conversation.updated_at = Utc::now();
            self.client.update_conversation(&conversation).await?;
        }
        Ok(())
    }
}
