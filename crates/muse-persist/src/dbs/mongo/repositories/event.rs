use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::ReturnDocument,
    Client, Collection,
};

use crate::error::{PersistError, Result};
use crate::models::ChatEvent;

#[derive(Clone)]
pub struct MongoEventRepository {
    collection: Collection<ChatEvent>,
    /// One `{_id: conversation_id, seq}` document per conversation
    counters: Collection<Document>,
}

impl MongoEventRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let db = client.database(db_name);
        Self {
            collection: db.collection("chat_events"),
            counters: db.collection("chat_event_counters"),
        }
    }

    /// Atomically claim the next `seq` for a conversation
    async fn next_seq(&self, conversation_id: &str) -> Result<i64> {
        let counter = self
            .counters
            .find_one_and_update(doc! { "_id": conversation_id }, doc! { "$inc": { "seq": 1_i64 } })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| PersistError::Internal(format!("no event counter for {}", conversation_id)))?;
        counter
            .get_i64("seq")
            .map_err(|e| PersistError::Internal(format!("bad event counter for {}: {}", conversation_id, e)))
    }

    pub async fn append(&self, mut event: ChatEvent) -> Result<ChatEvent> {
        event.seq = self.next_seq(&event.conversation_id).await?;
        self.collection.insert_one(&event).await?;
        Ok(event)
    }

    pub async fn list(&self, conversation_id: &str) -> Result<Vec<ChatEvent>> {
        let events = self
            .collection
            .find(doc! { "conversation_id": conversation_id })
            .sort(doc! { "seq": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(events)
    }

    pub async fn delete_all(&self, conversation_id: &str) -> Result<u64> {
        let result = self
            .collection
            .delete_many(doc! { "conversation_id": conversation_id })
            .await?;
        self.counters.delete_one(doc! { "_id": conversation_id }).await?;
        Ok(result.deleted_count)
    }
}
