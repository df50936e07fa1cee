use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};

use crate::error::Result;
use crate::models::Conversation;

#[derive(Clone)]
pub struct MongoConversationRepository {
    collection: Collection<Conversation>,
}

impl MongoConversationRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("conversations");
        Self { collection }
    }

    pub async fn insert(&self, conversation: &Conversation) -> Result<()> {
        self.collection.insert_one(conversation).await?;
        Ok(())
    }

    pub async fn get(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        Ok(self.collection.find_one(doc! { "id": conversation_id }).await?)
    }

    pub async fn replace(&self, conversation: &Conversation) -> Result<bool> {
        let result = self
            .collection
            .replace_one(doc! { "id": &conversation.id }, conversation)
            .await?;
        Ok(result.matched_count > 0)
    }

    pub async fn list(&self, user_id: &str, limit: Option<i64>, skip: Option<i64>) -> Result<Vec<Conversation>> {
        let mut find = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "updated_at": -1 });
        if let Some(limit) = limit {
            find = find.limit(limit);
        }
        if let Some(skip) = skip {
            find = find.skip(skip.max(0) as u64);
        }
        Ok(find.await?.try_collect().await?)
    }

    pub async fn delete(&self, conversation_id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "id": conversation_id }).await?;
        Ok(result.deleted_count > 0)
    }
}
