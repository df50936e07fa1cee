use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    Client, Collection,
};
use muse_types::ChatModel;

use crate::error::Result;

const DEFAULT_MODEL_KEY: &str = "chat_default";

#[derive(Clone)]
pub struct MongoChatModelRepository {
    models: Collection<ChatModel>,
    settings: Collection<Document>,
}

impl MongoChatModelRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let database = client.database(db_name);
        Self {
            models: database.collection("chat_models"),
            settings: database.collection("server_settings"),
        }
    }

    pub async fn upsert(&self, model: &ChatModel) -> Result<()> {
        self.models
            .replace_one(doc! { "id": &model.id }, model)
            .upsert(true)
            .await?;
        Ok(())
    }

    pub async fn get(&self, model_id: &str) -> Result<Option<ChatModel>> {
        Ok(self.models.find_one(doc! { "id": model_id }).await?)
    }

    pub async fn list(&self) -> Result<Vec<ChatModel>> {
        Ok(self.models.find(doc! {}).await?.try_collect().await?)
    }

    pub async fn default_model_id(&self) -> Result<Option<String>> {
        let setting = self.settings.find_one(doc! { "key": DEFAULT_MODEL_KEY }).await?;
        Ok(setting.and_then(|d| d.get_str("value").ok().map(str::to_string)))
    }

    pub async fn set_default_model_id(&self, model_id: &str) -> Result<()> {
        self.settings
            .update_one(
                doc! { "key": DEFAULT_MODEL_KEY },
                doc! { "$set": { "value": model_id } },
            )
            .upsert(true)
            .await?;
        Ok(())
    }
}
