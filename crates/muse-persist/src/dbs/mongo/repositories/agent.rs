use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};
use muse_types::Agent;

use crate::error::Result;

#[derive(Clone)]
pub struct MongoAgentRepository {
    collection: Collection<Agent>,
}

impl MongoAgentRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("agents");
        Self { collection }
    }

    pub async fn upsert(&self, agent: &Agent) -> Result<()> {
        self.collection
            .replace_one(doc! { "id": &agent.id }, agent)
            .upsert(true)
            .await?;
        Ok(())
    }

    pub async fn get(&self, agent_id: &str) -> Result<Option<Agent>> {
        Ok(self.collection.find_one(doc! { "id": agent_id }).await?)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Agent>> {
        Ok(self.collection.find_one(doc! { "slug": slug }).await?)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Vec<Agent>> {
        Ok(self.collection.find(doc! { "name": name }).await?.try_collect().await?)
    }

    pub async fn visible_to(&self, user_id: &str) -> Result<Vec<Agent>> {
        let filter = doc! {
            "$or": [
                { "creator_id": user_id },
                { "privacy_level": "public", "is_hidden": false },
            ]
        };
        let agents = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(agents)
    }

    pub async fn delete(&self, agent_id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "id": agent_id }).await?;
        Ok(result.deleted_count > 0)
    }
}
