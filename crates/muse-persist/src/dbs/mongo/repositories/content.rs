use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    Client, Collection,
};
use muse_types::{Entry, FileObject};

use crate::error::Result;
use crate::models::{EntryFilter, EntryOwner};

/// Entries and their parent file objects
#[derive(Clone)]
pub struct MongoContentRepository {
    entries: Collection<Entry>,
    file_objects: Collection<FileObject>,
}

fn entry_filter_doc(filter: &EntryFilter) -> Document {
    let owners: Vec<Document> = filter
        .owners
        .iter()
        .map(|owner| match owner {
            EntryOwner::User(id) => doc! { "user_id": id },
            EntryOwner::Agent(id) => doc! { "agent_id": id },
        })
        .collect();

    if owners.is_empty() {
        return doc! { "id": { "$in": Vec::<String>::new() } };
    }

    let mut query = doc! { "$or": owners };
    if !filter.file_types.is_empty() {
        let types: Vec<String> = filter.file_types.iter().map(|t| t.to_lowercase()).collect();
        query.insert("file_type", doc! { "$in": types });
    }
    if let Some(name) = &filter.file_name {
        query.insert("file_name", name.clone());
    }
    query
}

impl MongoContentRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let database = client.database(db_name);
        Self {
            entries: database.collection("entries"),
            file_objects: database.collection("file_objects"),
        }
    }

    pub async fn insert_entries(&self, entries: &[Entry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        self.entries.insert_many(entries).await?;
        Ok(())
    }

    pub async fn find_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>> {
        let entries = self
            .entries
            .find(entry_filter_doc(filter))
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(entries)
    }

    pub async fn delete_entries(&self, filter: &EntryFilter) -> Result<u64> {
        let result = self.entries.delete_many(entry_filter_doc(filter)).await?;
        Ok(result.deleted_count)
    }

    pub async fn insert_file_object(&self, file_object: &FileObject) -> Result<()> {
        self.file_objects.insert_one(file_object).await?;
        Ok(())
    }

    pub async fn get_file_object(&self, file_object_id: &str) -> Result<Option<FileObject>> {
        Ok(self.file_objects.find_one(doc! { "id": file_object_id }).await?)
    }

    pub async fn delete_file_objects(&self, ids: &[String]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = self
            .file_objects
            .delete_many(doc! { "id": { "$in": ids.to_vec() } })
            .await?;
        Ok(result.deleted_count)
    }
}
