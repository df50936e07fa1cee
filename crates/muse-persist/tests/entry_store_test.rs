use std::sync::Arc;

use muse_persist::{
    hash_content, EntryFilter, EntryStore, InMemoryPersistenceClient, IndexOutcome, PersistenceClient,
};
use muse_types::{Entry, FileObject};

fn store() -> (EntryStore, Arc<InMemoryPersistenceClient>) {
    let client = Arc::new(InMemoryPersistenceClient::new());
    (EntryStore::new(client.clone()), client)
}

#[tokio::test]
async fn test_put_assigns_hash_and_allows_duplicates() {
    let (store, _) = store();
    let first = store
        .put(Entry::new(Some("alice".to_string()), "monthly budget", "markdown"))
        .await
        .unwrap();
    let second = store
        .put(Entry::new(Some("alice".to_string()), "monthly budget", "markdown"))
        .await
        .unwrap();

    assert_eq!(first.hashed_value, hash_content("monthly budget"));
    assert_eq!(first.hashed_value, second.hashed_value);
    assert_ne!(first.id, second.id);

    let found = store.find(&EntryFilter::for_user("alice"), None).await.unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn test_find_scopes_by_user_and_limit() {
    let (store, _) = store();
    for i in 0..3 {
        store
            .put(Entry::new(Some("alice".to_string()), format!("note {}", i), "org"))
            .await
            .unwrap();
    }
    store
        .put(Entry::new(Some("bob".to_string()), "bob note", "org"))
        .await
        .unwrap();

    let limited = store.find(&EntryFilter::for_user("alice"), Some(2)).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert!(limited.iter().all(|e| e.user_id.as_deref() == Some("alice")));

    let markdown = store
        .find(&EntryFilter::for_user("alice").file_type("markdown"), None)
        .await
        .unwrap();
    assert!(markdown.is_empty());
}

#[tokio::test]
async fn test_delete_removes_parent_file_objects() {
    let (store, client) = store();
    let parent = FileObject::new(Some("alice".to_string()), "plan.md", "plan text");
    client.insert_file_object(parent.clone()).await.unwrap();

    let mut entry = Entry::new(Some("alice".to_string()), "plan text", "markdown").with_file_name("plan.md");
    entry.file_object_id = Some(parent.id.clone());
    store.put(entry).await.unwrap();
    store
        .put(Entry::new(Some("alice".to_string()), "keep me", "markdown").with_file_name("other.md"))
        .await
        .unwrap();

    let summary = store
        .delete(&EntryFilter::for_user("alice").file_name("plan.md"))
        .await
        .unwrap();

    assert_eq!(summary.entries, 1);
    assert_eq!(summary.file_objects, 1);
    assert!(client.get_file_object(&parent.id).await.unwrap().is_none());
    assert_eq!(store.find(&EntryFilter::for_user("alice"), None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_index_text_chunks_file() {
    let (store, client) = store();
    let text = "a".repeat(2100);

    let outcome = store.index_text("alice", "journal.md", &text).await.unwrap();

    let IndexOutcome::Indexed { file_object_id, entries } = outcome else {
        panic!("Expected file to be indexed");
    };
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].heading.as_deref(), Some("journal.md - Chunk 1"));
    assert!(entries.iter().all(|e| e.file_type == "markdown"));
    assert!(entries.iter().all(|e| e.file_object_id.as_deref() == Some(file_object_id.as_str())));
    assert!(client.get_file_object(&file_object_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_index_text_skips_unsupported() {
    let (store, _) = store();
    let outcome = store.index_text("alice", "scan.pdf", "binary").await.unwrap();
    assert_eq!(outcome, IndexOutcome::Unsupported { file_name: "scan.pdf".to_string() });
}
