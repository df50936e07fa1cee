#![cfg(feature = "mongodb")]

use muse_persist::{ChatEvent, MongoPersistenceClient, PersistenceClient};

async fn client() -> MongoPersistenceClient {
    let uri = std::env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    MongoPersistenceClient::connect(&uri, "muse_test").await.unwrap()
}

#[tokio::test]
#[ignore] // Requires a running MongoDB at MONGODB_URI
async fn test_concurrent_appends_get_distinct_seq() {
    let client = client().await;
    let conversation_id = uuid::Uuid::new_v4().to_string();

    let appends = (0..20).map(|i| {
        client.append_event(ChatEvent::user(conversation_id.clone(), format!("t{}", i), "hello"))
    });
    let mut seqs: Vec<i64> = futures::future::join_all(appends)
        .await
        .into_iter()
        .map(|event| event.unwrap().seq)
        .collect();
    seqs.sort_unstable();
    assert_eq!(seqs, (1..=20).collect::<Vec<_>>());

    let listed = client.list_events(&conversation_id).await.unwrap();
    assert_eq!(listed.len(), 20);

    client.delete_events(&conversation_id).await.unwrap();
    let event = client
        .append_event(ChatEvent::user(conversation_id.clone(), "t-again", "hello"))
        .await
        .unwrap();
    assert_eq!(event.seq, 1);
    client.delete_events(&conversation_id).await.unwrap();
}
