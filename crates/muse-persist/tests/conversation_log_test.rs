use std::sync::Arc;

use muse_llm::Message;
use muse_persist::{
    AssistantContext, Conversation, ConversationLog, ConversationUpdate, InMemoryPersistenceClient,
    PersistError, PersistenceClient,
};

fn log() -> (ConversationLog, Arc<InMemoryPersistenceClient>) {
    let client = Arc::new(InMemoryPersistenceClient::new());
    (ConversationLog::new(client.clone()), client)
}

async fn exchange(log: &ConversationLog, conversation_id: &str, question: &str, answer: &str) -> String {
    let turn_id = log.append_user_turn(conversation_id, question).await.unwrap();
    log.append_assistant_turn(conversation_id, &turn_id, answer, AssistantContext::default())
        .await
        .unwrap();
    turn_id
}

#[tokio::test]
async fn test_assistant_reply_pairs_with_user_turn() {
    let (log, _) = log();
    let conversation = log.create(Conversation::new("alice", None)).await.unwrap();

    let turn_id = exchange(&log, &conversation.id, "Hello", "Hi!").await;

    let turns = log.turns(&conversation.id).await.unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].turn_id, turn_id);
    assert_eq!(turns[0].user.message, "Hello");
    assert_eq!(turns[0].assistant.as_ref().map(|e| e.message.as_str()), Some("Hi!"));
}

#[tokio::test]
async fn test_unknown_turn_is_rejected() {
    let (log, client) = log();
    let conversation = log.create(Conversation::new("alice", None)).await.unwrap();

    let result = log
        .append_assistant_turn(&conversation.id, "no-such-turn", "orphan", AssistantContext::default())
        .await;

    match result {
        Err(PersistError::UnpairedTurn { turn_id, .. }) => assert_eq!(turn_id, "no-such-turn"),
        other => panic!("Expected UnpairedTurn, got {:?}", other),
    }
    assert!(client.list_events(&conversation.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_turn_cannot_be_answered_twice() {
    let (log, _) = log();
    let conversation = log.create(Conversation::new("alice", None)).await.unwrap();
    let turn_id = exchange(&log, &conversation.id, "Hello", "Hi!").await;

    let second = log
        .append_assistant_turn(&conversation.id, &turn_id, "Hi again", AssistantContext::default())
        .await;
    assert!(matches!(second, Err(PersistError::UnpairedTurn { .. })));
}

#[tokio::test]
async fn test_append_to_missing_conversation() {
    let (log, _) = log();
    let result = log.append_user_turn("missing", "Hello").await;
    assert!(matches!(result, Err(PersistError::ConversationNotFound(_))));
}

#[tokio::test]
async fn test_history_skips_dangling_user_message() {
    let (log, _) = log();
    let conversation = log.create(Conversation::new("alice", None)).await.unwrap();
    exchange(&log, &conversation.id, "q1", "a1").await;
    exchange(&log, &conversation.id, "q2", "a2").await;
    log.append_user_turn(&conversation.id, "pending").await.unwrap();

    let history = log.history_for_prompt(&conversation.id, 5).await.unwrap();

    assert_eq!(
        history,
        vec![
            Message::human("q1"),
            Message::ai("a1"),
            Message::human("q2"),
            Message::ai("a2"),
        ]
    );
}

#[tokio::test]
async fn test_history_keeps_most_recent_turns() {
    let (log, _) = log();
    let conversation = log.create(Conversation::new("alice", None)).await.unwrap();
    for i in 0..7 {
        exchange(&log, &conversation.id, &format!("q{}", i), &format!("a{}", i)).await;
    }

    let history = log.history_for_prompt(&conversation.id, 2).await.unwrap();

    assert_eq!(history.len(), 4);
    assert_eq!(history[0], Message::human("q5"));
    assert_eq!(history[3], Message::ai("a6"));
}

#[tokio::test]
async fn test_delete_cascades_to_events() {
    let (log, client) = log();
    let conversation = log.create(Conversation::new("alice", None)).await.unwrap();
    exchange(&log, &conversation.id, "q", "a").await;

    assert!(log.delete(&conversation.id).await.unwrap());
    assert!(log.get(&conversation.id).await.unwrap().is_none());
    assert!(client.list_events(&conversation.id).await.unwrap().is_empty());
    assert!(!log.delete(&conversation.id).await.unwrap());
}

#[tokio::test]
async fn test_get_owned_hides_foreign_conversation() {
    let (log, _) = log();
    let conversation = log.create(Conversation::new("alice", None)).await.unwrap();

    assert!(log.get_owned(&conversation.id, "alice").await.is_ok());
    assert!(matches!(
        log.get_owned(&conversation.id, "bob").await,
        Err(PersistError::ConversationNotFound(_))
    ));
}

#[tokio::test]
async fn test_append_refreshes_updated_at() {
    let (log, _) = log();
    let mut conversation = Conversation::new("alice", None);
    conversation.updated_at = conversation.updated_at - chrono::Duration::hours(1);
    let conversation = log.create(conversation).await.unwrap();

    log.append_user_turn(&conversation.id, "Hello").await.unwrap();

    let refreshed = log.get(&conversation.id).await.unwrap().unwrap();
    assert!(refreshed.updated_at > conversation.updated_at);
}

#[tokio::test]
async fn test_update_replaces_metadata_and_keeps_turns() {
    let (log, client) = log();
    let conversation = log.create(Conversation::new("alice", None)).await.unwrap();
    exchange(&log, &conversation.id, "Hello", "Hi!").await;

    let update = ConversationUpdate {
        title: Some("Groceries".to_string()),
        slug: Some("groceries".to_string()),
        agent_id: None,
        file_filters: vec!["notes.md".to_string()],
    };
    let updated = log.update(&conversation.id, "alice", update).await.unwrap();
    assert_eq!(updated.slug.as_deref(), Some("groceries"));
    assert!(updated.updated_at >= conversation.updated_at);

    // A missing slug keeps the current one
    let renamed = log
        .update(
            &conversation.id,
            "alice",
            ConversationUpdate {
                title: Some("Shopping".to_string()),
                ..ConversationUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.slug.as_deref(), Some("groceries"));
    assert!(renamed.file_filters.is_empty());

    let stored = client.get_conversation(&conversation.id).await.unwrap().unwrap();
    assert_eq!(stored.title.as_deref(), Some("Shopping"));
    assert_eq!(client.list_events(&conversation.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_of_foreign_conversation_is_not_found() {
    let (log, _) = log();
    let conversation = log.create(Conversation::new("alice", None)).await.unwrap();

    let err = log
        .update(&conversation.id, "bob", ConversationUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PersistError::ConversationNotFound(_)));
}
