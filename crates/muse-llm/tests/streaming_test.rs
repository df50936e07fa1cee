use futures::StreamExt;
use muse_llm::{ChatClient, ChatRequest, Message, OpenAIClient, ProviderError, StreamEvent};

fn sse_body(chunks: &[&str]) -> String {
    let mut body = String::new();
    for chunk in chunks {
        body.push_str(&format!(
            "data: {{\"id\":\"c1\",\"model\":\"m\",\"choices\":[{{\"index\":0,\"delta\":{{\"content\":\"{}\"}},\"finish_reason\":null}}]}}\n\n",
            chunk
        ));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

#[test]
fn test_stream_event_serialization_message() {
    let event = StreamEvent::Message {
        content: "Test".to_string(),
    };

    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("\"type\":\"message\""));
    assert!(json.contains("Test"));
}

#[test]
fn test_stream_event_done_omits_empty_reason() {
    let event = StreamEvent::Done { finish_reason: None };
    let json = serde_json::to_string(&event).unwrap();
    assert_eq!(json, r#"{"type":"done"}"#);
}

#[tokio::test]
async fn test_chat_stream_yields_fragments_in_order() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(sse_body(&["Hel", "lo", "!"]))
        .create_async()
        .await;

    let client = OpenAIClient::with_base_url("test-key", server.url()).unwrap();
    let request = ChatRequest::new("gpt-4o-mini", vec![Message::human("Hello")]);
    let mut stream = client.chat_stream(request).await.unwrap();

    let mut fragments = Vec::new();
    let mut saw_done = false;
    while let Some(event) = stream.next().await {
        match event.unwrap() {
            StreamEvent::Message { content } => fragments.push(content),
            StreamEvent::Done { .. } => saw_done = true,
        }
    }

    mock.assert_async().await;
    assert_eq!(fragments, vec!["Hel", "lo", "!"]);
    assert!(saw_done);
}

#[tokio::test]
async fn test_chat_stream_surfaces_provider_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body(r#"{"error":{"message":"Resource has been exhausted (e.g. check quota)."}}"#)
        .create_async()
        .await;

    let client = OpenAIClient::with_base_url("test-key", server.url()).unwrap();
    let request = ChatRequest::new("gemini-2.0-flash", vec![Message::human("Hello")]);

    let err = match client.chat_stream(request).await {
        Ok(_) => panic!("Expected provider error"),
        Err(e) => e,
    };
    let provider = err.downcast_ref::<ProviderError>().expect("typed provider error");
    assert_eq!(provider.status, 429);
    assert!(provider.is_rate_limited());
    assert!(!provider.is_not_found());
}
