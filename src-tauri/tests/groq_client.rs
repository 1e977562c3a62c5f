//! Groq client against a local mock server.

use image::RgbaImage;
use mockito::Matcher;
use snaplens_lib::capture::CapturedImage;
use snaplens_lib::config::InferenceConfig;
use snaplens_lib::error::TransportError;
use snaplens_lib::llm::{GroqClient, InferenceClient, InferenceRequest};
use std::io::Write;
use std::sync::Arc;

fn client(base: &str, key: Option<&str>) -> GroqClient {
    GroqClient::new(InferenceConfig {
        api_base: format!("{}/openai/v1", base),
        api_key: key.map(str::to_string),
        model: "llama-3.2-90b-vision-preview".to_string(),
        max_tokens: 64,
        ..InferenceConfig::default()
    })
    .unwrap()
}

fn request() -> InferenceRequest {
    let image = CapturedImage::encode(RgbaImage::new(2, 2)).unwrap();
    InferenceRequest::new(Arc::new(image), "Summarize this")
}

fn sse(chunks: &[&str]) -> String {
    let mut body = String::new();
    for c in chunks {
        body.push_str("data: ");
        body.push_str(c);
        body.push_str("\n\n");
    }
    body.push_str("data: [DONE]\n\n");
    body
}

async fn collect(client: &GroqClient) -> (Result<(), TransportError>, Vec<String>) {
    let mut fragments = Vec::new();
    let result = client
        .stream(&request(), &mut |text: String| fragments.push(text))
        .await;
    (result, fragments)
}

#[tokio::test]
async fn streams_fragments_in_order() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/openai/v1/chat/completions")
        .match_header("authorization", "Bearer gsk_test")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#""stream":true"#.to_string()),
            Matcher::Regex(r#""max_tokens":64"#.to_string()),
            Matcher::Regex(r#""type":"image_url""#.to_string()),
            Matcher::Regex("data:image/png;base64,".to_string()),
            Matcher::Regex("Summarize this".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(sse(&[
            r#"{"choices":[{"delta":{"role":"assistant"}}]}"#,
            r#"{"choices":[{"delta":{"content":"The "}}]}"#,
            r#"{"choices":[{"delta":{"content":""}}]}"#,
            r#"{"choices":[{"delta":{"content":"chart shows"}}]}"#,
            r#"{"choices":[{"delta":{"content":" growth."},"finish_reason":"stop"}],"x_groq":{"usage":{"prompt_tokens":900,"completion_tokens":4}}}"#,
        ]))
        .create_async()
        .await;

    let (result, fragments) = collect(&client(&server.url(), Some("gsk_test"))).await;

    result.unwrap();
    assert_eq!(fragments, vec!["The ", "chart shows", " growth."]);
    mock.assert_async().await;
}

#[tokio::test]
async fn malformed_chunk_is_skipped() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/openai/v1/chat/completions")
        .with_status(200)
        .with_body(sse(&[
            r#"{"choices":[{"delta":{"content":"a"}}]}"#,
            r#"{not json"#,
            r#"{"choices":[{"delta":{"content":"b"}}]}"#,
        ]))
        .create_async()
        .await;

    let (result, fragments) = collect(&client(&server.url(), Some("k"))).await;

    result.unwrap();
    assert_eq!(fragments, vec!["a", "b"]);
}

#[tokio::test]
async fn http_error_status_is_reported() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/openai/v1/chat/completions")
        .with_status(401)
        .with_body(r#"{"error":{"message":"Invalid API Key"}}"#)
        .create_async()
        .await;

    let (result, fragments) = collect(&client(&server.url(), Some("bad"))).await;

    match result {
        Err(TransportError::Status { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API Key"));
        }
        other => panic!("expected Status error, got {:?}", other),
    }
    assert!(fragments.is_empty());
}

#[tokio::test]
async fn error_event_mid_stream_fails_the_stream() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/openai/v1/chat/completions")
        .with_status(200)
        .with_body(sse(&[
            r#"{"choices":[{"delta":{"content":"par"}}]}"#,
            r#"{"error":{"message":"model overloaded"}}"#,
        ]))
        .create_async()
        .await;

    let (result, fragments) = collect(&client(&server.url(), Some("k"))).await;

    assert_eq!(fragments, vec!["par"]);
    match result {
        Err(TransportError::Stream(message)) => assert_eq!(message, "model overloaded"),
        other => panic!("expected Stream error, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_key_fails_without_a_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (result, _) = collect(&client(&server.url(), None)).await;

    assert!(matches!(result, Err(TransportError::MissingApiKey)));
    mock.assert_async().await;
}

#[tokio::test]
async fn saved_key_is_used_for_later_requests() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/openai/v1/chat/completions")
        .match_header("authorization", "Bearer gsk_saved")
        .with_status(200)
        .with_body(sse(&[r#"{"choices":[{"delta":{"content":"ok"}}]}"#]))
        .create_async()
        .await;

    let client = client(&server.url(), None);
    assert!(!client.has_api_key());
    client.set_api_key("gsk_saved");
    let (result, fragments) = collect(&client).await;

    result.unwrap();
    assert_eq!(fragments, vec!["ok"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn complete_returns_whole_message() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/openai/v1/chat/completions")
        .match_body(Matcher::Regex(r#""stream":false"#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"choices":[{"message":{"role":"assistant","content":"A bar chart."}}],"usage":{"prompt_tokens":812,"completion_tokens":5}}"#,
        )
        .create_async()
        .await;

    let text = client(&server.url(), Some("k"))
        .complete(&request())
        .await
        .unwrap();

    assert_eq!(text, "A bar chart.");
    mock.assert_async().await;
}

#[tokio::test]
async fn complete_without_content_is_a_decode_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/openai/v1/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[]}"#)
        .create_async()
        .await;

    let result = client(&server.url(), Some("k")).complete(&request()).await;

    assert!(matches!(result, Err(TransportError::Decode(_))));
}

#[tokio::test]
async fn stalled_stream_times_out() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/openai/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_chunked_body(|w| {
            w.write_all(b"data: {\"choices\":[{\"delta\":{\"content\":\"slow\"}}]}\n\n")?;
            std::thread::sleep(std::time::Duration::from_secs(3));
            w.write_all(b"data: [DONE]\n\n")
        })
        .create_async()
        .await;

    let client = GroqClient::new(InferenceConfig {
        api_base: format!("{}/openai/v1", server.url()),
        api_key: Some("k".to_string()),
        timeout: std::time::Duration::from_millis(300),
        ..InferenceConfig::default()
    })
    .unwrap();

    let start = std::time::Instant::now();
    let (result, _) = collect(&client).await;

    assert!(
        matches!(result, Err(TransportError::Http(_) | TransportError::Stream(_))),
        "got {:?}",
        result
    );
    assert!(start.elapsed() < std::time::Duration::from_secs(3));
}
