//! Oracle client and normalizer tests against a mock HTTP server

use lexfind::errors::LexError;
use lexfind::normalizer::{ChatMessage, OracleClient, OracleError, QueryNormalizer, QueryOracle};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "model": "test-model"
    })
}

fn mock_client(server: &MockServer) -> OracleClient {
    OracleClient::with_config(
        "test-key",
        Some(server.uri()),
        Some(Duration::from_secs(5)),
        Some(2),
    )
}

#[tokio::test]
async fn test_chat_completion_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("hello")))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let reply = client
        .chat_completion("test-model", vec![ChatMessage::user("hi")], 0.2, 64)
        .await
        .unwrap();
    assert_eq!(reply, "hello");
}

#[tokio::test]
async fn test_chat_completion_unauthorized_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = client
        .chat_completion("test-model", vec![ChatMessage::user("hi")], 0.2, 64)
        .await
        .unwrap_err();
    assert!(matches!(err, OracleError::Unauthorized));
}

#[tokio::test]
async fn test_chat_completion_api_error_surfaces_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(serde_json::json!({"error": {"message": "upstream down"}})),
        )
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = client
        .chat_completion("test-model", vec![ChatMessage::user("hi")], 0.2, 64)
        .await
        .unwrap_err();
    match err {
        OracleError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream down");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_chat_completion_retries_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("after retry")))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let reply = client
        .chat_completion("test-model", vec![ChatMessage::user("hi")], 0.2, 64)
        .await
        .unwrap();
    assert_eq!(reply, "after retry");
}

#[tokio::test]
async fn test_chat_completion_retries_network_failure() {
    let server = MockServer::start().await;
    // First attempt stalls past the client timeout and surfaces as a
    // network error
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("too late"))
                .set_delay(Duration::from_secs(10)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("after retry")))
        .mount(&server)
        .await;

    let client = OracleClient::with_config(
        "test-key",
        Some(server.uri()),
        Some(Duration::from_millis(200)),
        Some(2),
    );
    let reply = client
        .chat_completion("test-model", vec![ChatMessage::user("hi")], 0.2, 64)
        .await
        .unwrap();
    assert_eq!(reply, "after retry");
}

#[tokio::test]
async fn test_normalizer_parses_plain_json_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            r#"{"search_terms": ["contract", "IP", "India"], "language": "en"}"#,
        )))
        .mount(&server)
        .await;

    let normalizer = QueryNormalizer::new(mock_client(&server));
    let normalized = normalizer
        .normalize("Find contracts related to intellectual property rights in India.")
        .await
        .unwrap();
    assert_eq!(normalized.search_terms, vec!["contract", "IP", "India"]);
    assert_eq!(normalized.language, "en");
}

#[tokio::test]
async fn test_normalizer_parses_fenced_json_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            "```json\n{\"search_terms\": [\"lease\"], \"language\": \"en\"}\n```",
        )))
        .mount(&server)
        .await;

    let normalizer = QueryNormalizer::new(mock_client(&server));
    let normalized = normalizer.normalize("lease agreements").await.unwrap();
    assert_eq!(normalized.search_terms, vec!["lease"]);
}

#[tokio::test]
async fn test_normalizer_surfaces_parse_error_for_prose_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            "Here are some keywords you could try: contract, IP",
        )))
        .mount(&server)
        .await;

    let normalizer = QueryNormalizer::new(mock_client(&server));
    let err = normalizer.normalize("anything").await.unwrap_err();
    assert!(matches!(err, LexError::Parse { .. }));
}

#[tokio::test]
async fn test_normalizer_surfaces_oracle_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let normalizer = QueryNormalizer::new(mock_client(&server));
    let err = normalizer.normalize("anything").await.unwrap_err();
    assert!(matches!(err, LexError::Oracle(_)));
}
