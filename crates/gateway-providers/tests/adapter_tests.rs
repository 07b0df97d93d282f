//! Provider adapter tests against mock upstream servers.

use gateway_core::{ConversionProvider, ErrorKind};
use gateway_providers::{
    AnthropicConfig, AnthropicProvider, GoogleConfig, GoogleProvider, OpenAIConfig,
    OpenAIProvider, PromptTemplates,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn prompts() -> Arc<PromptTemplates> {
    Arc::new(PromptTemplates::default())
}

fn claude(server: &MockServer) -> AnthropicProvider {
    let config =
        AnthropicConfig::new("sk-ant-test").with_base_url(format!("{}/v1/messages", server.uri()));
    AnthropicProvider::new(config, prompts()).unwrap()
}

fn gemini(server: &MockServer) -> GoogleProvider {
    let config = GoogleConfig::new("g-test").with_base_url(format!("{}/v1beta", server.uri()));
    GoogleProvider::new(config, prompts()).unwrap()
}

fn openai(server: &MockServer) -> OpenAIProvider {
    let config = OpenAIConfig::new("sk-test")
        .with_base_url(format!("{}/v1/chat/completions", server.uri()));
    OpenAIProvider::new(config, prompts()).unwrap()
}

fn error_body(message: &str) -> Value {
    json!({"error": {"message": message, "type": "error"}})
}

/// An address nothing is listening on
fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

mod claude_tests {
    use super::*;

    #[tokio::test]
    async fn test_success_sends_headers_and_system_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(json!({"max_tokens": 1500})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_1",
                "type": "message",
                "model": "claude-3-5-sonnet-20241022",
                "content": [{"type": "text", "text": "We regret the delay."}],
                "stop_reason": "end_turn"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = claude(&server)
            .invoke("Sorry it's late.", "formal")
            .await
            .unwrap();

        assert_eq!(result.text, "We regret the delay.");
        assert_eq!(result.model_identifier, "claude-3-5-sonnet-20241022");
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = [
            (400, ErrorKind::UpstreamBadRequest, false),
            (401, ErrorKind::UpstreamUnauthorized, false),
            (403, ErrorKind::UpstreamForbidden, false),
            (429, ErrorKind::UpstreamRateLimited, true),
            (500, ErrorKind::UpstreamServerError, true),
            (529, ErrorKind::UpstreamServerError, true),
            (418, ErrorKind::Unknown, false),
        ];

        for (status, kind, retryable) in cases {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(
                    ResponseTemplate::new(status).set_body_json(error_body("upstream said no")),
                )
                .mount(&server)
                .await;

            let err = claude(&server).invoke("text", "casual").await.unwrap_err();
            assert_eq!(err.kind, kind, "status {status}");
            assert_eq!(err.retryable, retryable, "status {status}");
            assert_eq!(err.detail.as_deref(), Some("upstream said no"));
            assert!(!err.message.contains("upstream said no"));
            assert_eq!(err.provider.as_deref(), Some("claude"));
        }
    }

    #[tokio::test]
    async fn test_refusal_is_content_filtered() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [],
                "stop_reason": "refusal"
            })))
            .mount(&server)
            .await;

        let err = claude(&server).invoke("text", "casual").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpstreamContentFiltered);
        assert_eq!(err.http_status, 400);
    }

    #[tokio::test]
    async fn test_invalid_json_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = claude(&server).invoke("text", "casual").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedUpstreamResponse);
        assert!(err.retryable);
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"content": [{"type": "text", "text": "late"}]}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = AnthropicConfig::new("sk-ant-test")
            .with_base_url(format!("{}/v1/messages", server.uri()))
            .with_timeout(Duration::from_millis(200));
        let provider = AnthropicProvider::new(config, prompts()).unwrap();

        let err = provider.invoke("text", "casual").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert_eq!(err.http_status, 504);
        assert!(err.retryable);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let config = AnthropicConfig::new("sk-ant-test")
            .with_base_url(format!("{}/v1/messages", refused_url()));
        let provider = AnthropicProvider::new(config, prompts()).unwrap();

        let err = provider.invoke("text", "casual").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NetworkUnreachable);
        assert!(err.retryable);
    }
}

mod gemini_tests {
    use super::*;

    #[tokio::test]
    async fn test_success_passes_key_as_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemma-2-27b-it:generateContent"))
            .and(query_param("key", "g-test"))
            .and(body_partial_json(json!({
                "generationConfig": {"topK": 40, "maxOutputTokens": 8192}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Summary."}]},
                    "finishReason": "STOP"
                }],
                "modelVersion": "gemma-2-27b-it"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = gemini(&server).invoke("Long text", "summary").await.unwrap();
        assert_eq!(result.text, "Summary.");
        assert_eq!(result.model_identifier, "gemma-2-27b-it");
    }

    #[tokio::test]
    async fn test_safety_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"finishReason": "SAFETY", "safetyRatings": []}]
            })))
            .mount(&server)
            .await;

        let err = gemini(&server).invoke("text", "casual").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpstreamContentFiltered);
        assert!(!err.retryable);
    }

    #[tokio::test]
    async fn test_bad_key_is_bad_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&server)
            .await;

        let err = gemini(&server).invoke("text", "casual").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpstreamBadRequest);
        assert_eq!(err.detail.as_deref(), Some("API key not valid."));
    }

    #[tokio::test]
    async fn test_server_error_with_html_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("<html>unavailable</html>"))
            .mount(&server)
            .await;

        let err = gemini(&server).invoke("text", "casual").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpstreamServerError);
        assert_eq!(err.http_status, 502);
    }

    const QUERY_KEY: &str = "g-query-secret-123";

    fn assert_key_hidden(err: &gateway_core::ClassifiedError) {
        let detail = err.detail.as_deref().unwrap_or_default();
        assert!(!detail.contains(QUERY_KEY), "detail exposes key: {detail}");
        assert!(!detail.contains("key="), "detail exposes query: {detail}");
        assert!(!err.message.contains(QUERY_KEY));
    }

    #[tokio::test]
    async fn test_connection_refused_hides_query_key() {
        let config =
            GoogleConfig::new(QUERY_KEY).with_base_url(format!("{}/v1beta", refused_url()));
        let provider = GoogleProvider::new(config, prompts()).unwrap();

        let err = provider.invoke("text", "casual").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NetworkUnreachable);
        assert!(err.detail.is_some());
        assert_key_hidden(&err);
    }

    #[tokio::test]
    async fn test_timeout_hides_query_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"candidates": []}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = GoogleConfig::new(QUERY_KEY)
            .with_base_url(format!("{}/v1beta", server.uri()))
            .with_timeout(Duration::from_millis(200));
        let provider = GoogleProvider::new(config, prompts()).unwrap();

        let err = provider.invoke("text", "casual").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert_key_hidden(&err);
    }
}

mod openai_tests {
    use super::*;

    #[tokio::test]
    async fn test_success_uses_bearer_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "gpt-4o", "max_tokens": 1500})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "model": "gpt-4o-2024-08-06",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "- item one\n- item two"},
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = openai(&server)
            .invoke("item one and item two", "bullet-list")
            .await
            .unwrap();
        assert_eq!(result.text, "- item one\n- item two");
        assert_eq!(result.model_identifier, "gpt-4o-2024-08-06");
    }

    #[tokio::test]
    async fn test_content_filter() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": null}, "finish_reason": "content_filter"}]
            })))
            .mount(&server)
            .await;

        let err = openai(&server).invoke("text", "casual").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpstreamContentFiltered);
    }

    #[tokio::test]
    async fn test_quota_exhausted_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "You exceeded your current quota", "type": "insufficient_quota"}
            })))
            .mount(&server)
            .await;

        let err = openai(&server).invoke("text", "casual").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpstreamRateLimited);
        assert_eq!(err.http_status, 503);
        assert!(err.retryable);
    }

    #[tokio::test]
    async fn test_missing_choices_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"object": "chat.completion"})))
            .mount(&server)
            .await;

        let err = openai(&server).invoke("text", "casual").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedUpstreamResponse);
    }
}
