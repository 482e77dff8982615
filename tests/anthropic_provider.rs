//! Anthropic provider (rig-backed) against a local stand-in for the Messages endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use story_wizard::error::LlmError;
use story_wizard::llm::{CompletionRequest, LlmBackend, LlmConfig, LlmProvider, create_provider};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

fn api_error(status: StatusCode, kind: &str) -> axum::response::Response {
    (
        status,
        Json(json!({
            "type": "error",
            "error": {"type": kind, "message": "rejected by test server"}
        })),
    )
        .into_response()
}

async fn messages(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    let key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    match key {
        "good-key" => {}
        "busy-key" => return api_error(StatusCode::TOO_MANY_REQUESTS, "rate_limit_error"),
        _ => return api_error(StatusCode::UNAUTHORIZED, "authentication_error"),
    }

    let prompt = body["messages"][0]["content"]
        .as_str()
        .map(String::from)
        .or_else(|| body["messages"][0]["content"][0]["text"].as_str().map(String::from))
        .unwrap_or_default();
    Json(json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "model": body["model"],
        "content": [
            {"type": "text", "text": format!("max_tokens={} ", body["max_tokens"])},
            {"type": "text", "text": prompt}
        ],
        "stop_reason": "end_turn",
        "stop_sequence": null,
        "usage": {
            "input_tokens": 11,
            "output_tokens": 22,
            "cache_creation_input_tokens": 0,
            "cache_read_input_tokens": 0
        }
    }))
    .into_response()
}

async fn start_mock() -> String {
    let app = Router::new().route("/v1/messages", post(messages));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    format!("http://127.0.0.1:{port}")
}

fn provider(base: &str, key: &str) -> Arc<dyn LlmProvider> {
    create_provider(&LlmConfig {
        backend: LlmBackend::Anthropic,
        api_key: SecretString::from(key.to_string()),
        model: "claude-3-sonnet-20240229".to_string(),
        base_url: Some(base.to_string()),
    })
    .unwrap()
}

fn story_request() -> CompletionRequest {
    CompletionRequest::new("Tell me about Luna.").with_max_tokens(2000)
}

#[tokio::test]
async fn sends_prompt_and_joins_text() {
    timeout(TEST_TIMEOUT, async {
        let base = start_mock().await;
        let response = provider(&base, "good-key")
            .complete(story_request())
            .await
            .unwrap();
        assert_eq!(response.content, "max_tokens=2000 Tell me about Luna.");
        assert_eq!(response.output_tokens, 22);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn bad_key_is_auth_failure() {
    timeout(TEST_TIMEOUT, async {
        let base = start_mock().await;
        let err = provider(&base, "wrong")
            .complete(story_request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::AuthFailed { .. }));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rate_limit_is_reported() {
    timeout(TEST_TIMEOUT, async {
        let base = start_mock().await;
        let err = provider(&base, "busy-key")
            .complete(story_request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::RateLimited { .. }));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unreachable_host_is_request_failure() {
    timeout(TEST_TIMEOUT, async {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = provider(&format!("http://127.0.0.1:{port}"), "good-key")
            .complete(story_request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::RequestFailed { .. }));
    })
    .await
    .expect("test timed out");
}
