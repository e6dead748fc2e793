//! Forwarding integration tests
//!
//! Admitted requests are sanitized, re-targeted at the fixed upstream
//! completions path with the server-side credential, and the upstream
//! response is relayed unchanged.

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{access_key_header, chat_request, constants::*, valid_access_key, TestHarness};
use crate::mocks::{completion_response, COMPLETIONS_PATH};

#[tokio::test]
async fn test_admitted_request_reaches_upstream_and_is_relayed() {
    let harness = TestHarness::new().await;
    harness.upstream.mock_completion_success().await;

    let response = harness
        .server
        .post("/api/v1/chat/completions")
        .add_header(access_key_header(), valid_access_key())
        .json(&chat_request(ALLOWED_MODEL))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), completion_response());
    assert_eq!(response.header("x-upstream-request-id"), "req-abc");

    let upstream_request = harness.upstream.single_request().await;
    assert_eq!(upstream_request.method.as_str(), "POST");
    assert_eq!(upstream_request.url.path(), COMPLETIONS_PATH);
}

#[tokio::test]
async fn test_messages_are_sanitized_before_forwarding() {
    let harness = TestHarness::new().await;
    harness.upstream.mock_completion_success().await;

    let request = json!({
        "model": ALLOWED_MODEL,
        "temperature": 0.7,
        "messages": [
            {"role": "system", "content": "  keep  "},
            {"role": "user", "content": "  trim me \u{00A0}"},
            {"role": "assistant", "content": "\u{FEFF}\n earlier reply \n"}
        ]
    });

    harness
        .server
        .post("/api/v1/chat/completions")
        .add_header(access_key_header(), valid_access_key())
        .json(&request)
        .await
        .assert_status_ok();

    let forwarded: Value = harness.upstream.single_request().await.body_json().unwrap();
    assert_eq!(
        forwarded,
        json!({
            "model": ALLOWED_MODEL,
            "temperature": 0.7,
            "messages": [
                {"role": "system", "content": "  keep  "},
                {"role": "user", "content": "trim me"},
                {"role": "assistant", "content": "earlier reply"}
            ]
        })
    );
}

#[tokio::test]
async fn test_upstream_credentials_replace_caller_credentials() {
    let harness = TestHarness::new().await;
    harness.upstream.mock_completion_success().await;

    harness
        .server
        .post("/api/v1/chat/completions")
        .add_header(access_key_header(), valid_access_key())
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer caller-token"))
        .add_header(
            HeaderName::from_static("x-title"),
            HeaderValue::from_static("my-frontend"),
        )
        .json(&chat_request(ALLOWED_MODEL))
        .await
        .assert_status_ok();

    let upstream_request = harness.upstream.single_request().await;
    let headers = &upstream_request.headers;

    assert_eq!(
        headers.get("authorization").unwrap().to_str().unwrap(),
        format!("Bearer {}", TEST_UPSTREAM_KEY)
    );
    assert!(headers.get("auro").is_none());
    assert_eq!(headers.get("x-title").unwrap().to_str().unwrap(), "my-frontend");
}

#[tokio::test]
async fn test_content_length_matches_multibyte_body() {
    let harness = TestHarness::new().await;
    harness.upstream.mock_completion_success().await;

    let request = json!({
        "model": ALLOWED_MODEL,
        "messages": [
            {"role": "user", "content": "  こんにちは、世界 🌍 — ça va?  "}
        ]
    });

    harness
        .server
        .post("/api/v1/chat/completions")
        .add_header(access_key_header(), valid_access_key())
        .json(&request)
        .await
        .assert_status_ok();

    let upstream_request = harness.upstream.single_request().await;
    let content_length: usize = upstream_request
        .headers
        .get("content-length")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();

    assert_eq!(content_length, upstream_request.body.len());

    let forwarded: Value = serde_json::from_slice(&upstream_request.body).unwrap();
    assert_eq!(forwarded["messages"][0]["content"], "こんにちは、世界 🌍 — ça va?");
    assert_eq!(content_length, serde_json::to_vec(&forwarded).unwrap().len());
    assert!(content_length > serde_json::to_string(&forwarded).unwrap().chars().count());
}

#[tokio::test]
async fn test_inbound_path_and_query_are_ignored() {
    let harness = TestHarness::new().await;
    harness.upstream.mock_completion_success().await;

    for path in ["/api", "/api/", "/api/v1/completions?debug=true", "/api/some/other/path"] {
        harness
            .server
            .post(path)
            .add_header(access_key_header(), valid_access_key())
            .json(&chat_request(ALLOWED_MODEL))
            .await
            .assert_status_ok();
    }

    let requests = harness.upstream.received().await;
    assert_eq!(requests.len(), 4);
    for request in requests {
        assert_eq!(request.url.path(), COMPLETIONS_PATH);
        assert_eq!(request.url.query(), None);
    }
}

#[tokio::test]
async fn test_method_mirrors_inbound() {
    let harness = TestHarness::new().await;
    harness.upstream.mock_completion_success().await;

    harness
        .server
        .put("/api/v1/chat/completions")
        .add_header(access_key_header(), valid_access_key())
        .json(&chat_request(ALLOWED_MODEL))
        .await
        .assert_status_ok();

    assert_eq!(harness.upstream.single_request().await.method.as_str(), "PUT");
}

#[tokio::test]
async fn test_upstream_error_is_relayed_as_is() {
    let harness = TestHarness::new().await;
    let upstream_error = json!({"error": {"message": "Rate limit exceeded", "code": 429}});
    harness
        .upstream
        .mock_completion_error(429, upstream_error.clone())
        .await;

    let response = harness
        .server
        .post("/api/v1/chat/completions")
        .add_header(access_key_header(), valid_access_key())
        .json(&chat_request(ALLOWED_MODEL))
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.json::<Value>(), upstream_error);
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let harness = TestHarness::with_config(|config| {
        // Nothing listens on the discard port
        config.upstream_url = "http://127.0.0.1:9".to_string();
    })
    .await;

    let response = harness
        .server
        .post("/api/v1/chat/completions")
        .add_header(access_key_header(), valid_access_key())
        .json(&chat_request(ALLOWED_MODEL))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(response.json::<Value>(), json!({"error": "Upstream service error"}));
}

#[tokio::test]
async fn test_missing_upstream_key_is_unavailable() {
    let harness = TestHarness::with_config(|config| config.upstream_api_key = None).await;
    harness.upstream.mock_completion_success().await;

    let response = harness
        .server
        .post("/api/v1/chat/completions")
        .add_header(access_key_header(), valid_access_key())
        .json(&chat_request(ALLOWED_MODEL))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert!(harness.upstream.received().await.is_empty());
}

#[tokio::test]
async fn test_oversized_body_is_rejected_before_gate() {
    let harness = TestHarness::with_config(|config| config.max_body_bytes = 64).await;
    harness.upstream.mock_completion_success().await;

    let response = harness
        .server
        .post("/api/v1/chat/completions")
        .add_header(access_key_header(), valid_access_key())
        .json(&json!({
            "model": ALLOWED_MODEL,
            "messages": [{"role": "user", "content": "x".repeat(256)}]
        }))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert!(harness.upstream.received().await.is_empty());
}
