//! End-to-end tests for the HTTP API.
//!
//! These tests spin up the real Axum server on an OS-assigned ephemeral
//! port and drive it with `reqwest`, using the mock provider so no outbound
//! network calls are made.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{Value, json};
use tokio::net::TcpListener;

use dialogsum_core::{ProviderRouter, Settings};
use dialogsum_web::{AppState, WebConfig, WebServer};

// ── helpers ──────────────────────────────────────────────────────────────────

/// Bind to 127.0.0.1:0, start the API router, return (base_url, server task).
async fn start_test_server(settings: Settings) -> (String, tokio::task::JoinHandle<()>) {
    let settings = Arc::new(settings);
    let router = ProviderRouter::new(Arc::clone(&settings)).expect("build provider router");
    let state = Arc::new(AppState { settings, router });
    let app = WebServer::new(WebConfig::default(), state).router();

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind to port 0");
    let addr: SocketAddr = listener.local_addr().expect("get local addr");
    let base = format!("http://127.0.0.1:{}", addr.port());

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    // Small yield so the listener is ready.
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    (base, handle)
}

fn summarize_body(text: &str) -> Value {
    json!({
        "dialog": {
            "dialog_id": "d1",
            "messages": [{"sender": "A", "timestamp": "t0", "text": text}]
        },
        "prompt": {
            "system_instruction": "Summarize.",
            "rules": ["Be brief"],
            "output_instruction": "One sentence."
        }
    })
}

// ── GET /api/health ──────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_default_provider() {
    let (base, _srv) = start_test_server(Settings::default()).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/api/health"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("invalid JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["provider"], "mock");
}

// ── POST /api/summarize ──────────────────────────────────────────────────────

#[tokio::test]
async fn summarize_with_mock_provider_returns_marker_reply() {
    let (base, _srv) = start_test_server(Settings::default()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/summarize"))
        .json(&summarize_body("Routine exchange about the weather"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("invalid JSON");
    assert_eq!(body["summary"], "Routine exchange");
    assert_eq!(body["latency_ms"], 0);
    assert_eq!(body["provider"], "mock");
}

#[tokio::test]
async fn summarize_with_unsupported_provider_is_rejected() {
    let (base, _srv) = start_test_server(Settings::default()).await;
    let client = reqwest::Client::new();

    let mut body = summarize_body("hi");
    body["model"] = json!({"provider": "llama9"});

    let resp = client
        .post(format!("{base}/api/summarize"))
        .json(&body)
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), 400);

    let error: Value = resp.json().await.expect("invalid JSON");
    assert!(
        error["detail"].as_str().unwrap().contains("llama9"),
        "detail must name the provider: {error}"
    );
}

#[tokio::test]
async fn summarize_with_unconfigured_gemini_is_a_config_error() {
    let (base, _srv) = start_test_server(Settings::default()).await;
    let client = reqwest::Client::new();

    let mut body = summarize_body("hi");
    body["model"] = json!({"provider": "gemini"});

    let resp = client
        .post(format!("{base}/api/summarize"))
        .json(&body)
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), 500);

    let error: Value = resp.json().await.expect("invalid JSON");
    assert!(
        error["detail"]
            .as_str()
            .unwrap()
            .contains("API key or OAuth access token"),
        "unexpected detail: {error}"
    );
}

// ── POST /api/summarize-batch ────────────────────────────────────────────────

#[tokio::test]
async fn batch_returns_one_item_per_dialog_in_order() {
    let (base, _srv) = start_test_server(Settings::default()).await;
    let client = reqwest::Client::new();

    let body = json!({
        "dialogs": [
            {"dialog_id": "a", "messages": [{"timestamp": "t", "text": "one"}]},
            {"dialog_id": "b", "messages": [{"timestamp": "t", "text": "two"}]}
        ],
        "prompt": {
            "system_instruction": "Summarize.",
            "rules": [],
            "output_instruction": "Go."
        }
    });

    let resp = client
        .post(format!("{base}/api/summarize-batch"))
        .json(&body)
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), 200);

    let parsed: Value = resp.json().await.expect("invalid JSON");
    let items = parsed["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["dialog_id"], "a");
    assert_eq!(items[1]["dialog_id"], "b");
    assert!(items.iter().all(|i| i["provider"] == "mock"));
}

#[tokio::test]
async fn batch_with_unsupported_provider_yields_no_partial_results() {
    let (base, _srv) = start_test_server(Settings::default()).await;
    let client = reqwest::Client::new();

    let body = json!({
        "dialogs": [
            {"dialog_id": "a", "messages": []},
            {"dialog_id": "b", "messages": []},
            {"dialog_id": "c", "messages": []}
        ],
        "prompt": {
            "system_instruction": "s",
            "rules": [],
            "output_instruction": "o"
        },
        "model": {"provider": "unknown-llm"}
    });

    let resp = client
        .post(format!("{base}/api/summarize-batch"))
        .json(&body)
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), 400);

    let error: Value = resp.json().await.expect("invalid JSON");
    assert!(error["detail"].as_str().unwrap().contains("unknown-llm"));
    assert!(error.get("items").is_none(), "no partial results: {error}");
}

// ── POST /api/parse ──────────────────────────────────────────────────────────

#[tokio::test]
async fn parse_sniffs_timestamp_and_text_from_first_non_sender_key() {
    let (base, _srv) = start_test_server(Settings::default()).await;
    let client = reqwest::Client::new();

    let upload = r#"{"dialogs":[{"messages":[{"from":"A","2024-01-01T00:00:00":"hello"}]}]}"#;
    let resp = client
        .post(format!("{base}/api/parse"))
        .body(upload)
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), 200);

    let parsed: Value = resp.json().await.expect("invalid JSON");
    let message = &parsed["dialogs"][0]["messages"][0];
    assert_eq!(message["sender"], "A");
    assert_eq!(message["timestamp"], "2024-01-01T00:00:00");
    assert_eq!(message["text"], "hello");
}

#[tokio::test]
async fn parse_rejects_invalid_and_unsupported_payloads() {
    let (base, _srv) = start_test_server(Settings::default()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/parse"))
        .body("not json at all")
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), 400);
    let error: Value = resp.json().await.expect("invalid JSON");
    assert!(error["detail"].as_str().unwrap().contains("Failed to parse JSON"));

    let resp = client
        .post(format!("{base}/api/parse"))
        .body("\"just a string\"")
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), 400);
    let error: Value = resp.json().await.expect("invalid JSON");
    assert!(
        error["detail"]
            .as_str()
            .unwrap()
            .contains("Unsupported JSON format")
    );
}
