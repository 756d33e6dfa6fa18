//! Integration tests for the chat-completions gateways.
//!
//! A local axum server stands in for the provider so these tests verify:
//! - The request carries the bearer key, model, and annotated system prompt
//! - The first choice's content is returned
//! - Non-success statuses, malformed bodies, and timeouts become `Upstream`
//! - A missing key fails before any request is sent

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use francie_core::{
    ChatMessage, CompletionGateway, GatewayError, InstructionPrompt, Level, Role,
};
use francie_providers::{ProviderOptions, build_gateway};
use serde_json::{Value, json};
use tokio::sync::Mutex;

#[derive(Clone, Default)]
struct Recorder {
    hits: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<Value>>>,
    last_auth: Arc<Mutex<Option<String>>>,
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/v1")
}

async fn spawn_replying(status: StatusCode, body: Value, recorder: Recorder) -> String {
    let router = Router::new()
        .route(
            "/v1/chat/completions",
            post(
                move |State(rec): State<Recorder>, headers: HeaderMap, Json(req): Json<Value>| {
                    let body = body.clone();
                    async move {
                        rec.hits.fetch_add(1, Ordering::SeqCst);
                        *rec.last_body.lock().await = Some(req);
                        *rec.last_auth.lock().await = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        (status, Json(body))
                    }
                },
            ),
        )
        .with_state(recorder);
    spawn(router).await
}

fn options(name: &str, api_key: &str, base_url: String) -> ProviderOptions {
    ProviderOptions {
        base_url: Some(base_url),
        ..ProviderOptions::new(name, api_key)
    }
}

fn history() -> Vec<ChatMessage> {
    vec![ChatMessage::new(Role::Learner, "Salut")]
}

#[tokio::test]
async fn test_mistral_request_and_reply() {
    let recorder = Recorder::default();
    let base_url = spawn_replying(
        StatusCode::OK,
        json!({"choices": [{"message": {"role": "assistant", "content": "Bonjour ! Tu vas bien ?"}}]}),
        recorder.clone(),
    )
    .await;

    let gateway = build_gateway(&options("mistral", "secret", base_url)).unwrap();
    let reply = gateway
        .generate_reply(&history(), Level::Beginner, &InstructionPrompt::new("Tu es FRANCIE."))
        .await
        .unwrap();

    assert_eq!(reply, "Bonjour ! Tu vas bien ?");
    assert_eq!(recorder.hits.load(Ordering::SeqCst), 1);
    assert_eq!(
        recorder.last_auth.lock().await.as_deref(),
        Some("Bearer secret")
    );

    let body = recorder.last_body.lock().await.clone().unwrap();
    assert_eq!(body["model"], "mistral-small-latest");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], "Tu es FRANCIE.\nNiveau: A1");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "Salut");
    assert!((body["temperature"].as_f64().unwrap() - 0.6).abs() < 1e-6);
}

#[tokio::test]
async fn test_non_success_status_is_upstream_error() {
    let recorder = Recorder::default();
    let base_url = spawn_replying(
        StatusCode::TOO_MANY_REQUESTS,
        json!({"message": "rate limited"}),
        recorder,
    )
    .await;

    let gateway = build_gateway(&options("zhipu", "secret", base_url)).unwrap();
    let err = gateway
        .generate_reply(&history(), Level::Beginner, &InstructionPrompt::new("p"))
        .await
        .unwrap_err();

    match err {
        GatewayError::Upstream { status, detail } => {
            assert_eq!(status, Some(429));
            assert!(detail.contains("rate limited"));
        }
        other => panic!("Expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_content_is_upstream_error() {
    let base_url = spawn_replying(StatusCode::OK, json!({"choices": []}), Recorder::default()).await;

    let gateway = build_gateway(&options("mistral", "secret", base_url)).unwrap();
    let err = gateway
        .generate_reply(&history(), Level::Elementary, &InstructionPrompt::new("p"))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Upstream { status: Some(200), .. }));
}

#[tokio::test]
async fn test_reply_text_is_returned_verbatim() {
    let base_url = spawn_replying(
        StatusCode::OK,
        json!({"choices": [{"message": {"content": "  Bonjour !\n\nTu vas bien ?\n"}}]}),
        Recorder::default(),
    )
    .await;

    let gateway = build_gateway(&options("mistral", "secret", base_url)).unwrap();
    let reply = gateway
        .generate_reply(&history(), Level::Beginner, &InstructionPrompt::new("p"))
        .await
        .unwrap();

    assert_eq!(reply, "  Bonjour !\n\nTu vas bien ?\n");
}

#[tokio::test]
async fn test_whitespace_only_reply_is_upstream_error() {
    let base_url = spawn_replying(
        StatusCode::OK,
        json!({"choices": [{"message": {"content": " \n "}}]}),
        Recorder::default(),
    )
    .await;

    let gateway = build_gateway(&options("zhipu", "secret", base_url)).unwrap();
    let err = gateway
        .generate_reply(&history(), Level::Beginner, &InstructionPrompt::new("p"))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Upstream { status: Some(200), .. }));
}

#[tokio::test]
async fn test_missing_key_never_reaches_network() {
    let recorder = Recorder::default();
    let base_url = spawn_replying(
        StatusCode::OK,
        json!({"choices": [{"message": {"content": "unused"}}]}),
        recorder.clone(),
    )
    .await;

    let gateway = build_gateway(&options("mistral", "  ", base_url)).unwrap();
    let err = gateway
        .generate_reply(&history(), Level::Beginner, &InstructionPrompt::new("p"))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Configuration(_)));
    assert_eq!(recorder.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"choices": [{"message": {"content": "too late"}}]}))
        }),
    );
    let base_url = spawn(router).await;

    let gateway = build_gateway(&ProviderOptions {
        timeout: Duration::from_millis(200),
        ..options("mistral", "secret", base_url)
    })
    .unwrap();
    let err = gateway
        .generate_reply(&history(), Level::Beginner, &InstructionPrompt::new("p"))
        .await
        .unwrap_err();

    match err {
        GatewayError::Upstream { status, detail } => {
            assert_eq!(status, None);
            assert!(detail.contains("timed out"));
        }
        other => panic!("Expected Upstream, got {other:?}"),
    }
}
