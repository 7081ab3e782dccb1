//! HTTP API tests driven through the router with `tower::ServiceExt::oneshot`

mod common;

use std::sync::Arc;

use agrisense::api::build_router;
use agrisense::config::AppConfig;
use agrisense::embeddings::HashEmbedder;
use agrisense::ingest;
use agrisense::rag::GenerationMode;
use agrisense::store::VectorStore;
use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use common::ScriptedCompletion;
use serde_json::json;
use serde_json::Value;
use tower::ServiceExt;

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_chat(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_version() {
    let (service, _) = common::chat_service(&AppConfig::default(), ScriptedCompletion::replying("ok"));
    let app = build_router(Arc::new(service), true);

    let (status, body) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn empty_message_is_rejected_without_generation() {
    let completion = ScriptedCompletion::replying("should not be used");
    let (service, store) = common::chat_service(&AppConfig::default(), completion.clone());
    let service = Arc::new(service);
    let app = build_router(service.clone(), true);

    for payload in [json!({"message": ""}), json!({"message": "   "}), json!({})] {
        let (status, body) = send(&app, post_chat(payload.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    service.memory().flush().await;
    assert_eq!(completion.calls(), 0);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn malformed_json_is_a_structured_bad_request() {
    let completion = ScriptedCompletion::replying("unused");
    let (service, _) = common::chat_service(&AppConfig::default(), completion.clone());
    let app = build_router(Arc::new(service), false);

    let (status, body) = send(&app, post_chat("{\"message\": ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    assert_eq!(completion.calls(), 0);
}

#[tokio::test]
async fn punjab_question_end_to_end() {
    let mut config = AppConfig::default();
    config.llm.mode = GenerationMode::Grounded;
    let completion = ScriptedCompletion::replying(
        "Sow wheat from late October to mid November and irrigate at crown root initiation.",
    );
    let (service, store) = common::chat_service(&config, completion.clone());

    let embedder = HashEmbedder::new(common::DIM).unwrap();
    ingest::populate(&[common::punjab_farmer()], &embedder, store.as_ref())
        .await
        .unwrap();

    let service = Arc::new(service);
    let app = build_router(service.clone(), true);
    let payload = json!({
        "message": "When should I sow wheat in Punjab?",
        "language": "punjabi",
        "farmer_profile": {
            "id": 1,
            "location": "Punjab",
            "crops": ["Wheat", "Rice"]
        }
    });

    let (status, body) = send(&app, post_chat(payload.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["response"].as_str().unwrap().is_empty());
    assert_eq!(body["source"], "ai");
    // Profile, challenges and two previous queries were ingested
    assert_eq!(body["contexts_used"], 4);

    let request = completion.last_request().unwrap();
    assert!(request.system_prompt.contains("Punjabi"));
    assert!(request.user_prompt.contains("Relevant farmer contexts and past queries:"));
    assert_eq!(request.model, "llama-3.3-70b-versatile");

    // The fresh answer becomes a cache entry
    service.memory().flush().await;
    let (status, body) = send(&app, post_chat(payload.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "cache");
    assert_eq!(body["contexts_used"], 1);
    assert_eq!(completion.calls(), 1);
}

#[tokio::test]
async fn unknown_language_falls_back_to_english() {
    let completion = ScriptedCompletion::replying("Use neem oil.");
    let (service, _) = common::chat_service(&AppConfig::default(), completion.clone());
    let app = build_router(Arc::new(service), true);

    let payload = json!({"message": "Aphids on mustard", "language": "tamil"});
    let (status, body) = send(&app, post_chat(payload.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["contexts_used"], 0);

    let request = completion.last_request().unwrap();
    assert!(request.system_prompt.contains("directly in English"));
    assert!(request.user_prompt.contains("Name: Farmer, Location: India"));
}

#[tokio::test]
async fn generation_failure_is_bad_gateway_and_not_remembered() {
    let completion = ScriptedCompletion::failing("upstream timed out");
    let (service, store) = common::chat_service(&AppConfig::default(), completion.clone());
    let service = Arc::new(service);
    let app = build_router(service.clone(), true);

    let payload = json!({"message": "Whitefly control in cotton"});
    let (status, body) = send(&app, post_chat(payload.to_string())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body["error"],
        "Error generating response: upstream timed out"
    );

    service.memory().flush().await;
    assert_eq!(completion.calls(), 1);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn stats_counts_documents_by_type() {
    let completion = ScriptedCompletion::replying("Irrigate weekly.");
    let (service, store) = common::chat_service(&AppConfig::default(), completion);
    let embedder = HashEmbedder::new(common::DIM).unwrap();
    ingest::populate(&[common::punjab_farmer()], &embedder, store.as_ref())
        .await
        .unwrap();

    let service = Arc::new(service);
    let app = build_router(service.clone(), true);
    send(&app, post_chat(json!({"message": "How often to irrigate?"}).to_string())).await;
    service.memory().flush().await;

    let (status, body) = send(&app, get("/api/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_documents"], 5);
    assert_eq!(body["by_type"]["profile"], 1);
    assert_eq!(body["by_type"]["query"], 2);
    assert_eq!(body["by_type"]["interaction"], 1);
    assert_eq!(body["cache"]["misses"], 1);
}
