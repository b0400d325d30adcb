#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use vectorflow_api::config::ServerConfig;
use vectorflow_api::router::build_app_router;
use vectorflow_api::state::AppState;
use vectorflow_core::pipeline::AnchorPolicy;
use vectorflow_core::sink::KnownDomain;
use vectorflow_events::{EventBus, EventHistory};

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        anchor_policy: AnchorPolicy::RequireMlInference,
        event_bus_capacity: 64,
        event_history_limit: 50,
        pipeline_name: "chapter-embeddings".to_string(),
        known_domains: vec![KnownDomain::new(
            "books",
            "https://search-books-abc123.us-east-1.es.amazonaws.com",
        )],
    }
}

/// Build the application state and router for `config`, with the event
/// history recorder running in the background.
pub fn build_test_app_with(config: ServerConfig) -> (Router, AppState) {
    let event_bus = Arc::new(EventBus::new(config.event_bus_capacity));
    let history = Arc::new(EventHistory::new(config.event_history_limit));
    tokio::spawn(EventHistory::run(Arc::clone(&history), event_bus.subscribe()));

    let state = AppState::new(config.clone(), event_bus, history);
    let app = build_app_router(state.clone(), &config);
    (app, state)
}

/// Router with the production middleware stack and the default test config.
pub fn build_test_app() -> Router {
    build_test_app_with(test_config()).0
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Ids of the processors in a `{ "data": { "processors": [...] } }` body.
pub fn processor_ids(json: &serde_json::Value) -> Vec<String> {
    json["data"]["processors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}
