#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use assetroom_api::config::ServerConfig;
use assetroom_api::router::build_app_router;
use assetroom_api::state::AppState;
use assetroom_events::RoomHub;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        journal_path: std::env::temp_dir().join("assetroom-test-unused.jsonl"),
    }
}

/// Build the full application router around a fresh hub.
///
/// Returns the state too, so tests can inspect the hub and manager.
pub fn build_test_app() -> (Router, AppState) {
    let config = test_config();
    let state = AppState::new(config.clone(), Arc::new(RoomHub::new()));
    (build_app_router(state.clone(), &config), state)
}

/// Serve the full application on an ephemeral local port.
pub async fn spawn_server() -> (SocketAddr, AppState) {
    let (app, state) = build_test_app();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
