//! `GeminiClient` against a local fake of the generation endpoint.

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use assetroom_assist::{AssistError, ContentAssist, GeminiClient, GeminiConfig};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Seen {
    requests: Arc<Mutex<Vec<(String, String, Value)>>>,
}

async fn spawn_fake(reply: (StatusCode, Value)) -> (String, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route(
            "/v1beta/models/{call}",
            post(
                move |State(seen): State<Seen>,
                      Path(call): Path<String>,
                      Query(query): Query<std::collections::HashMap<String, String>>,
                      Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        let key = query.get("key").cloned().unwrap_or_default();
                        seen.requests.lock().unwrap().push((call, key, body));
                        (reply.0, Json(reply.1))
                    }
                },
            ),
        )
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), seen)
}

fn client(base_url: String) -> GeminiClient {
    GeminiClient::new(GeminiConfig {
        api_key: "test-key".into(),
        model: "test-model".into(),
        base_url,
    })
}

fn candidate(text: &str) -> Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

#[tokio::test]
async fn suggestion_round_trip() {
    let text = r#"{"tagline":"Segar!","caption":"Coba sekarang","prompt":"a glass of iced coffee","harga_saran":"Rp 18.000"}"#;
    let (base, seen) = spawn_fake((StatusCode::OK, candidate(text))).await;

    let suggestion = client(base).generate("  Es kopi susu  ").await.unwrap();
    assert_eq!(suggestion.tagline, "Segar!");
    assert_eq!(suggestion.suggested_price, "Rp 18.000");

    let requests = seen.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (call, key, body) = &requests[0];
    assert_eq!(call, "test-model:generateContent");
    assert_eq!(key, "test-key");
    assert!(body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("Es kopi susu."));
}

#[tokio::test]
async fn upstream_failure_status_is_reported() {
    let (base, _) = spawn_fake((StatusCode::TOO_MANY_REQUESTS, json!({ "error": "quota" }))).await;

    let err = client(base).generate("Kopi").await.unwrap_err();
    assert_matches!(err, AssistError::Api { status: 429, ref body } if body.contains("quota"));
}

#[tokio::test]
async fn incomplete_structured_output_is_malformed() {
    let (base, _) = spawn_fake((StatusCode::OK, candidate(r#"{"tagline":"only"}"#))).await;

    assert_matches!(client(base).generate("Kopi").await, Err(AssistError::Malformed(_)));
}

#[tokio::test]
async fn empty_description_never_reaches_upstream() {
    let (base, seen) = spawn_fake((StatusCode::OK, candidate("{}"))).await;

    assert_matches!(client(base).generate("").await, Err(AssistError::EmptyDescription));
    assert!(seen.requests.lock().unwrap().is_empty());
}
