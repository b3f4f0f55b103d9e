//! Router harness for handler tests: real routes over a `MemoryStore`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::config::Config;
use crate::matching::score::{MatchWeights, DEFAULT_MIN_SCORE};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::memory::MemoryStore;

pub fn test_router(store: MemoryStore) -> Router {
    build_router(AppState {
        store: Arc::new(store),
        config: Config {
            database_url: "postgres://unused".to_string(),
            db_max_connections: 1,
            port: 0,
            rust_log: "debug".to_string(),
            min_match_score: DEFAULT_MIN_SCORE,
            match_weights: MatchWeights::default(),
        },
    })
}

/// Sends one request and returns the status with the JSON body
/// (`Value::Null` for empty bodies).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let app = test_router(MemoryStore::default());
    let (status, json) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "planner");
}
