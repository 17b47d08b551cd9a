//! Shared fixtures for driving the router end to end
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use bistro::{auth::TokenKeys, db::Store, rest, AppState};
use serde_json::{json, Map, Value};
use tower::util::ServiceExt;

pub const TEST_SECRET: &[u8] = b"test-secret-key";

pub async fn create_test_app() -> (Router, AppState) {
    let store = Store::in_memory().await.unwrap();
    store.migrate().await.unwrap();

    let tokens = TokenKeys::from_secret(TEST_SECRET, chrono::Duration::days(7));
    let state = AppState { store, tokens };

    (rest::router(state.clone()), state)
}

pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected JSON object, got {other}"),
    }
}

pub fn token_for(state: &AppState, email: &str) -> String {
    state.tokens.issue(object(json!({ "email": email }))).unwrap()
}

/// Registers `email` directly in the store and promotes it, returning a token.
pub async fn admin_token(state: &AppState, email: &str) -> String {
    let inserted = state
        .store
        .insert_one(bistro::db::Collection::Users, object(json!({ "email": email })))
        .await
        .unwrap();
    let id = uuid::Uuid::parse_str(&inserted.inserted_id).unwrap();
    state.store.promote_to_admin(id).await.unwrap();
    token_for(state, email)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, value)
}
