//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional Swagger UI / OpenAPI document endpoint (disable with `MINDEASE_ENABLE_SWAGGER=false`)
//! - Welcome and health routes
//! - Chat, mood and resource routes
//! - A JSON 404 fallback

mod chat;
pub mod doc;
mod health;
mod mood;
mod resources;

use std::sync::Arc;

use axum::http::Uri;
use axum::{middleware, Router};
use tower::ServiceBuilder;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ServerError;
use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(chat::router())
        .merge(mood::router())
        .merge(resources::router());

    if state.config.enable_swagger {
        app = app.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()),
        );
    }

    app.fallback(not_found)
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(&state.config)))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

async fn not_found(uri: Uri) -> ServerError {
    ServerError::NotFound(uri.path().to_owned())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::db::memory::MemoryStore;
    use crate::db::unavailable::UnavailableStore;
    use crate::db::{Document, DocumentStore, FieldValue, Query};
    use axum::body::{Body, Bytes};
    use axum::http::{header, HeaderMap, Request, StatusCode};
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use tracing_test::traced_test;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    fn app_with(store: Arc<dyn DocumentStore>, pairs: &[(&str, &str)]) -> Router {
        build(Arc::new(AppState::new(config(pairs), store)))
    }

    fn memory_app() -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (app_with(store.clone(), &[]), store)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send_raw(app: Router, req: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, bytes)
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let (status, _, bytes) = send_raw(app, req).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn stored(store: &MemoryStore, collection: &str) -> Vec<Document> {
        store
            .query(&Query::collection(collection))
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.fields)
            .collect()
    }

    fn timestamp_of(doc: &Document) -> DateTime<Utc> {
        match &doc["timestamp"] {
            FieldValue::Timestamp(ts) => *ts,
            other => panic!("expected timestamp, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn root_returns_welcome() {
        let (app, _) = memory_app();
        let (status, body) = send(app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Welcome to MindEase API" }));
    }

    #[tokio::test]
    async fn health_reports_backend() {
        let (app, _) = memory_app();
        let (status, body) = send(app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "memory");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn chat_returns_canned_reply_and_persists_message() {
        let (app, store) = memory_app();
        let before = Utc::now();
        let (status, body) = send(
            app,
            post_json("/chat", json!({ "content": "I feel anxious", "user_id": "u1" })),
        )
        .await;
        let after = Utc::now();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "message":
                    "I understand you're feeling this way. Would you like to talk more about it?",
                "sentiment": "neutral",
            })
        );

        let docs = stored(&store, "chats").await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["user_id"], FieldValue::from("u1"));
        assert_eq!(docs[0]["content"], FieldValue::from("I feel anxious"));
        let ts = timestamp_of(&docs[0]);
        assert!(before <= ts && ts <= after);
    }

    #[tokio::test]
    async fn chat_reply_does_not_depend_on_content() {
        let (app, _) = memory_app();
        let (_, first) = send(
            app.clone(),
            post_json("/chat", json!({ "content": "great day!", "user_id": "u1" })),
        )
        .await;
        let (_, second) = send(
            app,
            post_json("/chat", json!({ "content": "everything is awful", "user_id": "u2" })),
        )
        .await;
        assert_eq!(first, second);
    }

    /// Client timestamps in RFC 3339, naive and epoch form.
    fn client_timestamps() -> [Value; 3] {
        [
            json!("2001-01-01T00:00:00Z"),
            json!("2024-01-01T10:00:00"),
            json!(1_700_000_000),
        ]
    }

    #[tokio::test]
    async fn chat_client_timestamp_is_overwritten() {
        for client in client_timestamps() {
            let (app, store) = memory_app();
            let before = Utc::now();
            let (status, _) = send(
                app,
                post_json(
                    "/chat",
                    json!({ "content": "hi", "user_id": "u1", "timestamp": client }),
                ),
            )
            .await;
            let after = Utc::now();
            assert_eq!(status, StatusCode::OK, "timestamp {client}");
            let docs = stored(&store, "chats").await;
            let ts = timestamp_of(&docs[0]);
            assert!(before <= ts && ts <= after, "timestamp {client}");
        }
    }

    #[tokio::test]
    async fn mood_client_timestamp_is_overwritten() {
        for client in client_timestamps() {
            let (app, store) = memory_app();
            let before = Utc::now();
            let (status, _) = send(
                app,
                post_json(
                    "/mood",
                    json!({ "user_id": "u1", "mood_score": 3, "timestamp": client }),
                ),
            )
            .await;
            let after = Utc::now();
            assert_eq!(status, StatusCode::OK, "timestamp {client}");
            let docs = stored(&store, "moods").await;
            let ts = timestamp_of(&docs[0]);
            assert!(before <= ts && ts <= after, "timestamp {client}");
        }
    }

    #[tokio::test]
    async fn mood_without_user_id_is_rejected_without_write() {
        let (app, store) = memory_app();
        let (status, body) = send(app, post_json("/mood", json!({ "mood_score": 4 }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("user_id"), "{message}");
        assert!(stored(&store, "moods").await.is_empty());
    }

    #[tokio::test]
    async fn mood_without_score_is_rejected_without_write() {
        let (app, store) = memory_app();
        let (status, body) = send(app, post_json("/mood", json!({ "user_id": "u1" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("mood_score"), "{message}");
        assert!(stored(&store, "moods").await.is_empty());
    }

    #[tokio::test]
    async fn missing_user_id_is_rejected_without_write() {
        let (app, store) = memory_app();
        let (status, body) = send(app, post_json("/chat", json!({ "content": "hi" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("user_id"), "{message}");
        assert!(stored(&store, "chats").await.is_empty());
    }

    #[tokio::test]
    async fn mistyped_user_id_is_rejected() {
        let (app, store) = memory_app();
        let (status, body) = send(
            app,
            post_json("/mood", json!({ "user_id": 5, "mood_score": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("user_id"), "{message}");
        assert!(stored(&store, "moods").await.is_empty());
    }

    #[tokio::test]
    async fn empty_content_is_rejected() {
        let (app, store) = memory_app();
        let (status, body) = send(
            app,
            post_json("/chat", json!({ "content": "", "user_id": "u1" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("content"));
        assert!(stored(&store, "chats").await.is_empty());
    }

    #[tokio::test]
    async fn body_without_json_content_type_is_rejected() {
        let (app, _) = memory_app();
        let req = Request::builder()
            .method("POST")
            .uri("/mood")
            .body(Body::from(r#"{"user_id":"u1","mood_score":3}"#))
            .unwrap();
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn mood_scores_outside_scale_are_accepted() {
        let (app, store) = memory_app();
        for score in [0, -3, 100] {
            let (status, body) = send(
                app.clone(),
                post_json("/mood", json!({ "user_id": "u1", "mood_score": score })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(
                body,
                json!({ "status": "success", "message": "Mood logged successfully" })
            );
        }
        let scores: Vec<FieldValue> = stored(&store, "moods")
            .await
            .iter()
            .map(|d| d["mood_score"].clone())
            .collect();
        assert_eq!(
            scores,
            vec![
                FieldValue::Integer(0),
                FieldValue::Integer(-3),
                FieldValue::Integer(100)
            ]
        );
    }

    #[tokio::test]
    async fn logged_mood_is_first_in_history() {
        let (app, _) = memory_app();
        send(
            app.clone(),
            post_json("/mood", json!({ "user_id": "u1", "mood_score": 2, "note": "tired" })),
        )
        .await;
        send(
            app.clone(),
            post_json("/mood", json!({ "user_id": "u1", "mood_score": 4 })),
        )
        .await;

        let (status, body) = send(app, get("/mood/history/u1")).await;
        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["mood_score"], 4);
        assert_eq!(entries[0]["note"], Value::Null);
        assert_eq!(entries[0]["user_id"], "u1");
        assert!(entries[0]["timestamp"].is_string());
        assert_eq!(entries[1]["note"], "tired");
    }

    #[tokio::test]
    async fn history_is_capped_at_thirty_newest_first() {
        let store = Arc::new(MemoryStore::new());
        let base = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        for i in 0..35 {
            let doc = Document::from([
                ("user_id".to_owned(), FieldValue::from("u1")),
                ("mood_score".to_owned(), FieldValue::from(i)),
                ("note".to_owned(), FieldValue::Null),
                ("timestamp".to_owned(), FieldValue::from(base + TimeDelta::hours(i))),
            ]);
            store.create("moods", doc).await.unwrap();
        }
        let mut other = Document::new();
        other.insert("user_id".into(), FieldValue::from("u2"));
        other.insert("timestamp".into(), FieldValue::from(base + TimeDelta::days(30)));
        store.create("moods", other).await.unwrap();

        let app = app_with(store, &[]);
        let (_, body) = send(app, get("/mood/history/u1")).await;
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 30);
        assert_eq!(entries[0]["mood_score"], 34);
        assert_eq!(entries[29]["mood_score"], 5);
        let stamps: Vec<&str> = entries
            .iter()
            .map(|e| e["timestamp"].as_str().unwrap())
            .collect();
        assert!(stamps.windows(2).all(|w| w[0] > w[1]));
    }

    #[tokio::test]
    async fn unknown_user_has_empty_history() {
        let (app, _) = memory_app();
        let (status, body) = send(app, get("/mood/history/nobody")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn resources_are_fixed() {
        let (app, _) = memory_app();
        let (status, _, first) = send_raw(app.clone(), get("/resources")).await;
        let (_, _, second) = send_raw(app, get("/resources")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first, second);
        let body: Value = serde_json::from_slice(&first).unwrap();
        assert_eq!(
            body,
            json!([
                {
                    "title": "Breathing Exercise",
                    "description": "5-minute guided breathing exercise",
                    "url": "https://example.com/breathing",
                    "type": "exercise",
                },
                {
                    "title": "Meditation Guide",
                    "description": "10-minute meditation for stress relief",
                    "url": "https://example.com/meditation",
                    "type": "meditation",
                },
            ])
        );
    }

    #[tokio::test]
    async fn store_failure_is_500_with_store_text() {
        let app = app_with(Arc::new(UnavailableStore::new("credentials error: boom")), &[]);
        let (status, body) = send(
            app.clone(),
            post_json("/chat", json!({ "content": "hi", "user_id": "u1" })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            "document store unavailable: credentials error: boom"
        );

        let (status, _) = send(app.clone(), get("/mood/history/u1")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        // Routes that never touch the store keep working.
        let (status, _) = send(app, get("/resources")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (app, _) = memory_app();
        let (status, body) = send(app, get("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not found: /nope");
    }

    #[tokio::test]
    async fn cors_allows_any_origin_by_default() {
        let (app, _) = memory_app();
        let req = Request::builder()
            .uri("/resources")
            .header(header::ORIGIN, "http://app.example")
            .body(Body::empty())
            .unwrap();
        let (_, headers, _) = send_raw(app, req).await;
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn cors_origins_can_be_restricted() {
        let app = app_with(
            Arc::new(MemoryStore::new()),
            &[("MINDEASE_CORS_ORIGINS", "http://app.example, http://admin.example")],
        );
        let req = Request::builder()
            .uri("/resources")
            .header(header::ORIGIN, "http://admin.example")
            .body(Body::empty())
            .unwrap();
        let (_, headers, _) = send_raw(app.clone(), req).await;
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://admin.example"
        );

        let req = Request::builder()
            .uri("/resources")
            .header(header::ORIGIN, "http://evil.example")
            .body(Body::empty())
            .unwrap();
        let (_, headers, _) = send_raw(app, req).await;
        assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[tokio::test]
    async fn trace_id_is_assigned_or_echoed() {
        let (app, _) = memory_app();
        let (_, headers, _) = send_raw(app.clone(), get("/health")).await;
        let assigned = headers[trace::X_TRACE_ID].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(assigned).is_ok());

        let id = "6f1c1f8e-2a4b-4c7d-9e3f-0a1b2c3d4e5f";
        let req = Request::builder()
            .uri("/health")
            .header(trace::X_TRACE_ID, id)
            .body(Body::empty())
            .unwrap();
        let (_, headers, _) = send_raw(app, req).await;
        assert_eq!(headers[trace::X_TRACE_ID], id);
    }

    #[tokio::test]
    #[traced_test]
    async fn message_content_is_not_logged() {
        let (app, _) = memory_app();
        send(
            app,
            post_json("/chat", json!({ "content": "very-private-words", "user_id": "u7" })),
        )
        .await;
        assert!(logs_contain("chat message stored"));
        assert!(logs_contain("u7"));
        assert!(!logs_contain("very-private-words"));
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let (app, _) = memory_app();
        let (status, body) = send(app, get("/api-docs/openapi.json")).await;
        assert_eq!(status, StatusCode::OK);
        for path in ["/", "/health", "/chat", "/mood", "/mood/history/{user_id}", "/resources"] {
            assert!(body["paths"].get(path).is_some(), "missing {path}");
        }
    }

    #[tokio::test]
    async fn swagger_can_be_disabled() {
        let app = app_with(
            Arc::new(MemoryStore::new()),
            &[("MINDEASE_ENABLE_SWAGGER", "false")],
        );
        let (status, _) = send(app, get("/api-docs/openapi.json")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
