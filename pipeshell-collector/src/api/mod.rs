//! API Module
//!
//! HTTP API layer for the collector.

pub mod ingest;

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::ingest::IngestSink;

/// Create the collector router writing every received record to `sink`
pub fn create_router(sink: Arc<dyn IngestSink>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/logs", post(ingest::ingest_logs))
        .route("/logs/auth", post(ingest::ingest_logs_auth))
        .with_state(sink)
        .layer(TraceLayer::new_for_http())
}

/// GET /health
/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::MemoryIngest;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> (Router, MemoryIngest) {
        let sink = MemoryIngest::new();
        (create_router(Arc::new(sink.clone())), sink)
    }

    fn post_logs(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let (app, _) = app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_logs_copies_body_verbatim() {
        let (app, sink) = app();
        let record = r#"{"level":"info","msg":"hello world","timestamp":1700000000}"#;

        let response = app.oneshot(post_logs("/logs", record)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(sink.bodies(), vec![record]);
    }

    #[tokio::test]
    async fn test_logs_accepts_any_body() {
        let (app, sink) = app();

        let response = app.oneshot(post_logs("/logs", "not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(sink.bodies(), vec!["not json"]);
    }

    #[tokio::test]
    async fn test_logs_auth_with_and_without_token() {
        let (app, sink) = app();

        let mut request = post_logs("/logs/auth", r#"{"msg":"with token"}"#);
        request
            .headers_mut()
            .insert("authorization", "Bearer secret".parse().unwrap());
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(post_logs("/logs/auth", r#"{"msg":"without token"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(
            sink.bodies(),
            vec![r#"{"msg":"with token"}"#, r#"{"msg":"without token"}"#]
        );
    }

    #[tokio::test]
    async fn test_logs_rejects_get() {
        let (app, sink) = app();

        let response = app
            .oneshot(Request::builder().uri("/logs").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(sink.is_empty());
    }
}
