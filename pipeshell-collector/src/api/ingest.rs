//! Log Ingest API Handlers
//!
//! Endpoints that receive forwarded log records. Bodies are never parsed or
//! validated; they are handed to the ingest sink byte for byte.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};
use std::sync::Arc;

use crate::ingest::IngestSink;

/// POST /logs
/// Accept one log record
pub async fn ingest_logs(
    State(sink): State<Arc<dyn IngestSink>>,
    body: Bytes,
) -> StatusCode {
    store(sink.as_ref(), &body);
    StatusCode::OK
}

/// POST /logs/auth
/// Accept one log record sent with a bearer token
///
/// Only the presence of the token is logged. The request is accepted either
/// way.
pub async fn ingest_logs_auth(
    State(sink): State<Arc<dyn IngestSink>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    match bearer_token(&headers) {
        Some(_) => tracing::info!("Log record received with bearer token"),
        None => tracing::warn!("Log record received without bearer token"),
    }

    store(sink.as_ref(), &body);
    StatusCode::OK
}

/// Extracts the token of an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();

    if token.is_empty() { None } else { Some(token) }
}

fn store(sink: &dyn IngestSink, body: &[u8]) {
    tracing::debug!(bytes = body.len(), "Ingesting log record");

    if let Err(e) = sink.ingest(body) {
        tracing::error!("Failed to ingest log record: {}", e);
    }
}
