//! Health check endpoint
//!
//! Returns 200 when the document store answers, 503 otherwise.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::json_response;
use crate::server::{AppState, StoreBackend};
use crate::services::bounded;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub db: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<i64>,
}

/// GET /health-check
pub async fn health_check(state: &AppState) -> Response<Full<Bytes>> {
    match bounded(state.store_timeout, state.players.ping()).await {
        Ok(()) => {
            let db = match state.backend {
                StoreBackend::Mongo => "connected",
                StoreBackend::Memory => "memory",
            };
            json_response(
                StatusCode::OK,
                &HealthResponse {
                    status: "ok",
                    db,
                    timestamps: Some(chrono::Utc::now().timestamp_millis()),
                },
            )
        }
        Err(_) => json_response(
            StatusCode::SERVICE_UNAVAILABLE,
            &HealthResponse {
                status: "starting",
                db: "not_ready",
                timestamps: None,
            },
        ),
    }
}
