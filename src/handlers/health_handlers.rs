//! Health handler.
//!
//! - GET /health/s3 -> probes the configured bucket with a HEAD call

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

/// `GET /health/s3`
///
/// HEADs the configured bucket. 200 with `status: ok` when reachable,
/// 500 with a generic message otherwise; the underlying error goes to
/// the server log only.
pub async fn s3_health(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.head_bucket().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                message: "Successfully connected to the store bucket.",
            }),
        ),
        Err(err) => {
            tracing::error!(error = %err, "bucket health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "error",
                    message: "Failed to connect to the store bucket. Check credentials and permissions.",
                }),
            )
        }
    }
}
