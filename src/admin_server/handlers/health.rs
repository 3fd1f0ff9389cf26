//! Liveness handler.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Unauthenticated liveness probe
pub async fn health_handler() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
        .into_response()
}
