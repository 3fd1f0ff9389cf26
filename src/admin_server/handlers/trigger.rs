//! Screenshot trigger handler.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use log::{error, info, warn};

use super::super::types::{AdminState, ErrorResponse, TriggerRequest, TriggerResponse};
use crate::run::{run_screenshots, Selection};

fn reject(status: StatusCode, error: &'static str) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

/// Byte comparison whose duration does not depend on where the inputs differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn is_authorized(headers: &HeaderMap, token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|presented| constant_time_eq(presented.trim().as_bytes(), token.as_bytes()))
}

/// Runs the pipeline for the requested projects and reports per-project outcomes.
///
/// Any authentication problem yields the same 401 body.
pub async fn trigger_handler(
    State(state): State<AdminState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !is_authorized(&headers, &state.token) {
        warn!("Rejected unauthorized screenshot trigger");
        return reject(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let request: TriggerRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(_) => return reject(StatusCode::BAD_REQUEST, "Invalid request body"),
    };
    let mut ids = request.project_ids;
    ids.extend(request.project_id);
    let selection = match Selection::from_flags(ids, request.all_pending, request.all) {
        Ok(selection) => selection,
        Err(_) => return reject(StatusCode::BAD_REQUEST, "No projects selected"),
    };

    let _guard = state.run_lock.lock().await;
    info!("Admin trigger: {selection:?} (force: {})", request.force);
    match run_screenshots(&state.resources, &selection, request.force).await {
        Ok(report) => (StatusCode::OK, Json(TriggerResponse::from(report))).into_response(),
        Err(e) => {
            error!("Screenshot run failed: {e:#}");
            reject(StatusCode::INTERNAL_SERVER_ERROR, "Screenshot run failed")
        }
    }
}
