//! Authenticated administrative trigger.
//!
//! Provides two endpoints:
//! - `POST /admin/screenshots` - run the pipeline for selected projects (bearer token)
//! - `GET /health` - liveness probe
//!
//! Runs are serialized: a second trigger waits until the first has finished.

mod handlers;
mod types;

use axum::routing::{get, post};
use axum::Router;

use handlers::{health_handler, trigger_handler};
pub use types::{AdminState, ProjectOutcome, TriggerRequest, TriggerResponse};

/// Routes of the admin server.
pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/screenshots", post(trigger_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Binds `listen` and serves until the process exits.
pub async fn start_admin_server(listen: &str, state: AdminState) -> Result<(), anyhow::Error> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind admin server to {}: {}", listen, e))?;

    log::info!("Admin server listening on http://{}/", listen);
    log::info!("  - Trigger: POST http://{}/admin/screenshots", listen);
    log::info!("  - Health: GET http://{}/health", listen);

    axum::serve(listener, router(state))
        .await
        .map_err(|e| anyhow::anyhow!("Admin server error: {}", e))?;

    Ok(())
}
