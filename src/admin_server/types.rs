//! Admin server data structures.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::orchestrator::BulkSummary;
use crate::run::{RunReport, RunResources};

/// Shared state for the admin server
#[derive(Clone)]
pub struct AdminState {
    pub resources: RunResources,
    /// Expected bearer token, trimmed
    pub token: Arc<str>,
    /// Held for the duration of a run; runs share one browser session
    pub run_lock: Arc<Mutex<()>>,
}

impl AdminState {
    /// Presented tokens are trimmed before comparison, so the expected one is too.
    pub fn new(resources: RunResources, token: &str) -> Self {
        Self {
            resources,
            token: Arc::from(token.trim()),
            run_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Body of `POST /admin/screenshots`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerRequest {
    pub project_id: Option<String>,
    pub project_ids: Vec<String>,
    pub all_pending: bool,
    pub all: bool,
    pub force: bool,
}

/// Per-project line of a [`TriggerResponse`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOutcome {
    pub project_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// JSON response for `POST /admin/screenshots`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponse {
    pub results: Vec<ProjectOutcome>,
    pub skipped: Vec<String>,
    pub not_found: Vec<String>,
    pub summary: BulkSummary,
    pub elapsed_seconds: f64,
}

impl From<RunReport> for TriggerResponse {
    fn from(report: RunReport) -> Self {
        let mut results: Vec<ProjectOutcome> = report
            .results
            .into_values()
            .map(|r| ProjectOutcome {
                project_id: r.project_id,
                success: r.success,
                strategy: r.strategy.map(|s| s.as_str().to_string()),
                image_url: r.image_path,
                error: r.error,
            })
            .collect();
        results.sort_by(|a, b| a.project_id.cmp(&b.project_id));

        Self {
            results,
            skipped: report.skipped,
            not_found: report.not_found,
            summary: report.summary,
            elapsed_seconds: report.elapsed_seconds,
        }
    }
}

/// JSON body of every rejection
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}
