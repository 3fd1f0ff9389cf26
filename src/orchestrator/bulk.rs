//! Bulk mode: many projects, one at a time.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use log::{debug, info, warn};
use serde::Serialize;

use crate::models::{PipelineMetadata, PipelineResult, ProjectInput};
use crate::storage::{ProjectStore, ProjectUpdate};

use super::Pipeline;

/// Counts over one bulk run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Projects left alone because they already had an image
    pub skipped: usize,
    /// Successful projects per strategy name
    pub strategies: BTreeMap<String, usize>,
}

impl BulkSummary {
    /// Counts `result` into the summary.
    pub fn record(&mut self, result: &PipelineResult) {
        self.total += 1;
        match (result.success, result.strategy) {
            (true, Some(strategy)) => {
                self.succeeded += 1;
                *self
                    .strategies
                    .entry(strategy.as_str().to_string())
                    .or_default() += 1;
            }
            _ => self.failed += 1,
        }
    }

    pub fn record_skip(&mut self) {
        self.total += 1;
        self.skipped += 1;
    }

    pub fn log(&self) {
        info!(
            "Bulk run finished: {} project(s), {} succeeded, {} failed, {} skipped",
            self.total, self.succeeded, self.failed, self.skipped
        );
        for (strategy, count) in &self.strategies {
            info!("  {strategy}: {count}");
        }
    }
}

/// Per-project results keyed by project id, plus summary counts.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReport {
    pub results: HashMap<String, PipelineResult>,
    pub summary: BulkSummary,
}

impl BulkReport {
    pub fn insert(&mut self, result: PipelineResult) {
        self.summary.record(&result);
        self.results.insert(result.project_id.clone(), result);
    }
}

impl Pipeline {
    /// Processes `inputs` strictly in order, pausing between projects.
    ///
    /// Every project id gets an entry; input that fails validation is recorded
    /// as a failed result instead of aborting the batch.
    pub async fn generate_bulk(&self, inputs: &[ProjectInput]) -> BulkReport {
        self.run_bulk(inputs, None).await
    }

    /// Like [`Pipeline::generate_bulk`], writing each result back to `store`
    /// as soon as the project is done.
    pub async fn generate_bulk_and_store(
        &self,
        inputs: &[ProjectInput],
        store: &dyn ProjectStore,
    ) -> BulkReport {
        self.run_bulk(inputs, Some(store)).await
    }

    async fn run_bulk(&self, inputs: &[ProjectInput], store: Option<&dyn ProjectStore>) -> BulkReport {
        let mut report = BulkReport::default();
        let delay = self.config().project_delay();

        for (index, input) in inputs.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            info!("Project {}/{}: {}", index + 1, inputs.len(), input.id);

            let result = match self.generate_smart_screenshot(input).await {
                Ok(result) => result,
                Err(e) => {
                    warn!("Rejected project {:?}: {e}", input.id);
                    self.stats().record_outcome(None, false);
                    PipelineResult::failure(input.id.clone(), PipelineMetadata::default(), e.to_string())
                }
            };
            if let Some(store) = store {
                write_back(store, &result).await;
            }
            report.insert(result);
        }

        report.summary.log();
        report
    }
}

/// Persists one result. A store failure is logged; the result itself stands.
pub async fn write_back(store: &dyn ProjectStore, result: &PipelineResult) {
    if result.project_id.trim().is_empty() {
        return;
    }
    let update = match ProjectUpdate::from_result(result, Utc::now()) {
        Ok(update) => update,
        Err(e) => {
            warn!("Could not encode result for {}: {e}", result.project_id);
            return;
        }
    };
    match store.update(&result.project_id, &update).await {
        Ok(_) => debug!("Stored result for {}", result.project_id),
        Err(e) => warn!("Failed to store result for {}: {e}", result.project_id),
    }
}
