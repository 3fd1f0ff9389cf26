//! One-shot screenshot runs against the project store.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;

use crate::browser::{BrowserSession, ChromiumSession};
use crate::config::Config;
use crate::error_handling::{PipelineError, PipelineStats};
use crate::fallback::GitHubClient;
use crate::initialization::{init_client, init_output_dirs};
use crate::models::{PipelineResult, ProjectInput};
use crate::orchestrator::{BulkSummary, Pipeline};
use crate::storage::{ProjectRecord, ProjectStore, SqliteProjectStore};

/// Which projects a run processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Ids(Vec<String>),
    /// Every project without an image
    AllPending,
    All,
}

impl Selection {
    /// Resolves operator flags. Explicit ids win over `all_pending`, which wins over `all`.
    pub fn from_flags(ids: Vec<String>, all_pending: bool, all: bool) -> Result<Self, PipelineError> {
        let ids: Vec<String> = ids
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        if !ids.is_empty() {
            Ok(Selection::Ids(ids))
        } else if all_pending {
            Ok(Selection::AllPending)
        } else if all {
            Ok(Selection::All)
        } else {
            Err(PipelineError::InvalidInput(
                "no projects selected (pass a project id, all-pending or all)".to_string(),
            ))
        }
    }
}

/// Everything a run needs. Built once per process and shared by runs; failure
/// counters are not shared and start at zero for every run.
#[derive(Clone)]
pub struct RunResources {
    pub config: Arc<Config>,
    pub store: Arc<dyn ProjectStore>,
    pub session: Arc<dyn BrowserSession>,
    pub github: Arc<GitHubClient>,
}

impl RunResources {
    /// Opens the SQLite store, builds the HTTP client and prepares a browser
    /// session. The browser itself starts on first use.
    pub async fn init(config: Config) -> Result<Self> {
        let store = SqliteProjectStore::open(&config.db_path)
            .await
            .with_context(|| format!("Failed to open project store {}", config.db_path.display()))?;
        init_output_dirs(&config)
            .await
            .context("Failed to create output directories")?;
        let client = init_client(&config).context("Failed to initialize HTTP client")?;
        let github = Arc::new(GitHubClient::new(client, &config));
        let session = Arc::new(ChromiumSession::new(config.chrome_path.clone()));

        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(store),
            session,
            github,
        })
    }
}

/// Outcome of [`run_screenshots`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Processed projects by id
    pub results: HashMap<String, PipelineResult>,
    /// Projects that already had an image
    pub skipped: Vec<String>,
    /// Requested ids with no project behind them
    pub not_found: Vec<String>,
    pub summary: BulkSummary,
    /// Non-zero failure counters of this run, by description
    pub failure_counts: BTreeMap<String, usize>,
    pub elapsed_seconds: f64,
}

/// Generates images for the selected projects and writes the results back.
///
/// Without `force`, projects that already have an image are skipped. The
/// browser session is closed before returning, on every path.
pub async fn run_screenshots(
    resources: &RunResources,
    selection: &Selection,
    force: bool,
) -> Result<RunReport> {
    let pipeline = Pipeline::standard(
        Arc::clone(&resources.session),
        Arc::clone(&resources.github),
        Arc::clone(&resources.config),
        Arc::new(PipelineStats::new()),
    );

    let outcome = process(&pipeline, resources, selection, force).await;
    if let Err(e) = resources.session.close().await {
        warn!("Failed to close browser session: {e}");
    }
    outcome
}

async fn process(
    pipeline: &Pipeline,
    resources: &RunResources,
    selection: &Selection,
    force: bool,
) -> Result<RunReport> {
    let start = Instant::now();
    let (records, not_found) = resolve(resources.store.as_ref(), selection).await?;

    let mut skipped = Vec::new();
    let mut inputs: Vec<ProjectInput> = Vec::with_capacity(records.len());
    for record in records {
        if record.has_image() && !force {
            info!("Skipping {}: already has an image", record.id);
            pipeline.stats().record_skip();
            skipped.push(record.id);
        } else {
            inputs.push(record.to_input());
        }
    }
    info!(
        "Processing {} project(s), {} skipped, {} not found",
        inputs.len(),
        skipped.len(),
        not_found.len()
    );

    let bulk = pipeline
        .generate_bulk_and_store(&inputs, resources.store.as_ref())
        .await;
    let mut summary = bulk.summary;
    for _ in &skipped {
        summary.record_skip();
    }

    let stats = pipeline.stats();
    print_error_statistics(stats);
    let failure_counts = stats
        .error_counts()
        .into_iter()
        .map(|(description, count)| (description.to_string(), count))
        .collect();

    Ok(RunReport {
        results: bulk.results,
        skipped,
        not_found,
        summary,
        failure_counts,
        elapsed_seconds: start.elapsed().as_secs_f64(),
    })
}

async fn resolve(
    store: &dyn ProjectStore,
    selection: &Selection,
) -> Result<(Vec<ProjectRecord>, Vec<String>)> {
    match selection {
        Selection::All => Ok((
            store.list_all().await.context("Failed to list projects")?,
            Vec::new(),
        )),
        Selection::AllPending => Ok((
            store
                .list_pending()
                .await
                .context("Failed to list pending projects")?,
            Vec::new(),
        )),
        Selection::Ids(ids) => {
            let mut records = Vec::with_capacity(ids.len());
            let mut missing = Vec::new();
            for id in ids {
                match store
                    .find(id)
                    .await
                    .with_context(|| format!("Failed to load project {id}"))?
                {
                    Some(record) => records.push(record),
                    None => {
                        warn!("Project {id} not found");
                        missing.push(id.clone());
                    }
                }
            }
            Ok((records, missing))
        }
    }
}

/// Logs the non-zero failure counters.
pub fn print_error_statistics(stats: &PipelineStats) {
    let total_errors = stats.total_errors();
    if total_errors > 0 {
        info!("Failure counts ({} total):", total_errors);
        for (description, count) in stats.error_counts() {
            info!("   {}: {}", description, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_prefers_ids() {
        let selection = Selection::from_flags(vec!["a".to_string()], true, false).unwrap();
        assert_eq!(selection, Selection::Ids(vec!["a".to_string()]));
    }

    #[test]
    fn test_selection_ignores_blank_ids() {
        let selection = Selection::from_flags(vec!["  ".to_string()], false, true).unwrap();
        assert_eq!(selection, Selection::All);
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        assert!(matches!(
            Selection::from_flags(Vec::new(), false, false),
            Err(PipelineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_print_error_statistics_does_not_panic() {
        let stats = PipelineStats::new();
        print_error_statistics(&stats);
        stats.increment_error(crate::error_handling::ErrorType::CacheMiss);
        print_error_statistics(&stats);
    }
}
