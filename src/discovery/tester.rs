//! URL health testing and ranking.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use log::{debug, info};

use crate::browser::scripts::{page_signals, PageSignals};
use crate::browser::{close_quietly, BrowserPage, BrowserSession, PageSetup, RequestFilter};
use crate::config::{Config, ScoringWeights};
use crate::discovery::candidates::generate_typed_candidates;
use crate::discovery::scoring::{score_candidate, Observation};
use crate::error_handling::BrowserError;
use crate::models::{UrlCandidate, UrlSource};
use crate::user_agent::DeviceProfile;
use crate::utils::elapsed_ms;

/// Result of [`UrlTester::find_best_url`].
#[derive(Debug, Clone, Default)]
pub struct CandidateRanking {
    /// The pick, see [`select_best`].
    pub best: Option<UrlCandidate>,
    /// Every tested candidate, by descending confidence.
    pub candidates: Vec<UrlCandidate>,
}

/// Loads candidate URLs in throwaway tabs and scores them.
pub struct UrlTester {
    session: Arc<dyn BrowserSession>,
    config: Arc<Config>,
}

impl UrlTester {
    pub fn new(session: Arc<dyn BrowserSession>, config: Arc<Config>) -> Self {
        Self { session, config }
    }

    /// Tests one URL. Never fails: problems yield a zero-confidence candidate
    /// flagged as an error page.
    pub async fn test_candidate(&self, url: &str, source: UrlSource) -> UrlCandidate {
        let profile = DeviceProfile::Desktop;
        let setup = PageSetup {
            viewport: profile.viewport(),
            user_agent: profile.user_agent(),
            request_filter: Some(RequestFilter::health_check()),
        };

        let page = match self.session.new_page(&setup).await {
            Ok(page) => page,
            Err(e) => {
                debug!("Could not open a tab to test {url}: {e}");
                return UrlCandidate::failed(url, source, e.to_string());
            }
        };

        let observed = self.observe(page.as_ref(), url).await;
        close_quietly(page).await;

        match observed {
            Ok(observation) => {
                let candidate = score_candidate(
                    url,
                    source,
                    &observation,
                    &self.config.patterns,
                    &self.config.weights,
                );
                debug!(
                    "Tested {url}: status={:?} access={} quality={} confidence={} login={} error={}",
                    candidate.status_code,
                    candidate.accessibility_score,
                    candidate.content_quality,
                    candidate.confidence,
                    candidate.is_login_page,
                    candidate.is_error_page
                );
                candidate
            }
            Err(e) => {
                debug!("Candidate {url} failed: {e}");
                UrlCandidate::failed(url, source, e.to_string())
            }
        }
    }

    async fn observe(&self, page: &dyn BrowserPage, url: &str) -> Result<Observation, BrowserError> {
        let start = Instant::now();
        let response = page.navigate(url, self.config.health_timeout()).await?;
        let load_time_ms = elapsed_ms(start);

        let value = page.evaluate(&page_signals(&self.config.patterns)).await?;
        let signals: PageSignals = serde_json::from_value(value)
            .map_err(|e| BrowserError::Evaluation(format!("unexpected page signals: {e}")))?;

        Ok(Observation {
            status: response.status,
            final_url: response.final_url,
            load_time_ms,
            signals,
        })
    }

    /// Tests candidates in bounded concurrent batches and returns them ranked.
    pub async fn test_all(&self, candidates: Vec<(String, UrlSource)>) -> Vec<UrlCandidate> {
        let batch_size = self.config.batch_size.max(1);
        let total_batches = candidates.len().div_ceil(batch_size);
        let mut results = Vec::with_capacity(candidates.len());

        for (index, batch) in candidates.chunks(batch_size).enumerate() {
            let tests = batch
                .iter()
                .map(|(url, source)| self.test_candidate(url, *source));
            results.extend(join_all(tests).await);

            if index + 1 < total_batches && !self.config.batch_pause().is_zero() {
                tokio::time::sleep(self.config.batch_pause()).await;
            }
        }

        rank_candidates(&mut results);
        results
    }

    /// Generates, tests and ranks every candidate for a project.
    pub async fn find_best_url(
        &self,
        project_name: &str,
        deployment_url: Option<&str>,
        source_repo_url: Option<&str>,
    ) -> CandidateRanking {
        let generated = generate_typed_candidates(project_name, deployment_url, source_repo_url);
        info!(
            "Testing {} candidate URLs for {}",
            generated.len(),
            project_name
        );

        let candidates = self.test_all(generated).await;
        let best = select_best(&candidates, &self.config.weights).cloned();
        match best {
            Some(ref b) => info!(
                "Best URL for {project_name}: {} (confidence {}, screenshotable {})",
                b.url, b.confidence, b.screenshotable
            ),
            None => info!("No candidate URLs for {project_name}"),
        }

        CandidateRanking { best, candidates }
    }

    /// Tests operator-supplied URLs.
    pub async fn test_urls(&self, candidates: Vec<UrlCandidate>) -> Vec<UrlCandidate> {
        self.test_all(
            candidates
                .into_iter()
                .map(|c| (c.url, c.source))
                .collect(),
        )
        .await
    }
}

/// Sorts by descending confidence. Stable, so ties keep generation order.
pub fn rank_candidates(candidates: &mut [UrlCandidate]) {
    candidates.sort_by(|a, b| b.confidence.cmp(&a.confidence));
}

/// First screenshotable candidate, else the first one above the usable
/// threshold, else the first one at all.
pub fn select_best<'a>(
    ranked: &'a [UrlCandidate],
    weights: &ScoringWeights,
) -> Option<&'a UrlCandidate> {
    ranked
        .iter()
        .find(|c| c.screenshotable)
        .or_else(|| {
            ranked
                .iter()
                .find(|c| c.confidence > weights.usable_confidence)
        })
        .or_else(|| ranked.first())
}
