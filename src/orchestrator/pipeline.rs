//! Per-project pipeline: rank URLs, capture, try alternatives, fall back.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use log::{error, info, warn};

use crate::browser::BrowserSession;
use crate::capture::{CaptureEngine, CaptureOptions};
use crate::config::{Config, MAX_ALTERNATIVE_URLS};
use crate::discovery::{manual_candidates, rank_candidates, select_best, UrlTester};
use crate::error_handling::{ErrorType, PipelineError, PipelineStats};
use crate::fallback::{FallbackChain, FallbackRequest, GitHubClient};
use crate::models::{
    PipelineMetadata, PipelineResult, ProjectInput, ScreenshotResult, Strategy, UrlCandidate,
};
use crate::utils::elapsed_ms;

/// Capture that produced the project's image.
struct CaptureWin {
    candidate: UrlCandidate,
    screenshot: ScreenshotResult,
}

/// Composes URL testing, capture and the fallback chain for one project at a time.
///
/// Holds the shared browser session but never closes it; the owner of the
/// session does that once the run is over.
pub struct Pipeline {
    tester: UrlTester,
    engine: CaptureEngine,
    fallback: FallbackChain,
    config: Arc<Config>,
    stats: Arc<PipelineStats>,
}

impl Pipeline {
    pub fn new(
        session: Arc<dyn BrowserSession>,
        fallback: FallbackChain,
        config: Arc<Config>,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            tester: UrlTester::new(Arc::clone(&session), Arc::clone(&config)),
            engine: CaptureEngine::new(session, Arc::clone(&config), Arc::clone(&stats)),
            fallback,
            config,
            stats,
        }
    }

    /// Pipeline with the standard fallback tiers.
    pub fn standard(
        session: Arc<dyn BrowserSession>,
        github: Arc<GitHubClient>,
        config: Arc<Config>,
        stats: Arc<PipelineStats>,
    ) -> Self {
        let fallback = FallbackChain::standard(Arc::clone(&config), github, Arc::clone(&stats));
        Self::new(session, fallback, config, stats)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats(&self) -> &Arc<PipelineStats> {
        &self.stats
    }

    /// Produces an image for one project.
    ///
    /// Only malformed input is an `Err`, and it is rejected before any browser
    /// or network work. Every other outcome, including a terminal failure of
    /// all fallback tiers, is a [`PipelineResult`].
    pub async fn generate_smart_screenshot(
        &self,
        input: &ProjectInput,
    ) -> Result<PipelineResult, PipelineError> {
        input.validate()?;

        let start = Instant::now();
        let mut metadata = PipelineMetadata::default();
        info!("Generating image for {} ({})", input.name, input.id);

        let captured = AssertUnwindSafe(self.capture_phase(input, &mut metadata))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                error!(
                    "URL testing or capture crashed for {}, falling back",
                    input.id
                );
                self.stats.increment_error(ErrorType::UnexpectedFailure);
                None
            });

        let mut result = match captured {
            Some(win) => {
                metadata.winning_url = Some(win.candidate.url.clone());
                metadata.winning_confidence = Some(win.candidate.confidence);
                metadata.capture = Some(win.screenshot.metadata);
                PipelineResult {
                    project_id: input.id.clone(),
                    success: true,
                    image_path: win.screenshot.image_path,
                    strategy: Some(Strategy::Capture),
                    metadata,
                    error: None,
                }
            }
            None => {
                let kept = metadata.clone();
                AssertUnwindSafe(self.fallback_phase(input, metadata))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        error!("Fallback crashed for {}", input.id);
                        self.stats.increment_error(ErrorType::UnexpectedFailure);
                        PipelineResult::failure(
                            input.id.clone(),
                            kept,
                            "All image strategies failed: fallback crashed",
                        )
                    })
            }
        };

        result.metadata.processing_time_ms = elapsed_ms(start);
        self.stats.record_outcome(result.strategy, result.success);
        match result.strategy {
            Some(strategy) if result.success => info!(
                "{}: {} -> {} ({} capture attempt(s), {}ms)",
                input.id,
                strategy,
                result.image_path.as_deref().unwrap_or("-"),
                result.metadata.total_attempts,
                result.metadata.processing_time_ms
            ),
            _ => warn!(
                "{}: no image produced: {}",
                input.id,
                result.error.as_deref().unwrap_or("unknown error")
            ),
        }
        Ok(result)
    }

    /// Candidate URLs for `input`, tested and ranked, manual overrides included.
    pub async fn rank_candidates_for(&self, input: &ProjectInput) -> Vec<UrlCandidate> {
        let ranking = self
            .tester
            .find_best_url(
                &input.name,
                input.deployment_url.as_deref(),
                input.source_repo_url.as_deref(),
            )
            .await;
        let mut candidates = ranking.candidates;

        let manual: Vec<UrlCandidate> = manual_candidates(&input.manual_urls)
            .into_iter()
            .filter(|m| !candidates.iter().any(|c| c.url == m.url))
            .collect();
        if !manual.is_empty() {
            info!(
                "Testing {} manual URL(s) for {}",
                manual.len(),
                input.name
            );
            candidates.extend(self.tester.test_urls(manual).await);
            rank_candidates(&mut candidates);
        }
        candidates
    }

    async fn capture_phase(
        &self,
        input: &ProjectInput,
        metadata: &mut PipelineMetadata,
    ) -> Option<CaptureWin> {
        let candidates = self.rank_candidates_for(input).await;
        metadata.candidates_tested = candidates.len();

        let weights = &self.config.weights;
        let primary = select_best(&candidates, weights)?;
        let options = CaptureOptions::from_config(&self.config);

        if primary.screenshotable {
            if let Some(win) = self.capture_candidate(primary, &input.name, &options, metadata).await {
                return Some(win);
            }
        } else {
            info!(
                "Best URL {} for {} is not screenshotable (confidence {})",
                primary.url, input.name, primary.confidence
            );
            self.record_gate(primary);
        }

        let alternative_options = options.with_retry_count(self.config.alternative_retry_count);
        let alternatives = candidates
            .iter()
            .filter(|c| c.url != primary.url)
            .filter(|c| c.confidence > weights.alternative_min_confidence && !c.is_gated())
            .take(MAX_ALTERNATIVE_URLS);
        for alternative in alternatives {
            info!(
                "Trying alternative URL {} for {} (confidence {})",
                alternative.url, input.name, alternative.confidence
            );
            if let Some(win) = self
                .capture_candidate(alternative, &input.name, &alternative_options, metadata)
                .await
            {
                return Some(win);
            }
        }
        None
    }

    async fn capture_candidate(
        &self,
        candidate: &UrlCandidate,
        project_name: &str,
        options: &CaptureOptions,
        metadata: &mut PipelineMetadata,
    ) -> Option<CaptureWin> {
        let screenshot = self.engine.capture(&candidate.url, project_name, options).await;
        metadata.total_attempts += screenshot.attempts;
        if screenshot.success {
            Some(CaptureWin {
                candidate: candidate.clone(),
                screenshot,
            })
        } else {
            None
        }
    }

    fn record_gate(&self, candidate: &UrlCandidate) {
        if candidate.is_login_page {
            self.stats.increment_error(ErrorType::LoginGate);
        } else if candidate.is_error_page {
            self.stats.increment_error(ErrorType::ErrorPage);
        }
    }

    async fn fallback_phase(
        &self,
        input: &ProjectInput,
        mut metadata: PipelineMetadata,
    ) -> PipelineResult {
        info!("Falling back for {}", input.name);
        let request = FallbackRequest {
            framework: input.framework.clone(),
            technologies: input.technologies.clone(),
            description: input.description.clone(),
            category: input.category.clone(),
            ..FallbackRequest::new(input.name.clone())
        }
        .with_source_repo_url(input.source_repo_url.as_deref());

        let outcome = self.fallback.get_best_fallback(request).await;
        match outcome.image {
            Some(image) => {
                metadata.fallback_source = Some(image.source);
                PipelineResult {
                    project_id: input.id.clone(),
                    success: true,
                    image_path: Some(image.location),
                    strategy: Some(Strategy::from(image.kind)),
                    metadata,
                    error: None,
                }
            }
            None => {
                let detail = if outcome.errors.is_empty() {
                    "no fallback tier produced an image".to_string()
                } else {
                    outcome.errors.join("; ")
                };
                PipelineResult::failure(
                    input.id.clone(),
                    metadata,
                    format!("All image strategies failed: {detail}"),
                )
            }
        }
    }
}
