//! Fallback strategy chain.
//!
//! When no URL can be captured, the chain tries its tiers in order and stops at
//! the first that produces an image. The standard order is README image, cached
//! screenshot, generated placeholder; a tier is a [`FallbackStrategy`] value, so
//! adding one means adding it to the list.

mod cache;
mod github;
mod placeholder;
mod readme;

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::config::Config;
use crate::error_handling::{categorize_fallback_error, ErrorType, FallbackError, PipelineStats};
use crate::models::{FallbackImage, FallbackKind};
use crate::utils::{parse_repo_url, RepoRef};

pub use cache::{find_latest_screenshot, CachedScreenshotStrategy};
pub use github::{GitHubClient, RepoMetadata};
pub use placeholder::{
    category_color, render_placeholder_svg, tech_color, wrap_text, PlaceholderContent,
    PlaceholderStrategy,
};
pub use readme::{
    best_image, extract_image_urls, resolve_image_url, score_image_url, ReadmeImageStrategy,
};

/// Project facts available to the fallback tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackRequest {
    pub project_name: String,
    pub source_repo_url: Option<String>,
    /// Parsed from `source_repo_url` when the host is recognized.
    pub repo: Option<RepoRef>,
    /// Fetched once per chain run when `repo` is set.
    pub repo_metadata: Option<RepoMetadata>,
    pub framework: Option<String>,
    pub technologies: Vec<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl FallbackRequest {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            ..Default::default()
        }
    }

    pub fn with_source_repo_url(mut self, url: Option<&str>) -> Self {
        self.source_repo_url = url.map(str::to_string);
        self.repo = url.and_then(parse_repo_url);
        self
    }
}

/// One fallback tier.
#[async_trait]
pub trait FallbackStrategy: Send + Sync {
    fn kind(&self) -> FallbackKind;

    /// `Ok(None)` means "nothing here, try the next tier".
    async fn attempt(
        &self,
        request: &FallbackRequest,
    ) -> Result<Option<FallbackImage>, FallbackError>;
}

/// Outcome of [`FallbackChain::get_best_fallback`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FallbackResult {
    /// The winning image, if any tier produced one.
    pub image: Option<FallbackImage>,
    /// Tiers tried, in order.
    pub tried: Vec<FallbackKind>,
    /// Errors from tiers that failed outright.
    pub errors: Vec<String>,
}

impl FallbackResult {
    pub fn success(&self) -> bool {
        self.image.is_some()
    }
}

/// Ordered list of fallback tiers.
pub struct FallbackChain {
    strategies: Vec<Box<dyn FallbackStrategy>>,
    github: Option<Arc<GitHubClient>>,
    stats: Arc<PipelineStats>,
}

impl FallbackChain {
    pub fn new(
        strategies: Vec<Box<dyn FallbackStrategy>>,
        github: Option<Arc<GitHubClient>>,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            strategies,
            github,
            stats,
        }
    }

    /// README image, then cached screenshot, then placeholder.
    pub fn standard(
        config: Arc<Config>,
        github: Arc<GitHubClient>,
        stats: Arc<PipelineStats>,
    ) -> Self {
        let strategies: Vec<Box<dyn FallbackStrategy>> = vec![
            Box::new(ReadmeImageStrategy::new(
                Arc::clone(&github),
                config.patterns.clone(),
            )),
            Box::new(CachedScreenshotStrategy::new(Arc::clone(&config))),
            Box::new(PlaceholderStrategy::new(config)),
        ];
        Self::new(strategies, Some(github), stats)
    }

    /// Tries each tier in order; the first image wins.
    pub async fn get_best_fallback(&self, request: FallbackRequest) -> FallbackResult {
        let request = self.enrich(request).await;
        let mut result = FallbackResult::default();

        for strategy in &self.strategies {
            let kind = strategy.kind();
            result.tried.push(kind);
            match strategy.attempt(&request).await {
                Ok(Some(image)) => {
                    info!(
                        "Fallback {} produced {} for {}",
                        kind.as_str(),
                        image.location,
                        request.project_name
                    );
                    result.image = Some(image);
                    return result;
                }
                Ok(None) => {
                    debug!("Fallback {} found nothing for {}", kind.as_str(), request.project_name);
                    self.stats.increment_error(miss_error_type(kind));
                }
                Err(e) => {
                    warn!(
                        "Fallback {} failed for {}: {e}",
                        kind.as_str(),
                        request.project_name
                    );
                    self.stats.increment_error(categorize_fallback_error(&e));
                    result.errors.push(format!("{}: {e}", kind.as_str()));
                }
            }
        }

        result
    }

    /// Adds repository metadata; failures just leave it out.
    async fn enrich(&self, mut request: FallbackRequest) -> FallbackRequest {
        if request.repo_metadata.is_some() {
            return request;
        }
        let (Some(github), Some(repo)) = (self.github.as_ref(), request.repo.as_ref()) else {
            return request;
        };
        match github.fetch_metadata(repo).await {
            Ok(metadata) => request.repo_metadata = metadata,
            Err(e) => {
                debug!("Repository metadata unavailable for {}/{}: {e}", repo.owner, repo.repo);
                self.stats.increment_error(ErrorType::ReadmeUnavailable);
            }
        }
        request
    }
}

fn miss_error_type(kind: FallbackKind) -> ErrorType {
    match kind {
        FallbackKind::ReadmeImage => ErrorType::NoReadmeImages,
        FallbackKind::CachedScreenshot => ErrorType::CacheMiss,
        FallbackKind::GeneratedPlaceholder => ErrorType::PlaceholderFailed,
    }
}
