//! Records passed between the pipeline stages.

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter as EnumIterMacro;

use crate::error_handling::PipelineError;

/// A project as supplied by the project store. Immutable for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub id: String,
    pub name: String,
    /// Known deployment URL
    pub deployment_url: Option<String>,
    /// Source repository URL (e.g. `https://github.com/owner/repo`)
    pub source_repo_url: Option<String>,
    /// Operator-supplied URL overrides
    #[serde(default)]
    pub manual_urls: Vec<String>,
    pub framework: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl ProjectInput {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_deployment_url(mut self, url: impl Into<String>) -> Self {
        self.deployment_url = Some(url.into());
        self
    }

    pub fn with_source_repo_url(mut self, url: impl Into<String>) -> Self {
        self.source_repo_url = Some(url.into());
        self
    }

    pub fn with_manual_urls(mut self, urls: Vec<String>) -> Self {
        self.manual_urls = urls;
        self
    }

    pub fn with_technologies(mut self, technologies: Vec<String>) -> Self {
        self.technologies = technologies;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Rejects inputs that can never produce a result (no id, no name).
    ///
    /// Called at the pipeline boundary before any browser or network resource
    /// is touched.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.id.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "project id is missing".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(PipelineError::InvalidInput(format!(
                "project {} has no name",
                self.id
            )));
        }
        Ok(())
    }
}

/// Where a candidate URL came from. Determines its confidence bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UrlSource {
    Deployment,
    SourceRepoPages,
    DomainPattern,
    Manual,
}

impl UrlSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlSource::Deployment => "deployment",
            UrlSource::SourceRepoPages => "source-repo-pages",
            UrlSource::DomainPattern => "domain-pattern",
            UrlSource::Manual => "manual",
        }
    }
}

/// A URL hypothesized to be a project's live deployment, plus its test results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlCandidate {
    pub url: String,
    pub source: UrlSource,
    /// 0-100
    pub accessibility_score: u8,
    /// 0-100
    pub content_quality: u8,
    /// 0-100
    pub confidence: u8,
    pub is_login_page: bool,
    pub is_error_page: bool,
    pub has_main_content: bool,
    pub load_time_ms: u64,
    pub status_code: Option<u16>,
    /// URL after redirects
    pub final_url: Option<String>,
    pub title: Option<String>,
    pub screenshotable: bool,
    /// Why the test failed, when it did
    pub error: Option<String>,
}

impl UrlCandidate {
    /// A candidate that has not been tested yet.
    pub fn untested(url: impl Into<String>, source: UrlSource) -> Self {
        Self {
            url: url.into(),
            source,
            accessibility_score: 0,
            content_quality: 0,
            confidence: 0,
            is_login_page: false,
            is_error_page: false,
            has_main_content: false,
            load_time_ms: 0,
            status_code: None,
            final_url: None,
            title: None,
            screenshotable: false,
            error: None,
        }
    }

    /// A candidate whose test could not complete. Zero confidence, flagged as error page.
    pub fn failed(url: impl Into<String>, source: UrlSource, error: impl Into<String>) -> Self {
        Self {
            is_error_page: true,
            error: Some(error.into()),
            ..Self::untested(url, source)
        }
    }

    /// Login walls and error pages are never captured.
    pub fn is_gated(&self) -> bool {
        self.is_login_page || self.is_error_page
    }
}

/// Details recorded for one capture attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureMetadata {
    pub source_url: String,
    pub final_url: Option<String>,
    pub title: Option<String>,
    pub load_time_ms: u64,
    pub has_content: bool,
    pub has_hero: bool,
    pub width: u32,
    pub height: u32,
}

/// Outcome of [`crate::capture::CaptureEngine::capture`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotResult {
    pub success: bool,
    /// Public path of the written image
    pub image_path: Option<String>,
    pub metadata: CaptureMetadata,
    /// Attempts made, including the successful one
    pub attempts: u32,
    pub error: Option<String>,
}

/// Fallback tiers, in the order they are tried by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackKind {
    ReadmeImage,
    CachedScreenshot,
    GeneratedPlaceholder,
}

impl FallbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackKind::ReadmeImage => "readme-image",
            FallbackKind::CachedScreenshot => "cached-screenshot",
            FallbackKind::GeneratedPlaceholder => "generated-placeholder",
        }
    }
}

/// An image produced by a fallback tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackImage {
    pub kind: FallbackKind,
    /// Remote URL (README images) or public path (cache, placeholder)
    pub location: String,
    /// Human-readable provenance, e.g. the README the image came from
    pub source: String,
    /// 0-100
    pub confidence: u8,
}

/// Which strategy produced a project's image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIterMacro)]
pub enum Strategy {
    #[serde(rename = "capture")]
    Capture,
    #[serde(rename = "fallback-readme")]
    FallbackReadme,
    #[serde(rename = "fallback-cached")]
    FallbackCached,
    #[serde(rename = "fallback-placeholder")]
    FallbackPlaceholder,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Capture => "capture",
            Strategy::FallbackReadme => "fallback-readme",
            Strategy::FallbackCached => "fallback-cached",
            Strategy::FallbackPlaceholder => "fallback-placeholder",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "capture" => Some(Strategy::Capture),
            "fallback-readme" => Some(Strategy::FallbackReadme),
            "fallback-cached" => Some(Strategy::FallbackCached),
            "fallback-placeholder" => Some(Strategy::FallbackPlaceholder),
            _ => None,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<FallbackKind> for Strategy {
    fn from(kind: FallbackKind) -> Self {
        match kind {
            FallbackKind::ReadmeImage => Strategy::FallbackReadme,
            FallbackKind::CachedScreenshot => Strategy::FallbackCached,
            FallbackKind::GeneratedPlaceholder => Strategy::FallbackPlaceholder,
        }
    }
}

/// Diagnostics recorded for every pipeline run, whatever the outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineMetadata {
    /// Capture attempts across every URL tried
    pub total_attempts: u32,
    pub processing_time_ms: u64,
    pub candidates_tested: usize,
    pub winning_url: Option<String>,
    pub winning_confidence: Option<u8>,
    /// Provenance of a fallback image
    pub fallback_source: Option<String>,
    pub capture: Option<CaptureMetadata>,
}

/// Per-project outcome, persisted back to the project store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub project_id: String,
    pub success: bool,
    pub image_path: Option<String>,
    pub strategy: Option<Strategy>,
    pub metadata: PipelineMetadata,
    pub error: Option<String>,
}

impl PipelineResult {
    /// Terminal failure with descriptive text.
    pub fn failure(
        project_id: impl Into<String>,
        metadata: PipelineMetadata,
        error: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            success: false,
            image_path: None,
            strategy: None,
            metadata,
            error: Some(error.into()),
        }
    }
}
