//! Project store records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{PipelineResult, ProjectInput, Strategy};

/// A project row as kept by the project store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    /// Live deployment URL; overwritten with the winning URL after a capture
    pub url: Option<String>,
    pub github_url: Option<String>,
    pub manual_urls: Vec<String>,
    pub framework: Option<String>,
    pub technologies: Vec<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub screenshot_strategy: Option<String>,
    pub screenshot_metadata: Option<serde_json::Value>,
    pub last_screenshot_at: Option<DateTime<Utc>>,
}

impl ProjectRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// True when a previous run left an image behind.
    pub fn has_image(&self) -> bool {
        self.image_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }

    /// The pipeline's view of this record.
    pub fn to_input(&self) -> ProjectInput {
        ProjectInput {
            id: self.id.clone(),
            name: self.name.clone(),
            deployment_url: self.url.clone(),
            source_repo_url: self.github_url.clone(),
            manual_urls: self.manual_urls.clone(),
            framework: self.framework.clone(),
            technologies: self.technologies.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
        }
    }
}

/// Partial update written back after a pipeline run. `None` leaves a column alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectUpdate {
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub screenshot_strategy: Option<String>,
    pub screenshot_metadata: Option<serde_json::Value>,
    pub last_screenshot_at: Option<DateTime<Utc>>,
}

impl ProjectUpdate {
    /// Write-back for one pipeline result.
    ///
    /// The winning URL replaces `url` only when the image came from a capture.
    /// Diagnostics and the timestamp are written whatever the outcome.
    pub fn from_result(result: &PipelineResult, now: DateTime<Utc>) -> Result<Self, serde_json::Error> {
        let url = match result.strategy {
            Some(Strategy::Capture) => result.metadata.winning_url.clone(),
            _ => None,
        };
        let metadata = serde_json::json!({
            "success": result.success,
            "error": result.error,
            "details": serde_json::to_value(&result.metadata)?,
        });

        Ok(Self {
            url,
            image_url: result.image_path.clone(),
            screenshot_strategy: result.strategy.map(|s| s.as_str().to_string()),
            screenshot_metadata: Some(metadata),
            last_screenshot_at: Some(now),
        })
    }
}
