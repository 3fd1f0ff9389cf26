//! Source-repository REST client (GitHub API shape).

use base64::Engine as _;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error_handling::FallbackError;
use crate::utils::RepoRef;

/// Repository metadata used to enrich placeholders and resolve README paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMetadata {
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub default_branch: Option<String>,
}

#[derive(Deserialize)]
struct ReadmeResponse {
    content: String,
    #[serde(default)]
    encoding: String,
}

/// Token-authenticated client for README and repository metadata calls.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: String,
    raw_base: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            api_base: config.github_api_base.trim_end_matches('/').to_string(),
            raw_base: config.github_raw_base.trim_end_matches('/').to_string(),
            token: config.github_token.clone().filter(|t| !t.is_empty()),
        }
    }

    /// Raw-content base for relative README paths, ending in `/`.
    pub fn raw_content_base(&self, repo: &RepoRef, branch: &str) -> String {
        format!("{}/{}/{}/{}/", self.raw_base, repo.owner, repo.repo, branch)
    }

    /// Decoded README text. `Ok(None)` when there is none or access is denied.
    pub async fn fetch_readme(&self, repo: &RepoRef) -> Result<Option<String>, FallbackError> {
        let url = format!("{}/repos/{}/{}/readme", self.api_base, repo.owner, repo.repo);
        let Some(response) = self.get(&url).await? else {
            return Ok(None);
        };

        let readme: ReadmeResponse = response.json().await?;
        if !readme.encoding.is_empty() && readme.encoding != "base64" {
            return Err(FallbackError::Upstream(format!(
                "unsupported README encoding: {}",
                readme.encoding
            )));
        }

        let compact: String = readme
            .content
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| FallbackError::Upstream(format!("README is not valid base64: {e}")))?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Repository metadata. `Ok(None)` when the repository is missing or private.
    pub async fn fetch_metadata(
        &self,
        repo: &RepoRef,
    ) -> Result<Option<RepoMetadata>, FallbackError> {
        let url = format!("{}/repos/{}/{}", self.api_base, repo.owner, repo.repo);
        match self.get(&url).await? {
            Some(response) => Ok(Some(response.json().await?)),
            None => Ok(None),
        }
    }

    async fn get(&self, url: &str) -> Result<Option<reqwest::Response>, FallbackError> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github.v3+json");
        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(Some(response));
        }
        if matches!(
            status,
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED
        ) {
            debug!("{url} answered {status}, treating as unavailable");
            return Ok(None);
        }
        Err(FallbackError::Upstream(format!("{url} answered {status}")))
    }
}
