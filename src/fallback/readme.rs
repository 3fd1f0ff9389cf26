//! README image extraction tier.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use log::{debug, info};
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::config::{PatternTables, README_MIN_CONFIDENCE};
use crate::error_handling::FallbackError;
use crate::models::{FallbackImage, FallbackKind};

use super::{FallbackRequest, FallbackStrategy, GitHubClient};

/// Score every README image starts from.
const BASE_IMAGE_SCORE: i32 = 50;

/// `![alt](src "optional title")` and `![alt](<src>)`
static MARKDOWN_IMAGE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"!\[[^\]]*\]\(\s*<?([^)\s>]+)>?(?:\s+["'][^"']*["'])?\s*\)"#).ok()
});

/// Image sources in order of appearance: Markdown images first, then `<img>` tags.
/// Duplicates are dropped.
pub fn extract_image_urls(readme: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    if let Some(re) = MARKDOWN_IMAGE.as_ref() {
        found.extend(
            re.captures_iter(readme)
                .filter_map(|c| c.get(1).map(|m| m.as_str().to_string())),
        );
    }

    let fragment = Html::parse_fragment(readme);
    if let Ok(selector) = Selector::parse("img[src]") {
        found.extend(
            fragment
                .select(&selector)
                .filter_map(|img| img.value().attr("src"))
                .map(|src| src.trim().to_string()),
        );
    }

    let mut unique = Vec::with_capacity(found.len());
    for src in found {
        if !src.is_empty() && !unique.contains(&src) {
            unique.push(src);
        }
    }
    unique
}

/// Absolute URL for an image source. Relative paths (including `/`-rooted ones)
/// resolve against the repository's raw-content base. `data:` URIs are dropped.
pub fn resolve_image_url(src: &str, raw_base: &str) -> Option<String> {
    let src = src.trim();
    if src.starts_with("http://") || src.starts_with("https://") {
        return Some(src.to_string());
    }
    if let Some(rest) = src.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if src.starts_with("data:") || src.starts_with('#') {
        return None;
    }

    let base = Url::parse(raw_base).ok()?;
    let relative = src.trim_start_matches('/');
    base.join(relative).ok().map(String::from)
}

/// 50, plus or minus the keyword weights found in the URL, clamped to 0-100.
pub fn score_image_url(url: &str, patterns: &PatternTables) -> u8 {
    let lower = url.to_lowercase();
    let mut score = BASE_IMAGE_SCORE;
    for (keyword, weight) in &patterns.readme_positive_keywords {
        if lower.contains(keyword.as_str()) {
            score += weight;
        }
    }
    for (keyword, weight) in &patterns.readme_negative_keywords {
        if lower.contains(keyword.as_str()) {
            score -= weight;
        }
    }
    score.clamp(0, 100) as u8
}

/// Picks the best-scoring image at or above the minimum confidence.
/// Ties go to the earlier image.
pub fn best_image(
    readme: &str,
    raw_base: &str,
    patterns: &PatternTables,
    min_confidence: u8,
) -> Option<(String, u8)> {
    let mut best: Option<(String, u8)> = None;
    for url in extract_image_urls(readme)
        .iter()
        .filter_map(|src| resolve_image_url(src, raw_base))
    {
        let score = score_image_url(&url, patterns);
        if score < min_confidence {
            debug!("Discarding README image {url} (score {score})");
            continue;
        }
        if best.as_ref().map_or(true, |(_, s)| score > *s) {
            best = Some((url, score));
        }
    }
    best
}

/// Fallback tier that reuses an image from the project's README.
pub struct ReadmeImageStrategy {
    github: Arc<GitHubClient>,
    patterns: PatternTables,
}

impl ReadmeImageStrategy {
    pub fn new(github: Arc<GitHubClient>, patterns: PatternTables) -> Self {
        Self { github, patterns }
    }
}

#[async_trait]
impl FallbackStrategy for ReadmeImageStrategy {
    fn kind(&self) -> FallbackKind {
        FallbackKind::ReadmeImage
    }

    async fn attempt(
        &self,
        request: &FallbackRequest,
    ) -> Result<Option<FallbackImage>, FallbackError> {
        let Some(repo) = request.repo.as_ref() else {
            return Ok(None);
        };
        let Some(readme) = self.github.fetch_readme(repo).await? else {
            debug!("No README for {}/{}", repo.owner, repo.repo);
            return Ok(None);
        };

        let branch = request
            .repo_metadata
            .as_ref()
            .and_then(|m| m.default_branch.as_deref())
            .unwrap_or("HEAD");
        let raw_base = self.github.raw_content_base(repo, branch);

        Ok(
            best_image(&readme, &raw_base, &self.patterns, README_MIN_CONFIDENCE).map(
                |(url, confidence)| {
                    info!("Using README image {url} (confidence {confidence})");
                    FallbackImage {
                        kind: FallbackKind::ReadmeImage,
                        location: url,
                        source: format!("README of {}/{}", repo.owner, repo.repo),
                        confidence,
                    }
                },
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "https://raw.githubusercontent.com/alice/shop/main/";

    #[test]
    fn test_extracts_markdown_and_html_images() {
        let readme = r#"
# Shop
[![Build](https://img.shields.io/badge/build-passing-green.svg)](https://ci)
![Screenshot](./docs/screenshot.png "Home page")
<p align="center"><img src="assets/logo.svg" width="120"></p>
![dup](./docs/screenshot.png)
"#;
        assert_eq!(
            extract_image_urls(readme),
            vec![
                "https://img.shields.io/badge/build-passing-green.svg",
                "./docs/screenshot.png",
                "assets/logo.svg",
            ]
        );
    }

    #[test]
    fn test_resolve_relative_paths() {
        assert_eq!(
            resolve_image_url("./docs/a.png", RAW).as_deref(),
            Some("https://raw.githubusercontent.com/alice/shop/main/docs/a.png")
        );
        assert_eq!(
            resolve_image_url("/docs/a.png", RAW).as_deref(),
            Some("https://raw.githubusercontent.com/alice/shop/main/docs/a.png")
        );
        assert_eq!(
            resolve_image_url("//cdn.example.com/a.png", RAW).as_deref(),
            Some("https://cdn.example.com/a.png")
        );
        assert_eq!(resolve_image_url("data:image/png;base64,AAAA", RAW), None);
    }

    #[test]
    fn test_scoring_prefers_screenshots_over_badges() {
        let patterns = PatternTables::default();
        let screenshot = score_image_url("https://x/docs/screenshot.png", &patterns);
        let badge = score_image_url("https://img.shields.io/badge/ci.svg", &patterns);
        let logo = score_image_url("https://x/assets/logo.svg", &patterns);
        assert_eq!(screenshot, 85);
        assert_eq!(badge, 0);
        assert_eq!(logo, 20);
    }

    #[test]
    fn test_best_image_discards_low_scores() {
        let patterns = PatternTables::default();
        let readme = "![logo](assets/logo.svg)\n![badge](https://img.shields.io/badge/x.svg)";
        assert_eq!(best_image(readme, RAW, &patterns, 30), None);

        let readme = "![logo](assets/logo.svg)\n![Demo](docs/demo.gif)\n![shot](docs/screenshot.png)";
        let (url, score) = best_image(readme, RAW, &patterns, 30).unwrap();
        assert_eq!(
            url,
            "https://raw.githubusercontent.com/alice/shop/main/docs/screenshot.png"
        );
        assert_eq!(score, 85);
    }
}
