//! URL candidate generation. Pure string work, no network access.

use crate::models::{UrlCandidate, UrlSource};
use crate::utils::sanitize::slugify;
use crate::utils::{https_upgrade, parse_repo_url, validate_and_normalize_url};

/// Hosting patterns tried for the bare slug, in priority order.
const SLUG_PATTERNS: &[&str] = &[
    "https://{}.com",
    "https://www.{}.com",
    "https://{}.vercel.app",
    "https://{}.netlify.app",
    "https://{}.app",
    "https://{}.io",
    "https://{}.dev",
];

/// Name suffixes people commonly add when the bare name is taken.
const NAME_SUFFIXES: &[&str] = &["app", "web", "frontend", "demo", "project"];

/// Platforms on which suffixed names are tried.
const SUFFIX_HOSTS: &[&str] = &["vercel.app", "netlify.app"];

/// Ordered, deduplicated candidate URLs for a project.
///
/// Deterministic: the same inputs always produce the same list.
pub fn generate_candidates(
    project_name: &str,
    deployment_url: Option<&str>,
    source_repo_url: Option<&str>,
) -> Vec<String> {
    generate_typed_candidates(project_name, deployment_url, source_repo_url)
        .into_iter()
        .map(|(url, _)| url)
        .collect()
}

/// Same as [`generate_candidates`], keeping each URL's provenance.
pub fn generate_typed_candidates(
    project_name: &str,
    deployment_url: Option<&str>,
    source_repo_url: Option<&str>,
) -> Vec<(String, UrlSource)> {
    let mut out: Vec<(String, UrlSource)> = Vec::new();
    let mut push = |url: String, source: UrlSource| {
        if !out.iter().any(|(existing, _)| existing == &url) {
            out.push((url, source));
        }
    };

    if let Some(deployment) = deployment_url.and_then(validate_and_normalize_url) {
        let upgraded = https_upgrade(&deployment);
        push(deployment, UrlSource::Deployment);
        if let Some(upgraded) = upgraded {
            push(upgraded, UrlSource::Deployment);
        }
    }

    let slug = slugify(project_name);
    if !slug.is_empty() {
        for pattern in SLUG_PATTERNS {
            push(pattern.replace("{}", &slug), UrlSource::DomainPattern);
        }
        for host in SUFFIX_HOSTS {
            for suffix in NAME_SUFFIXES {
                push(
                    format!("https://{slug}-{suffix}.{host}"),
                    UrlSource::DomainPattern,
                );
            }
        }
    }

    if let Some(repo) = source_repo_url.and_then(parse_repo_url) {
        push(repo.pages_url(), UrlSource::SourceRepoPages);
    }

    out
}

/// Untested candidates for manually supplied URLs. Invalid entries are dropped.
pub fn manual_candidates(urls: &[String]) -> Vec<UrlCandidate> {
    let mut seen: Vec<String> = Vec::new();
    for url in urls.iter().filter_map(|u| validate_and_normalize_url(u)) {
        if !seen.contains(&url) {
            seen.push(url);
        }
    }
    seen.into_iter()
        .map(|url| UrlCandidate::untested(url, UrlSource::Manual))
        .collect()
}
