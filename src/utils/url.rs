//! URL validation and normalization utilities.

use log::warn;

use crate::config::MAX_URL_LENGTH;

/// Validates and normalizes a URL.
///
/// Trims whitespace, adds an `https://` prefix when no scheme is present, then
/// checks that the result parses and uses http/https. The returned form is the
/// parsed URL (lowercase scheme and host) without the bare root `/`. Logs a
/// warning and returns `None` if the URL is empty, too long, or invalid.
pub fn validate_and_normalize_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    if url.len() > MAX_URL_LENGTH {
        warn!(
            "Skipping URL exceeding maximum length ({} > {}): {}...",
            url.len(),
            MAX_URL_LENGTH,
            url.chars().take(50).collect::<String>()
        );
        return None;
    }

    let normalized = if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{url}")
    };

    match url::Url::parse(&normalized) {
        Ok(parsed) => match parsed.scheme() {
            "http" | "https" if parsed.host_str().is_some() => Some(render(&parsed)),
            _ => {
                warn!("Skipping unsupported URL: {url}");
                None
            }
        },
        Err(_) => {
            warn!("Skipping invalid URL: {url}");
            None
        }
    }
}

/// The `https://` form of an `http://` URL; `None` for anything else.
pub fn https_upgrade(url: &str) -> Option<String> {
    let mut parsed = url::Url::parse(url).ok()?;
    if parsed.scheme() != "http" {
        return None;
    }
    parsed.set_scheme("https").ok()?;
    Some(render(&parsed))
}

fn render(parsed: &url::Url) -> String {
    let mut out = parsed.to_string();
    if parsed.path() == "/" && parsed.query().is_none() && parsed.fragment().is_none() {
        out.pop();
    }
    out
}

/// Owner and repository name of a recognized source-repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    /// Static-pages URL for the repository, e.g. `https://owner.github.io/repo`.
    pub fn pages_url(&self) -> String {
        format!(
            "https://{}.github.io/{}",
            self.owner.to_lowercase(),
            self.repo
        )
    }
}

/// Parses `https://github.com/{owner}/{repo}[.git][/...]`.
///
/// Returns `None` for other hosts or URLs without both path segments.
pub fn parse_repo_url(url: &str) -> Option<RepoRef> {
    let normalized = validate_and_normalize_url(url)?;
    let parsed = url::Url::parse(&normalized).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    if host != "github.com" && host != "www.github.com" {
        return None;
    }

    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
    let owner = segments.next()?.to_string();
    let repo = segments.next()?.trim_end_matches(".git").to_string();
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some(RepoRef { owner, repo })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_and_normalize_url_adds_https() {
        let result = validate_and_normalize_url("example.com");
        assert_eq!(result, Some("https://example.com".to_string()));
    }

    #[test]
    fn test_validate_and_normalize_url_preserves_http() {
        let result = validate_and_normalize_url(" http://example.com ");
        assert_eq!(result, Some("http://example.com".to_string()));
    }

    #[test]
    fn test_validate_and_normalize_url_rejects_invalid_url() {
        assert_eq!(validate_and_normalize_url("not a valid url!!!"), None);
        assert_eq!(validate_and_normalize_url(""), None);
    }

    #[test]
    fn test_validate_and_normalize_url_rejects_unsupported_scheme() {
        assert_eq!(validate_and_normalize_url("ftp://example.com"), None);
        assert_eq!(validate_and_normalize_url("javascript://alert(1)"), None);
    }

    #[test]
    fn test_validate_and_normalize_url_rejects_overlong() {
        let long = format!("example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert_eq!(validate_and_normalize_url(&long), None);
    }

    #[test]
    fn test_https_upgrade() {
        assert_eq!(
            https_upgrade("http://example.com/a"),
            Some("https://example.com/a".to_string())
        );
        assert_eq!(https_upgrade("https://example.com"), None);
        assert_eq!(
            https_upgrade("HTTP://Example.com"),
            Some("https://example.com".to_string())
        );
    }

    #[test]
    fn test_validate_and_normalize_url_canonicalizes_case_and_root() {
        assert_eq!(
            validate_and_normalize_url("HTTPS://Example.COM/"),
            Some("https://example.com".to_string())
        );
        assert_eq!(
            validate_and_normalize_url("https://example.com/Docs/?q=1"),
            Some("https://example.com/Docs/?q=1".to_string())
        );
    }

    #[test]
    fn test_parse_repo_url() {
        let repo = parse_repo_url("https://github.com/Octo/hello-world.git").unwrap();
        assert_eq!(repo.owner, "Octo");
        assert_eq!(repo.repo, "hello-world");
        assert_eq!(repo.pages_url(), "https://octo.github.io/hello-world");

        let repo = parse_repo_url("github.com/octo/site/tree/main/docs").unwrap();
        assert_eq!(repo.repo, "site");
    }

    #[test]
    fn test_parse_repo_url_rejects_other_hosts() {
        assert_eq!(parse_repo_url("https://gitlab.com/octo/site"), None);
        assert_eq!(parse_repo_url("https://github.com/octo"), None);
    }
}
