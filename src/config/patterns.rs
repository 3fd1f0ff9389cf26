//! Heuristic pattern tables.
//!
//! Login/error detection keywords, content and hero selectors, overlay selectors
//! and image-scoring keywords live here as plain data so they can be extended
//! or swapped without touching the browser automation.

/// Keyword and selector tables used by the health tester, the capture engine
/// and the README image scorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTables {
    /// Matched (case-insensitively) against title and body text to flag login walls.
    pub login_keywords: Vec<String>,
    /// Auth redirect targets. Entries starting with `/` match whole leading
    /// segments of the final URL path; others are `host[/path]` and match the
    /// host (or a subdomain of it) before the path rule applies.
    pub login_url_patterns: Vec<String>,
    /// Matched against the title to flag error pages.
    pub error_title_keywords: Vec<String>,
    /// Matched against the start of the body text to flag error pages.
    pub error_body_keywords: Vec<String>,
    /// Presence of any of these means the page has main content.
    pub main_content_selectors: Vec<String>,
    /// Navigation landmarks.
    pub navigation_selectors: Vec<String>,
    /// Loading indicators whose absence signals readiness.
    pub loading_selectors: Vec<String>,
    /// Hero/banner candidates, in priority order.
    pub hero_selectors: Vec<String>,
    /// Cookie banners, modals, chat widgets and similar overlays.
    pub overlay_selectors: Vec<String>,
    /// Image URLs containing one of these are let through the request filter.
    pub image_allow_hints: Vec<String>,
    /// README image URL keywords that raise the score.
    pub readme_positive_keywords: Vec<(String, i32)>,
    /// README image URL keywords that lower the score.
    pub readme_negative_keywords: Vec<(String, i32)>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn weighted(items: &[(&str, i32)]) -> Vec<(String, i32)> {
    items.iter().map(|(s, w)| (s.to_string(), *w)).collect()
}

impl Default for PatternTables {
    fn default() -> Self {
        Self {
            login_keywords: strings(&[
                "login",
                "log in",
                "sign in",
                "signin",
                "authenticate",
                "authentication required",
                "enter your password",
            ]),
            login_url_patterns: strings(&[
                "/login",
                "/signin",
                "/sign-in",
                "/auth",
                "/oauth",
                "/sso",
                "/session/new",
                "vercel.com/login",
                "github.com/login",
                "accounts.google.com",
            ]),
            error_title_keywords: strings(&[
                "404",
                "not found",
                "error",
                "page not found",
                "deployment not found",
                "site not found",
                "application error",
                "502 bad gateway",
                "503 service unavailable",
            ]),
            error_body_keywords: strings(&[
                "404",
                "page not found",
                "this page could not be found",
                "deployment_not_found",
                "there isn't a github pages site here",
                "site not found",
                "application error",
            ]),
            main_content_selectors: strings(&[
                "main",
                "[role='main']",
                "#root > *",
                "#__next > *",
                "#app > *",
                "article",
                ".container",
                ".content",
                "section",
            ]),
            navigation_selectors: strings(&["nav", "[role='navigation']", "header nav", ".navbar"]),
            loading_selectors: strings(&[
                ".loading",
                ".spinner",
                ".loader",
                "[aria-busy='true']",
                ".skeleton",
            ]),
            hero_selectors: strings(&[
                ".hero",
                "#hero",
                "[class*='hero']",
                ".banner",
                "[class*='banner']",
                ".jumbotron",
                ".masthead",
                ".landing",
                "header + section",
                "main > section:first-child",
                "section",
            ]),
            overlay_selectors: strings(&[
                "[class*='cookie']",
                "[id*='cookie']",
                "[class*='consent']",
                "[id*='consent']",
                "[class*='gdpr']",
                "[class*='modal']",
                "[class*='popup']",
                "[class*='overlay']",
                "[role='dialog']",
                "[class*='newsletter']",
                "[class*='subscribe']",
                "[class*='notification']",
                "[class*='toast']",
                "[id*='intercom']",
                "[class*='intercom']",
                "[id*='crisp']",
                "[class*='drift']",
                "[id*='hubspot']",
                "iframe[src*='chat']",
            ]),
            image_allow_hints: strings(&[
                "logo", "hero", "banner", "og", "social", "cover", "header",
            ]),
            readme_positive_keywords: weighted(&[
                ("screenshot", 25),
                ("preview", 20),
                ("demo", 20),
                ("banner", 15),
                ("hero", 15),
                ("landing", 15),
                ("app", 5),
                ("web", 5),
                ("ui", 5),
                (".png", 10),
            ]),
            readme_negative_keywords: weighted(&[
                ("logo", 30),
                ("icon", 30),
                ("avatar", 35),
                ("badge", 40),
                ("shields.io", 40),
            ]),
        }
    }
}

impl PatternTables {
    /// Returns the first login keyword found in `haystack`, if any.
    pub fn match_login_text(&self, haystack: &str) -> Option<&str> {
        find_keyword(&self.login_keywords, haystack)
    }

    /// Returns the first login URL pattern matching `url`, if any.
    ///
    /// Unparseable URLs never match.
    pub fn match_login_url(&self, url: &str) -> Option<&str> {
        let parsed = url::Url::parse(url).ok()?;
        let host = parsed.host_str().unwrap_or_default().to_lowercase();
        let path = parsed.path().to_lowercase();

        self.login_url_patterns
            .iter()
            .find(|pattern| {
                let pattern = pattern.to_lowercase();
                match pattern.split_once('/') {
                    Some(("", _)) => path_has_prefix(&path, &pattern),
                    Some((pattern_host, pattern_path)) => {
                        host_matches(&host, pattern_host)
                            && path_has_prefix(&path, &format!("/{pattern_path}"))
                    }
                    None => host_matches(&host, &pattern),
                }
            })
            .map(String::as_str)
    }

    /// Returns the first error keyword found in the title, if any.
    pub fn match_error_title(&self, title: &str) -> Option<&str> {
        find_keyword(&self.error_title_keywords, title)
    }

    /// Returns the first error keyword found in the body text, if any.
    pub fn match_error_body(&self, body: &str) -> Option<&str> {
        find_keyword(&self.error_body_keywords, body)
    }
}

/// `prefix` covers whole leading segments of `path`: `/auth` matches `/auth`
/// and `/auth/callback` but not `/authors`.
fn path_has_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn host_matches(host: &str, pattern_host: &str) -> bool {
    host == pattern_host
        || host
            .strip_suffix(pattern_host)
            .is_some_and(|sub| sub.ends_with('.'))
}

fn find_keyword<'a>(keywords: &'a [String], haystack: &str) -> Option<&'a str> {
    let haystack = haystack.to_lowercase();
    keywords
        .iter()
        .find(|k| haystack.contains(k.as_str()))
        .map(String::as_str)
}
