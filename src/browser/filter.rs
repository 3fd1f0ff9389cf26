//! Request filtering policy.
//!
//! Decides, per request, whether a tab should load it. The decision is pure so
//! it can be tested without a browser; the Chromium backend only translates its
//! protocol resource types into [`ResourceKind`] and applies the verdict.

/// Resource categories the filter distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Document,
    Stylesheet,
    Script,
    Xhr,
    Fetch,
    Image,
    Media,
    Font,
    /// Pings, manifests, text tracks, beacons and the like
    Other,
}

impl ResourceKind {
    /// Kinds a page cannot render without; never blocked.
    fn is_essential(&self) -> bool {
        matches!(
            self,
            ResourceKind::Document
                | ResourceKind::Stylesheet
                | ResourceKind::Script
                | ResourceKind::Xhr
                | ResourceKind::Fetch
        )
    }
}

/// How image requests are treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePolicy {
    AllowAll,
    BlockAll,
    /// Only images whose URL contains one of these (lowercase) hints.
    AllowMatching(Vec<String>),
}

/// Verdict for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Continue,
    Abort,
}

/// Per-tab request filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFilter {
    /// Non-image kinds to abort. Essential kinds listed here are ignored.
    pub blocked: Vec<ResourceKind>,
    pub images: ImagePolicy,
}

impl RequestFilter {
    /// Filter for health tests: skip heavy media and fonts, keep everything else.
    pub fn health_check() -> Self {
        Self {
            blocked: vec![ResourceKind::Media, ResourceKind::Font],
            images: ImagePolicy::AllowAll,
        }
    }

    /// Filter for captures: skip media and decorative requests, and only load
    /// images that look like logos, heroes, banners or social cards.
    pub fn capture(image_hints: &[String]) -> Self {
        Self {
            blocked: vec![ResourceKind::Media, ResourceKind::Other],
            images: ImagePolicy::AllowMatching(
                image_hints.iter().map(|h| h.to_lowercase()).collect(),
            ),
        }
    }

    pub fn decide(&self, kind: ResourceKind, url: &str) -> FilterDecision {
        if kind.is_essential() {
            return FilterDecision::Continue;
        }

        if kind == ResourceKind::Image {
            return match &self.images {
                ImagePolicy::AllowAll => FilterDecision::Continue,
                ImagePolicy::BlockAll => FilterDecision::Abort,
                ImagePolicy::AllowMatching(hints) => {
                    let url = url.to_lowercase();
                    if hints.iter().any(|hint| url.contains(hint.as_str())) {
                        FilterDecision::Continue
                    } else {
                        FilterDecision::Abort
                    }
                }
            };
        }

        if self.blocked.contains(&kind) {
            FilterDecision::Abort
        } else {
            FilterDecision::Continue
        }
    }
}
