//! In-page scripts.
//!
//! Every script is an expression evaluating to a JSON-serializable value. The
//! selector lists come from [`PatternTables`] and are embedded as JSON literals,
//! so no table entry can break out of its string.

use serde::Deserialize;

use crate::browser::ClipRegion;
use crate::config::PatternTables;

fn js_array(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Helper shared by scripts: does any selector in the list match?
const ANY_MATCH_FN: &str = r#"const anyMatch = (sels) => sels.some((s) => {
    try { return document.querySelector(s) !== null; } catch (_) { return false; }
  });"#;

/// Raw facts gathered from a loaded page by [`page_signals`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageSignals {
    pub title: String,
    /// First few thousand characters of `document.body.innerText`
    pub body_text: String,
    pub body_text_length: usize,
    pub image_count: usize,
    pub has_navigation: bool,
    pub button_count: usize,
    pub link_count: usize,
    pub structural_count: usize,
    pub has_main_content: bool,
    pub has_password_field: bool,
}

/// Collects [`PageSignals`] from the current document.
pub fn page_signals(patterns: &PatternTables) -> String {
    format!(
        r#"(() => {{
  {any_match}
  const text = (document.body && document.body.innerText) || '';
  return {{
    title: document.title || '',
    bodyText: text.slice(0, 3000),
    bodyTextLength: text.length,
    imageCount: document.images.length,
    hasNavigation: anyMatch({nav}),
    buttonCount: document.querySelectorAll('button, [role="button"], input[type="submit"]').length,
    linkCount: document.querySelectorAll('a[href]').length,
    structuralCount: document.querySelectorAll('header, main, section, article, footer, aside, nav').length,
    hasMainContent: anyMatch({main}),
    hasPasswordField: document.querySelector('input[type="password"]') !== null,
  }};
}})()"#,
        any_match = ANY_MATCH_FN,
        nav = js_array(&patterns.navigation_selectors),
        main = js_array(&patterns.main_content_selectors),
    )
}

/// Independent readiness conditions raced by the capture engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessCheck {
    MainContent,
    Navigation,
    ImagesComplete,
    NoLoadingIndicator,
}

impl ReadinessCheck {
    pub const ALL: [ReadinessCheck; 4] = [
        ReadinessCheck::MainContent,
        ReadinessCheck::Navigation,
        ReadinessCheck::ImagesComplete,
        ReadinessCheck::NoLoadingIndicator,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ReadinessCheck::MainContent => "main-content",
            ReadinessCheck::Navigation => "navigation",
            ReadinessCheck::ImagesComplete => "images-complete",
            ReadinessCheck::NoLoadingIndicator => "no-loading-indicator",
        }
    }

    /// Expression evaluating to `true` once the condition holds.
    pub fn script(&self, patterns: &PatternTables) -> String {
        match self {
            ReadinessCheck::MainContent => format!(
                "(() => {{ {} return anyMatch({}); }})()",
                ANY_MATCH_FN,
                js_array(&patterns.main_content_selectors)
            ),
            ReadinessCheck::Navigation => format!(
                "(() => {{ {} return anyMatch({}); }})()",
                ANY_MATCH_FN,
                js_array(&patterns.navigation_selectors)
            ),
            ReadinessCheck::ImagesComplete => {
                "Array.from(document.images).every((img) => img.complete)".to_string()
            }
            ReadinessCheck::NoLoadingIndicator => format!(
                r#"(() => {{
  const sels = {};
  return !sels.some((s) => {{
    try {{
      return Array.from(document.querySelectorAll(s)).some((el) => {{
        const r = el.getBoundingClientRect();
        return r.width > 0 && r.height > 0 && getComputedStyle(el).visibility !== 'hidden';
      }});
    }} catch (_) {{ return false; }}
  }});
}})()"#,
                js_array(&patterns.loading_selectors)
            ),
        }
    }
}

/// Result of [`content_inspection`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentInspection {
    pub has_content: bool,
    pub has_hero: bool,
    /// Hero bounding box in document coordinates
    pub hero: Option<ClipRegion>,
}

/// Classifies the page: does it have content, and where is its hero section?
///
/// The hero is the first visible element, in selector priority order, that spans
/// at least half the viewport width and 200px of height.
pub fn content_inspection(patterns: &PatternTables) -> String {
    format!(
        r#"(() => {{
  {any_match}
  const text = (document.body && document.body.innerText) || '';
  const hasContent = anyMatch({main}) || text.trim().length > 200;
  const minWidth = window.innerWidth * 0.5;
  for (const sel of {hero}) {{
    let els = [];
    try {{ els = Array.from(document.querySelectorAll(sel)); }} catch (_) {{ continue; }}
    for (const el of els) {{
      const r = el.getBoundingClientRect();
      const style = getComputedStyle(el);
      if (style.display === 'none' || style.visibility === 'hidden') continue;
      if (r.width >= minWidth && r.height >= 200) {{
        return {{
          hasContent,
          hasHero: true,
          hero: {{ x: r.left + window.scrollX, y: r.top + window.scrollY, width: r.width, height: r.height }},
        }};
      }}
    }}
  }}
  return {{ hasContent, hasHero: false, hero: null }};
}})()"#,
        any_match = ANY_MATCH_FN,
        main = js_array(&patterns.main_content_selectors),
        hero = js_array(&patterns.hero_selectors),
    )
}

/// Hides overlays and returns how many elements were hidden.
///
/// Two passes: positioned, visible elements matching the overlay selectors;
/// then any element with an extreme z-index covering most of the viewport.
pub fn suppress_overlays(patterns: &PatternTables) -> String {
    format!(
        r#"(() => {{
  let hidden = 0;
  const hide = (el) => {{ el.style.setProperty('display', 'none', 'important'); hidden += 1; }};
  const isVisible = (el, style) => {{
    const r = el.getBoundingClientRect();
    return r.width > 0 && r.height > 0 && style.display !== 'none' && style.visibility !== 'hidden';
  }};
  for (const sel of {overlays}) {{
    let els = [];
    try {{ els = Array.from(document.querySelectorAll(sel)); }} catch (_) {{ continue; }}
    for (const el of els) {{
      const style = getComputedStyle(el);
      if (['fixed', 'absolute', 'sticky'].includes(style.position) && isVisible(el, style)) hide(el);
    }}
  }}
  const viewportArea = window.innerWidth * window.innerHeight;
  for (const el of Array.from(document.querySelectorAll('body *'))) {{
    const style = getComputedStyle(el);
    const z = parseInt(style.zIndex, 10);
    if (!Number.isNaN(z) && z >= 1000 && style.position === 'fixed' && isVisible(el, style)) {{
      const r = el.getBoundingClientRect();
      if (r.width * r.height > viewportArea * 0.5) hide(el);
    }}
  }}
  if (document.body) document.body.style.setProperty('overflow', 'auto', 'important');
  document.documentElement.style.setProperty('overflow', 'auto', 'important');
  return hidden;
}})()"#,
        overlays = js_array(&patterns.overlay_selectors),
    )
}
