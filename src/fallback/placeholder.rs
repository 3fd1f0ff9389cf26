//! Generated SVG placeholder tier.
//!
//! The markup depends only on [`PlaceholderContent`], so the same project
//! always renders the same image; only the filename carries a timestamp.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::info;

use crate::config::{Config, PLACEHOLDER_SUBDIR};
use crate::error_handling::FallbackError;
use crate::models::{FallbackImage, FallbackKind};
use crate::utils::sanitize::timestamped_filename;

use super::{FallbackRequest, FallbackStrategy};

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 630;
const MARGIN: u32 = 80;
const MAX_BADGES: usize = 5;
const NAME_LINE_CHARS: usize = 28;
const NAME_MAX_LINES: usize = 2;
const DESCRIPTION_LINE_CHARS: usize = 60;
const DESCRIPTION_MAX_LINES: usize = 3;
const DEFAULT_COLOR: &str = "#6b7280";
const PLACEHOLDER_CONFIDENCE: u8 = 10;

/// Technology badge colors (background, text). Keys are lowercase.
const TECH_COLORS: &[(&str, &str, &str)] = &[
    ("react", "#61dafb", "#0f172a"),
    ("next.js", "#111827", "#ffffff"),
    ("nextjs", "#111827", "#ffffff"),
    ("vue", "#42b883", "#ffffff"),
    ("svelte", "#ff3e00", "#ffffff"),
    ("angular", "#dd0031", "#ffffff"),
    ("typescript", "#3178c6", "#ffffff"),
    ("javascript", "#f7df1e", "#0f172a"),
    ("node.js", "#339933", "#ffffff"),
    ("nodejs", "#339933", "#ffffff"),
    ("python", "#3776ab", "#ffffff"),
    ("django", "#092e20", "#ffffff"),
    ("rust", "#dea584", "#0f172a"),
    ("go", "#00add8", "#ffffff"),
    ("tailwind", "#06b6d4", "#ffffff"),
    ("tailwindcss", "#06b6d4", "#ffffff"),
    ("postgresql", "#336791", "#ffffff"),
    ("mongodb", "#47a248", "#ffffff"),
    ("docker", "#2496ed", "#ffffff"),
];

/// Category badge and gradient accent colors. Keys are lowercase.
const CATEGORY_COLORS: &[(&str, &str)] = &[
    ("web", "#3b82f6"),
    ("mobile", "#10b981"),
    ("ai", "#8b5cf6"),
    ("ml", "#8b5cf6"),
    ("data", "#f59e0b"),
    ("tool", "#ef4444"),
    ("cli", "#ef4444"),
    ("game", "#ec4899"),
    ("library", "#14b8a6"),
];

/// (background, text) for a technology badge; gray when unknown.
pub fn tech_color(technology: &str) -> (&'static str, &'static str) {
    let key = technology.trim().to_lowercase();
    TECH_COLORS
        .iter()
        .find(|(name, _, _)| *name == key)
        .map(|(_, bg, fg)| (*bg, *fg))
        .unwrap_or((DEFAULT_COLOR, "#ffffff"))
}

pub fn category_color(category: &str) -> &'static str {
    let key = category.trim().to_lowercase();
    CATEGORY_COLORS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_COLOR)
}

/// Greedy word wrap. Words longer than `max_chars` get a line of their own.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wraps and keeps at most `max_lines`, marking the cut with an ellipsis.
fn wrap_limited(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    let mut lines = wrap_text(text, max_chars);
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.push('…');
        }
    }
    lines
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// What a placeholder shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderContent {
    pub name: String,
    pub description: Option<String>,
    pub technologies: Vec<String>,
    pub framework: Option<String>,
    pub category: Option<String>,
}

/// Renders the placeholder markup.
pub fn render_placeholder_svg(content: &PlaceholderContent) -> String {
    let accent = content
        .category
        .as_deref()
        .map(category_color)
        .or_else(|| content.technologies.first().map(|t| tech_color(t).0))
        .unwrap_or(DEFAULT_COLOR);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">
  <defs>
    <linearGradient id="bg" x1="0" y1="0" x2="1" y2="1">
      <stop offset="0%" stop-color="#0f172a"/>
      <stop offset="100%" stop-color="{accent}"/>
    </linearGradient>
    <pattern id="grid" width="40" height="40" patternUnits="userSpaceOnUse">
      <path d="M 40 0 L 0 0 0 40" fill="none" stroke="#ffffff" stroke-opacity="0.06" stroke-width="1"/>
    </pattern>
  </defs>
  <rect width="{WIDTH}" height="{HEIGHT}" fill="url(#bg)"/>
  <rect width="{WIDTH}" height="{HEIGHT}" fill="url(#grid)"/>
"##
    );

    if let Some(category) = content.category.as_deref().filter(|c| !c.trim().is_empty()) {
        let label = escape_xml(&category.trim().to_uppercase());
        let width = 32 + category.trim().chars().count() as u32 * 11;
        let _ = write!(
            svg,
            r##"  <rect x="{MARGIN}" y="64" width="{width}" height="36" rx="18" fill="{}"/>
  <text x="{}" y="88" font-family="Inter, Helvetica, Arial, sans-serif" font-size="16" font-weight="600" fill="#ffffff">{label}</text>
"##,
            category_color(category),
            MARGIN + 16,
        );
    }

    let mut y = 200;
    for line in wrap_limited(&content.name, NAME_LINE_CHARS, NAME_MAX_LINES) {
        let _ = writeln!(
            svg,
            r##"  <text x="{MARGIN}" y="{y}" font-family="Inter, Helvetica, Arial, sans-serif" font-size="64" font-weight="700" fill="#ffffff">{}</text>"##,
            escape_xml(&line)
        );
        y += 76;
    }

    if let Some(description) = content.description.as_deref() {
        y += 8;
        for line in wrap_limited(description, DESCRIPTION_LINE_CHARS, DESCRIPTION_MAX_LINES) {
            let _ = writeln!(
                svg,
                r##"  <text x="{MARGIN}" y="{y}" font-family="Inter, Helvetica, Arial, sans-serif" font-size="28" fill="#cbd5e1">{}</text>"##,
                escape_xml(&line)
            );
            y += 40;
        }
    }

    if let Some(framework) = content.framework.as_deref().filter(|f| !f.trim().is_empty()) {
        let _ = writeln!(
            svg,
            r##"  <text x="{MARGIN}" y="490" font-family="Inter, Helvetica, Arial, sans-serif" font-size="22" fill="#94a3b8">Built with {}</text>"##,
            escape_xml(framework.trim())
        );
    }

    let mut x = MARGIN;
    for technology in content
        .technologies
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .take(MAX_BADGES)
    {
        let width = 32 + technology.chars().count() as u32 * 12;
        if x + width > WIDTH - MARGIN {
            break;
        }
        let (bg, fg) = tech_color(technology);
        let _ = writeln!(
            svg,
            r##"  <rect x="{x}" y="520" width="{width}" height="44" rx="22" fill="{bg}"/>
  <text x="{}" y="549" font-family="Inter, Helvetica, Arial, sans-serif" font-size="20" font-weight="600" fill="{fg}">{}</text>"##,
            x + 16,
            escape_xml(technology)
        );
        x += width + 16;
    }

    svg.push_str("</svg>\n");
    svg
}

/// Fallback tier that always produces an image unless the write fails.
pub struct PlaceholderStrategy {
    config: Arc<Config>,
}

impl PlaceholderStrategy {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Project fields, with repository metadata filling the gaps.
    fn content(request: &FallbackRequest) -> PlaceholderContent {
        let metadata = request.repo_metadata.as_ref();
        let description = request.description.clone().or_else(|| {
            metadata
                .and_then(|m| m.description.clone())
                .filter(|d| !d.trim().is_empty())
        });

        let mut technologies = request.technologies.clone();
        if technologies.is_empty() {
            if let Some(metadata) = metadata {
                technologies.extend(metadata.language.iter().cloned());
                technologies.extend(metadata.topics.iter().cloned());
            }
        }

        PlaceholderContent {
            name: request.project_name.clone(),
            description,
            technologies,
            framework: request.framework.clone(),
            category: request.category.clone(),
        }
    }
}

#[async_trait]
impl FallbackStrategy for PlaceholderStrategy {
    fn kind(&self) -> FallbackKind {
        FallbackKind::GeneratedPlaceholder
    }

    async fn attempt(
        &self,
        request: &FallbackRequest,
    ) -> Result<Option<FallbackImage>, FallbackError> {
        let svg = render_placeholder_svg(&Self::content(request));

        let dir = self.config.placeholder_dir();
        tokio::fs::create_dir_all(&dir).await?;
        let filename = timestamped_filename(
            &request.project_name,
            Utc::now().timestamp_millis(),
            "svg",
        );
        tokio::fs::write(dir.join(&filename), svg).await?;
        info!("Generated placeholder {filename}");

        Ok(Some(FallbackImage {
            kind: FallbackKind::GeneratedPlaceholder,
            location: self.config.public_path(PLACEHOLDER_SUBDIR, &filename),
            source: "generated from project metadata".to_string(),
            confidence: PLACEHOLDER_CONFIDENCE,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::RepoMetadata;

    #[test]
    fn test_wrap_text_greedy() {
        assert_eq!(
            wrap_text("the quick brown fox jumps over the lazy dog", 15),
            vec!["the quick brown", "fox jumps over", "the lazy dog"]
        );
        assert_eq!(wrap_text("", 10), Vec::<String>::new());
        assert_eq!(
            wrap_text("a supercalifragilistic word", 10),
            vec!["a", "supercalifragilistic", "word"]
        );
    }

    #[test]
    fn test_wrap_limited_marks_truncation() {
        let lines = wrap_limited("one two three four five six", 7, 2);
        assert_eq!(lines, vec!["one two", "three…"]);
    }

    #[test]
    fn test_colors_default_to_gray() {
        assert_eq!(tech_color("React").0, "#61dafb");
        assert_eq!(tech_color("COBOL"), (DEFAULT_COLOR, "#ffffff"));
        assert_eq!(category_color("Mobile"), "#10b981");
        assert_eq!(category_color("misc"), DEFAULT_COLOR);
    }

    #[test]
    fn test_svg_contains_content_and_escapes() {
        let svg = render_placeholder_svg(&PlaceholderContent {
            name: "Tom & Jerry <Chase>".to_string(),
            description: Some("A cat-and-mouse game".to_string()),
            technologies: vec!["React".to_string(), "Rust".to_string()],
            framework: Some("Next.js".to_string()),
            category: Some("game".to_string()),
        });
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Tom &amp; Jerry &lt;Chase&gt;"));
        assert!(svg.contains("A cat-and-mouse game"));
        assert!(svg.contains("Built with Next.js"));
        assert!(svg.contains("GAME"));
        assert!(svg.contains(r##"fill="#61dafb""##));
        assert!(svg.contains(r##"fill="#dea584""##));
        assert!(svg.contains("url(#grid)"));
    }

    #[test]
    fn test_svg_caps_badges_at_five() {
        let technologies: Vec<String> = ["a", "b", "c", "d", "e", "f", "g"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let svg = render_placeholder_svg(&PlaceholderContent {
            name: "X".to_string(),
            technologies,
            ..Default::default()
        });
        assert_eq!(svg.matches(r#"y="520""#).count(), 5);
    }

    #[test]
    fn test_metadata_fills_missing_fields() {
        let mut request = FallbackRequest::new("Shop");
        request.repo_metadata = Some(RepoMetadata {
            description: Some("From GitHub".to_string()),
            language: Some("Go".to_string()),
            topics: vec!["api".to_string()],
            default_branch: None,
        });
        let content = PlaceholderStrategy::content(&request);
        assert_eq!(content.description.as_deref(), Some("From GitHub"));
        assert_eq!(content.technologies, vec!["Go", "api"]);

        request.description = Some("Own".to_string());
        request.technologies = vec!["Rust".to_string()];
        let content = PlaceholderStrategy::content(&request);
        assert_eq!(content.description.as_deref(), Some("Own"));
        assert_eq!(content.technologies, vec!["Rust"]);
    }
}
