//! Candidate scoring.
//!
//! Everything here is pure: the health tester gathers [`PageSignals`] from a
//! browser tab and hands them over, so the weights and gate heuristics are
//! testable without a browser.

use crate::browser::scripts::PageSignals;
use crate::config::{PatternTables, ScoringWeights};
use crate::models::{UrlCandidate, UrlSource};

/// Body text shorter than this, combined with a login keyword, marks a login wall
/// even without a password field.
const SHORT_LOGIN_BODY: usize = 1500;

/// Error keywords only count near the top of the body.
const ERROR_BODY_PREFIX: usize = 500;

/// Up to 40 for the status, 30 for speed, 20 for no login wall, 10 for no error page.
pub fn accessibility_score(
    status: Option<u16>,
    load_time_ms: u64,
    is_login_page: bool,
    is_error_page: bool,
) -> u8 {
    let status_points: u32 = match status {
        Some(200) => 40,
        Some(201..=299) => 30,
        Some(300..=399) => 20,
        _ => 0,
    };
    let speed_points: u32 = match load_time_ms {
        0..=2_999 => 30,
        3_000..=4_999 => 20,
        5_000..=9_999 => 10,
        _ => 0,
    };
    let login_points = if is_login_page { 0 } else { 20 };
    let error_points = if is_error_page { 0 } else { 10 };

    cap(status_points + speed_points + login_points + error_points)
}

/// Weighted presence/count of images, navigation, buttons, links, structure and text.
pub fn content_quality_score(signals: &PageSignals) -> u8 {
    let mut score: u32 = 0;

    score += match signals.image_count {
        0 => 0,
        1..=2 => 10,
        _ => 20,
    };
    if signals.has_navigation {
        score += 15;
    }
    if signals.button_count > 0 {
        score += 10;
    }
    score += match signals.link_count {
        0 => 0,
        1..=4 => 5,
        _ => 10,
    };
    score += match signals.structural_count {
        0 => 0,
        1..=2 => 8,
        _ => 15,
    };
    score += match signals.body_text_length {
        0..=100 => 0,
        101..=500 => 5,
        501..=2000 => 12,
        _ => 20,
    };
    if signals.has_navigation && signals.structural_count > 0 && signals.image_count > 0 {
        score += 10;
    }

    cap(score)
}

/// Bonus for where the URL came from.
pub fn source_bonus(source: UrlSource, weights: &ScoringWeights) -> f64 {
    match source {
        UrlSource::Deployment => weights.deployment_bonus,
        UrlSource::SourceRepoPages => weights.source_repo_bonus,
        UrlSource::DomainPattern => weights.domain_pattern_bonus,
        UrlSource::Manual => weights.manual_bonus,
    }
}

/// Inputs to the confidence formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInputs {
    pub accessibility: u8,
    pub quality: u8,
    pub source: UrlSource,
    pub is_login_page: bool,
    pub is_error_page: bool,
    pub has_main_content: bool,
}

/// Confidence before clamping. Can be negative or above 100.
pub fn raw_confidence(inputs: &ConfidenceInputs, weights: &ScoringWeights) -> f64 {
    let mut score = weights.accessibility_weight * f64::from(inputs.accessibility)
        + weights.quality_weight * f64::from(inputs.quality)
        + source_bonus(inputs.source, weights);

    if inputs.is_login_page {
        score -= weights.login_penalty;
    }
    if inputs.is_error_page {
        score -= weights.error_penalty;
    }
    if !inputs.has_main_content {
        score -= weights.no_content_penalty;
    }
    score
}

/// Confidence clamped to 0-100.
pub fn confidence(inputs: &ConfidenceInputs, weights: &ScoringWeights) -> u8 {
    let raw = raw_confidence(inputs, weights).round();
    raw.clamp(0.0, 100.0) as u8
}

/// Capture gate: good accessibility, good content, no gate condition, exactly 200.
pub fn is_screenshotable(
    status: Option<u16>,
    accessibility: u8,
    quality: u8,
    is_login_page: bool,
    is_error_page: bool,
    weights: &ScoringWeights,
) -> bool {
    status == Some(200)
        && !is_login_page
        && !is_error_page
        && accessibility > weights.screenshotable_min_accessibility
        && quality > weights.screenshotable_min_quality
}

/// Login wall: keyword in the title, auth-looking URL, or a login keyword in a
/// short body or next to a password field.
pub fn detect_login(signals: &PageSignals, final_url: &str, patterns: &PatternTables) -> bool {
    if patterns.match_login_text(&signals.title).is_some() {
        return true;
    }
    if patterns.match_login_url(final_url).is_some() {
        return true;
    }
    patterns.match_login_text(&signals.body_text).is_some()
        && (signals.has_password_field || signals.body_text_length < SHORT_LOGIN_BODY)
}

/// Error page: keyword in the title or near the top of the body.
pub fn detect_error(signals: &PageSignals, patterns: &PatternTables) -> bool {
    if patterns.match_error_title(&signals.title).is_some() {
        return true;
    }
    let head: String = signals.body_text.chars().take(ERROR_BODY_PREFIX).collect();
    patterns.match_error_body(&head).is_some()
}

/// Everything the health tester observed for one URL.
#[derive(Debug, Clone)]
pub struct Observation {
    pub status: Option<u16>,
    pub final_url: String,
    pub load_time_ms: u64,
    pub signals: PageSignals,
}

/// Turns an observation into a fully scored candidate.
pub fn score_candidate(
    url: &str,
    source: UrlSource,
    observation: &Observation,
    patterns: &PatternTables,
    weights: &ScoringWeights,
) -> UrlCandidate {
    let signals = &observation.signals;
    let is_login_page = detect_login(signals, &observation.final_url, patterns);
    let is_error_page = detect_error(signals, patterns);

    let accessibility = accessibility_score(
        observation.status,
        observation.load_time_ms,
        is_login_page,
        is_error_page,
    );
    let quality = content_quality_score(signals);
    let inputs = ConfidenceInputs {
        accessibility,
        quality,
        source,
        is_login_page,
        is_error_page,
        has_main_content: signals.has_main_content,
    };

    UrlCandidate {
        url: url.to_string(),
        source,
        accessibility_score: accessibility,
        content_quality: quality,
        confidence: confidence(&inputs, weights),
        is_login_page,
        is_error_page,
        has_main_content: signals.has_main_content,
        load_time_ms: observation.load_time_ms,
        status_code: observation.status,
        final_url: Some(observation.final_url.clone()),
        title: (!signals.title.is_empty()).then(|| signals.title.clone()),
        screenshotable: is_screenshotable(
            observation.status,
            accessibility,
            quality,
            is_login_page,
            is_error_page,
            weights,
        ),
        error: None,
    }
}

fn cap(score: u32) -> u8 {
    score.min(100) as u8
}
