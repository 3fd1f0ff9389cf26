//! Utilities for sanitizing names, filenames and error messages.

/// Turns a project name into a URL/filename-safe slug.
///
/// Lowercases, replaces every run of non-alphanumeric characters with a single
/// hyphen and trims hyphens from both ends. `"My Cool App!"` becomes `"my-cool-app"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Filename stem for a project's images. Never empty.
pub fn file_stem(project_name: &str) -> String {
    let slug = slugify(project_name);
    if slug.is_empty() {
        "project".to_string()
    } else {
        slug
    }
}

/// `{sanitized-name}-{unix-timestamp-ms}.{ext}`
pub fn timestamped_filename(project_name: &str, timestamp_ms: i64, extension: &str) -> String {
    format!("{}-{}.{}", file_stem(project_name), timestamp_ms, extension)
}

/// Splits a `{stem}-{timestamp}.{ext}` filename produced by [`timestamped_filename`].
///
/// Returns the timestamp when `filename` belongs to `project_name`.
pub fn parse_timestamped_filename(filename: &str, project_name: &str) -> Option<i64> {
    let prefix = format!("{}-", file_stem(project_name));
    let rest = filename.strip_prefix(&prefix)?;
    let (timestamp, _extension) = rest.split_once('.')?;
    if timestamp.is_empty() || !timestamp.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    timestamp.parse().ok()
}

/// Sanitizes an error message by removing control characters.
///
/// Control characters (0x00-0x1F, except newline/tab/carriage return) can cause
/// issues when stored in databases or displayed in logs.
pub fn sanitize_error_message(message: &str) -> String {
    message
        .chars()
        .filter(|c| {
            let code = *c as u32;
            code >= 0x20 // Printable ASCII starts at 0x20 (space)
                || code == 0x09 // Tab
                || code == 0x0A // Newline
                || code == 0x0D // Carriage return
        })
        .collect()
}

/// Sanitizes and truncates an error message to `MAX_ERROR_MESSAGE_LENGTH`.
pub fn sanitize_and_truncate_error_message(message: &str) -> String {
    let sanitized = sanitize_error_message(message);
    let max = crate::config::MAX_ERROR_MESSAGE_LENGTH;

    if sanitized.chars().count() > max {
        let kept: String = sanitized.chars().take(max.saturating_sub(50)).collect();
        format!(
            "{}... (truncated, original length: {} chars)",
            kept,
            sanitized.chars().count()
        )
    } else {
        sanitized
    }
}
