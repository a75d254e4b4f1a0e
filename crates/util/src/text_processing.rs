//! # Text Processing Utilities
//!
//! Redaction of credentials before they reach logs, and truncation of long
//! messages for one-line summaries.

use once_cell::sync::Lazy;
use regex::Regex;

/// Redacts values that look like secrets in a string.
///
/// Covers session cookies, authorization headers and `KEY=value` style
/// assignments whose key names a credential.
///
/// # Example
/// ```rust
/// use bullpen_util::redact_sensitive;
///
/// let redacted = redact_sensitive("cookie: connect.sid=s%3Aabc123");
/// assert_eq!(redacted, "cookie: connect.sid=[REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    redact_sensitive_with(input, "[REDACTED]")
}

/// Redacts sensitive-looking values, using a custom replacement token.
pub fn redact_sensitive_with(input: &str, replacement: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in get_redact_patterns().iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{}{}", prefix, replacement)
            })
            .to_string();
    }
    redacted
}

/// Returns the compiled redaction patterns. Capture group 1 is preserved.
pub fn get_redact_patterns() -> &'static Vec<Regex> {
    static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
        [
            r"(?i)(authorization:\s*)([^\s,;]+(?:\s+[^\s,;]+)?)",
            r"(?i)((?:connect\.sid|session|sid)=)([^\s;]+)",
            r"(?i)([A-Z0-9_]*?(?:KEY|TOKEN|SECRET|PASSWORD|SESSION)=)([^\s]+)",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    });

    &REDACT_PATTERNS
}

/// Trim `text` and cut it to `max_len` characters, ending with `...` when cut.
pub fn truncate_for_summary(text: &str, max_len: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_len {
        return trimmed.to_string();
    }

    // Reserve space for the trailing ellipsis.
    let target_len = max_len.saturating_sub(3);
    let truncated: String = trimmed.chars().take(target_len).collect();
    format!("{}...", truncated.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_session_cookie_and_env_assignment() {
        assert_eq!(redact_sensitive("sid=abcdef; Path=/"), "sid=[REDACTED]; Path=/");
        assert_eq!(redact_sensitive("BULLPEN_SESSION=s%3Axyz"), "BULLPEN_SESSION=[REDACTED]");
    }

    #[test]
    fn redacts_authorization_header() {
        let redacted = redact_sensitive("Authorization: Bearer secret123");
        assert_eq!(redacted, "Authorization: [REDACTED]");
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(redact_sensitive("athlete created"), "athlete created");
    }

    #[test]
    fn truncate_for_summary_trims_and_truncates() {
        assert_eq!(truncate_for_summary(" short message ", 20), "short message");
        assert_eq!(truncate_for_summary("abcdefghij", 5), "ab...");
    }
}
