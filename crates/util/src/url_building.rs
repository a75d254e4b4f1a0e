//! Path template substitution and query-string encoding.
//!
//! Templates use OpenAPI-style placeholders (`/api/athletes/{id}`). Every
//! placeholder is required; substituted values are percent-encoded so that a
//! value can never introduce additional path segments.

use std::collections::HashMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use thiserror::Error;
use url::form_urlencoded;

/// Bytes left unescaped inside a path segment (RFC 3986 unreserved).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Raised when a template placeholder has no (or an empty) value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing path parameter '{parameter}' for template '{template}'")]
pub struct MissingParameterError {
    pub template: String,
    pub parameter: String,
}

/// Substitute every `{name}` placeholder in `template` with its encoded value.
///
/// Extra entries in `params` are ignored. An unterminated `{` is copied
/// through literally.
///
/// # Examples
/// ```rust
/// use std::collections::HashMap;
/// use bullpen_util::build_url;
///
/// let params = HashMap::from([("id".to_string(), "42".to_string())]);
/// assert_eq!(build_url("/api/assessments/{id}/analyze", &params).unwrap(), "/api/assessments/42/analyze");
/// assert!(build_url("/api/athletes/{id}", &HashMap::new()).is_err());
/// ```
pub fn build_url(template: &str, params: &HashMap<String, String>) -> Result<String, MissingParameterError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        out.push_str(&rest[..open]);
        let name = &rest[open + 1..open + close];
        let value = params
            .get(name)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| MissingParameterError {
                template: template.to_string(),
                parameter: name.to_string(),
            })?;
        out.extend(utf8_percent_encode(value, PATH_SEGMENT));
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Placeholder names in template order.
pub fn template_placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        names.push(&rest[open + 1..open + close]);
        rest = &rest[open + close + 1..];
    }
    names
}

/// Append `query` to `path` as an `application/x-www-form-urlencoded` string.
///
/// Pairs are emitted in the order given; an empty slice leaves the path untouched.
pub fn append_query(path: &str, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query.iter().map(|(key, value)| (key.as_str(), value.as_str())))
        .finish();
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{encoded}")
}
