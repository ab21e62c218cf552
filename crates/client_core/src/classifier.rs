//! Taxonomy-driven failure classifier.
//!
//! Rules are applied in order and the first match wins; the ordering is part
//! of the contract (a 403 whose message also says "invalid" must classify as
//! Permission, not Validation). Matching is substring-based on the lowercased
//! message, which is coupled to upstream wording; structured error codes from
//! the remote side would replace this without changing the `Outcome` shape.

use std::collections::HashMap;
use std::time::Duration;

use shared::error::RemoteError;

use crate::outcome::Outcome;

const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Classify a raw remote failure into a typed `Outcome`.
///
/// Pure and deterministic: identical inputs always produce the identical
/// classification.
pub fn classify(failure: &RemoteError) -> Outcome {
    let message = failure.message.as_str();
    let lower = message.to_ascii_lowercase();
    let status = failure.status;

    if status == Some(429) || lower.contains("rate limit") || lower.contains("rate_limited") {
        let retry_after = extract_retry_after(&lower).unwrap_or(DEFAULT_RETRY_AFTER);
        return Outcome::rate_limit("rate limit exceeded", retry_after);
    }

    if status == Some(401)
        || status == Some(403)
        || lower.contains("not authorized")
        || lower.contains("permission denied")
        || lower.contains("forbidden")
        || lower.contains("does not have access")
    {
        return Outcome::permission(message);
    }

    if status == Some(400)
        || lower.contains("invalid")
        || lower.contains("validation")
        || (lower.contains("not found") && lower.contains("user"))
    {
        return Outcome::validation(message, extract_field_errors(&lower));
    }

    if status == Some(409) || lower.contains("conflict") || lower.contains("concurrent") {
        return Outcome::conflict(message);
    }

    if lower.contains("timeout")
        || lower.contains("connection")
        || lower.contains("network")
        || lower.contains("temporary")
        || status.is_some_and(|s| s >= 500)
    {
        return Outcome::transient(message);
    }

    Outcome::unknown(message)
}

/// Pull a `<n> second(s)` or `<n>s` duration token out of a rate-limit
/// message. Returns `None` when no recognizable token is present.
fn extract_retry_after(lower: &str) -> Option<Duration> {
    let tokens: Vec<&str> = lower
        .split(|c: char| c.is_whitespace() || c == ',' || c == '.' || c == ';')
        .filter(|t| !t.is_empty())
        .collect();

    for (i, token) in tokens.iter().enumerate() {
        if let Ok(secs) = token.parse::<u64>() {
            if tokens
                .get(i + 1)
                .is_some_and(|next| next.starts_with("second") || *next == "s" || *next == "sec")
            {
                return Some(Duration::from_secs(secs));
            }
        } else if let Some(stripped) = token.strip_suffix('s') {
            if let Ok(secs) = stripped.parse::<u64>() {
                return Some(Duration::from_secs(secs));
            }
        }
    }

    None
}

/// Heuristic extraction of field-level validation errors from a message.
fn extract_field_errors(lower: &str) -> HashMap<String, String> {
    let mut field_errors = HashMap::new();

    if lower.contains("user") && lower.contains("not found") {
        field_errors.insert("assignee".to_string(), "user not found".to_string());
    }
    if lower.contains("title") {
        field_errors.insert("title".to_string(), "invalid title".to_string());
    }

    field_errors
}

#[cfg(test)]
#[path = "tests/classifier_tests.rs"]
mod tests;
