//! Typed classification of remote failures.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Failure taxonomy. Closed set: adding a variant forces every match site
/// (reducer, renderer, retry executor) to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RateLimit,
    Permission,
    Validation,
    Conflict,
    Transient,
    Cancelled,
    PartialSuccess,
    Unknown,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::Permission => "permission",
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Transient => "transient",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::PartialSuccess => "partial_success",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Classified failure. Produced once per raw failure and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<Duration>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub field_errors: HashMap<String, String>,
}

impl Outcome {
    fn new(kind: ErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            retry_after: None,
            field_errors: HashMap::new(),
        }
    }

    pub fn rate_limit(message: impl Into<String>, retry_after: Duration) -> Self {
        let mut outcome = Self::new(ErrorKind::RateLimit, message, true);
        outcome.retry_after = Some(retry_after);
        outcome
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Permission, message, false)
    }

    pub fn validation(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        let mut outcome = Self::new(ErrorKind::Validation, message, false);
        outcome.field_errors = field_errors;
        outcome
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message, false)
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transient, message, true)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "operation cancelled", false)
    }

    pub fn partial_success(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PartialSuccess, message, false)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message, false)
    }

    pub fn is_warning(&self) -> bool {
        self.kind == ErrorKind::PartialSuccess
    }

    /// Human-readable message for the error overlay.
    pub fn user_message(&self) -> String {
        match self.kind {
            ErrorKind::RateLimit => match self.retry_after {
                Some(wait) => format!(
                    "Rate limit reached. Please wait {}s before trying again.",
                    wait.as_secs()
                ),
                None => "Rate limit reached. Please wait a moment before trying again.".to_string(),
            },
            ErrorKind::Permission => {
                if self.message.to_ascii_lowercase().contains("token") {
                    "Permission denied. Your token may not have the required scopes.".to_string()
                } else {
                    "Permission denied. You may not have access to this resource.".to_string()
                }
            }
            ErrorKind::Validation => {
                if self.field_errors.is_empty() {
                    self.message.clone()
                } else {
                    let mut parts: Vec<String> = self
                        .field_errors
                        .iter()
                        .map(|(field, msg)| format!("{field}: {msg}"))
                        .collect();
                    parts.sort();
                    format!("Validation failed: {}", parts.join("; "))
                }
            }
            ErrorKind::Conflict => format!(
                "Conflict: {}. The resource may have been modified by someone else.",
                self.message
            ),
            ErrorKind::Transient => format!(
                "Network error: {}. This will be retried automatically.",
                self.message
            ),
            ErrorKind::Cancelled => "Operation cancelled.".to_string(),
            ErrorKind::PartialSuccess | ErrorKind::Unknown => self.message.clone(),
        }
    }
}
