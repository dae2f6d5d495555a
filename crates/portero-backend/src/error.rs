//! Typed error for the backend operations.

use thiserror::Error;

use portero_core::ErrorCategory;

use crate::outcome::RequestOutcome;

/// A failed backend operation, carrying the domain category the
/// navigation layer maps to user-facing copy.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{category} (status {status}): {message}")]
pub struct BackendError {
    /// Domain category derived from the status.
    pub category: ErrorCategory,
    /// HTTP status, or 0 for transport failures.
    pub status: u16,
    /// Detail for logs; not shown verbatim to users.
    pub message: String,
}

impl BackendError {
    /// Build from a failed [`RequestOutcome`].
    #[must_use]
    pub fn from_outcome(outcome: &RequestOutcome) -> Self {
        Self {
            category: outcome
                .category()
                .unwrap_or(ErrorCategory::ServerError),
            status: outcome.status,
            message: outcome
                .error
                .clone()
                .unwrap_or_else(|| "backend request failed".to_owned()),
        }
    }

    /// A 2xx response whose body explicitly rejected the command.
    #[must_use]
    pub fn rejected(status: u16, reason: Option<String>) -> Self {
        let category = match reason.as_deref() {
            Some("FORBIDDEN") => ErrorCategory::Forbidden,
            _ => ErrorCategory::ClientError,
        };
        Self {
            category,
            status,
            message: reason.unwrap_or_else(|| "command rejected".to_owned()),
        }
    }
}
