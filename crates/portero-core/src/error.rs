//! Status-based error taxonomy for backend calls.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Domain category of a failed backend call.
///
/// Status `0` is reserved for transport-level failures (timeout, refused
/// connection, unconfigured base URL) and is distinct from any HTTP
/// status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Status 0: the request never produced an HTTP response.
    Transport,
    /// 4xx other than 401/403/404/429. Terminal.
    ClientError,
    /// 401: the bot's own credentials were rejected. An internal fault,
    /// never a user error.
    AuthError,
    /// 403: the backend denied the user this resource.
    Forbidden,
    /// 404: unknown user or entity.
    NotFound,
    /// 429: debounced or rate limited.
    RateLimited,
    /// 5xx (and other non-4xx failure statuses).
    ServerError,
}

impl ErrorCategory {
    /// Classify an outcome status.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            0 => Self::Transport,
            401 => Self::AuthError,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            400..=499 => Self::ClientError,
            _ => Self::ServerError,
        }
    }

    /// Whether the retry loop may try again for this category.
    ///
    /// Transport failures, 5xx and 429 are worth retrying; any other 4xx
    /// is terminal.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Transport | Self::ServerError | Self::RateLimited)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transport => "transport failure",
            Self::ClientError => "client error",
            Self::AuthError => "authentication error",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::RateLimited => "rate limited",
            Self::ServerError => "server error",
        };
        f.write_str(name)
    }
}
