//! Canonical result of every backend call.

use serde_json::Value;

use portero_core::ErrorCategory;

/// What a backend request produced, success or not.
///
/// Invariants: `ok == true` iff the transport succeeded with a 2xx
/// status; `status == 0` denotes a transport-level failure and is
/// distinct from any HTTP status; `ok == true` implies `error` is
/// absent.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOutcome {
    /// Transport succeeded with a success status.
    pub ok: bool,
    /// HTTP status, or 0 for transport failures.
    pub status: u16,
    /// Opportunistically parsed JSON body. Malformed bodies degrade to
    /// `None` instead of raising.
    pub data: Option<Value>,
    /// Failure detail, absent on success.
    pub error: Option<String>,
}

impl RequestOutcome {
    /// A 2xx response.
    #[must_use]
    pub fn success(status: u16, data: Option<Value>) -> Self {
        Self {
            ok: true,
            status,
            data,
            error: None,
        }
    }

    /// A response with a failure status.
    #[must_use]
    pub fn failure(status: u16, data: Option<Value>, error: Option<String>) -> Self {
        Self {
            ok: false,
            status,
            data,
            error,
        }
    }

    /// A transport-level failure: timeout, refused connection, or an
    /// unusable base URL. No HTTP response was observed.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: 0,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Error category of a failed outcome; `None` when `ok`.
    #[must_use]
    pub fn category(&self) -> Option<ErrorCategory> {
        if self.ok {
            None
        } else {
            Some(ErrorCategory::from_status(self.status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_carries_no_error() {
        let outcome = RequestOutcome::success(200, Some(json!({"ok": true})));
        assert!(outcome.ok);
        assert!(outcome.error.is_none());
        assert!(outcome.category().is_none());
    }

    #[test]
    fn transport_has_status_zero() {
        let outcome = RequestOutcome::transport("Timeout");
        assert!(!outcome.ok);
        assert_eq!(outcome.status, 0);
        assert!(outcome.data.is_none());
        assert_eq!(outcome.category(), Some(ErrorCategory::Transport));
        assert_eq!(outcome.error.as_deref(), Some("Timeout"));
    }

    #[test]
    fn failure_maps_to_category() {
        let outcome = RequestOutcome::failure(403, None, Some("FORBIDDEN".to_owned()));
        assert_eq!(outcome.category(), Some(ErrorCategory::Forbidden));
    }
}
