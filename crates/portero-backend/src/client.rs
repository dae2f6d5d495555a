//! The backend client: timeout, retry loop, correlation ids, and the
//! typed operations the bot consumes.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use portero_core::{GateList, Group, Menu, RetryPolicy};

use crate::error::BackendError;
use crate::normalize;
use crate::outcome::RequestOutcome;

/// How much of a non-JSON error body is kept for logging.
const ERROR_BODY_LIMIT: usize = 120;

/// Connection settings for the authority backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL, e.g. `https://backend.example.com`. Validated on every
    /// request; an empty or unparseable value short-circuits to a
    /// transport outcome without touching the network.
    pub base_url: String,
    /// Optional shared secret sent as `X-API-Key`.
    pub api_key: Option<String>,
    /// Total per-attempt timeout.
    pub timeout: Duration,
    /// Retry schedule for transport failures, 5xx and 429.
    pub retry: RetryPolicy,
}

impl BackendConfig {
    /// Config with the original deployment's defaults (10s timeout, two
    /// retries at 300ms linear steps).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

/// HTTP client to the authority backend.
pub struct BackendClient {
    http: Client,
    config: BackendConfig,
}

impl BackendClient {
    /// Create a client. The base URL is checked lazily per request so a
    /// misconfigured deployment degrades to transport outcomes instead
    /// of refusing to start.
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Issue a request with timeout, classified retries and a fresh
    /// correlation id per attempt. Never errors: every failure mode is
    /// folded into the returned [`RequestOutcome`].
    pub async fn issue(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        extra_headers: Option<HeaderMap>,
    ) -> RequestOutcome {
        let url = match self.request_url(path) {
            Ok(url) => url,
            Err(message) => {
                warn!(path, error = %message, "refusing backend request");
                return RequestOutcome::transport(message);
            },
        };

        let mut failed_attempts: u32 = 0;
        loop {
            let outcome = self
                .attempt(method.clone(), url.clone(), body, extra_headers.as_ref())
                .await;
            if outcome.ok {
                return outcome;
            }

            let retryable = outcome
                .category()
                .is_some_and(portero_core::ErrorCategory::is_retryable);
            if !retryable || !self.config.retry.should_retry(failed_attempts) {
                return outcome;
            }

            failed_attempts = failed_attempts.saturating_add(1);
            let delay = self.config.retry.delay_for_attempt(failed_attempts);
            debug!(
                attempt = failed_attempts,
                delay_ms = delay.as_millis() as u64,
                status = outcome.status,
                "retrying backend request"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// One bounded attempt.
    async fn attempt(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        extra_headers: Option<&HeaderMap>,
    ) -> RequestOutcome {
        let request_id = Uuid::new_v4();
        debug!(%request_id, %method, path = url.path(), "backend request");

        let mut request = self
            .http
            .request(method, url)
            .timeout(self.config.timeout)
            .header("X-Request-Id", request_id.to_string());
        if let Some(api_key) = &self.config.api_key {
            request = request.header("X-API-Key", api_key);
        }
        if let Some(headers) = extra_headers {
            request = request.headers(headers.clone());
        }
        // Content-Type is only set when there is a body.
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let message = if e.is_timeout() {
                    "Timeout".to_owned()
                } else {
                    e.to_string()
                };
                warn!(%request_id, error = %message, "backend transport failure");
                return RequestOutcome::transport(message);
            },
        };

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let data: Option<Value> = if text.is_empty() {
            None
        } else {
            serde_json::from_str(&text).ok()
        };

        if (200..300).contains(&status) {
            return RequestOutcome::success(status, data);
        }

        let error = data
            .as_ref()
            .and_then(error_detail)
            .or_else(|| non_empty_prefix(&text));
        warn!(%request_id, status, error = error.as_deref().unwrap_or("-"), "backend response not ok");
        RequestOutcome::failure(status, data, error)
    }

    fn request_url(&self, path: &str) -> Result<Url, String> {
        let base = self.config.base_url.trim();
        if base.is_empty() {
            return Err("backend base URL is not configured".to_owned());
        }
        let base = Url::parse(base).map_err(|e| format!("invalid backend base URL: {e}"))?;
        base.join(path)
            .map_err(|e| format!("invalid backend request path {path:?}: {e}"))
    }

    // --- typed operations ---

    /// Fetch the per-user menu (modules + profile).
    pub async fn menu(&self, user_id: u64) -> Result<Menu, BackendError> {
        let path = format!("/api/telegram/menu?telegram_id={user_id}");
        let outcome = self.issue(Method::GET, &path, None, None).await;
        if !outcome.ok {
            return Err(BackendError::from_outcome(&outcome));
        }
        Ok(normalize::menu(outcome.data.as_ref()))
    }

    /// List the gate groups visible to the user.
    pub async fn gate_groups(&self, user_id: u64) -> Result<Vec<Group>, BackendError> {
        let path = format!("/api/telegram/gate-groups?telegram_id={user_id}");
        let outcome = self.issue(Method::GET, &path, None, None).await;
        if !outcome.ok {
            return Err(BackendError::from_outcome(&outcome));
        }
        Ok(normalize::groups(outcome.data.as_ref()))
    }

    /// List the gates of one group visible to the user.
    pub async fn gates_in_group(
        &self,
        user_id: u64,
        group_id: i64,
    ) -> Result<GateList, BackendError> {
        let path = format!("/api/telegram/gates?telegram_id={user_id}&group_id={group_id}");
        let outcome = self.issue(Method::GET, &path, None, None).await;
        if !outcome.ok {
            return Err(BackendError::from_outcome(&outcome));
        }
        Ok(normalize::gate_list(outcome.data.as_ref(), group_id))
    }

    /// Issue the open command for a gate.
    ///
    /// A 2xx response whose body explicitly rejects the command (e.g.
    /// `{"accepted": false, "reason": "FORBIDDEN"}`) is still an error.
    pub async fn open_gate(&self, user_id: u64, gate_id: i64) -> Result<(), BackendError> {
        let path = format!("/api/telegram/gates/{gate_id}/open");
        let body = json!({
            "telegramId": user_id,
            "gateId": gate_id,
            "action": "OPEN",
        });
        let outcome = self.issue(Method::POST, &path, Some(&body), None).await;
        if !outcome.ok {
            return Err(BackendError::from_outcome(&outcome));
        }
        let receipt = normalize::command_receipt(outcome.data.as_ref());
        if receipt.accepted {
            Ok(())
        } else {
            Err(BackendError::rejected(outcome.status, receipt.reason))
        }
    }
}

fn error_detail(data: &Value) -> Option<String> {
    ["error", "reason"].iter().find_map(|key| {
        data.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
    })
}

fn non_empty_prefix(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(ERROR_BODY_LIMIT).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(BackendConfig::new(base))
    }

    #[tokio::test]
    async fn empty_base_url_is_transport_without_network() {
        let outcome = client("")
            .issue(Method::GET, "/api/telegram/menu?telegram_id=1", None, None)
            .await;
        assert!(!outcome.ok);
        assert_eq!(outcome.status, 0);
        assert!(outcome.error.unwrap().contains("not configured"));
    }

    #[tokio::test]
    async fn invalid_base_url_is_transport_without_network() {
        let outcome = client("not a url")
            .issue(Method::GET, "/whatever", None, None)
            .await;
        assert!(!outcome.ok);
        assert_eq!(outcome.status, 0);
        assert!(outcome.error.unwrap().contains("invalid backend base URL"));
    }

    #[test]
    fn request_url_joins_path_and_query() {
        let client = client("https://backend.example.com");
        let url = client
            .request_url("/api/telegram/gates?telegram_id=5&group_id=2")
            .unwrap();
        assert_eq!(url.path(), "/api/telegram/gates");
        assert_eq!(url.query(), Some("telegram_id=5&group_id=2"));
    }

    #[test]
    fn error_detail_prefers_error_over_reason() {
        let data = serde_json::json!({"error": "boom", "reason": "other"});
        assert_eq!(error_detail(&data).as_deref(), Some("boom"));
        let data = serde_json::json!({"reason": "FORBIDDEN"});
        assert_eq!(error_detail(&data).as_deref(), Some("FORBIDDEN"));
    }

    #[test]
    fn body_prefix_is_bounded() {
        let long = "x".repeat(500);
        assert_eq!(non_empty_prefix(&long).unwrap().len(), ERROR_BODY_LIMIT);
        assert!(non_empty_prefix("   ").is_none());
    }
}
