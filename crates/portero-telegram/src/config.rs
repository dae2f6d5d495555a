//! Configuration for the Telegram bot.
//!
//! Loaded from environment variables (the deployment targets container
//! platforms where env is the config surface):
//!
//! - `TELEGRAM_BOT_TOKEN` — bot API token (required)
//! - `PORTERO_BACKEND_URL` — authority backend base URL (required)
//! - `PORTERO_API_KEY` — optional shared secret, sent as `X-API-Key`
//! - `PORTERO_TIMEOUT_SECS` — per-attempt timeout (default 10)
//! - `PORTERO_MAX_RETRIES` — retries after the first attempt (default 2)
//! - `TELEGRAM_ALLOWED_USERS` — comma-separated Telegram user ids;
//!   empty means allow all

use std::time::Duration;

use tracing::warn;

use portero_backend::BackendConfig;
use portero_core::RetryPolicy;

use crate::error::{BotError, BotResult};

/// Delay step between retries; grows linearly per attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(300);

/// Telegram bot configuration.
#[derive(Clone)]
pub struct BotConfig {
    /// Telegram Bot API token (from `@BotFather`).
    pub bot_token: String,
    /// Base URL of the authority backend.
    pub backend_base_url: String,
    /// Optional shared secret for the backend.
    pub api_key: Option<String>,
    /// Per-attempt request timeout.
    pub request_timeout: Duration,
    /// Additional attempts after the first one.
    pub max_retries: u32,
    /// Telegram user IDs allowed to interact with the bot.
    /// Empty means allow all users.
    pub allowed_user_ids: Vec<u64>,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"[REDACTED]")
            .field("backend_base_url", &self.backend_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .field("allowed_user_ids", &self.allowed_user_ids)
            .finish()
    }
}

impl BotConfig {
    /// Load configuration from the environment.
    pub fn load() -> BotResult<Self> {
        let bot_token = required("TELEGRAM_BOT_TOKEN")?;
        let backend_base_url = required("PORTERO_BACKEND_URL")?;
        let api_key = optional("PORTERO_API_KEY");

        let request_timeout =
            Duration::from_secs(parse_or("PORTERO_TIMEOUT_SECS", 10));
        let max_retries = parse_or("PORTERO_MAX_RETRIES", 2);

        let allowed_user_ids = optional("TELEGRAM_ALLOWED_USERS")
            .map(|val| parse_allowlist(&val))
            .unwrap_or_default();

        Ok(Self {
            bot_token,
            backend_base_url,
            api_key,
            request_timeout,
            max_retries,
            allowed_user_ids,
        })
    }

    /// Check if a user ID is allowed.
    #[must_use]
    pub fn is_user_allowed(&self, user_id: u64) -> bool {
        self.allowed_user_ids.is_empty() || self.allowed_user_ids.contains(&user_id)
    }

    /// Backend client settings derived from this config.
    #[must_use]
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.backend_base_url.clone(),
            api_key: self.api_key.clone(),
            timeout: self.request_timeout,
            retry: RetryPolicy::new(self.max_retries, RETRY_BASE_DELAY),
        }
    }
}

fn required(name: &str) -> BotResult<String> {
    optional(name).ok_or_else(|| BotError::Config(format!("{name} is required")))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match optional(name) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(value = %raw, "ignoring unparseable {name}, using default");
            default
        }),
    }
}

fn parse_allowlist(raw: &str) -> Vec<u64> {
    raw.split(',')
        .filter_map(|entry| {
            let trimmed = entry.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<u64>() {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(
                        value = trimmed,
                        error = %e,
                        "ignoring unparseable entry in TELEGRAM_ALLOWED_USERS"
                    );
                    None
                },
            }
        })
        .collect()
}
