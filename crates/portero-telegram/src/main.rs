//! Portero Telegram bot — standalone binary.
//!
//! Reads configuration from the environment and runs the bot until
//! shutdown.

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![deny(clippy::unwrap_used)]

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,portero_telegram=info")),
        )
        .init();

    let config = portero_telegram::config::BotConfig::load()?;
    Box::pin(portero_telegram::bot::run(config)).await
}
