//! Teloxide bot setup, dispatcher, and handler registration.

use std::sync::Arc;

use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use tracing::{info, warn};

use portero_backend::BackendClient;
use portero_core::ActionToken;

use crate::commands;
use crate::config::BotConfig;
use crate::controller::{self, ActionContext, ActionResponse};
use crate::outbound::TelegramOutbound;
use crate::session::SessionStore;

/// Shared bot state passed to all handlers.
#[derive(Clone)]
pub struct BotState {
    /// Authority backend client.
    pub backend: Arc<BackendClient>,
    /// Per-chat sessions.
    pub sessions: SessionStore,
    /// Bot configuration.
    pub config: Arc<BotConfig>,
}

/// Build `BotState` and the teloxide handler tree from a config.
fn build_state_and_handler(
    config: BotConfig,
) -> (
    BotState,
    Bot,
    teloxide::dispatching::UpdateHandler<anyhow::Error>,
) {
    if config.allowed_user_ids.is_empty() {
        warn!(
            "Telegram bot starting with NO user restrictions — \
             any Telegram user can operate the gates the backend \
             exposes to them. Set TELEGRAM_ALLOWED_USERS to restrict \
             access."
        );
    }

    let bot = Bot::new(&config.bot_token);

    let state = BotState {
        backend: Arc::new(BackendClient::new(config.backend_config())),
        sessions: SessionStore::new(),
        config: Arc::new(config),
    };

    let message_handler = Update::filter_message().endpoint({
        let state = state.clone();
        move |bot: Bot, msg: Message| {
            let state = state.clone();
            async move { Box::pin(commands::handle_message(bot, msg, state)).await }
        }
    });

    let callback_handler = Update::filter_callback_query().endpoint({
        let state = state.clone();
        move |bot: Bot, query: CallbackQuery| {
            let state = state.clone();
            async move { Box::pin(handle_callback(bot, query, state)).await }
        }
    });

    let handler = dptree::entry()
        .branch(message_handler)
        .branch(callback_handler);

    (state, bot, handler)
}

/// Run the Telegram bot until shutdown.
pub async fn run(config: BotConfig) -> anyhow::Result<()> {
    let (_state, bot, handler) = build_state_and_handler(config);

    info!("Starting Telegram bot...");
    Box::pin(
        Dispatcher::builder(bot, handler)
            .enable_ctrlc_handler()
            .build()
            .dispatch(),
    )
    .await;

    info!("Bot stopped");
    Ok(())
}

/// Handle callback queries (every inline button press).
async fn handle_callback(bot: Bot, query: CallbackQuery, state: BotState) -> anyhow::Result<()> {
    // Access control: verify the button-presser is on the allowlist.
    let user_id = query.from.id.0;
    if !state.config.is_user_allowed(user_id) {
        let _ = bot
            .answer_callback_query(&query.id)
            .text("Not authorized")
            .await;
        return Ok(());
    }

    // Buttons on messages Telegram no longer lets us inspect carry no
    // usable chat; just clear the spinner.
    let Some(chat_id) = query.message.as_ref().map(|m| m.chat().id) else {
        let _ = bot.answer_callback_query(&query.id).await;
        return Ok(());
    };

    let token = match query.data.as_deref().map(ActionToken::decode) {
        Some(Ok(token)) => token,
        Some(Err(e)) => {
            warn!(chat_id = chat_id.0, error = %e, "undecodable callback data");
            let _ = bot
                .answer_callback_query(&query.id)
                .text("Unknown action")
                .await;
            return Ok(());
        },
        None => {
            let _ = bot.answer_callback_query(&query.id).await;
            return Ok(());
        },
    };

    let outbound = TelegramOutbound::new(bot.clone());
    let ctx = ActionContext {
        outbound: &outbound,
        backend: state.backend.as_ref(),
        sessions: &state.sessions,
        chat_id,
        user_id,
    };

    match token {
        // The open command's result is the callback answer itself, so
        // the ack waits for the backend.
        token @ ActionToken::Open { .. } => {
            match controller::handle_action(&ctx, token).await? {
                ActionResponse::Ephemeral { text, alert } => {
                    // The user only learns the outcome through this
                    // answer, so a lost one must leave a trace.
                    if let Err(e) = bot
                        .answer_callback_query(&query.id)
                        .text(text)
                        .show_alert(alert)
                        .await
                    {
                        warn!(chat_id = chat_id.0, error = %e, "failed to deliver command result");
                    }
                },
                ActionResponse::ScreenShown => {
                    if let Err(e) = bot.answer_callback_query(&query.id).await {
                        warn!(chat_id = chat_id.0, error = %e, "failed to ack callback");
                    }
                },
            }
        },
        // Navigation: ack immediately so the button stops spinning,
        // then fetch and redraw.
        token => {
            if let Err(e) = bot.answer_callback_query(&query.id).await {
                warn!(chat_id = chat_id.0, error = %e, "failed to ack callback");
            }
            controller::handle_action(&ctx, token).await?;
        },
    }

    Ok(())
}
