//! The delivery seam between navigation logic and the Telegram API.
//!
//! The controller talks to a [`Outbound`] trait object so the upsert
//! logic (edit in place, fall back to a fresh message) is testable with
//! a fake. [`TelegramOutbound`] is the production implementation.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId};
use teloxide::{ApiError, RequestError};
use thiserror::Error;

use crate::render::Screen;

/// A send that failed outright.
#[derive(Debug, Error)]
#[error("failed to deliver message: {0}")]
pub struct OutboundError(pub String);

/// Why an in-place edit did not succeed. The two named variants drive
/// the upsert fallback; everything else is [`EditFailure::Other`].
#[derive(Debug, Error)]
pub enum EditFailure {
    /// The rendered screen is identical to what is already on screen.
    /// Treated as success.
    #[error("message is not modified")]
    NotModified,
    /// The anchored message was deleted or is too old to edit. The
    /// caller should send a fresh message and re-anchor.
    #[error("message to edit not found")]
    MessageMissing,
    /// Any other delivery failure.
    #[error("edit failed: {0}")]
    Other(String),
}

/// Message delivery operations the controller needs.
#[async_trait]
pub trait Outbound: Send + Sync {
    /// Send a new screen message, returning its id.
    async fn send_message(
        &self,
        chat_id: ChatId,
        screen: &Screen,
    ) -> Result<MessageId, OutboundError>;

    /// Edit an existing message in place.
    async fn edit_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        screen: &Screen,
    ) -> Result<(), EditFailure>;

    /// Send a plain text message without a keyboard.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), OutboundError>;
}

/// Production delivery through the Bot API.
#[derive(Clone)]
pub struct TelegramOutbound {
    bot: Bot,
}

impl TelegramOutbound {
    /// Wrap a bot handle.
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Outbound for TelegramOutbound {
    async fn send_message(
        &self,
        chat_id: ChatId,
        screen: &Screen,
    ) -> Result<MessageId, OutboundError> {
        let message = self
            .bot
            .send_message(chat_id, screen.text.clone())
            .reply_markup(screen.keyboard.clone())
            .await
            .map_err(|e| OutboundError(e.to_string()))?;
        Ok(message.id)
    }

    async fn edit_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        screen: &Screen,
    ) -> Result<(), EditFailure> {
        match self
            .bot
            .edit_message_text(chat_id, message_id, screen.text.clone())
            .reply_markup(screen.keyboard.clone())
            .await
        {
            Ok(_) => Ok(()),
            Err(RequestError::Api(ApiError::MessageNotModified)) => {
                Err(EditFailure::NotModified)
            },
            Err(RequestError::Api(ApiError::MessageToEditNotFound)) => {
                Err(EditFailure::MessageMissing)
            },
            Err(e) => Err(EditFailure::Other(e.to_string())),
        }
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), OutboundError> {
        self.bot
            .send_message(chat_id, text)
            .await
            .map_err(|e| OutboundError(e.to_string()))?;
        Ok(())
    }
}
