//! Navigation controller: resolves action tokens into screens and keeps
//! the single anchored message up to date.
//!
//! All Telegram I/O goes through the [`Outbound`] seam and all backend
//! I/O through [`BackendClient`], so the upsert and fallback rules here
//! are covered by tests with a fake transport and a mock backend.

use teloxide::types::ChatId;
use tracing::{info, warn};

use portero_backend::BackendClient;
use portero_core::ActionToken;

use crate::outbound::{EditFailure, Outbound};
use crate::render::{self, Screen};
use crate::session::SessionStore;

/// What the update handler should do after an action was processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResponse {
    /// The anchored screen was updated; a bare callback ack suffices.
    ScreenShown,
    /// No screen change; show this text as the callback answer instead.
    Ephemeral {
        /// Text for the callback answer.
        text: String,
        /// Show as a modal alert rather than a toast.
        alert: bool,
    },
}

/// Everything an action handler needs, bundled to keep signatures flat.
pub struct ActionContext<'a, O: Outbound + ?Sized> {
    /// Message delivery.
    pub outbound: &'a O,
    /// Authority backend.
    pub backend: &'a BackendClient,
    /// Per-chat sessions.
    pub sessions: &'a SessionStore,
    /// Chat the action came from.
    pub chat_id: ChatId,
    /// Telegram user id of the caller.
    pub user_id: u64,
}

impl<O: Outbound + ?Sized> ActionContext<'_, O> {
    /// The user id backend calls are made for: the session's resolved
    /// user when one exists, otherwise the caller.
    async fn resolved_user(&self) -> u64 {
        match self.sessions.get(self.chat_id).await {
            Some(session) => session.resolved_user_id,
            None => self.user_id,
        }
    }

    /// Show `screen` on the anchored message, editing in place when
    /// possible and falling back to a fresh message otherwise.
    ///
    /// `force_send` skips the edit and always posts a new message; used
    /// by /start so the menu lands below the user's command.
    async fn upsert(&self, screen: &Screen, force_send: bool) -> anyhow::Result<()> {
        if !force_send {
            if let Some(anchor) = self.sessions.anchor(self.chat_id).await {
                match self
                    .outbound
                    .edit_message(self.chat_id, anchor, screen)
                    .await
                {
                    // Re-rendering the current screen is a no-op, not
                    // an error.
                    Ok(()) | Err(EditFailure::NotModified) => return Ok(()),
                    Err(EditFailure::MessageMissing) => {
                        info!(chat_id = self.chat_id.0, "anchor gone, sending fresh message");
                    },
                    Err(EditFailure::Other(e)) => {
                        warn!(chat_id = self.chat_id.0, error = %e, "edit failed, sending fresh message");
                    },
                }
            }
        }

        let message_id = self.outbound.send_message(self.chat_id, screen).await?;
        self.sessions.resolve_user(self.chat_id, self.user_id).await;
        self.sessions.set_anchor(self.chat_id, message_id).await;
        Ok(())
    }

    async fn show_home(&self, force_send: bool) -> anyhow::Result<ActionResponse> {
        let user = self.resolved_user().await;
        match self.backend.menu(user).await {
            Ok(menu) => {
                self.upsert(&render::home(&menu), force_send).await?;
                let account_id = menu.user.and_then(|u| u.account_id);
                self.sessions.set_account(self.chat_id, account_id).await;
            },
            Err(err) => {
                warn!(user, error = %err, "menu fetch failed");
                self.upsert(&render::error(err.category, None), force_send)
                    .await?;
            },
        }
        Ok(ActionResponse::ScreenShown)
    }

    async fn show_groups(&self) -> anyhow::Result<ActionResponse> {
        let user = self.resolved_user().await;
        match self.backend.gate_groups(user).await {
            Ok(groups) if groups.is_empty() => {
                // Nothing to pick from; HOME explains the situation
                // better than an empty list would.
                self.show_home(false).await
            },
            Ok(groups) => {
                self.upsert(&render::groups(&groups), false).await?;
                Ok(ActionResponse::ScreenShown)
            },
            Err(err) => {
                warn!(user, error = %err, "group fetch failed");
                self.upsert(&render::error(err.category, None), false)
                    .await?;
                Ok(ActionResponse::ScreenShown)
            },
        }
    }

    async fn show_gates(&self, group_id: i64) -> anyhow::Result<ActionResponse> {
        let user = self.resolved_user().await;
        match self.backend.gates_in_group(user, group_id).await {
            Ok(list) => {
                self.upsert(&render::gates(&list), false).await?;
            },
            Err(err) => {
                warn!(user, group_id, error = %err, "gate fetch failed");
                self.upsert(
                    &render::error(err.category, Some(ActionToken::Groups)),
                    false,
                )
                .await?;
            },
        }
        Ok(ActionResponse::ScreenShown)
    }

    async fn show_gate(&self, gate_id: i64, group_id: i64) -> anyhow::Result<ActionResponse> {
        let user = self.resolved_user().await;
        // Names are not carried in the token, so re-fetch the group to
        // resolve them. Backend data may have changed since the list
        // was rendered; a vanished gate degrades to not-found.
        match self.backend.gates_in_group(user, group_id).await {
            Ok(list) => match list.gates.iter().find(|g| g.id == gate_id) {
                Some(gate) => {
                    self.upsert(&render::gate_detail(gate, &list.group), false)
                        .await?;
                },
                None => {
                    self.upsert(
                        &render::error(
                            portero_core::ErrorCategory::NotFound,
                            Some(ActionToken::Gates { group_id }),
                        ),
                        false,
                    )
                    .await?;
                },
            },
            Err(err) => {
                warn!(user, gate_id, error = %err, "gate detail fetch failed");
                self.upsert(
                    &render::error(err.category, Some(ActionToken::Gates { group_id })),
                    false,
                )
                .await?;
            },
        }
        Ok(ActionResponse::ScreenShown)
    }

    async fn open_gate(&self, gate_id: i64) -> ActionResponse {
        let user = self.resolved_user().await;
        let result = self.backend.open_gate(user, gate_id).await;
        if let Err(err) = &result {
            warn!(user, gate_id, error = %err, "open command failed");
        } else {
            info!(user, gate_id, "open command accepted");
        }
        ActionResponse::Ephemeral {
            text: render::open_outcome_text(&result),
            alert: result.is_err(),
        }
    }
}

/// Dispatch one decoded action token.
pub async fn handle_action<O: Outbound + ?Sized>(
    ctx: &ActionContext<'_, O>,
    token: ActionToken,
) -> anyhow::Result<ActionResponse> {
    match token {
        ActionToken::Home => ctx.show_home(false).await,
        ActionToken::Help => {
            ctx.upsert(&render::help(), false).await?;
            Ok(ActionResponse::ScreenShown)
        },
        // `gates` is the only module the bot serves today; unknown
        // module keys re-render HOME so stale buttons stay harmless.
        ActionToken::Module { key } if key == "gates" => ctx.show_groups().await,
        ActionToken::Module { .. } => ctx.show_home(false).await,
        ActionToken::Groups => ctx.show_groups().await,
        ActionToken::Gates { group_id } => ctx.show_gates(group_id).await,
        ActionToken::Gate { gate_id, group_id } => ctx.show_gate(gate_id, group_id).await,
        ActionToken::Open { gate_id, .. } => Ok(ctx.open_gate(gate_id).await),
    }
}

/// Handle /start: always post a fresh menu message and anchor to it.
pub async fn start<O: Outbound + ?Sized>(ctx: &ActionContext<'_, O>) -> anyhow::Result<()> {
    ctx.show_home(true).await?;
    Ok(())
}

/// Handle /help: show the help screen on the anchored message.
pub async fn help_command<O: Outbound + ?Sized>(
    ctx: &ActionContext<'_, O>,
) -> anyhow::Result<()> {
    ctx.upsert(&render::help(), false).await
}

/// Handle /open <id>: issue the command and return the result line.
pub async fn open_command<O: Outbound + ?Sized>(
    ctx: &ActionContext<'_, O>,
    gate_id: i64,
) -> String {
    match ctx.open_gate(gate_id).await {
        ActionResponse::Ephemeral { text, .. } => text,
        ActionResponse::ScreenShown => render::open_outcome_text(&Ok(())),
    }
}
