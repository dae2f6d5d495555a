//! Message handler: slash commands arriving as plain chat messages.

use teloxide::prelude::*;
use tracing::warn;

use crate::bot::BotState;
use crate::controller::{self, ActionContext};
use crate::outbound::{Outbound, TelegramOutbound};

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    /// `/start` — fresh HOME render.
    Start,
    /// `/help` — help screen.
    Help,
    /// `/open <gate id>`; `None` when the argument is missing or not a
    /// number.
    Open(Option<i64>),
    /// Anything else starting with `/`.
    Unknown,
}

/// Parse a message text into a command. Returns `None` for free text,
/// which the bot ignores (button-first UI).
fn parse_command(text: &str) -> Option<Command> {
    if !text.starts_with('/') {
        return None;
    }
    let mut parts = text.split_whitespace();
    // Strip the "@botname" suffix groups attach to commands.
    let command = parts
        .next()
        .unwrap_or_default()
        .split('@')
        .next()
        .unwrap_or_default();

    Some(match command {
        "/start" => Command::Start,
        "/help" => Command::Help,
        "/open" => Command::Open(parts.next().and_then(|arg| arg.parse().ok())),
        _ => Command::Unknown,
    })
}

/// Execute a parsed command through the controller.
async fn dispatch<O: Outbound + ?Sized>(
    ctx: &ActionContext<'_, O>,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Start => controller::start(ctx).await,
        Command::Help => controller::help_command(ctx).await,
        Command::Open(Some(gate_id)) => {
            let result = controller::open_command(ctx, gate_id).await;
            ctx.outbound.send_text(ctx.chat_id, &result).await?;
            Ok(())
        },
        Command::Open(None) => {
            // Bad argument: explain, don't touch the backend.
            ctx.outbound
                .send_text(ctx.chat_id, "Usage: /open <gate id>")
                .await?;
            Ok(())
        },
        Command::Unknown => {
            warn!(chat_id = ctx.chat_id.0, "unknown command");
            ctx.outbound
                .send_text(ctx.chat_id, "Unknown command. Try /help.")
                .await?;
            Ok(())
        },
    }
}

/// Handle an incoming text message.
pub async fn handle_message(bot: Bot, msg: Message, state: BotState) -> anyhow::Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let chat_id = msg.chat.id;

    // Access control: check user identity against the allowlist.
    // If msg.from is absent (channel posts, etc.) and an allowlist is set,
    // deny access since we can't verify the sender.
    let user_allowed = match &msg.from {
        Some(user) => state.config.is_user_allowed(user.id.0),
        None => state.config.allowed_user_ids.is_empty(),
    };
    if !user_allowed {
        let _ = bot
            .send_message(chat_id, "You are not authorized to use this bot.")
            .await;
        return Ok(());
    }

    let Some(command) = parse_command(text) else {
        return Ok(());
    };

    let user_id = msg.from.as_ref().map(|u| u.id.0).unwrap_or_default();
    let outbound = TelegramOutbound::new(bot.clone());
    let ctx = ActionContext {
        outbound: &outbound,
        backend: state.backend.as_ref(),
        sessions: &state.sessions,
        chat_id,
        user_id,
    };

    dispatch(&ctx, command).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use httpmock::prelude::*;
    use teloxide::types::{ChatId, MessageId};

    use portero_backend::{BackendClient, BackendConfig};
    use portero_core::RetryPolicy;

    use super::*;
    use crate::outbound::{EditFailure, OutboundError};
    use crate::render::Screen;
    use crate::session::SessionStore;

    const CHAT: ChatId = ChatId(42);

    #[derive(Default)]
    struct FakeOutbound {
        texts: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Outbound for FakeOutbound {
        async fn send_message(
            &self,
            _chat_id: ChatId,
            _screen: &Screen,
        ) -> Result<MessageId, OutboundError> {
            Ok(MessageId(1))
        }

        async fn edit_message(
            &self,
            _chat_id: ChatId,
            _message_id: MessageId,
            _screen: &Screen,
        ) -> Result<(), EditFailure> {
            Ok(())
        }

        async fn send_text(&self, _chat_id: ChatId, text: &str) -> Result<(), OutboundError> {
            self.texts.lock().unwrap().push(text.to_owned());
            Ok(())
        }
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command("/start"), Some(Command::Start));
        assert_eq!(parse_command("/help"), Some(Command::Help));
        assert_eq!(parse_command("/open 12"), Some(Command::Open(Some(12))));
        assert_eq!(parse_command("/rollcall"), Some(Command::Unknown));
    }

    #[test]
    fn strips_botname_suffix_in_groups() {
        assert_eq!(parse_command("/start@portero_bot"), Some(Command::Start));
        assert_eq!(
            parse_command("/open@portero_bot 12"),
            Some(Command::Open(Some(12)))
        );
    }

    #[test]
    fn free_text_is_not_a_command() {
        assert_eq!(parse_command("open the gate"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn open_without_a_numeric_id_parses_as_invalid() {
        assert_eq!(parse_command("/open"), Some(Command::Open(None)));
        assert_eq!(parse_command("/open main"), Some(Command::Open(None)));
        assert_eq!(parse_command("/open 12.5"), Some(Command::Open(None)));
    }

    #[tokio::test]
    async fn malformed_open_argument_never_reaches_the_backend() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.any_request();
                then.status(200);
            })
            .await;
        let backend = BackendClient::new(BackendConfig {
            base_url: server.base_url(),
            api_key: None,
            timeout: Duration::from_millis(500),
            retry: RetryPolicy::new(2, Duration::from_millis(1)),
        });
        let outbound = FakeOutbound::default();
        let sessions = SessionStore::new();
        let ctx = ActionContext {
            outbound: &outbound,
            backend: &backend,
            sessions: &sessions,
            chat_id: CHAT,
            user_id: 555,
        };

        dispatch(&ctx, Command::Open(None)).await.unwrap();

        // Terminal validation reply, zero backend traffic.
        assert_eq!(mock.hits_async().await, 0);
        assert_eq!(
            outbound.texts.lock().unwrap().as_slice(),
            ["Usage: /open <gate id>"]
        );
    }

    #[tokio::test]
    async fn valid_open_argument_issues_the_command() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/telegram/gates/12/open");
                then.status(200);
            })
            .await;
        let backend = BackendClient::new(BackendConfig::new(server.base_url()));
        let outbound = FakeOutbound::default();
        let sessions = SessionStore::new();
        let ctx = ActionContext {
            outbound: &outbound,
            backend: &backend,
            sessions: &sessions,
            chat_id: CHAT,
            user_id: 555,
        };

        dispatch(&ctx, Command::Open(Some(12))).await.unwrap();

        assert_eq!(mock.hits_async().await, 1);
        assert_eq!(
            outbound.texts.lock().unwrap().as_slice(),
            ["✅ Command sent"]
        );
    }
}
