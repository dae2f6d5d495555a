//! Per-chat session state.
//!
//! One session per Telegram chat: the resolved Telegram user id, the
//! active account (when the backend reports one) and the id of the
//! anchored root message the bot keeps editing in place.

use std::collections::HashMap;
use std::sync::Arc;

use teloxide::types::{ChatId, MessageId};
use tokio::sync::RwLock;

/// State tracked for one chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Telegram user id the chat was resolved to on first contact.
    pub resolved_user_id: u64,
    /// Active backend account, when known.
    pub account_id: Option<i64>,
    /// The single message the bot edits in place.
    pub root_message_id: Option<MessageId>,
}

impl Session {
    fn new(resolved_user_id: u64) -> Self {
        Self {
            resolved_user_id,
            account_id: None,
            root_message_id: None,
        }
    }
}

/// Shared, concurrency-safe map of chat sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<ChatId, Session>>>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one chat's session.
    pub async fn get(&self, chat_id: ChatId) -> Option<Session> {
        self.inner.read().await.get(&chat_id).cloned()
    }

    /// Ensure a session exists for the chat, resolved to `user_id`.
    ///
    /// The resolved user id is immutable once set: a second caller in
    /// the same chat does not take the session over. Returns the
    /// session's resolved user id.
    pub async fn resolve_user(&self, chat_id: ChatId, user_id: u64) -> u64 {
        let mut sessions = self.inner.write().await;
        sessions
            .entry(chat_id)
            .or_insert_with(|| Session::new(user_id))
            .resolved_user_id
    }

    /// Record the active account. No-op when the chat has no session.
    pub async fn set_account(&self, chat_id: ChatId, account_id: Option<i64>) {
        if let Some(session) = self.inner.write().await.get_mut(&chat_id) {
            session.account_id = account_id;
        }
    }

    /// Record the anchored root message. No-op when the chat has no
    /// session.
    pub async fn set_anchor(&self, chat_id: ChatId, message_id: MessageId) {
        if let Some(session) = self.inner.write().await.get_mut(&chat_id) {
            session.root_message_id = Some(message_id);
        }
    }

    /// The anchored root message of a chat, if any.
    pub async fn anchor(&self, chat_id: ChatId) -> Option<MessageId> {
        self.inner
            .read()
            .await
            .get(&chat_id)
            .and_then(|s| s.root_message_id)
    }

    /// Drop a chat's session, returning it.
    pub async fn clear(&self, chat_id: ChatId) -> Option<Session> {
        self.inner.write().await.remove(&chat_id)
    }
}
