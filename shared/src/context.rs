//! Conversation context: bounded turn history behind two stores.
//!
//! One value type, [`ConversationContext`], holds the most recent
//! exchanges fed back into the completion prompt. It is backed either
//! by the anonymous `sessions` row (reset on every visit) or by a
//! user-owned chat (persisted until soft-deleted). Exactly one of the
//! two feeds a given turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::VecDeque;
use tracing::error;
use uuid::Uuid;

use crate::Result;

/// Most recent exchanges kept per conversation.
pub const CONTEXT_CAPACITY: usize = 10;

/// One user/assistant exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub user: String,
    pub assistant: String,
}

/// Bounded, ordered turn history. Oldest exchanges are evicted from
/// the front so the length never exceeds [`CONTEXT_CAPACITY`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationContext {
    exchanges: VecDeque<Exchange>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one exchange, evicting the oldest past capacity.
    pub fn append(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.exchanges.push_back(Exchange {
            user: user.into(),
            assistant: assistant.into(),
        });
        while self.exchanges.len() > CONTEXT_CAPACITY {
            self.exchanges.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Exchanges in arrival order, most recent last.
    pub fn iter(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    /// Render the history for prompt embedding, markup stripped.
    pub fn prompt_history(&self) -> String {
        let mut history = String::new();
        for exchange in &self.exchanges {
            history.push_str(&format!(
                "User: {}\nBAAC: {}\n",
                strip_html(&exchange.user),
                strip_html(&exchange.assistant)
            ));
        }
        history
    }
}

/// Remove markup tags so stored HTML fragments embed cleanly in a
/// plain-text prompt. Not an HTML parser: drops everything between
/// '<' and the next '>'.
pub fn strip_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;

    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Session row state consumed by handlers.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub admin_authenticated: bool,
    pub context: ConversationContext,
}

/// Anonymous, session-scoped context store backed by the `sessions`
/// table. Read failures degrade to an empty session; write failures
/// are logged and swallowed so the user-visible reply still goes out.
pub struct SessionStore {
    pool: PgPool,
}

impl SessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load session state, defaulting when the row is missing or bad.
    pub async fn load(&self, session_id: &str) -> SessionState {
        let row: std::result::Result<Option<(bool, serde_json::Value)>, sqlx::Error> =
            sqlx::query_as("SELECT admin_authenticated, context FROM sessions WHERE id = $1")
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await;

        match row {
            Ok(Some((admin_authenticated, context_json))) => {
                let context = serde_json::from_value(context_json).unwrap_or_default();
                SessionState {
                    admin_authenticated,
                    context,
                }
            }
            Ok(None) => SessionState::default(),
            Err(e) => {
                error!("Failed to load session {}: {}", session_id, e);
                SessionState::default()
            }
        }
    }

    /// Persist a turn into the session context, enforcing the cap.
    pub async fn append(&self, session_id: &str, user: &str, assistant: &str) -> bool {
        let mut state = self.load(session_id).await;
        state.context.append(user, assistant);
        self.save_context(session_id, &state.context).await
    }

    /// Reset the session context (reset-per-visit policy).
    pub async fn clear(&self, session_id: &str) -> bool {
        self.save_context(session_id, &ConversationContext::new())
            .await
    }

    /// Mark the session as admin-authenticated.
    pub async fn mark_admin(&self, session_id: &str) -> bool {
        let result = sqlx::query(
            r#"
            INSERT INTO sessions (id, admin_authenticated, context)
            VALUES ($1, TRUE, '{"exchanges":[]}'::jsonb)
            ON CONFLICT (id) DO UPDATE SET admin_authenticated = TRUE, updated_at = NOW()
            "#,
        )
        .bind(session_id)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            error!("Failed to mark session {} as admin: {}", session_id, e);
            return false;
        }
        true
    }

    /// Check the admin flag for a session id, failing closed.
    pub async fn is_admin(&self, session_id: &str) -> bool {
        self.load(session_id).await.admin_authenticated
    }

    async fn save_context(&self, session_id: &str, context: &ConversationContext) -> bool {
        let context_json = match serde_json::to_value(context) {
            Ok(v) => v,
            Err(e) => {
                error!("Failed to serialize session context: {}", e);
                return false;
            }
        };

        let result = sqlx::query(
            r#"
            INSERT INTO sessions (id, admin_authenticated, context)
            VALUES ($1, FALSE, $2)
            ON CONFLICT (id) DO UPDATE SET context = EXCLUDED.context, updated_at = NOW()
            "#,
        )
        .bind(session_id)
        .bind(&context_json)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            error!("Failed to save session {}: {}", session_id, e);
            return false;
        }
        true
    }
}

/// A persisted chat row.
#[derive(Debug, sqlx::FromRow)]
pub struct ChatRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Authenticated, chat-scoped context store. Every read and write is
/// scoped by the owning user id in the SQL itself; cross-user access
/// behaves as if the chat does not exist.
pub struct ChatStore {
    pool: PgPool,
}

impl ChatStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a chat the user owns, or NotFound.
    pub async fn owned_chat(&self, chat_id: Uuid, user_id: Uuid) -> Result<ChatRow> {
        let chat: Option<ChatRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, title, is_active, created_at, updated_at
            FROM chats
            WHERE id = $1 AND user_id = $2 AND is_active = TRUE
            "#,
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        chat.ok_or_else(|| crate::Error::NotFound("Chat not found".to_string()))
    }

    /// Load the most recent exchanges of an owned chat into a context.
    pub async fn context_for(&self, chat_id: Uuid, user_id: Uuid) -> Result<ConversationContext> {
        self.owned_chat(chat_id, user_id).await?;

        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT user_input, ai_response FROM (
                SELECT user_input, ai_response, created_at
                FROM chat_messages
                WHERE chat_id = $1
                ORDER BY created_at DESC
                LIMIT $2
            ) recent
            ORDER BY created_at ASC
            "#,
        )
        .bind(chat_id)
        .bind(CONTEXT_CAPACITY as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut context = ConversationContext::new();
        for (user, assistant) in rows {
            context.append(user, assistant);
        }
        Ok(context)
    }

    /// Append a turn to an owned chat. Ownership failure is a logged
    /// no-op returning false, never an error bubbled to the user.
    pub async fn append(&self, chat_id: Uuid, user_id: Uuid, user: &str, assistant: &str) -> bool {
        if let Err(e) = self.owned_chat(chat_id, user_id).await {
            error!(
                "Refusing chat append: chat {} not owned by {}: {}",
                chat_id, user_id, e
            );
            return false;
        }

        let result = sqlx::query(
            r#"
            INSERT INTO chat_messages (id, chat_id, user_input, ai_response)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(chat_id)
        .bind(user)
        .bind(assistant)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            error!("Failed to append to chat {}: {}", chat_id, e);
            return false;
        }

        let _ = sqlx::query("UPDATE chats SET updated_at = NOW() WHERE id = $1")
            .bind(chat_id)
            .execute(&self.pool)
            .await;

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_eviction() {
        let mut context = ConversationContext::new();
        for i in 0..25 {
            context.append(format!("q{}", i), format!("a{}", i));
        }

        assert_eq!(context.len(), CONTEXT_CAPACITY);
        let first = context.iter().next().unwrap();
        assert_eq!(first.user, "q15");
        let last = context.iter().last().unwrap();
        assert_eq!(last.user, "q24");
    }

    #[test]
    fn test_length_is_min_n_capacity() {
        let mut context = ConversationContext::new();
        for i in 0..4 {
            context.append(format!("q{}", i), "a");
        }
        assert_eq!(context.len(), 4);
    }

    #[test]
    fn test_clear() {
        let mut context = ConversationContext::new();
        context.append("hello", "hi");
        context.clear();
        assert!(context.is_empty());
    }

    #[test]
    fn test_strip_html() {
        let stripped = strip_html("<div class=\"x\"><p>two  words</p></div>");
        assert_eq!(stripped, "two words");
    }

    #[test]
    fn test_prompt_history_is_markup_free() {
        let mut context = ConversationContext::new();
        context.append("hi", "<div><p>hello there</p></div>");
        let history = context.prompt_history();
        assert!(history.contains("BAAC: hello there"));
        assert!(!history.contains('<'));
    }

    #[test]
    fn test_context_round_trips_through_json() {
        let mut context = ConversationContext::new();
        context.append("q", "a");
        let value = serde_json::to_value(&context).unwrap();
        let back: ConversationContext = serde_json::from_value(value).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back.iter().next().unwrap().user, "q");
    }
}
