//! Per-user conversation history.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Messages retained per user; older ones are dropped.
pub const HISTORY_CAP: usize = 50;

/// Messages handed to a model as conversational context.
pub const CONTEXT_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

pub trait ConversationStore: Send + Sync {
    /// Appends a message to the user's history, evicting the oldest entries
    /// past [`HISTORY_CAP`].
    fn append(&self, user_id: &str, message: ChatMessage) -> Result<()>;

    /// Returns the newest `limit` messages in chronological order.
    fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<ChatMessage>>;

    /// Returns the full retained history in chronological order.
    fn history(&self, user_id: &str) -> Result<Vec<ChatMessage>>;

    /// Drops the user's history.
    fn clear(&self, user_id: &str) -> Result<()>;
}

/// Process-local [`ConversationStore`].
#[derive(Default)]
pub struct InMemoryConversationStore {
    histories: Mutex<HashMap<String, VecDeque<ChatMessage>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationStore for InMemoryConversationStore {
    fn append(&self, user_id: &str, message: ChatMessage) -> Result<()> {
        let mut histories = self.histories.lock().unwrap();
        let history = histories.entry(user_id.to_string()).or_default();
        history.push_back(message);
        while history.len() > HISTORY_CAP {
            history.pop_front();
        }
        Ok(())
    }

    fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<ChatMessage>> {
        let histories = self.histories.lock().unwrap();
        let history = match histories.get(user_id) {
            Some(history) => history,
            None => return Ok(vec![]),
        };
        let skip = history.len().saturating_sub(limit);
        Ok(history.iter().skip(skip).cloned().collect())
    }

    fn history(&self, user_id: &str) -> Result<Vec<ChatMessage>> {
        let histories = self.histories.lock().unwrap();
        Ok(histories
            .get(user_id)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn clear(&self, user_id: &str) -> Result<()> {
        self.histories.lock().unwrap().remove(user_id);
        Ok(())
    }
}
