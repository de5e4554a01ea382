//! In-memory conversation history, one bounded log per chat.

use std::collections::HashMap;

use log::debug;

use crate::types::{ChatKey, ConversationMessage, MessageRole};

/// Messages kept per chat before the oldest are dropped.
pub const MAX_HISTORY: usize = 50;

/// Messages handed to the model when no window is configured.
pub const DEFAULT_CONTEXT_WINDOW: usize = 10;

/// Summary of a chat's stored history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatStats {
    pub total_messages: usize,
    /// Epoch milliseconds of the newest message
    pub last_activity: Option<i64>,
}

#[derive(Debug)]
pub struct ConversationStore {
    histories: HashMap<ChatKey, Vec<ConversationMessage>>,
    max_history: usize,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity_limit(MAX_HISTORY)
    }

    /// Store that retains at most `max_history` messages per chat.
    #[must_use]
    pub fn with_capacity_limit(max_history: usize) -> Self {
        Self {
            histories: HashMap::new(),
            max_history,
        }
    }

    /// Append a message to the chat, evicting the oldest entries past the limit.
    pub fn add_message(&mut self, chat_id: ChatKey, role: MessageRole, content: impl Into<String>) {
        let history = self.histories.entry(chat_id).or_default();
        history.push(ConversationMessage::new(role, content));

        if history.len() > self.max_history {
            let excess = history.len() - self.max_history;
            history.drain(..excess);
            debug!("Trimmed {excess} old messages from chat {chat_id}");
        }
    }

    /// The last `max_messages` messages of the chat in chronological order.
    #[must_use]
    pub fn context(&self, chat_id: ChatKey, max_messages: usize) -> Vec<ConversationMessage> {
        self.histories
            .get(&chat_id)
            .map(|history| {
                let start = history.len().saturating_sub(max_messages);
                history[start..].to_vec()
            })
            .unwrap_or_default()
    }

    pub fn clear_history(&mut self, chat_id: ChatKey) {
        if self.histories.remove(&chat_id).is_some() {
            debug!("Cleared history for chat {chat_id}");
        }
    }

    #[must_use]
    pub fn stats(&self, chat_id: ChatKey) -> ChatStats {
        let history = self.histories.get(&chat_id);
        ChatStats {
            total_messages: history.map_or(0, Vec::len),
            last_activity: history
                .and_then(|history| history.last())
                .map(|message| message.timestamp),
        }
    }
}
