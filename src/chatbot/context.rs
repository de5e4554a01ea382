//! Completion context building from stored history.

use crate::types::{ConversationMessage, MessageRole};

/// Prefix the trimmed history with the system prompt.
pub fn build_completion_messages(
    system_prompt: &str,
    history: Vec<ConversationMessage>,
) -> Vec<ConversationMessage> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ConversationMessage::new(MessageRole::System, system_prompt));
    messages.extend(history);
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_comes_first() {
        let history = vec![
            ConversationMessage::new(MessageRole::User, "hi"),
            ConversationMessage::new(MessageRole::Assistant, "hello"),
        ];

        let messages = build_completion_messages("Be Dobby.", history);
        let roles: Vec<MessageRole> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [MessageRole::System, MessageRole::User, MessageRole::Assistant]
        );
        assert_eq!(messages[0].content, "Be Dobby.");
    }

    #[test]
    fn empty_history_still_carries_system_prompt() {
        let messages = build_completion_messages("Be Dobby.", Vec::new());
        assert_eq!(messages.len(), 1);
    }
}
