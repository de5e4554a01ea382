//! Decides which chat messages the bot answers and cleans them up.

use teloxide::types::Chat;

/// Kind of chat a message arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatScope {
    Private,
    Group,
    /// Channels and anything else the bot never answers in
    Other,
}

impl From<&Chat> for ChatScope {
    fn from(chat: &Chat) -> Self {
        if chat.is_private() {
            ChatScope::Private
        } else if chat.is_group() || chat.is_supergroup() {
            ChatScope::Group
        } else {
            ChatScope::Other
        }
    }
}

/// Returns the text to send to the model, or `None` when the bot should stay
/// silent: commands, empty text, and group messages without a mention.
#[must_use]
pub fn prepare_prompt(text: &str, scope: ChatScope, bot_username: Option<&str>) -> Option<String> {
    if text.is_empty() || text.starts_with('/') {
        return None;
    }

    if !should_respond(text, scope, bot_username) {
        return None;
    }

    let cleaned = match bot_username {
        Some(username) => strip_mention(text, username),
        None => text.trim().to_string(),
    };

    if cleaned.is_empty() { None } else { Some(cleaned) }
}

fn should_respond(text: &str, scope: ChatScope, bot_username: Option<&str>) -> bool {
    match scope {
        ChatScope::Private => true,
        ChatScope::Group => {
            bot_username.is_some_and(|username| find_mention(text, username).is_some())
        }
        ChatScope::Other => false,
    }
}

/// Byte offset of the first case-insensitive `@username` in `text`.
fn find_mention(text: &str, username: &str) -> Option<usize> {
    let needle = format!("@{}", username.to_ascii_lowercase());
    // ASCII lowercasing keeps byte offsets aligned with `text`
    text.to_ascii_lowercase().find(&needle)
}

/// Remove every `@username` mention (case-insensitive) and trim.
fn strip_mention(text: &str, username: &str) -> String {
    let mention_len = username.len() + 1;
    let mut remaining = text;
    let mut cleaned = String::with_capacity(text.len());

    while let Some(start) = find_mention(remaining, username) {
        cleaned.push_str(&remaining[..start]);
        remaining = &remaining[start + mention_len..];
    }
    cleaned.push_str(remaining);

    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT: Option<&str> = Some("DobbyBot");

    #[test]
    fn private_chats_get_every_message() {
        assert_eq!(
            prepare_prompt("  what is rust?  ", ChatScope::Private, BOT),
            Some("what is rust?".to_string())
        );
    }

    #[test]
    fn commands_and_empty_text_are_ignored() {
        assert_eq!(prepare_prompt("/start", ChatScope::Private, BOT), None);
        assert_eq!(prepare_prompt("", ChatScope::Private, BOT), None);
    }

    #[test]
    fn groups_require_a_mention() {
        assert_eq!(prepare_prompt("hello all", ChatScope::Group, BOT), None);
        assert_eq!(
            prepare_prompt("@dobbybot hello", ChatScope::Group, BOT),
            Some("hello".to_string())
        );
        assert_eq!(prepare_prompt("hello", ChatScope::Group, None), None);
    }

    #[test]
    fn every_mention_is_stripped() {
        assert_eq!(
            prepare_prompt("hey @DobbyBot, tell @DOBBYBOT a joke", ChatScope::Group, BOT),
            Some("hey , tell  a joke".to_string())
        );
    }

    #[test]
    fn bare_mention_is_ignored() {
        assert_eq!(prepare_prompt("@DobbyBot", ChatScope::Group, BOT), None);
    }

    #[test]
    fn channels_are_ignored() {
        assert_eq!(prepare_prompt("@DobbyBot hi", ChatScope::Other, BOT), None);
    }

    #[test]
    fn non_ascii_text_around_mentions_survives() {
        assert_eq!(
            prepare_prompt("привет @dobbybot ёж", ChatScope::Group, BOT),
            Some("привет  ёж".to_string())
        );
    }
}
