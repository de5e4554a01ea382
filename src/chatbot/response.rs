//! Response sending utilities for Telegram.

use log::{info, warn};
use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters};

use crate::error::{BotError, Result};
use crate::markdown::{escape_markdown, split_message};

const THINKING_TEXT: &str = "🤖 Dobby is thinking\\.\\.\\.";

// Telegram rejects messages over 4096 characters and escaping can double the
// length of a chunk
const MAX_RAW_CHUNK: usize = 2048;

/// Post the placeholder shown while the model is working.
pub async fn send_thinking(bot: &Bot, message: &Message) -> Result<Message> {
    let thinking = bot
        .send_message(message.chat.id, THINKING_TEXT)
        .parse_mode(ParseMode::MarkdownV2)
        .reply_parameters(ReplyParameters::new(message.id))
        .await?;
    Ok(thinking)
}

/// Remove the placeholder; failures are only logged.
pub async fn delete_thinking(bot: &Bot, thinking: &Message) {
    if let Err(e) = bot.delete_message(thinking.chat.id, thinking.id).await {
        warn!("Failed to delete thinking message: {e}");
    }
}

/// Send the model's reply as escaped MarkdownV2, split to fit Telegram limits.
pub async fn send_reply(bot: &Bot, message: &Message, reply: &str) -> Result<()> {
    for chunk in split_message(reply, MAX_RAW_CHUNK) {
        bot.send_message(message.chat.id, escape_markdown(&chunk))
            .parse_mode(ParseMode::MarkdownV2)
            .reply_parameters(ReplyParameters::new(message.id))
            .await?;
    }

    info!(
        "Replied in chat {} ({} characters)",
        message.chat.id,
        reply.chars().count()
    );
    Ok(())
}

/// Tell the user their request failed.
pub async fn send_failure(bot: &Bot, message: &Message, error: &BotError) -> Result<()> {
    bot.send_message(message.chat.id, escape_markdown(&error.user_message()))
        .parse_mode(ParseMode::MarkdownV2)
        .reply_parameters(ReplyParameters::new(message.id))
        .await?;
    Ok(())
}
