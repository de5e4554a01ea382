//! Main handler for plain text messages.

use std::sync::Arc;

use log::{debug, error, info};
use teloxide::prelude::*;
use teloxide::types::{ChatAction, Me};

use crate::bot::{Data, log_processing};
use crate::error::{BotError, Result};

use super::conversation::generate_reply;
use super::mention::{ChatScope, prepare_prompt};
use super::response::{delete_thinking, send_failure, send_reply, send_thinking};

/// Dispatcher endpoint for messages that are not bot commands.
pub async fn message_endpoint(bot: Bot, msg: Message, me: Me, data: Arc<Data>) -> Result<()> {
    log_processing("message", handle_text_message(&bot, &msg, &me, &data)).await
}

async fn handle_text_message(bot: &Bot, msg: &Message, me: &Me, data: &Data) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(prompt) = prepare_prompt(
        text,
        ChatScope::from(&msg.chat),
        me.user.username.as_deref(),
    ) else {
        return Ok(());
    };

    info!(
        "Received message from user {} in chat {}: {}",
        user.id, msg.chat.id, prompt
    );

    if let Err(e) = answer(bot, msg, data, user.id.0, &prompt).await {
        error!("Error processing message in chat {}: {e}", msg.chat.id);
        if should_apologize(&e) {
            send_failure(bot, msg, &e).await?;
        }
    }

    Ok(())
}

/// Generation failures get one apology; a failed Telegram send is not retried.
fn should_apologize(error: &BotError) -> bool {
    error.is_generation()
}

async fn answer(bot: &Bot, msg: &Message, data: &Data, user_id: u64, prompt: &str) -> Result<()> {
    if let Err(e) = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await {
        debug!("Failed to send typing indicator: {e}");
    }

    let thinking = send_thinking(bot, msg).await?;
    let outcome = generate_reply(data, msg.chat.id.0, user_id, prompt).await;
    delete_thinking(bot, &thinking).await;

    let reply = outcome?;
    send_reply(bot, msg, &reply).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompletionError;

    #[test]
    fn generation_failures_get_an_apology() {
        assert!(should_apologize(&BotError::from(CompletionError::EmptyResponse)));
        assert!(should_apologize(&BotError::from(CompletionError::UnknownModel(
            "gpt".to_string()
        ))));
    }

    #[test]
    fn other_failures_are_only_logged() {
        assert!(!should_apologize(&BotError::Config("missing".to_string())));
        assert!(!should_apologize(&BotError::EnvVar(std::env::VarError::NotPresent)));
    }
}
