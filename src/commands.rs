//! Slash commands: help texts, status and model selection.

mod keyboard;
mod replies;

use std::sync::Arc;

use log::info;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};
use teloxide::utils::command::BotCommands;

use crate::bot::{Data, log_processing};
use crate::error::Result;

pub use keyboard::{models_keyboard, parse_model_callback};
pub use replies::{model_changed_text, models_text};

use replies::{
    CLEARED_TEXT, HELP_TEXT, WELCOME_TEXT, chat_text, invalid_model_text, model_usage_text,
    status_text,
};

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Sentient AI Bot commands:")]
pub enum Command {
    #[command(description = "welcome message and setup")]
    Start,
    #[command(description = "show available commands")]
    Help,
    #[command(description = "start a conversation")]
    Chat,
    #[command(description = "clear conversation history")]
    Clear,
    #[command(description = "show current AI model and settings")]
    Status,
    #[command(description = "view and select AI models")]
    Models,
    #[command(description = "change AI model, e.g. /model dobby-mini")]
    Model(String),
}

/// Dispatcher endpoint for parsed bot commands.
pub async fn command_endpoint(bot: Bot, msg: Message, cmd: Command, data: Arc<Data>) -> Result<()> {
    log_processing("command", handle_command(&bot, &msg, cmd, &data)).await
}

async fn handle_command(bot: &Bot, msg: &Message, cmd: Command, data: &Data) -> Result<()> {
    let chat_id = msg.chat.id;
    let user_id = msg.from.as_ref().map(|user| user.id.0);
    info!("Command {cmd:?} from user {user_id:?} in chat {chat_id}");

    match cmd {
        Command::Start => {
            if user_id.is_some() {
                send_markdown(bot, chat_id, WELCOME_TEXT).await?;
            }
        }
        Command::Help => send_markdown(bot, chat_id, HELP_TEXT).await?,
        Command::Chat => {
            let key = match user_id {
                Some(id) => data.preferences().read().await.user_model(id).to_string(),
                None => data.registry().default_key().to_string(),
            };
            send_markdown(bot, chat_id, chat_text(&key)).await?;
        }
        Command::Clear => {
            data.conversations().write().await.clear_history(chat_id.0);
            send_markdown(bot, chat_id, CLEARED_TEXT).await?;
        }
        Command::Status => {
            let Some(user_id) = user_id else {
                return Ok(());
            };
            let info = data.preferences().read().await.user_model_info(user_id);
            let stats = data.conversations().read().await.stats(chat_id.0);
            send_markdown(bot, chat_id, status_text(&info, stats)).await?;
        }
        Command::Models => {
            let Some(user_id) = user_id else {
                return Ok(());
            };
            let current = data.preferences().read().await.user_model(user_id).to_string();
            bot.send_message(chat_id, models_text(data.registry(), &current))
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(models_keyboard(data.registry()))
                .await?;
        }
        Command::Model(args) => {
            let Some(user_id) = user_id else {
                return Ok(());
            };
            let text = change_model(data, user_id, &args).await;
            send_markdown(bot, chat_id, text).await?;
        }
    }

    Ok(())
}

/// Apply `/model <key>` and return the reply to send.
async fn change_model(data: &Data, user_id: u64, args: &str) -> String {
    let Some(requested) = args.split_whitespace().next() else {
        return model_usage_text(data.registry());
    };

    let mut preferences = data.preferences().write().await;
    if preferences.set_user_model(user_id, requested) {
        model_changed_text(&preferences.user_model_info(user_id))
    } else {
        invalid_model_text(data.registry(), data.registry().suggest(requested))
    }
}

async fn send_markdown(bot: &Bot, chat_id: ChatId, text: impl Into<String>) -> Result<()> {
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::completion::CompletionClient;
    use crate::models::ModelRegistry;

    fn test_data() -> Data {
        let registry = Arc::new(ModelRegistry::builtin());
        let base = Url::parse("http://127.0.0.1:9/").expect("valid url");
        let client = CompletionClient::new("key".to_string(), &base, Arc::clone(&registry))
            .expect("client should build");
        Data::new(registry, client, "prompt".to_string(), 10)
    }

    #[test]
    fn parses_model_argument() {
        let cmd = Command::parse("/model dobby-mini", "DobbyBot").expect("valid command");
        assert_eq!(cmd, Command::Model("dobby-mini".to_string()));
        assert_eq!(
            Command::parse("/status", "DobbyBot").expect("valid command"),
            Command::Status
        );
    }

    #[test]
    fn every_command_is_listed() {
        let listed = Command::descriptions().to_string();
        for name in ["/start", "/help", "/chat", "/clear", "/status", "/models", "/model"] {
            assert!(listed.contains(name), "{name} missing from {listed}");
        }
    }

    #[tokio::test]
    async fn model_command_switches_valid_keys() {
        let data = test_data();
        let text = change_model(&data, 3, "  dobby-mini extra").await;
        assert!(text.contains("Model changed successfully"));
        assert_eq!(data.preferences().read().await.user_model(3), "dobby-mini");
    }

    #[tokio::test]
    async fn model_command_rejects_unknown_keys_with_suggestion() {
        let data = test_data();
        let text = change_model(&data, 3, "dobby-mni").await;
        assert!(text.contains("Invalid model name"));
        assert!(text.contains("Did you mean `dobby\\-mini`?"));
        assert_eq!(data.preferences().read().await.user_model(3), "dobby-70b");
    }

    #[tokio::test]
    async fn model_command_without_argument_shows_usage() {
        let data = test_data();
        assert!(change_model(&data, 3, "   ").await.starts_with("❌ *Usage:*"));
    }
}
