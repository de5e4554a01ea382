//! Inline keyboard presses from the `/models` message.

use std::sync::Arc;

use log::{error, info, warn};
use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::bot::{Data, log_processing};
use crate::commands::{model_changed_text, models_keyboard, models_text, parse_model_callback};
use crate::error::Result;

/// Dispatcher endpoint for callback queries.
pub async fn callback_endpoint(bot: Bot, query: CallbackQuery, data: Arc<Data>) -> Result<()> {
    log_processing("callback", handle_callback(&bot, &query, &data)).await
}

async fn handle_callback(bot: &Bot, query: &CallbackQuery, data: &Data) -> Result<()> {
    let Some(payload) = query.data.as_deref() else {
        bot.answer_callback_query(query.id.clone())
            .text("❌ Unable to process callback")
            .await?;
        return Ok(());
    };

    let Some(model_key) = parse_model_callback(payload) else {
        warn!("Unknown callback data '{payload}'");
        bot.answer_callback_query(query.id.clone())
            .text("❌ Unknown callback type")
            .await?;
        return Ok(());
    };

    let user_id = query.from.id.0;
    let info = {
        let mut preferences = data.preferences().write().await;
        if !preferences.set_user_model(user_id, model_key) {
            drop(preferences);
            bot.answer_callback_query(query.id.clone())
                .text("❌ Invalid model selected")
                .await?;
            return Ok(());
        }
        preferences.user_model_info(user_id)
    };
    info!("User {user_id} selected model '{}' via keyboard", info.key);

    bot.answer_callback_query(query.id.clone())
        .text(format!("✅ Model changed to {}!", info.key))
        .await?;

    let Some(message) = query.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;

    bot.send_message(chat_id, model_changed_text(&info))
        .parse_mode(ParseMode::MarkdownV2)
        .await?;

    if let Err(e) = bot
        .edit_message_text(chat_id, message.id(), models_text(data.registry(), &info.key))
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(models_keyboard(data.registry()))
        .await
    {
        error!("Failed to update models message in chat {chat_id}: {e}");
    }

    Ok(())
}
