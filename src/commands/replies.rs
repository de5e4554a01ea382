//! MarkdownV2 texts for command replies.

use std::fmt::Write;

use chrono::DateTime;

use crate::history::ChatStats;
use crate::markdown::escape_markdown;
use crate::models::ModelRegistry;
use crate::preferences::UserModelInfo;

pub const WELCOME_TEXT: &str = "🌟 *Welcome to Sentient AI Bot\\!*\n\n\
I'm Dobby, your AI assistant powered by advanced language models\\.\n\n\
*What I can do:*\n\
• Answer questions and engage in conversations\n\
• Support multiple AI models \\(70B and Mini\\)\n\
• Remember conversation context\n\
• Provide formatted responses\n\n\
*Commands:*\n\
• /help \\- show this help message\n\
• /chat \\- start a conversation\n\
• /models \\- choose AI model\n\
• /status \\- show current settings\n\
• /clear \\- clear conversation history\n\n\
Just send me a message to start chatting\\! 🚀";

pub const HELP_TEXT: &str = "📚 *Sentient AI Bot Help*\n\n\
*Available Commands:*\n\
• /start \\- welcome message and setup\n\
• /help \\- this help message\n\
• /chat \\- start a new conversation\n\
• /clear \\- clear conversation history\n\
• /status \\- show current AI model and settings\n\
• /models \\- view and select AI models\n\
• /model <name\\> \\- change AI model via command\n\n\
*Usage:*\n\
• In private chats: I respond to all messages\n\
• In group chats: Tag me with @username to get my attention\n\
• I remember conversation context for better responses\n\
• Choose between Dobby 70B \\(quality\\) and Dobby Mini \\(speed\\)\n\n\
*Need more help?* Just ask me anything\\! 🤖";

pub const CLEARED_TEXT: &str = "🧹 *Conversation History Cleared\\!*\n\n\
Your chat history has been reset\\. I'll start fresh with our next conversation\\.";

pub fn chat_text(model_key: &str) -> String {
    format!(
        "💬 *Chat Mode Activated\\!*\n\n\
         I'm ready to chat with you\\! Send me any message and I'll respond using your selected AI model\\.\n\n\
         *Current AI Model:* {}\n\n\
         *Tip:* Use /models to change your AI model or /status to see current settings\\.",
        escape_markdown(model_key)
    )
}

pub fn status_text(info: &UserModelInfo, stats: ChatStats) -> String {
    let mut text = String::from("📊 *Bot Status*\n\n");
    let _ = writeln!(
        text,
        "*Current AI Model:* {}",
        escape_markdown(&info.descriptor.name)
    );
    let _ = writeln!(text, "*Model Key:* `{}`", escape_markdown(&info.key));
    let _ = writeln!(
        text,
        "*Parameters:* {}",
        escape_markdown(&format!("{}B", info.descriptor.parameters))
    );
    let _ = writeln!(
        text,
        "*Endpoint:* `{}`\n",
        escape_markdown(&info.descriptor.endpoint)
    );

    text.push_str("*Chat Statistics:*\n");
    let _ = writeln!(text, "• Total Messages: {}", stats.total_messages);
    let _ = writeln!(
        text,
        "• Last Activity: {}\n",
        escape_markdown(&format_activity(stats.last_activity))
    );

    text.push_str(
        "*Commands:*\n\
         • /models \\- change AI model\n\
         • /clear \\- reset conversation history\n\
         • /help \\- show all commands",
    );
    text
}

/// List of registered models with the current one marked.
pub fn models_text(registry: &ModelRegistry, current_key: &str) -> String {
    let mut text = String::from("🤖 *Available AI Models:*\n\n");
    for (key, descriptor) in registry.iter() {
        let status = if key == current_key {
            "✅ *CURRENT*"
        } else {
            "⚪"
        };
        let _ = writeln!(text, "{status} *{}*", escape_markdown(key));
        let _ = writeln!(text, "   {}\n", escape_markdown(&descriptor.description));
    }

    text.push_str("\n💡 *Click the button below to change your model:*\n\n");
    let _ = write!(
        text,
        "*Your current model:* {}",
        escape_markdown(current_key)
    );
    text
}

pub fn model_changed_text(info: &UserModelInfo) -> String {
    format!(
        "🎉 *Model changed successfully\\!*\n\n\
         *New model:* {}\n\
         *Model URL:* `{}`\n\n\
         Your conversation will now use this model\\. You can use /models to see your current selection\\.",
        escape_markdown(&info.key),
        escape_markdown(&info.descriptor.endpoint)
    )
}

pub fn model_usage_text(registry: &ModelRegistry) -> String {
    let mut text = String::from("❌ *Usage:* /model <model\\_name\\>\n\n");
    push_model_list(&mut text, registry);
    if let Some(key) = registry.keys().last() {
        let _ = write!(text, "\n*Example:* /model {}", escape_markdown(key));
    }
    text
}

pub fn invalid_model_text(registry: &ModelRegistry, suggestion: Option<&str>) -> String {
    let mut text = String::from("❌ *Invalid model name\\!*\n\n");
    if let Some(key) = suggestion {
        let _ = writeln!(text, "Did you mean `{}`?\n", escape_markdown(key));
    }
    push_model_list(&mut text, registry);
    text
}

fn push_model_list(text: &mut String, registry: &ModelRegistry) {
    text.push_str("*Available models:*\n");
    for (key, descriptor) in registry.iter() {
        let _ = writeln!(
            text,
            "• `{}` \\- {}",
            escape_markdown(key),
            escape_markdown(&descriptor.description)
        );
    }
}

/// Human readable time of the newest message.
fn format_activity(last_activity: Option<i64>) -> String {
    last_activity
        .and_then(DateTime::from_timestamp_millis)
        .map_or_else(
            || "Never".to_string(),
            |time| time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        )
}
