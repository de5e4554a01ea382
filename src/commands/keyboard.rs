//! Inline keyboard for model selection.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::models::ModelRegistry;

/// Prefix of callback data emitted by model buttons.
pub const MODEL_CALLBACK_PREFIX: &str = "model_";

/// One row with a button per registered model.
pub fn models_keyboard(registry: &ModelRegistry) -> InlineKeyboardMarkup {
    let row = registry
        .iter()
        .map(|(key, descriptor)| {
            InlineKeyboardButton::callback(
                format!("🤖 {}", descriptor.name),
                format!("{MODEL_CALLBACK_PREFIX}{key}"),
            )
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(vec![row])
}

/// The model key carried by a model button's callback data.
pub fn parse_model_callback(data: &str) -> Option<&str> {
    data.strip_prefix(MODEL_CALLBACK_PREFIX)
}
