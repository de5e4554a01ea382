use reqwest::StatusCode;
use thiserror::Error;

/// Failures of a single completion request.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Completion API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("No response content from completion API")]
    EmptyResponse,

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Generation failed: {0}")]
    Generation(#[from] CompletionError),
}

impl BotError {
    /// Returns a user-friendly error message suitable for displaying in Telegram
    pub fn user_message(&self) -> String {
        match self {
            BotError::Telegram(_) => {
                "❌ An error occurred while processing the message. Please try again later.".to_string()
            }
            BotError::Config(_) | BotError::EnvVar(_) => {
                "❌ There's a configuration issue on my end. Please contact the bot administrator.".to_string()
            }
            BotError::Generation(_) => {
                "❌ Error: Failed to get AI response. Please try again.".to_string()
            }
        }
    }

    /// Whether the error came out of the completion client.
    pub fn is_generation(&self) -> bool {
        matches!(self, BotError::Generation(_))
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
