use std::env;

use log::{debug, error, info};
use url::Url;

use crate::completion::DEFAULT_BASE_URL;
use crate::error::{BotError, Result};
use crate::history::DEFAULT_CONTEXT_WINDOW;

/// Persona prompt sent ahead of every conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Dobby - AI assistant. You speak directly, always try to be helpful and honest. You support freedom, cryptocurrencies and decentralization. Answer briefly and to the point.";

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub fireworks_api_key: String,
    pub fireworks_base_url: Url,
    /// Overrides the registry's default model when set
    pub default_model: Option<String>,
    pub system_prompt: String,
    pub context_window: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name))
    }

    /// Build the configuration from an arbitrary variable source.
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, env::VarError>,
    {
        let telegram_token = required(&lookup, "TELEGRAM_TOKEN")?;
        let fireworks_api_key = required(&lookup, "FIREWORKS_API_KEY")?;

        let base_url = optional(&lookup, "FIREWORKS_BASE_URL")?
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let fireworks_base_url = Url::parse(&base_url).map_err(|e| {
            error!("Invalid FIREWORKS_BASE_URL '{base_url}': {e}");
            BotError::Config(format!("FIREWORKS_BASE_URL is not a valid URL: {e}"))
        })?;

        let default_model = optional(&lookup, "DEFAULT_MODEL")?;

        let system_prompt = optional(&lookup, "SYSTEM_PROMPT")?
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let context_window = match optional(&lookup, "CONTEXT_WINDOW")? {
            Some(raw) => parse_context_window(&raw)?,
            None => DEFAULT_CONTEXT_WINDOW,
        };

        info!("Configuration loaded successfully");
        debug!(
            "Telegram token length: {} characters",
            telegram_token.len()
        );
        debug!(
            "Fireworks API key length: {} characters",
            fireworks_api_key.len()
        );
        debug!("Fireworks base URL: {fireworks_base_url}");
        debug!("Default model override: {default_model:?}");
        debug!("System prompt length: {} characters", system_prompt.len());
        debug!("Context window: {context_window} messages");

        Ok(Self {
            telegram_token,
            fireworks_api_key,
            fireworks_base_url,
            default_model,
            system_prompt,
            context_window,
        })
    }
}

/// A credential that must be set to a non-blank value.
fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> std::result::Result<String, env::VarError>,
{
    let value = lookup(name).map_err(|e| {
        error!("Failed to load {name} from environment: {e}");
        e
    })?;

    if value.trim().is_empty() {
        error!("{name} is set but empty");
        return Err(BotError::Config(format!("{name} is empty")));
    }
    Ok(value)
}

/// Treats unset and blank variables alike; other lookup failures are errors.
fn optional<F>(lookup: &F, name: &str) -> Result<Option<String>>
where
    F: Fn(&str) -> std::result::Result<String, env::VarError>,
{
    match lookup(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => {
            error!("Failed to load {name} from environment: {e}");
            Err(e.into())
        }
    }
}

fn parse_context_window(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(window) if window > 0 => Ok(window),
        _ => {
            error!("Invalid CONTEXT_WINDOW '{raw}'");
            Err(BotError::Config(format!(
                "CONTEXT_WINDOW must be a positive integer, got '{raw}'"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(
        vars: &[(&str, &str)],
    ) -> impl Fn(&str) -> std::result::Result<String, env::VarError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned().ok_or(env::VarError::NotPresent)
    }

    const REQUIRED: [(&str, &str); 2] = [("TELEGRAM_TOKEN", "123:abc"), ("FIREWORKS_API_KEY", "fw_key")];

    #[test]
    fn required_only_uses_defaults() -> Result<()> {
        let config = Config::from_lookup(lookup_from(&REQUIRED))?;
        assert_eq!(config.telegram_token, "123:abc");
        assert_eq!(config.fireworks_api_key, "fw_key");
        assert_eq!(config.fireworks_base_url.as_str(), "https://api.fireworks.ai/inference/v1");
        assert_eq!(config.default_model, None);
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.context_window, DEFAULT_CONTEXT_WINDOW);
        Ok(())
    }

    #[test]
    fn missing_telegram_token_is_fatal() {
        let result = Config::from_lookup(lookup_from(&[("FIREWORKS_API_KEY", "fw_key")]));
        assert!(matches!(result, Err(BotError::EnvVar(env::VarError::NotPresent))));
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let result = Config::from_lookup(lookup_from(&[("TELEGRAM_TOKEN", "123:abc")]));
        assert!(matches!(result, Err(BotError::EnvVar(_))));
    }

    #[test]
    fn blank_credentials_are_fatal() {
        let empty_token = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_TOKEN", ""),
            ("FIREWORKS_API_KEY", "fw_key"),
        ]));
        assert!(matches!(empty_token, Err(BotError::Config(msg)) if msg == "TELEGRAM_TOKEN is empty"));

        let blank_key = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_TOKEN", "123:abc"),
            ("FIREWORKS_API_KEY", "  "),
        ]));
        assert!(matches!(blank_key, Err(BotError::Config(msg)) if msg == "FIREWORKS_API_KEY is empty"));
    }

    #[test]
    fn optional_overrides_are_read() -> Result<()> {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("FIREWORKS_BASE_URL", "http://localhost:8080/v1"),
            ("DEFAULT_MODEL", "dobby-mini"),
            ("SYSTEM_PROMPT", "Be terse."),
            ("CONTEXT_WINDOW", "4"),
        ]);

        let config = Config::from_lookup(lookup_from(&vars))?;
        assert_eq!(config.fireworks_base_url.as_str(), "http://localhost:8080/v1");
        assert_eq!(config.default_model.as_deref(), Some("dobby-mini"));
        assert_eq!(config.system_prompt, "Be terse.");
        assert_eq!(config.context_window, 4);
        Ok(())
    }

    #[test]
    fn blank_optional_falls_back_to_default() -> Result<()> {
        let mut vars = REQUIRED.to_vec();
        vars.push(("SYSTEM_PROMPT", "   "));
        let config = Config::from_lookup(lookup_from(&vars))?;
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
        Ok(())
    }

    #[test]
    fn invalid_context_window_is_rejected() {
        for raw in ["0", "-3", "ten"] {
            let mut vars = REQUIRED.to_vec();
            vars.push(("CONTEXT_WINDOW", raw));
            assert!(matches!(
                Config::from_lookup(lookup_from(&vars)),
                Err(BotError::Config(_))
            ));
        }
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("FIREWORKS_BASE_URL", "not a url"));
        assert!(matches!(
            Config::from_lookup(lookup_from(&vars)),
            Err(BotError::Config(_))
        ));
    }
}
