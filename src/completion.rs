//! Client for the OpenAI-compatible chat completions endpoint.

use std::sync::Arc;

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{BotError, CompletionError, Result};
use crate::models::ModelRegistry;
use crate::types::{ConversationMessage, MessageRole};

/// Fireworks inference API root
pub const DEFAULT_BASE_URL: &str = "https://api.fireworks.ai/inference/v1";

// Fixed generation parameters, not user configurable
const MAX_TOKENS: u32 = 4096;
const TEMPERATURE: f32 = 0.6;
const TOP_P: f32 = 1.0;
const TOP_K: u32 = 40;

const PROBE_MESSAGE: &str = "Hello";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

/// Message as sent to the API, without the local timestamp.
#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: MessageRole,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct CompletionClient {
    api_key: String,
    client: reqwest::Client,
    endpoint: Url,
    registry: Arc<ModelRegistry>,
}

impl CompletionClient {
    /// Create a client posting to `{base_url}/chat/completions`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the completions URL cannot be built.
    pub fn new(api_key: String, base_url: &Url, registry: Arc<ModelRegistry>) -> Result<Self> {
        let endpoint = completions_url(base_url)?;
        debug!("Completion endpoint: {endpoint}");

        Ok(Self {
            api_key,
            client: reqwest::Client::new(),
            endpoint,
            registry,
        })
    }

    /// Send the conversation to the model behind `model_key` and return its reply.
    ///
    /// # Errors
    ///
    /// Every failure is reported as [`BotError::Generation`]
    /// wrapping the cause: unknown model, non-success status, transport
    /// error, or a response without content.
    pub async fn generate_response(
        &self,
        messages: &[ConversationMessage],
        model_key: &str,
    ) -> Result<String> {
        self.request_completion(messages, model_key)
            .await
            .map_err(|e| {
                error!("Error calling completion API: {e}");
                e.into()
            })
    }

    async fn request_completion(
        &self,
        messages: &[ConversationMessage],
        model_key: &str,
    ) -> std::result::Result<String, CompletionError> {
        let model = self
            .registry
            .get(model_key)
            .ok_or_else(|| CompletionError::UnknownModel(model_key.to_string()))?;

        debug!(
            "Sending {} messages to model '{}' ({})",
            messages.len(),
            model_key,
            model.endpoint
        );

        let request = CompletionRequest {
            model: &model.endpoint,
            messages: messages
                .iter()
                .map(|message| WireMessage {
                    role: message.role,
                    content: &message.content,
                })
                .collect(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            top_k: TOP_K,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            return Err(CompletionError::Api { status, message });
        }

        let api_response: CompletionResponse = response.json().await?;

        let reply = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(CompletionError::EmptyResponse)?;

        debug!("Received {} characters from completion API", reply.len());
        Ok(reply)
    }

    /// Probe the API with the lightweight model. Never fails; returns reachability.
    pub async fn test_connection(&self) -> bool {
        let probe = [ConversationMessage::new(MessageRole::User, PROBE_MESSAGE)];
        match self
            .generate_response(&probe, self.registry.lightweight_key())
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!("Completion API connection test failed: {e}");
                false
            }
        }
    }

    #[must_use]
    pub fn available_models(&self) -> &ModelRegistry {
        &self.registry
    }
}

fn completions_url(base_url: &Url) -> Result<Url> {
    // `Url::join` replaces the last segment unless the base ends with '/'
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join("chat/completions")
        .map_err(|e| BotError::Config(format!("invalid completion URL: {e}")))
}
