//! Registry of the hosted models a user can pick from.

use log::debug;
use strsim::normalized_levenshtein;

use crate::error::{BotError, Result};

/// Minimum similarity for a model key suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.5;

/// Static description of one hosted model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    /// Human readable name
    pub name: String,
    /// Identifier the completion provider uses to route the request
    pub endpoint: String,
    pub description: String,
    /// Parameter count in billions
    pub parameters: f64,
}

impl ModelDescriptor {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        description: impl Into<String>,
        parameters: f64,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Ordered, immutable mapping from model key to descriptor.
///
/// The default and lightweight entries are stored as indices that the
/// constructors have checked, so both always resolve.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    entries: Vec<(String, ModelDescriptor)>,
    default_index: usize,
    lightweight_index: usize,
}

impl ModelRegistry {
    /// Build a registry, checking that the default and lightweight keys exist.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either key is missing from `entries`.
    pub fn new(
        entries: Vec<(String, ModelDescriptor)>,
        default_key: &str,
        lightweight_key: &str,
    ) -> Result<Self> {
        let default_index = position(&entries, default_key)?;
        let lightweight_index = position(&entries, lightweight_key)?;

        Ok(Self {
            entries,
            default_index,
            lightweight_index,
        })
    }

    /// The Dobby models served by Fireworks.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                (
                    "dobby-70b".to_string(),
                    ModelDescriptor::new(
                        "Dobby 70B",
                        "accounts/sentientfoundation/models/dobby-unhinged-llama-3-3-70b-new",
                        "Full 70B parameter model for high-quality responses and complex reasoning",
                        70.0,
                    ),
                ),
                (
                    "dobby-mini".to_string(),
                    ModelDescriptor::new(
                        "Dobby Mini",
                        "accounts/sentientfoundation-serverless/models/dobby-mini-unhinged-plus-llama-3-1-8b",
                        "Lightweight 1.8B parameter model for fast responses",
                        1.8,
                    ),
                ),
            ],
            default_index: 0,
            lightweight_index: 1,
        }
    }

    /// Replace the default model key.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `key` is not a registered model.
    pub fn with_default(mut self, key: &str) -> Result<Self> {
        self.default_index = position(&self.entries, key)?;
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ModelDescriptor> {
        self.entries
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, descriptor)| descriptor)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelDescriptor)> {
        self.entries
            .iter()
            .map(|(key, descriptor)| (key.as_str(), descriptor))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn default_key(&self) -> &str {
        &self.entries[self.default_index].0
    }

    /// Key of the cheapest model, used for connectivity probes.
    #[must_use]
    pub fn lightweight_key(&self) -> &str {
        &self.entries[self.lightweight_index].0
    }

    /// Returns `key` if it names a registered model, otherwise the default key.
    #[must_use]
    pub fn resolve_or_default(&self, key: Option<&str>) -> &str {
        self.resolve_entry(key).0
    }

    /// Like [`Self::resolve_or_default`], also returning the descriptor.
    #[must_use]
    pub fn resolve_entry(&self, key: Option<&str>) -> (&str, &ModelDescriptor) {
        if let Some(key) = key {
            if let Some((entry_key, descriptor)) =
                self.entries.iter().find(|(entry_key, _)| entry_key == key)
            {
                return (entry_key.as_str(), descriptor);
            }
            debug!("Model '{key}' is no longer registered, using default");
        }

        let (key, descriptor) = &self.entries[self.default_index];
        (key.as_str(), descriptor)
    }

    /// Closest registered key to `query`, if any is similar enough.
    #[must_use]
    pub fn suggest(&self, query: &str) -> Option<&str> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        self.keys()
            .map(|key| (key, normalized_levenshtein(key, &query)))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|(_, left), (_, right)| left.total_cmp(right))
            .map(|(key, _)| key)
    }
}

fn position(entries: &[(String, ModelDescriptor)], key: &str) -> Result<usize> {
    entries
        .iter()
        .position(|(entry_key, _)| entry_key == key)
        .ok_or_else(|| BotError::Config(format!("model '{key}' is not in the model registry")))
}
