//! Per-user model preferences.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};

use crate::models::{ModelDescriptor, ModelRegistry};
use crate::types::UserKey;

/// A user's effective model joined with its descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct UserModelInfo {
    pub key: String,
    pub descriptor: ModelDescriptor,
}

/// Number of users currently pinned to one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelUsage {
    pub key: String,
    pub users: usize,
}

#[derive(Debug)]
pub struct PreferenceStore {
    registry: Arc<ModelRegistry>,
    preferences: HashMap<UserKey, String>,
}

impl PreferenceStore {
    #[must_use]
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            preferences: HashMap::new(),
        }
    }

    /// The user's model key, or the default when unset or no longer registered.
    #[must_use]
    pub fn user_model(&self, user_id: UserKey) -> &str {
        self.registry
            .resolve_or_default(self.preferences.get(&user_id).map(String::as_str))
    }

    /// Store `model_key` for the user. Returns `false` and keeps the previous
    /// choice when the key is not registered.
    pub fn set_user_model(&mut self, user_id: UserKey, model_key: &str) -> bool {
        if !self.registry.contains(model_key) {
            debug!("User {user_id} requested unknown model '{model_key}'");
            return false;
        }

        self.preferences.insert(user_id, model_key.to_string());
        info!("User {user_id} switched to model '{model_key}'");
        true
    }

    #[must_use]
    pub fn user_model_info(&self, user_id: UserKey) -> UserModelInfo {
        let (key, descriptor) = self
            .registry
            .resolve_entry(self.preferences.get(&user_id).map(String::as_str));
        UserModelInfo {
            key: key.to_string(),
            descriptor: descriptor.clone(),
        }
    }

    /// Snapshot of every stored preference.
    #[must_use]
    pub fn all_preferences(&self) -> HashMap<UserKey, String> {
        self.preferences.clone()
    }

    pub fn reset_user_preferences(&mut self, user_id: UserKey) {
        if self.preferences.remove(&user_id).is_some() {
            debug!("Reset model preference for user {user_id}");
        }
    }

    /// Users per registered model, in registry order.
    #[must_use]
    pub fn model_usage_stats(&self) -> Vec<ModelUsage> {
        self.registry
            .keys()
            .map(|key| ModelUsage {
                key: key.to_string(),
                users: self
                    .preferences
                    .values()
                    .filter(|stored| stored.as_str() == key)
                    .count(),
            })
            .collect()
    }
}
