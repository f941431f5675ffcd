use std::time::Duration;

use crate::core::config::data::{Config, StorageKind};
use crate::core::constants::{
    DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, ENV_BASE_URL, ENV_DEFAULT_MODEL,
};
use crate::utils::url::normalize_base_url;

/// Values supplied on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub base_url: Option<String>,
    pub model: Option<String>,
}

/// Effective settings for one run, after layering
/// command line > environment > config file > built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeSettings {
    pub base_url: String,
    pub default_model: Option<String>,
    pub storage: StorageKind,
    pub request_timeout: Duration,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl RuntimeSettings {
    pub fn resolve(config: &Config, overrides: &SettingsOverrides) -> Self {
        Self::resolve_with_env(config, overrides, |name| std::env::var(name).ok())
    }

    pub fn resolve_with_env<F>(config: &Config, overrides: &SettingsOverrides, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let base_url = non_empty(overrides.base_url.clone())
            .or_else(|| non_empty(env(ENV_BASE_URL)))
            .or_else(|| non_empty(config.base_url.clone()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let default_model = non_empty(overrides.model.clone())
            .or_else(|| non_empty(env(ENV_DEFAULT_MODEL)))
            .or_else(|| non_empty(config.default_model.clone()));

        Self {
            base_url: normalize_base_url(base_url.trim()),
            default_model,
            storage: config.storage.unwrap_or_default(),
            request_timeout: Duration::from_secs(
                config
                    .request_timeout_secs
                    .filter(|secs| *secs > 0)
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}
