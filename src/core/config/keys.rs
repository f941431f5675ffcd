use crate::core::config::data::{Config, StorageKind};
use crate::utils::url::normalize_base_url;

/// Keys accepted by `owchat set` / `owchat unset`.
pub const CONFIG_KEYS: &[&str] = &[
    "base-url",
    "default-model",
    "storage",
    "request-timeout",
    "temperature",
    "max-tokens",
];

impl Config {
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("A value is required for {key}"));
        }
        match key {
            "base-url" => self.base_url = Some(normalize_base_url(value)),
            "default-model" => self.default_model = Some(value.to_string()),
            "storage" => {
                let kind = StorageKind::parse(value)
                    .ok_or_else(|| format!("Unknown storage backend: {value} (use blob or indexed)"))?;
                self.storage = Some(kind);
            }
            "request-timeout" => {
                let secs = value
                    .trim_end_matches('s')
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| format!("Invalid timeout: {value}"))?;
                self.request_timeout_secs = Some(secs);
            }
            "temperature" => {
                let temperature = value
                    .parse::<f32>()
                    .ok()
                    .filter(|t| (0.0..=2.0).contains(t))
                    .ok_or_else(|| format!("Temperature must be between 0 and 2: {value}"))?;
                self.temperature = Some(temperature);
            }
            "max-tokens" => {
                let tokens = value
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| format!("Invalid max-tokens: {value}"))?;
                self.max_tokens = Some(tokens);
            }
            _ => return Err(format!("Unknown config key: {key}")),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: &str) -> Result<(), String> {
        match key {
            "base-url" => self.base_url = None,
            "default-model" => self.default_model = None,
            "storage" => self.storage = None,
            "request-timeout" => self.request_timeout_secs = None,
            "temperature" => self.temperature = None,
            "max-tokens" => self.max_tokens = None,
            _ => return Err(format!("Unknown config key: {key}")),
        }
        Ok(())
    }
}
