use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where conversation history is written.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// One JSON array per credential scope, rewritten as a whole.
    #[default]
    Blob,
    /// Append-only SQLite table with timestamp and conversation indexes.
    Indexed,
}

impl StorageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKind::Blob => "blob",
            StorageKind::Indexed => "indexed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "blob" => Some(StorageKind::Blob),
            "indexed" => Some(StorageKind::Indexed),
            _ => None,
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Root URL of the Open WebUI (or compatible) server, without the `/api` suffix
    pub base_url: Option<String>,
    /// Model to switch to once the model list has loaded, if the server offers it
    pub default_model: Option<String>,
    /// History backend ("blob" or "indexed")
    pub storage: Option<StorageKind>,
    /// Per-request timeout for the chat API
    pub request_timeout_secs: Option<u64>,
    /// Sampling temperature sent with each completion, when set
    pub temperature: Option<f32>,
    /// Completion token limit sent with each completion, when set
    pub max_tokens: Option<u32>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.config/owchat/config.toml` → `~/.config/owchat/config.toml`
/// - macOS: `/Users/user/Library/Application Support/...` → `~/Library/Application Support/...`
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.base_url {
            Some(url) => println!("  base-url: {url}"),
            None => println!("  base-url: (unset)"),
        }
        match &self.default_model {
            Some(model) => println!("  default-model: {model}"),
            None => println!("  default-model: (unset)"),
        }
        println!("  storage: {}", self.storage.unwrap_or_default());
        match self.request_timeout_secs {
            Some(secs) => println!("  request-timeout: {secs}s"),
            None => println!("  request-timeout: (unset)"),
        }
        match self.temperature {
            Some(value) => println!("  temperature: {value}"),
            None => println!("  temperature: (unset)"),
        }
        match self.max_tokens {
            Some(value) => println!("  max-tokens: {value}"),
            None => println!("  max-tokens: (unset)"),
        }
    }
}
