//! Shared constants used across the application

/// Base URL used when neither the config file nor `OPENWEBUI_URL` provide one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Environment variable overriding the configured base URL.
pub const ENV_BASE_URL: &str = "OPENWEBUI_URL";

/// Environment variable overriding the configured default model.
pub const ENV_DEFAULT_MODEL: &str = "OPENWEBUI_MODEL";

/// Environment variable holding the tracing filter directives.
pub const ENV_LOG_FILTER: &str = "OWCHAT_LOG";

pub const MODELS_ENDPOINT: &str = "api/models";
pub const CHAT_ENDPOINT: &str = "api/chat/completions";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const KEYRING_SERVICE: &str = "owchat";
pub const KEYRING_ACCOUNT: &str = "api-key";

/// Prefix of every per-credential storage scope.
pub const HISTORY_SCOPE_PREFIX: &str = "messages";
pub const HISTORY_DIR: &str = "history";
pub const HISTORY_DATABASE: &str = "history.sqlite3";

/// Longest chat input line accepted by the terminal loop.
pub const MAX_INPUT_CHARS: usize = 16 * 1024;
