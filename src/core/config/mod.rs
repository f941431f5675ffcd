pub mod data;
pub mod io;
pub mod keys;
pub mod settings;

pub use data::{Config, StorageKind};
pub use io::ConfigError;
pub use settings::{RuntimeSettings, SettingsOverrides};
