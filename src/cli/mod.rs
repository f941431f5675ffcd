//! Command-line interface parsing and handling
//!
//! This module parses arguments, installs logging, wires the session
//! controller to its collaborators, and dispatches to the subcommands.

pub mod account;
pub mod chat;
pub mod model_list;
pub mod render;
pub mod say;

#[cfg(test)]
mod tests;

use std::error::Error;

use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::api::OpenWebUiClient;
use crate::auth::CredentialStore;
use crate::core::config::keys::CONFIG_KEYS;
use crate::core::config::{io::data_dir, Config, RuntimeSettings, SettingsOverrides};
use crate::core::constants::ENV_LOG_FILTER;
use crate::core::session::{SessionController, SessionState};
use crate::storage::{open_store, History};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ", rustc ",
    env!("VERGEN_RUSTC_SEMVER"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "owchat")]
#[command(version = VERSION)]
#[command(about = "A terminal chat client for Open WebUI")]
#[command(
    long_about = "owchat talks to an Open WebUI (or other OpenAI-compatible) server from the \
terminal. Your API key is kept in the system keyring and each key gets its own saved \
conversation.\n\n\
Environment Variables:\n\
  OPENWEBUI_URL     Server base URL (defaults to http://localhost:3000)\n\
  OPENWEBUI_MODEL   Model to select after sign-in\n\
  OWCHAT_LOG        Log filter, e.g. owchat=debug (defaults to owchat=warn)\n\n\
Commands inside the chat:\n\
  /help             List commands\n\
  /model [id]       Show or switch the active model\n\
  /models           List available models\n\
  /reset            Clear this conversation and its saved history\n\
  /logout           Forget the API key\n\
  /quit             Leave"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to select after sign-in
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Server base URL
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Keep the API key in memory only for this run
    #[arg(long, global = true)]
    pub no_keyring: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start the interactive chat (default)
    Chat,
    /// Send one message and print the reply
    Say {
        /// The message to send
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        prompt: Vec<String>,
    },
    /// List the models offered by the server
    Models,
    /// Sign in with an API key
    Auth,
    /// Forget the stored API key
    Deauth {
        /// Also delete the saved conversation for this key
        #[arg(long)]
        purge: bool,
    },
    /// Clear the saved conversation for the stored key
    Reset,
    /// Set a configuration value, or print the configuration
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset a configuration value
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async_main(args))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env(ENV_LOG_FILTER)
        .unwrap_or_else(|_| EnvFilter::new("owchat=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let command = args.command.clone().unwrap_or(Commands::Chat);
    debug!(?command, "dispatching");

    match command {
        Commands::Chat => chat::run_chat(&args).await,
        Commands::Say { prompt } => say::run_say(&args, prompt).await,
        Commands::Models => model_list::list_models(&args).await,
        Commands::Auth => account::run_auth(&args).await,
        Commands::Deauth { purge } => account::run_deauth(&args, purge).await,
        Commands::Reset => account::run_reset(&args).await,
        Commands::Set { key, value } => set_config(key, value),
        Commands::Unset { key } => unset_config(&key),
    }
}

/// The pieces every session-driven subcommand needs.
pub struct Bootstrap {
    pub settings: RuntimeSettings,
    pub controller: SessionController,
}

impl Bootstrap {
    pub fn from_args(args: &Args) -> Result<Self, Box<dyn Error>> {
        let config = Config::load()?;
        let overrides = SettingsOverrides {
            base_url: args.base_url.clone(),
            model: args.model.clone(),
        };
        let settings = RuntimeSettings::resolve(&config, &overrides);
        debug!(base_url = %settings.base_url, storage = %settings.storage, "settings resolved");

        let api = OpenWebUiClient::new(&settings)?;
        let credentials = if args.no_keyring {
            CredentialStore::in_memory()
        } else {
            CredentialStore::keyring()
        };
        let history = History::new(open_store(settings.storage, &data_dir()?)?);

        Ok(Self {
            controller: SessionController::new(Box::new(api), credentials, history),
            settings,
        })
    }

    /// Resume the stored key; fails when there is none.
    pub async fn resume(&mut self) -> Result<(), Box<dyn Error>> {
        match self.controller.start().await? {
            SessionState::Ready => {
                self.apply_default_model();
                Ok(())
            }
            _ => Err("No API key stored. Run 'owchat auth' to sign in.".into()),
        }
    }

    /// Switch to the configured model if the server offers it.
    pub fn apply_default_model(&mut self) {
        if let Some(model) = self.settings.default_model.as_deref() {
            if !self.controller.change_model(model) {
                warn!(model, "configured model is not offered by the server");
                eprintln!("⚠️  Model '{model}' is not available; using the server's first model");
            }
        }
    }
}

fn set_config(key: Option<String>, value: Vec<String>) -> Result<(), Box<dyn Error>> {
    let Some(key) = key else {
        Config::load()?.print_all();
        return Ok(());
    };
    if value.is_empty() {
        Config::load()?.print_all();
        return Ok(());
    }

    check_key(&key)?;

    let value = value.join(" ");
    Config::mutate(|config| config.set_value(&key, &value).map_err(Into::into))?;
    println!("✅ Set {key} to: {value}");
    Ok(())
}

fn unset_config(key: &str) -> Result<(), Box<dyn Error>> {
    check_key(key)?;
    Config::mutate(|config| config.unset_value(key).map_err(Into::into))?;
    println!("✅ Unset {key}");
    Ok(())
}

fn check_key(key: &str) -> Result<(), String> {
    if CONFIG_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(format!(
            "Unknown config key: {key} (known keys: {})",
            CONFIG_KEYS.join(", ")
        ))
    }
}
