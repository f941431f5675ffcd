//! owchat is a terminal chat client for Open WebUI and other
//! OpenAI-compatible servers.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns configuration, the message model, and the session
//!   controller state machine that sequences everything else.
//! - [`api`] defines the wire payloads, model-list decoding, and the HTTP
//!   client behind the [`api::ChatApi`] trait.
//! - [`auth`] keeps the single active API key in the system keyring.
//! - [`storage`] persists conversation history per credential, either as JSON
//!   blobs or in a SQLite table.
//! - [`commands`] parses slash commands typed into the chat loop.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod core;
pub mod storage;
pub mod utils;
