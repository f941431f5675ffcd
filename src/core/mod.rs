pub mod config;
pub mod constants;
pub mod keyring;
pub mod message;
pub mod session;
