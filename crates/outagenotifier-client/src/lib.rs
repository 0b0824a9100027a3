//! CLI: refresh, show and watch outages
//!
//! This crate provides the `outagenotifier` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
