//! Subcommand implementations.

pub mod config;
pub mod outages;
pub mod watch;
