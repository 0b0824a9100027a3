//! Command-line interface definition.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use outagenotifier_core::{TracingConfig, init_tracing};

use crate::error::ClientResult;

/// outagenotifier - Infrastructure outages from the outage calendar
#[derive(Debug, Parser)]
#[command(name = "outagenotifier")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "OUTAGENOTIFIER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Append log output to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Disable colored console output
    #[arg(long)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Logging setup for this invocation.
    ///
    /// `watch` logging to a file writes JSON lines; everything else uses the
    /// compact console format.
    pub fn tracing_config(&self) -> TracingConfig {
        let base = if self.debug {
            TracingConfig::cli_debug()
        } else if matches!(self.command, Some(Command::Watch)) && self.log.is_some() {
            TracingConfig::daemon()
        } else {
            TracingConfig::default()
        };

        match self.log {
            Some(ref path) => base.with_log_file(path),
            None => base,
        }
    }

    /// Whether console output gets ANSI colors.
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }

    /// Installs the tracing subscriber and the console color switch.
    pub fn init_output(&self) -> ClientResult<()> {
        init_tracing(self.tracing_config())?;
        colored::control::set_override(self.use_color());
        Ok(())
    }
}

/// Available commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Fetch the feed and update the outage snapshot (meant for cron)
    Refresh,

    /// Print outages from the current snapshot (default)
    Show,

    /// Poll the feed and show desktop pop-ups when outages change
    Watch,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use outagenotifier_core::TracingOutputFormat;
    use tracing::Level;

    use crate::error::ClientError;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("outagenotifier").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_subcommand_means_show() {
        let cli = parse(&[]);
        assert_eq!(cli.command, None);
        assert!(!cli.debug);
    }

    #[test]
    fn global_flags() {
        let cli = parse(&["--debug", "--log", "/tmp/outages.log", "--no-color", "show"]);
        assert!(cli.debug);
        assert!(cli.no_color);
        assert!(!cli.use_color());
        assert_eq!(cli.log, Some(PathBuf::from("/tmp/outages.log")));
        assert_eq!(cli.command, Some(Command::Show));
    }

    #[test]
    fn config_subcommands() {
        let cli = parse(&["config", "validate"]);
        assert_eq!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Validate
            })
        );
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["outagenotifier", "status"]).is_err());
    }

    #[test]
    fn tracing_presets() {
        let plain = parse(&["refresh"]).tracing_config();
        assert_eq!(plain.default_level, Level::WARN);
        assert!(plain.log_file.is_none());

        let debug = parse(&["--debug", "refresh"]).tracing_config();
        assert_eq!(debug.default_level, Level::DEBUG);

        let watch = parse(&["--log", "/tmp/watch.log", "watch"]).tracing_config();
        assert_eq!(watch.output_format, TracingOutputFormat::Json);
        assert_eq!(watch.log_file, Some(PathBuf::from("/tmp/watch.log")));
    }

    #[test]
    fn unwritable_log_file_is_a_client_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("missing").join("watch.log");
        let cli = parse(&["--log", log.to_str().unwrap(), "show"]);

        let err = cli.init_output().unwrap_err();
        assert!(matches!(err, ClientError::Tracing(_)));
        assert!(err.to_string().starts_with("logging setup failed: failed to open log file"));
    }
}
