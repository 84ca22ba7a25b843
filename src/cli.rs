//! CLI definitions for queuewatch.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// queuewatch CLI.
#[derive(Parser)]
#[command(name = "queuewatch")]
#[command(about = "Job queue monitoring and alerting")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true, env = "QUEUEWATCH_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the monitor and its HTTP API in foreground (default)
    Run {
        /// Server host, overrides the configuration file
        #[arg(long)]
        host: Option<String>,

        /// Server port, overrides the configuration file
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate the configuration file and exit
    CheckConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let cli = Cli::parse_from(["queuewatch"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
    }

    #[test]
    fn test_run_overrides() {
        let cli = Cli::parse_from(["queuewatch", "run", "--host", "0.0.0.0", "--port", "9090"]);
        match cli.command {
            Some(Commands::Run { host, port }) => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(9090));
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_check_config_with_global_config_flag() {
        let cli = Cli::parse_from(["queuewatch", "check-config", "--config", "/etc/qw.toml"]);
        assert!(matches!(cli.command, Some(Commands::CheckConfig)));
        assert_eq!(cli.config, PathBuf::from("/etc/qw.toml"));
    }
}
