//! queuewatch - job queue monitoring and alerting
//!
//! Main entry point for the queuewatch CLI and server.

mod cli;
mod cmd_check;
mod server;

use clap::Parser;
use tracing::error;

use queuewatch_config::ConfigLoader;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Commands::CheckConfig) = cli.command {
        return cmd_check::check_config(&cli.config);
    }

    let mut config = ConfigLoader::load_or_default(&cli.config)?;
    server::init_tracing(&config.logging)?;

    if let Some(Commands::Run { host, port }) = cli.command {
        if let Some(host) = host {
            config.server.host = host;
        }
        if let Some(port) = port {
            config.server.port = port;
        }
    }

    if let Err(e) = server::run_server(config).await {
        error!("queuewatch exited with error: {}", e);
        return Err(e);
    }
    Ok(())
}
