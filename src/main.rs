//! PageLayer - framing proxy and text-layer extractor.
//!
//! Main entry point for the pagelayer CLI and server.

mod cli;
mod server;

use clap::Parser;
use tracing::{error, info, warn};

use pagelayer_config::{Config, ConfigLoader, ConfigValidator};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = ConfigLoader::load_or_default(&cli.config)?;

    match cli.command {
        Some(Commands::Check) => {
            server::init_tracing(&config.logging)?;
            if !validate(&config) {
                std::process::exit(1);
            }
            info!("Configuration OK");
            Ok(())
        }
        Some(Commands::Run { host, port, browser }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(browser) = browser {
                config.browser.endpoint = browser;
            }
            start(config).await
        }
        None => start(config).await,
    }
}

async fn start(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    server::init_tracing(&config.logging)?;
    if !validate(&config) {
        return Err("invalid configuration".into());
    }
    server::run_server(config).await
}

/// Log every validation finding; `false` when any is an error.
fn validate(config: &Config) -> bool {
    let result = match ConfigValidator::validate(config) {
        Ok(result) => result,
        Err(e) => {
            error!("Config validation failed: {}", e);
            return false;
        }
    };
    for warning in &result.warnings {
        warn!("{}: {}", warning.path, warning.message);
    }
    for err in &result.errors {
        error!("{}: {}", err.path, err.message);
    }
    result.is_valid()
}
