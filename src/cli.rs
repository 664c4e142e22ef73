//! CLI definitions for pagelayer.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// PageLayer CLI.
#[derive(Parser)]
#[command(name = "pagelayer")]
#[command(about = "Framing proxy that turns live web pages into selectable text layers")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the proxy server in foreground (default)
    Run {
        /// Override `server.host`
        #[arg(long, env = "PAGELAYER_HOST")]
        host: Option<String>,

        /// Override `server.port`
        #[arg(long, env = "PAGELAYER_PORT")]
        port: Option<u16>,

        /// Override `browser.endpoint`
        #[arg(long, env = "PAGELAYER_BROWSER")]
        browser: Option<String>,
    },

    /// Load and validate the configuration, then exit
    Check,
}
