//! Tracing setup and server startup.

use std::sync::{Arc, OnceLock};

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pagelayer_api::{AppState, ProxyServer};
use pagelayer_browser::CdpNavigator;
use pagelayer_config::{Config, LoggingConfig};

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize tracing with console output and, when `logging.dir` is set,
/// a daily-rolling log file.
///
/// `RUST_LOG` takes precedence over `logging.level`.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.level))?;

    let file_layer = match &logging.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("pagelayer")
                .filename_suffix("log")
                .max_log_files(14)
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().with_writer(writer).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    Ok(())
}

/// Run the proxy in foreground until Ctrl+C.
pub(crate) async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting pagelayer v{}", env!("CARGO_PKG_VERSION"));
    info!("Public root: {}", config.server.public_root);
    info!("Browser endpoint: {}", config.browser.endpoint);

    let navigator = Arc::new(CdpNavigator::new(config.browser.clone(), &config.proxy));
    let server_config = config.server.clone();
    let state = Arc::new(AppState::new(config, navigator)?);

    ProxyServer::new(server_config, state).run().await?;

    info!("pagelayer stopped");
    Ok(())
}
