//! Runtime collaborators (headless browser, logging).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Headless browser reached over the DevTools protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// DevTools HTTP endpoint, e.g. `http://127.0.0.1:9222`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Fixed wait after load before a snapshot is taken.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Layout must stay unchanged this long before it is captured.
    #[serde(default = "default_quiet_ms")]
    pub quiet_ms: u64,

    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            settle_ms: default_settle_ms(),
            quiet_ms: default_quiet_ms(),
            navigation_timeout_secs: default_navigation_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    "http://127.0.0.1:9222".to_string()
}

fn default_settle_ms() -> u64 {
    2000
}

fn default_quiet_ms() -> u64 {
    500
}

fn default_navigation_timeout() -> u64 {
    30
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for daily-rolling log files. Console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
