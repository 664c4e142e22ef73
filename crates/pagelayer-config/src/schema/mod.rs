//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod schema_http;
mod schema_runtime;

pub use schema_http::*;
pub use schema_runtime::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub cors: CorsConfig,

    #[serde(default)]
    pub cookie: CookieConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Per-user config location, `~/.pagelayer/config.toml`.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".pagelayer").join("config.toml"))
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Public origin the proxy is reachable on. Used as the `Referer` base
    /// for forwarded requests and as the base of escape-marker links.
    #[serde(default = "default_public_root")]
    pub public_root: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_root: default_public_root(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3100
}

fn default_public_root() -> String {
    "http://localhost:3100".to_string()
}

/// Forwarding behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Accept plain `http://` targets.
    #[serde(default)]
    pub allow_http: bool,

    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,

    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Largest request body buffered for forwarding.
    #[serde(default = "default_max_request_body")]
    pub max_request_body_bytes: usize,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            allow_http: false,
            upstream_timeout_secs: default_upstream_timeout(),
            max_redirects: default_max_redirects(),
            max_request_body_bytes: default_max_request_body(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

fn default_upstream_timeout() -> u64 {
    30
}

fn default_max_redirects() -> u32 {
    5
}

fn default_max_request_body() -> usize {
    10 * 1024 * 1024
}

fn default_viewport_width() -> u32 {
    1440
}

fn default_viewport_height() -> u32 {
    770
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
