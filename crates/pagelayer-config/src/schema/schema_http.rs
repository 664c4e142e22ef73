//! HTTP-facing configuration types (CORS, session cookie).

use serde::{Deserialize, Serialize};

use super::default_true;

/// Cross-origin policy for the viewer that embeds the proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to call the API. Empty means any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_true")]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_credentials: default_true(),
        }
    }
}

/// `SameSite` attribute of the session cookie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    #[default]
    None,
    Lax,
    Strict,
}

impl SameSitePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Lax => "Lax",
            Self::Strict => "Strict",
        }
    }
}

/// Session cookie settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    #[serde(default = "default_cookie_name")]
    pub name: String,

    #[serde(default)]
    pub same_site: SameSitePolicy,

    #[serde(default = "default_true")]
    pub secure: bool,

    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            same_site: SameSitePolicy::default(),
            secure: default_true(),
            ttl_secs: default_ttl(),
        }
    }
}

fn default_cookie_name() -> String {
    "pagelayer_proxy_sid".to_string()
}

fn default_ttl() -> u64 {
    3600
}
