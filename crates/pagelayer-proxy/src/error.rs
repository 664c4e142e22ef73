//! Proxy errors.

use thiserror::Error;

use pagelayer_core::{GuardRejection, SessionError};

/// Errors that end a forwarding pass.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Upstream unreachable: {0}")]
    Upstream(String),

    #[error("Upstream timed out after {0} seconds")]
    Timeout(u64),

    #[error("Too many redirects (limit {0})")]
    TooManyRedirects(u32),

    #[error("Redirect to {location} rejected: {reason}")]
    RedirectRejected {
        location: String,
        reason: GuardRejection,
    },

    #[error("Escape origin rejected: {0}")]
    EscapeRejected(GuardRejection),

    #[error("Target error: {0}")]
    Target(#[from] SessionError),

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Asset missing: {0}")]
    AssetMissing(String),
}

impl ProxyError {
    /// Whether the client should see the failure page for this error.
    pub fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            Self::Upstream(_)
                | Self::Timeout(_)
                | Self::TooManyRedirects(_)
                | Self::RedirectRejected { .. }
        )
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}

/// Reasons a body is passed through without rewriting.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("Document has no </head>")]
    MissingHead,

    #[error("HTML rewrite failed: {0}")]
    Html(String),

    #[error("Body is not valid UTF-8")]
    Encoding,

    #[error("Gzip error: {0}")]
    Gzip(#[from] std::io::Error),
}
