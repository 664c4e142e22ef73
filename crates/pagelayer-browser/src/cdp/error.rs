//! CDP error types.

use thiserror::Error;

use pagelayer_protocols::NavigatorError;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Nothing answers on the debugging endpoint.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --headless --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<CdpError> for NavigatorError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::ChromeNotAvailable(_)
            | CdpError::ConnectionFailed(_)
            | CdpError::WebSocket(_)
            | CdpError::Http(_)
            | CdpError::SessionClosed => NavigatorError::Unavailable(e.to_string()),
            CdpError::NavigationFailed(reason) => NavigatorError::NavigationFailed(reason),
            CdpError::Serialization(_) | CdpError::InvalidResponse(_) | CdpError::JavaScript(_) => {
                NavigatorError::InvalidPageData(e.to_string())
            }
            CdpError::Protocol { .. } | CdpError::Timeout(_) => {
                NavigatorError::SnapshotFailed(e.to_string())
            }
        }
    }
}
