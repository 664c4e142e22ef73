//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use pagelayer_protocols::NavigatorError;
use pagelayer_proxy::ProxyError;

pub const INVALID_URL_MESSAGE: &str = "Please enter a valid URL and try again.";

/// Errors surfaced by the HTTP handlers and server startup.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported snapshot format: {0}")]
    InvalidFormat(String),

    #[error("Navigation error: {0}")]
    Navigation(NavigatorError),

    #[error("Snapshot error: {0}")]
    Snapshot(NavigatorError),

    #[error("Text extraction error: {0}")]
    TextData(NavigatorError),

    #[error("Link preview error: {0}")]
    Preview(ProxyError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Startup error: {0}")]
    Startup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Internal(_) | Self::Startup(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Text shown to the end user. Internal detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidUrl(_) | Self::Navigation(_) => INVALID_URL_MESSAGE.to_string(),
            Self::InvalidFormat(format) => {
                format!("Unsupported format '{}'. Use png or pdf.", format)
            }
            Self::Snapshot(_) => "Error taking a snapshot of the page.".to_string(),
            Self::TextData(_) => "Error reading the text of the page.".to_string(),
            Self::Preview(_) => "Could not load a preview for this link.".to_string(),
            Self::Internal(_) | Self::Startup(_) | Self::Io(_) => "Internal server error.".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!("Request failed: {}", self);
        let body = Json(json!({ "errorMessage": self.user_message() }));
        (self.status(), body).into_response()
    }
}
