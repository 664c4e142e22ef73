//! Headless navigation errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavigatorError {
    #[error("Browser not available: {0}")]
    Unavailable(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Navigation timed out after {0} seconds")]
    Timeout(u64),

    #[error("Snapshot failed: {0}")]
    SnapshotFailed(String),

    #[error("Invalid page data: {0}")]
    InvalidPageData(String),
}
