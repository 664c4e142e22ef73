//! # PageLayer API
//!
//! HTTP surface of the framing proxy.
//!
//! ```text
//! client ──/proxy────────► navigator ──► session cookie
//!        ──/download─────► navigator ──► PNG / PDF
//!        ──/text-data────► navigator ──► text layer
//!        ──/link-preview─► previewer
//!        ──anything else─► session ──► forwarder ──► upstream
//! ```

pub mod error;
pub mod http;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use http::routes::create_router;
pub use server::ProxyServer;
pub use state::AppState;
