//! Chrome DevTools Protocol client.
//!
//! Talks to an already running Chrome/Chromium started with
//! `--remote-debugging-port`. One browser-level WebSocket carries every
//! command; pages are flat-attached sessions on it.
//!
//! ```rust,ignore
//! let client = CdpClient::connect("http://127.0.0.1:9222", Duration::from_secs(30)).await?;
//! let page = client.new_page().await?;
//! page.navigate("https://example.com", Duration::from_secs(30)).await?;
//! client.close_page(&page).await?;
//! ```

mod client;
mod error;
mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::*;
pub use session::PageSession;
