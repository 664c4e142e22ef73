//! # PageLayer Proxy
//!
//! The forwarding half of the framing proxy: upstream requests, response
//! header sanitizing, in-flight HTML/CSS rewriting and the assets injected
//! into proxied pages.
//!
//! ## Components
//!
//! - [`Forwarder`] - one upstream exchange per inbound request, redirects included
//! - [`rewrite`] - HTML injection and CSS `vh`/`url()` rewriting
//! - [`InjectedAssets`] - embedded scripts and styles
//! - [`LinkPreviewer`] - hover-card metadata fetch
//! - [`failure_page`] - the page served when an upstream cannot be reached

pub mod assets;
pub mod error;
pub mod failure;
pub mod forwarder;
pub mod headers;
pub mod preview;
pub mod resolver;
pub mod rewrite;

pub use assets::InjectedAssets;
pub use error::{ProxyError, RewriteError};
pub use failure::failure_page;
pub use forwarder::{ForwardRequest, Forwarder, ProxiedBody, ProxiedResponse};
pub use preview::{parse_preview, LinkPreviewer};
pub use resolver::{DirectResolver, PinnedResolver, UpstreamResolver};
