//! # PageLayer Core
//!
//! Request-independent logic of the framing proxy.
//!
//! ## Components
//!
//! - [`SsrfGuard`] - decides whether a URL may be proxied at all
//! - [`resolve_target`] - host/port/transport of a validated URL
//! - [`SessionBinder`] - cookie binding of a client to one target origin
//! - [`escape`] - one-shot cross-origin escape links
//! - [`Debounce`] - trailing/leading debounce state machine
//! - [`text_layer::extract`] - text layer of a captured render tree

pub mod debounce;
pub mod error;
pub mod escape;
pub mod guard;
pub mod session;
pub mod target;
pub mod text_layer;

pub use debounce::{Debounce, DebounceState};
pub use error::{GuardRejection, SessionError};
pub use escape::{EscapedRequest, ESCAPE_PARAM};
pub use guard::{is_allowed, SsrfGuard};
pub use session::{ProxySession, SessionBinder, SessionBinding};
pub use target::{resolve_target, TargetDescriptor, Transport};
pub use text_layer::{extract, Extraction};
