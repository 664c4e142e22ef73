//! # PageLayer Browser
//!
//! Headless-browser collaborator: a small Chrome DevTools Protocol client
//! ([`cdp`]) and [`CdpNavigator`], the [`PageNavigator`] the server uses to
//! validate URLs by loading them, take snapshots, and capture layout trees.
//!
//! [`PageNavigator`]: pagelayer_protocols::PageNavigator

pub mod cdp;
mod navigator;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use navigator::CdpNavigator;
