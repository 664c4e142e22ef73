//! # PageLayer Protocols
//!
//! Shared type and trait definitions for the pagelayer workspace.
//! Contains only interface definitions - no implementations.
//!
//! ## Contents
//!
//! - [`TextLayer`] / [`LinkRecord`] - the geometry a proxied page reports
//! - [`LayoutNode`] - serialized render tree the text layer is extracted from
//! - [`HostMessage`] / [`PageMessage`] - the cross-document sync channel
//! - [`PageNavigator`] - headless-browser boundary (canonical URL, snapshots)
//! - [`LinkPreview`] - hover-card metadata

pub mod error;
pub mod layout;
pub mod navigator;
pub mod preview;
pub mod sync;
pub mod text_layer;

pub use error::NavigatorError;
pub use layout::{LayoutNode, Rect};
pub use navigator::{
    LayoutCapture, NavigatedPage, PageDimensions, PageNavigator, Snapshot, SnapshotFormat,
};
pub use preview::LinkPreview;
pub use sync::{HostMessage, PageMessage};
pub use text_layer::{ClientRect, LinkRecord, TextLayer};
