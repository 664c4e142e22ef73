//! Headless-browser navigation boundary.
//!
//! The proxy never talks to a browser directly. It asks a [`PageNavigator`]
//! to load a URL and report what the page turned into: the canonical URL
//! after redirects, the rendered page size, a snapshot, or a layout tree.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::NavigatorError;
use crate::layout::LayoutNode;

/// Core trait for headless page navigation.
#[async_trait]
pub trait PageNavigator: Send + Sync {
    /// Load `url` and report the canonical URL it resolved to.
    async fn navigate(&self, url: &str) -> Result<NavigatedPage, NavigatorError>;

    /// Load `url` and capture a full-page snapshot.
    async fn snapshot(&self, url: &str, format: SnapshotFormat)
        -> Result<Snapshot, NavigatorError>;

    /// Load `url`, wait for its layout to settle, and serialize the render tree.
    async fn capture_layout(&self, url: &str) -> Result<LayoutCapture, NavigatorError>;
}

/// Rendered size of a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PageDimensions {
    pub width: f64,
    pub height: f64,
}

impl PageDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Result of a navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigatedPage {
    /// URL the browser ended up on.
    pub final_url: String,
    pub dimensions: PageDimensions,
}

/// Snapshot encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    #[default]
    Png,
    Pdf,
}

impl SnapshotFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Pdf => "application/pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }
}

/// Encoded snapshot bytes.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub bytes: Vec<u8>,
    pub format: SnapshotFormat,
    pub dimensions: PageDimensions,
}

/// Layout tree captured from a settled page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutCapture {
    pub root: LayoutNode,
    /// Full document height, as the in-page extractor reports it.
    pub iframe_height: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Rect;

    struct FixedNavigator;

    #[async_trait]
    impl PageNavigator for FixedNavigator {
        async fn navigate(&self, url: &str) -> Result<NavigatedPage, NavigatorError> {
            Ok(NavigatedPage {
                final_url: format!("{}/", url.trim_end_matches('/')),
                dimensions: PageDimensions::new(1440.0, 2000.0),
            })
        }

        async fn snapshot(
            &self,
            _url: &str,
            format: SnapshotFormat,
        ) -> Result<Snapshot, NavigatorError> {
            Ok(Snapshot {
                bytes: vec![0x89, b'P', b'N', b'G'],
                format,
                dimensions: PageDimensions::default(),
            })
        }

        async fn capture_layout(&self, _url: &str) -> Result<LayoutCapture, NavigatorError> {
            Err(NavigatorError::Unavailable("no browser".to_string()))
        }
    }

    #[tokio::test]
    async fn test_navigator_as_trait_object() {
        let navigator: Box<dyn PageNavigator> = Box::new(FixedNavigator);
        let page = navigator.navigate("https://example.com").await.unwrap();
        assert_eq!(page.final_url, "https://example.com/");
        assert_eq!(page.dimensions.width, 1440.0);

        let snapshot = navigator
            .snapshot("https://example.com", SnapshotFormat::Pdf)
            .await
            .unwrap();
        assert_eq!(snapshot.format, SnapshotFormat::Pdf);

        assert!(navigator.capture_layout("https://example.com").await.is_err());
    }

    #[test]
    fn test_snapshot_format() {
        assert_eq!(SnapshotFormat::Png.content_type(), "image/png");
        assert_eq!(SnapshotFormat::Pdf.content_type(), "application/pdf");
        assert_eq!(SnapshotFormat::default(), SnapshotFormat::Png);
        let parsed: SnapshotFormat = serde_json::from_str("\"pdf\"").unwrap();
        assert_eq!(parsed, SnapshotFormat::Pdf);
    }

    #[test]
    fn test_layout_capture_deserialize() {
        let json = r#"{
            "root": {"kind": "element", "tag": "body",
                     "rect": {"left": 0, "top": 0, "right": 10, "bottom": 10}},
            "iframeHeight": 1234.5
        }"#;
        let capture: LayoutCapture = serde_json::from_str(json).unwrap();
        assert_eq!(capture.iframe_height, 1234.5);
        match capture.root {
            LayoutNode::Element { tag, rect, .. } => {
                assert_eq!(tag, "body");
                assert_eq!(rect, Rect::new(0.0, 0.0, 10.0, 10.0));
            }
            other => panic!("unexpected root: {:?}", other),
        }
    }
}
