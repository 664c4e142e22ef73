//! Text layer and hyperlink geometry reported by a proxied page.

use serde::{Deserialize, Serialize};

use crate::layout::Rect;

/// Character geometry of a page, shaped like a PDF text layer.
///
/// `structure[0]` counts lines; it is followed by line records
/// `[wordCount, 0, leftX, bottomY, rightX, topY]`, each followed by its word
/// records `[charCount, startIndex, charCount, leftX, rightX]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    #[serde(rename = "struct")]
    pub structure: Vec<f64>,
    #[serde(rename = "str")]
    pub text: String,
    pub offsets: Vec<i64>,
    pub quads: Vec<f64>,
}

impl TextLayer {
    /// Offset marking a space.
    pub const SPACE: i64 = -1;
    /// Offset marking a line separator, explicit or synthesized.
    pub const LINE_BREAK: i64 = -2;

    pub fn new() -> Self {
        Self {
            structure: vec![0.0],
            text: String::new(),
            offsets: Vec::new(),
            quads: Vec::new(),
        }
    }

    /// Total number of lines recorded in `structure[0]`.
    pub fn line_count(&self) -> usize {
        self.structure.first().copied().unwrap_or(0.0) as usize
    }

    /// The quad of slot `index`, if any.
    pub fn quad(&self, index: usize) -> Option<&[f64]> {
        self.quads.get(index * 8..index * 8 + 8)
    }

    /// Offsets, quads and text all describe the same slots.
    pub fn is_aligned(&self) -> bool {
        self.quads.len() % 8 == 0
            && self.offsets.len() == self.quads.len() / 8
            && self.offsets.len() == self.text.chars().count()
    }
}

impl Default for TextLayer {
    fn default() -> Self {
        Self::new()
    }
}

/// `DOMRect`-shaped box, as `getBoundingClientRect()` serializes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl From<Rect> for ClientRect {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.left,
            y: rect.top,
            width: rect.width(),
            height: rect.height(),
            top: rect.top,
            right: rect.right,
            bottom: rect.bottom,
            left: rect.left,
        }
    }
}

/// A hyperlink whose original target was stashed by the navigation guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub client_rect: ClientRect,
    pub href: String,
}
