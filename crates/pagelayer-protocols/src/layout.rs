//! Serialized render tree.
//!
//! A [`LayoutNode`] tree is a frozen copy of the parts of a live DOM that the
//! text-layer extraction needs: element boxes and computed visibility, and
//! per-character boxes for text nodes.

use serde::{Deserialize, Serialize};

/// An axis-aligned box in viewport coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// True when the box has no rendered area.
    pub fn is_empty(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }
}

/// One node of a captured render tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayoutNode {
    #[serde(rename_all = "camelCase")]
    Element {
        #[serde(default)]
        tag: String,
        rect: Rect,
        #[serde(default)]
        display: String,
        #[serde(default)]
        visibility: String,
        #[serde(default = "default_opacity")]
        opacity: f64,
        /// Original hyperlink target stashed by the navigation guard.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        original_href: Option<String>,
        #[serde(default)]
        children: Vec<LayoutNode>,
    },
    #[serde(rename_all = "camelCase")]
    Text {
        text: String,
        /// One box per character of `text`.
        #[serde(default)]
        char_rects: Vec<Rect>,
    },
}

fn default_opacity() -> f64 {
    1.0
}

impl LayoutNode {
    /// A visible element with no children.
    pub fn element(tag: impl Into<String>, rect: Rect) -> Self {
        Self::Element {
            tag: tag.into(),
            rect,
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: default_opacity(),
            original_href: None,
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>, char_rects: Vec<Rect>) -> Self {
        Self::Text {
            text: text.into(),
            char_rects,
        }
    }

    /// Builder: replace the children of an element. No-op on text nodes.
    pub fn with_children(mut self, nodes: Vec<LayoutNode>) -> Self {
        if let Self::Element { children, .. } = &mut self {
            *children = nodes;
        }
        self
    }

    /// Builder: stash an original href on an element.
    pub fn with_original_href(mut self, href: impl Into<String>) -> Self {
        if let Self::Element { original_href, .. } = &mut self {
            *original_href = Some(href.into());
        }
        self
    }

    /// Builder: override computed display/visibility/opacity.
    pub fn with_style(mut self, new_display: &str, new_visibility: &str, new_opacity: f64) -> Self {
        if let Self::Element {
            display,
            visibility,
            opacity,
            ..
        } = &mut self
        {
            *display = new_display.to_string();
            *visibility = new_visibility.to_string();
            *opacity = new_opacity;
        }
        self
    }

    /// Whether the node is filtered out of extraction.
    ///
    /// Elements are hidden when they have no rendered area or are
    /// `display:none`, `visibility:hidden` or fully transparent. Text nodes
    /// carry no box of their own and are never hidden here.
    pub fn is_hidden(&self) -> bool {
        match self {
            Self::Element {
                rect,
                display,
                visibility,
                opacity,
                ..
            } => {
                rect.is_empty()
                    || display == "none"
                    || visibility == "hidden"
                    || *opacity == 0.0
            }
            Self::Text { .. } => false,
        }
    }
}
