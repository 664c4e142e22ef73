//! Link-preview metadata.

use serde::{Deserialize, Serialize};

/// Hover-card data for a hyperlink target. Every field is best effort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPreview {
    pub page_title: Option<String>,
    pub favicon_url: Option<String>,
    pub meta_description: Option<String>,
}

impl LinkPreview {
    pub fn is_empty(&self) -> bool {
        self.page_title.is_none() && self.favicon_url.is_none() && self.meta_description.is_none()
    }
}
