//! Cross-document sync channel.
//!
//! The viewer (host) and the proxied page exchange these messages with
//! `postMessage`. The in-page scripts produce the same JSON by hand, so the
//! wire shape here is fixed.

use serde::{Deserialize, Serialize};

use crate::text_layer::{LinkRecord, TextLayer};

/// Host → page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostMessage {
    /// Ask the page to re-run extraction and report.
    #[serde(rename = "loadTextData")]
    LoadTextData,
}

/// Page → host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PageMessage {
    #[serde(rename = "selectionData", rename_all = "camelCase")]
    SelectionData {
        selection_data: TextLayer,
        link_data: Vec<LinkRecord>,
        iframe_height: f64,
    },
    #[serde(rename = "proxyFinishSuccess")]
    ProxyFinishSuccess,
    #[serde(rename = "proxyFinishFail")]
    ProxyFinishFail { error: String },
}

impl PageMessage {
    /// JSON safe to embed inside an inline `<script>` element.
    ///
    /// `<` and the JS line terminators U+2028/U+2029 are written as escapes
    /// so no payload can close the script tag or break the literal.
    pub fn to_script_json(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(escape_for_script(&json))
    }
}

/// Escape serialized JSON for inline-script embedding.
pub fn escape_for_script(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}
