//! CDP wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outgoing command.
#[derive(Debug, Serialize)]
pub struct CdpRequest {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Incoming frame: a command response when `id` is set, else an event.
#[derive(Debug, Deserialize)]
pub struct CdpResponse {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<CdpErrorResponse>,
    pub method: Option<String>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CdpErrorResponse {
    pub code: i64,
    pub message: String,
}

/// `/json/version` payload. Chrome uses mixed-case keys here.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "Protocol-Version", default)]
    pub protocol_version: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

/// `Emulation.setDeviceMetricsOverride` parameters.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMetrics {
    pub width: u32,
    pub height: u32,
    pub device_scale_factor: f64,
    pub mobile: bool,
}

impl DeviceMetrics {
    pub fn desktop(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            device_scale_factor: 1.0,
            mobile: false,
        }
    }
}

/// Capture region for `Page.captureScreenshot`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Clip {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

/// `Page.printToPDF` parameters for a single page holding the whole document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintOptions {
    pub print_background: bool,
    /// Inches.
    pub paper_width: f64,
    /// Inches.
    pub paper_height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub page_ranges: String,
}

/// CSS pixels per inch.
const CSS_DPI: f64 = 96.0;

impl PrintOptions {
    pub fn single_page(width_px: f64, height_px: f64) -> Self {
        Self {
            print_background: true,
            paper_width: width_px / CSS_DPI,
            paper_height: height_px / CSS_DPI,
            margin_top: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            margin_right: 0.0,
            page_ranges: "1".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
