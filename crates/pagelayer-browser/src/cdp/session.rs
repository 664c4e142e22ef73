//! One attached page.

use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use super::client::Connection;
use super::error::CdpError;
use super::protocol::{Clip, DeviceMetrics, PrintOptions};

const LOAD_POLL: Duration = Duration::from_millis(100);

/// A session attached to a single page target.
pub struct PageSession {
    target_id: String,
    session_id: String,
    conn: Arc<Connection>,
}

impl PageSession {
    pub(crate) fn new(target_id: String, session_id: String, conn: Arc<Connection>) -> Self {
        Self {
            target_id,
            session_id,
            conn,
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.conn.call(method, params, Some(&self.session_id)).await
    }

    pub(crate) async fn enable(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    pub async fn set_viewport(&self, metrics: DeviceMetrics) -> Result<(), CdpError> {
        self.call(
            "Emulation.setDeviceMetricsOverride",
            Some(serde_json::to_value(metrics)?),
        )
        .await?;
        Ok(())
    }

    /// Navigate and wait until the DOM is parsed.
    pub async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), CdpError> {
        let result = self
            .call("Page.navigate", Some(json!({"url": url})))
            .await?;

        if let Some(error) = result.get("errorText").and_then(Value::as_str) {
            return Err(CdpError::NavigationFailed(error.to_string()));
        }

        self.wait_for_dom(timeout).await?;
        debug!("Navigated to {}", url);
        Ok(())
    }

    /// Poll `document.readyState` until it leaves `loading`.
    async fn wait_for_dom(&self, timeout: Duration) -> Result<(), CdpError> {
        let start = Instant::now();
        loop {
            let state = self.evaluate("document.readyState").await?;
            if matches!(state.as_str(), Some("interactive" | "complete")) {
                return Ok(());
            }
            if start.elapsed() > timeout {
                return Err(CdpError::Timeout("DOM content load".to_string()));
            }
            tokio::time::sleep(LOAD_POLL).await;
        }
    }

    /// Evaluate an expression, awaiting promises, and return its JSON value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["exception"]["description"]
                .as_str()
                .or_else(|| exception["text"].as_str())
                .unwrap_or("Unknown error");
            return Err(CdpError::JavaScript(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }

    pub async fn evaluate_as<T: DeserializeOwned>(&self, expression: &str) -> Result<T, CdpError> {
        Ok(serde_json::from_value(self.evaluate(expression).await?)?)
    }

    pub async fn current_url(&self) -> Result<String, CdpError> {
        self.evaluate_as("window.location.href").await
    }

    /// PNG of the region `(0, 0, width, height)`, beyond the viewport if needed.
    pub async fn capture_png(&self, width: f64, height: f64) -> Result<Vec<u8>, CdpError> {
        let clip = Clip {
            x: 0.0,
            y: 0.0,
            width,
            height,
            scale: 1.0,
        };
        let result = self
            .call(
                "Page.captureScreenshot",
                Some(json!({
                    "format": "png",
                    "captureBeyondViewport": true,
                    "clip": clip,
                })),
            )
            .await?;
        decode_data(&result)
    }

    pub async fn print_pdf(&self, options: &PrintOptions) -> Result<Vec<u8>, CdpError> {
        let result = self
            .call("Page.printToPDF", Some(serde_json::to_value(options)?))
            .await?;
        decode_data(&result)
    }
}

/// Decode the base64 `data` field of a capture response.
pub(crate) fn decode_data(result: &Value) -> Result<Vec<u8>, CdpError> {
    let data = result["data"]
        .as_str()
        .ok_or_else(|| CdpError::InvalidResponse("Missing capture data".to_string()))?;
    STANDARD
        .decode(data)
        .map_err(|e| CdpError::InvalidResponse(format!("Bad base64: {}", e)))
}
