//! Page served in place of an unreachable upstream.

use pagelayer_protocols::PageMessage;

/// Minimal document that reports `error` to the embedding page.
///
/// The message is posted to the origin of `document.referrer`, the host
/// page that framed the proxy.
pub fn failure_page(error: &str) -> String {
    let message = PageMessage::ProxyFinishFail {
        error: error.to_string(),
    }
    .to_script_json()
    .unwrap_or_else(|_| r#"{"type":"proxyFinishFail","error":""}"#.to_string());

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Page unavailable</title></head>
<body>
<script>
(() => {{
  let origin = '*';
  try {{
    origin = new URL(document.referrer).origin;
  }} catch (e) {{}}
  window.parent.postMessage({message}, origin);
}})();
</script>
</body>
</html>
"#
    )
}
