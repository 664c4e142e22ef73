//! Response header sanitizing.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CACHE_CONTROL, CONTENT_TYPE};

/// Headers that would stop the page from being framed, leak upstream
/// cookies onto the proxy origin, or only apply to the upstream hop.
const STRIPPED: &[&str] = &[
    "set-cookie",
    "x-frame-options",
    "content-security-policy",
    "content-security-policy-report-only",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub const NO_CACHE: &str = "max-age=0, public, no-cache, no-store, must-revalidate";

/// Kind of body, decided from `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Css,
    Other,
}

pub fn content_kind(headers: &HeaderMap) -> ContentKind {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.contains("text/html") {
        ContentKind::Html
    } else if content_type.contains("text/css") {
        ContentKind::Css
    } else {
        ContentKind::Other
    }
}

/// Copy upstream headers minus the stripped set, then force the
/// cross-origin and caching policy.
pub fn sanitize_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len() + 3);
    for (name, value) in upstream {
        if !STRIPPED.contains(&name.as_str()) {
            headers.append(name.clone(), value.clone());
        }
    }

    headers.insert(
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("cross-origin"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-embedder-policy"),
        HeaderValue::from_static("credentialless"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
    headers
}
