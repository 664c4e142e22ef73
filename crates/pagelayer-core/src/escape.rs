//! Cross-origin escape links.
//!
//! A sub-resource on another origin than the bound session is rewritten to
//! a root-relative link on the proxy carrying the real origin in
//! [`ESCAPE_PARAM`]. The proxy serves that one request from the embedded
//! origin and strips the parameter before forwarding.

use url::form_urlencoded;
use url::Url;

/// Query parameter holding the escaped origin.
pub const ESCAPE_PARAM: &str = "__pagelayer_origin";

/// A request that asked to leave the session origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapedRequest {
    /// Origin the request is served from. Not yet validated.
    pub origin: String,
    /// Request line with the escape parameter removed.
    pub path_and_query: String,
}

/// Root-relative proxy link that fetches `resource` from its own origin.
pub fn escape_link(resource: &Url) -> String {
    let mut link = resource.path().to_string();
    match resource.query() {
        Some(query) if !query.is_empty() => {
            link.push('?');
            link.push_str(query);
            link.push('&');
        }
        _ => link.push('?'),
    }
    link.push_str(ESCAPE_PARAM);
    link.push('=');
    link.extend(form_urlencoded::byte_serialize(
        resource.origin().ascii_serialization().as_bytes(),
    ));
    link
}

/// Recognize and strip an escape marker from a request line.
pub fn extract_escape(path_and_query: &str) -> Option<EscapedRequest> {
    let (path, query) = path_and_query.split_once('?')?;

    let mut origin = None;
    let mut kept = Vec::new();
    for pair in query.split('&') {
        let key = pair.split_once('=').map(|(k, _)| k).unwrap_or(pair);
        if key == ESCAPE_PARAM {
            if origin.is_none() {
                origin = form_urlencoded::parse(pair.as_bytes())
                    .next()
                    .map(|(_, value)| value.into_owned());
            }
        } else {
            kept.push(pair);
        }
    }

    let origin = origin.filter(|o| !o.is_empty())?;
    let path_and_query = if kept.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, kept.join("&"))
    };

    Some(EscapedRequest {
        origin,
        path_and_query,
    })
}
