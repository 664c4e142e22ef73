//! Upstream forwarding.
//!
//! One inbound request becomes one upstream exchange, with redirects
//! followed here so every hop passes the SSRF guard. HTML and CSS bodies
//! are buffered and rewritten; everything else streams through.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE,
    LOCATION, REFERER, USER_AGENT,
};
use reqwest::{redirect, Client, Method, Response, StatusCode};
use tracing::{debug, warn};
use url::Url;

use pagelayer_config::ProxyConfig;
use pagelayer_core::escape::extract_escape;
use pagelayer_core::{resolve_target, ProxySession, SsrfGuard};

use crate::assets::InjectedAssets;
use crate::error::{ProxyError, RewriteError};
use crate::headers::{content_kind, sanitize_response_headers, ContentKind};
use crate::resolver::{DirectResolver, UpstreamResolver};
use crate::rewrite::{gunzip, is_gzip, rewrite_css_body, rewrite_html, CssContext, HtmlContext};

/// The parts of an inbound request that are forwarded.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    /// Request line as received, e.g. `/a/b?c=d`.
    pub path_and_query: String,
    pub user_agent: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl ForwardRequest {
    pub fn get(path_and_query: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path_and_query: path_and_query.into(),
            user_agent: None,
            content_type: None,
            body: Bytes::new(),
        }
    }
}

pub enum ProxiedBody {
    /// Rewritten or otherwise buffered body.
    Full(Bytes),
    /// Untouched upstream body, streamed to the client.
    Stream(Response),
}

pub struct ProxiedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ProxiedBody,
}

/// HTTP client for upstream requests: redirects are left to the caller,
/// and `upstream_timeout_secs` bounds connecting and each idle read, not
/// the whole exchange, so long streamed bodies are not cut off.
pub(crate) fn upstream_client(config: &ProxyConfig) -> Result<Client, ProxyError> {
    let timeout = Duration::from_secs(config.upstream_timeout_secs);
    Client::builder()
        .redirect(redirect::Policy::none())
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .build()
        .map_err(|e| ProxyError::Client(e.to_string()))
}

/// Sends proxied requests upstream and rewrites what comes back.
pub struct Forwarder {
    client: Client,
    guard: SsrfGuard,
    resolver: Arc<dyn UpstreamResolver>,
    public_root: String,
    max_redirects: u32,
    timeout_secs: u64,
    viewport_height: u32,
    assets: InjectedAssets,
}

impl Forwarder {
    pub fn new(
        config: &ProxyConfig,
        public_root: &str,
        assets: InjectedAssets,
    ) -> Result<Self, ProxyError> {
        Ok(Self {
            client: upstream_client(config)?,
            guard: SsrfGuard::new(config.allow_http),
            resolver: Arc::new(DirectResolver),
            public_root: public_root.trim_end_matches('/').to_string(),
            max_redirects: config.max_redirects,
            timeout_secs: config.upstream_timeout_secs,
            viewport_height: config.viewport_height,
            assets,
        })
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn UpstreamResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Forward `request` to the session target, or to the origin named
    /// by an escape marker in its query.
    pub async fn forward(
        &self,
        session: &ProxySession,
        request: ForwardRequest,
    ) -> Result<ProxiedResponse, ProxyError> {
        let (target, path_and_query, escaped) = match extract_escape(&request.path_and_query) {
            Some(escape) => {
                let origin = self
                    .guard
                    .check(&escape.origin)
                    .map_err(ProxyError::EscapeRejected)?;
                (resolve_target(&origin)?, escape.path_and_query, true)
            }
            None => (
                session.target_descriptor()?,
                request.path_and_query.clone(),
                false,
            ),
        };

        let referer = format!("{}{}", self.public_root, session.target.path());
        let mut url = target
            .upstream_url(&path_and_query)
            .map_err(ProxyError::Target)?;
        let mut method = request.method.clone();
        let mut body = request.body.clone();

        let mut hops = 0;
        loop {
            debug!("Forwarding {} {}", method, url);
            let response = self
                .send(&method, &url, &referer, &request, body.clone())
                .await?;

            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            let Some(location) = location.filter(|_| response.status().is_redirection()) else {
                return self.finish(response, &url, session, escaped).await;
            };

            if hops == self.max_redirects {
                return Err(ProxyError::TooManyRedirects(self.max_redirects));
            }
            hops += 1;

            let next = url
                .join(&location)
                .map_err(|e| ProxyError::Upstream(format!("bad redirect {}: {}", location, e)))?;
            let next = self
                .guard
                .check(next.as_str())
                .map_err(|reason| ProxyError::RedirectRejected {
                    location: location.clone(),
                    reason,
                })?;

            if switches_to_get(response.status(), &method) {
                method = Method::GET;
                body = Bytes::new();
            }
            debug!("Following {} redirect to {}", response.status(), next);
            url = next;
        }
    }

    async fn send(
        &self,
        method: &Method,
        url: &Url,
        referer: &str,
        request: &ForwardRequest,
        body: Bytes,
    ) -> Result<Response, ProxyError> {
        let mut builder = self
            .client
            .request(method.clone(), self.resolver.resolve(url))
            .header(REFERER, referer)
            .header(ACCEPT_ENCODING, "identity");

        if let Some(agent) = &request.user_agent {
            builder = builder.header(USER_AGENT, agent);
        }
        if !body.is_empty() {
            if let Some(content_type) = &request.content_type {
                builder = builder.header(CONTENT_TYPE, content_type);
            }
            builder = builder.body(body);
        }

        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProxyError::Timeout(self.timeout_secs)
            } else {
                ProxyError::Upstream(e.to_string())
            }
        })
    }

    async fn finish(
        &self,
        response: Response,
        page_url: &Url,
        session: &ProxySession,
        escaped: bool,
    ) -> Result<ProxiedResponse, ProxyError> {
        let status = response.status();
        let mut headers = sanitize_response_headers(response.headers());

        let kind = content_kind(response.headers());
        if kind == ContentKind::Other {
            return Ok(ProxiedResponse {
                status,
                headers,
                body: ProxiedBody::Stream(response),
            });
        }

        let original = response.bytes().await?;
        let rewritten = match kind {
            ContentKind::Html => self.rewrite_document(&original, page_url, session),
            _ => rewrite_css_body(
                &original,
                &CssContext {
                    sheet_url: page_url,
                    escaped,
                },
            ),
        };

        let body = match rewritten {
            Ok(body) => {
                if kind == ContentKind::Html {
                    headers.remove(CONTENT_ENCODING);
                    headers.remove(CONTENT_LENGTH);
                } else {
                    headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
                }
                Bytes::from(body)
            }
            Err(RewriteError::MissingHead) => {
                debug!("No </head> in {}, forwarding as is", page_url);
                original
            }
            Err(e) => {
                warn!("Rewrite of {} failed, forwarding original: {}", page_url, e);
                original
            }
        };

        Ok(ProxiedResponse {
            status,
            headers,
            body: ProxiedBody::Full(body),
        })
    }

    fn rewrite_document(
        &self,
        body: &[u8],
        page_url: &Url,
        session: &ProxySession,
    ) -> Result<Vec<u8>, RewriteError> {
        let plain = if is_gzip(body) { gunzip(body)? } else { body.to_vec() };
        let text = String::from_utf8(plain).map_err(|_| RewriteError::Encoding)?;

        let session_origin = session.target.origin().ascii_serialization();
        let ctx = HtmlContext {
            page_url,
            session_origin: &session_origin,
            bound_url: session.target.as_str(),
            viewport_height: self.viewport_height,
            assets: &self.assets,
        };
        Ok(rewrite_html(&text, &ctx)?.into_bytes())
    }
}

/// 303 always becomes GET; 301/302 only for POST, as browsers do.
fn switches_to_get(status: StatusCode, method: &Method) -> bool {
    status == StatusCode::SEE_OTHER
        || (matches!(status, StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND)
            && *method == Method::POST)
}

#[cfg(test)]
#[path = "forwarder_tests.rs"]
mod tests;
