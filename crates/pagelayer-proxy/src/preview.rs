//! Link-preview metadata.

use std::sync::{Arc, LazyLock};

use reqwest::header::{ACCEPT_ENCODING, CONTENT_TYPE, LOCATION};
use reqwest::{Client, Response};
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use pagelayer_config::ProxyConfig;
use pagelayer_core::{SessionError, SsrfGuard};
use pagelayer_protocols::LinkPreview;

use crate::error::ProxyError;
use crate::forwarder::upstream_client;
use crate::resolver::{DirectResolver, UpstreamResolver};

const MAX_PREVIEW_REDIRECTS: u32 = 5;
const MAX_PREVIEW_BYTES: usize = 512 * 1024;

static OG_TITLE: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[property="og:title"]"#));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static ICON: LazyLock<Selector> = LazyLock::new(|| selector(r#"link[rel~="icon"][href]"#));
static DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[name="description"]"#));
static OG_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[property="og:description"]"#));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Fetches hover-card metadata for link targets.
pub struct LinkPreviewer {
    client: Client,
    guard: SsrfGuard,
    resolver: Arc<dyn UpstreamResolver>,
}

impl LinkPreviewer {
    pub fn new(config: &ProxyConfig) -> Result<Self, ProxyError> {
        Ok(Self {
            client: upstream_client(config)?,
            guard: SsrfGuard::new(config.allow_http),
            resolver: Arc::new(DirectResolver),
        })
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn UpstreamResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Fetch `url` and read its title, favicon and description. Every
    /// redirect hop is re-checked against the guard.
    pub async fn preview(&self, url: &str) -> Result<LinkPreview, ProxyError> {
        let mut current = self.guard.check(url).map_err(SessionError::from)?;

        for _ in 0..=MAX_PREVIEW_REDIRECTS {
            let response = self
                .client
                .get(self.resolver.resolve(&current))
                .header(ACCEPT_ENCODING, "identity")
                .send()
                .await?;

            if response.status().is_redirection() {
                if let Some(location) = response.headers().get(LOCATION).and_then(|v| v.to_str().ok()) {
                    let next = current
                        .join(location)
                        .map_err(|e| ProxyError::Upstream(e.to_string()))?;
                    current = self.guard.check(next.as_str()).map_err(|reason| {
                        ProxyError::RedirectRejected {
                            location: location.to_string(),
                            reason,
                        }
                    })?;
                    continue;
                }
            }

            let is_html = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.to_ascii_lowercase().contains("text/html"));
            if !is_html {
                debug!("Preview target {} is not HTML", current);
                return Ok(LinkPreview::default());
            }

            let body = read_capped(response, MAX_PREVIEW_BYTES).await?;
            return Ok(parse_preview(&String::from_utf8_lossy(&body), &current));
        }

        Err(ProxyError::TooManyRedirects(MAX_PREVIEW_REDIRECTS))
    }
}

/// Read at most `limit` bytes of a body, dropping the rest unread.
async fn read_capped(mut response: Response, limit: usize) -> Result<Vec<u8>, ProxyError> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = limit - body.len();
        body.extend_from_slice(&chunk[..chunk.len().min(room)]);
        if body.len() == limit {
            break;
        }
    }
    Ok(body)
}

/// Read preview metadata out of a document fetched from `base`.
pub fn parse_preview(html: &str, base: &Url) -> LinkPreview {
    let document = Html::parse_document(html);

    let content = |sel: &Selector| {
        document
            .select(sel)
            .filter_map(|el| el.value().attr("content"))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
    };

    let page_title = content(&OG_TITLE).or_else(|| {
        document
            .select(&TITLE)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    });

    let favicon_url = document
        .select(&ICON)
        .filter_map(|el| el.value().attr("href"))
        .find_map(|href| base.join(href.trim()).ok())
        .or_else(|| base.join("/favicon.ico").ok())
        .map(|u| u.to_string());

    let meta_description = content(&DESCRIPTION).or_else(|| content(&OG_DESCRIPTION));

    LinkPreview {
        page_title,
        favicon_url,
        meta_description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::path;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::resolver::PinnedResolver;

    fn base() -> Url {
        Url::parse("https://docs.example.org/guide/intro").unwrap()
    }

    #[test]
    fn test_parse_full_document() {
        let html = r#"<html><head>
            <title>Fallback</title>
            <meta property="og:title" content="Intro to Widgets">
            <meta name="description" content="All about widgets.">
            <link rel="shortcut icon" href="/static/fav.png">
        </head></html>"#;

        let preview = parse_preview(html, &base());
        assert_eq!(preview.page_title.as_deref(), Some("Intro to Widgets"));
        assert_eq!(preview.meta_description.as_deref(), Some("All about widgets."));
        assert_eq!(
            preview.favicon_url.as_deref(),
            Some("https://docs.example.org/static/fav.png")
        );
    }

    #[test]
    fn test_parse_fallbacks() {
        let html = r#"<html><head>
            <title> Plain title </title>
            <meta property="og:description" content="From open graph">
        </head></html>"#;

        let preview = parse_preview(html, &base());
        assert_eq!(preview.page_title.as_deref(), Some("Plain title"));
        assert_eq!(preview.meta_description.as_deref(), Some("From open graph"));
        assert_eq!(
            preview.favicon_url.as_deref(),
            Some("https://docs.example.org/favicon.ico")
        );
    }

    #[test]
    fn test_parse_empty_document() {
        let preview = parse_preview("", &base());
        assert!(preview.page_title.is_none());
        assert!(preview.meta_description.is_none());
    }

    fn previewer(server: &MockServer) -> LinkPreviewer {
        LinkPreviewer::new(&ProxyConfig::default())
            .unwrap()
            .with_resolver(Arc::new(PinnedResolver::new(
                Url::parse(&server.uri()).unwrap(),
            )))
    }

    #[tokio::test]
    async fn test_preview_follows_redirect() {
        let server = MockServer::start().await;
        Mock::given(path("/short"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/article"))
            .mount(&server)
            .await;
        Mock::given(path("/article"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<html><head><title>Article</title></head></html>"),
            )
            .mount(&server)
            .await;

        let preview = previewer(&server)
            .preview("https://blog.example.com/short")
            .await
            .unwrap();
        assert_eq!(preview.page_title.as_deref(), Some("Article"));
        assert_eq!(
            preview.favicon_url.as_deref(),
            Some("https://blog.example.com/favicon.ico")
        );
    }

    #[tokio::test]
    async fn test_preview_rejects_internal_redirect() {
        let server = MockServer::start().await;
        Mock::given(path("/short"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", "https://metadata.google.internal/"),
            )
            .mount(&server)
            .await;

        let result = previewer(&server).preview("https://blog.example.com/short").await;
        assert!(matches!(result, Err(ProxyError::RedirectRejected { .. })));
    }

    #[tokio::test]
    async fn test_preview_non_html() {
        let server = MockServer::start().await;
        Mock::given(path("/file.pdf"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/pdf"))
            .mount(&server)
            .await;

        let preview = previewer(&server)
            .preview("https://blog.example.com/file.pdf")
            .await
            .unwrap();
        assert!(preview.is_empty());
    }

    #[tokio::test]
    async fn test_preview_rejects_blocked_url() {
        let server = MockServer::start().await;
        let result = previewer(&server).preview("https://localhost/").await;
        assert!(matches!(result, Err(ProxyError::Target(_))));
    }

    #[tokio::test]
    async fn test_body_read_stops_at_cap() {
        let server = MockServer::start().await;
        let page = format!(
            "<html><head><title>Huge</title></head><body>{}</body></html>",
            "x".repeat(2 * MAX_PREVIEW_BYTES)
        );
        Mock::given(path("/huge"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(page),
            )
            .mount(&server)
            .await;

        let response = reqwest::get(format!("{}/huge", server.uri())).await.unwrap();
        let body = read_capped(response, MAX_PREVIEW_BYTES).await.unwrap();
        assert_eq!(body.len(), MAX_PREVIEW_BYTES);
        assert!(body.starts_with(b"<html><head><title>Huge</title>"));

        let preview = previewer(&server)
            .preview("https://blog.example.com/huge")
            .await
            .unwrap();
        assert_eq!(preview.page_title.as_deref(), Some("Huge"));
    }

    #[tokio::test]
    async fn test_body_read_cap_inside_chunk() {
        let server = MockServer::start().await;
        Mock::given(path("/small"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>hi</p>"))
            .mount(&server)
            .await;

        let response = reqwest::get(format!("{}/small", server.uri())).await.unwrap();
        assert_eq!(read_capped(response, 4).await.unwrap(), b"<p>h");
    }
}
