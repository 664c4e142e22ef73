use super::*;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_string, header, method, path, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::resolver::PinnedResolver;
use crate::rewrite::gzip;

fn assets() -> InjectedAssets {
    InjectedAssets {
        style: ".popup{}".into(),
        scripts: vec!["var injected = true;".into()],
    }
}

fn session() -> ProxySession {
    ProxySession {
        token: "https%3A%2F%2Fnews.example.com%2Fblog".into(),
        target: Url::parse("https://news.example.com/blog").unwrap(),
    }
}

fn forwarder(server: &MockServer, max_redirects: u32) -> Forwarder {
    let config = ProxyConfig {
        max_redirects,
        upstream_timeout_secs: 5,
        ..ProxyConfig::default()
    };
    Forwarder::new(&config, "http://localhost:3100/", assets())
        .unwrap()
        .with_resolver(Arc::new(PinnedResolver::new(
            Url::parse(&server.uri()).unwrap(),
        )))
}

async fn full_body(response: ProxiedResponse) -> Bytes {
    match response.body {
        ProxiedBody::Full(bytes) => bytes,
        ProxiedBody::Stream(upstream) => upstream.bytes().await.unwrap(),
    }
}

#[tokio::test]
async fn test_html_is_injected_and_headers_sanitized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blog"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .insert_header("x-frame-options", "DENY")
                .insert_header("set-cookie", "tracker=1")
                .set_body_string("<html><head><title>Blog</title></head><body>hi</body></html>"),
        )
        .mount(&server)
        .await;

    let response = forwarder(&server, 5)
        .forward(&session(), ForwardRequest::get("/blog"))
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.headers.get("x-frame-options").is_none());
    assert!(response.headers.get("set-cookie").is_none());
    assert!(response.headers.get(CONTENT_LENGTH).is_none());
    assert_eq!(response.headers["cross-origin-embedder-policy"], "credentialless");

    let body = String::from_utf8(full_body(response).await.to_vec()).unwrap();
    assert!(body.contains("data-pagelayer-injected"));
    assert!(body.contains("var injected = true;"));
    assert!(body.contains(r#""urlToProxy":"https://news.example.com/blog""#));
}

#[tokio::test]
async fn test_forwarded_request_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(header("referer", "http://localhost:3100/blog"))
        .and(header("accept-encoding", "identity"))
        .and(header("user-agent", "Agent/1.0"))
        .and(header("content-type", "application/json"))
        .and(body_string(r#"{"q":"rust"}"#))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("content-type", "application/json")
                .set_body_string("{}"),
        )
        .mount(&server)
        .await;

    let request = ForwardRequest {
        method: Method::POST,
        path_and_query: "/api/search".into(),
        user_agent: Some("Agent/1.0".into()),
        content_type: Some("application/json".into()),
        body: Bytes::from_static(br#"{"q":"rust"}"#),
    };
    let response = forwarder(&server, 5).forward(&session(), request).await.unwrap();
    assert_eq!(response.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_other_content_streams() {
    let server = MockServer::start().await;
    Mock::given(path("/logo.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(vec![0x89, b'P', b'N', b'G']),
        )
        .mount(&server)
        .await;

    let response = forwarder(&server, 5)
        .forward(&session(), ForwardRequest::get("/logo.png"))
        .await
        .unwrap();

    assert!(matches!(response.body, ProxiedBody::Stream(_)));
    assert_eq!(full_body(response).await.as_ref(), &[0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn test_relative_redirect_followed() {
    let server = MockServer::start().await;
    Mock::given(path("/old.css"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/new.css"))
        .mount(&server)
        .await;
    Mock::given(path("/new.css"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/css")
                .set_body_string("div{height:50vh}"),
        )
        .mount(&server)
        .await;

    let response = forwarder(&server, 5)
        .forward(&session(), ForwardRequest::get("/old.css"))
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[CONTENT_LENGTH], "32");
    assert_eq!(
        full_body(response).await.as_ref(),
        b"div{height:calc(50 * var(--vh))}"
    );
}

#[tokio::test]
async fn test_gzip_stylesheet_stays_gzip() {
    let server = MockServer::start().await;
    Mock::given(path("/site.css"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/css")
                .insert_header("content-encoding", "gzip")
                .set_body_bytes(gzip(b"a{top:10vh}").unwrap()),
        )
        .mount(&server)
        .await;

    let response = forwarder(&server, 5)
        .forward(&session(), ForwardRequest::get("/site.css"))
        .await
        .unwrap();
    let body = full_body(response).await;
    assert_eq!(gunzip(&body).unwrap(), b"a{top:calc(10 * var(--vh))}");
}

#[tokio::test]
async fn test_redirect_to_blocked_host_rejected() {
    let server = MockServer::start().await;
    Mock::given(path("/go"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "https://localhost/admin"),
        )
        .mount(&server)
        .await;

    let err = forwarder(&server, 5)
        .forward(&session(), ForwardRequest::get("/go"))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ProxyError::RedirectRejected { .. }));
    assert!(err.is_upstream_failure());
}

#[tokio::test]
async fn test_redirect_limit() {
    let server = MockServer::start().await;
    Mock::given(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
        .expect(3)
        .mount(&server)
        .await;

    let err = forwarder(&server, 2)
        .forward(&session(), ForwardRequest::get("/loop"))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ProxyError::TooManyRedirects(2)));
}

#[tokio::test]
async fn test_see_other_switches_to_get() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/form"))
        .respond_with(ResponseTemplate::new(303).insert_header("location", "/done"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/done"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let request = ForwardRequest {
        method: Method::POST,
        path_and_query: "/form".into(),
        user_agent: None,
        content_type: Some("application/x-www-form-urlencoded".into()),
        body: Bytes::from_static(b"a=1"),
    };
    let response = forwarder(&server, 5).forward(&session(), request).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(full_body(response).await.as_ref(), b"ok");
}

#[tokio::test]
async fn test_escaped_stylesheet() {
    let server = MockServer::start().await;
    Mock::given(path("/css/a.css"))
        .and(query_param_is_missing("__pagelayer_origin"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/css")
                .set_body_string("a{background:url(../img/x.png)}"),
        )
        .mount(&server)
        .await;

    let response = forwarder(&server, 5)
        .forward(
            &session(),
            ForwardRequest::get("/css/a.css?__pagelayer_origin=https%3A%2F%2Fcdn.other.org"),
        )
        .await
        .unwrap();

    let body = String::from_utf8(full_body(response).await.to_vec()).unwrap();
    assert_eq!(
        body,
        r#"a{background:url("/img/x.png?__pagelayer_origin=https%3A%2F%2Fcdn.other.org")}"#
    );
}

#[tokio::test]
async fn test_escape_to_loopback_rejected() {
    let server = MockServer::start().await;
    let err = forwarder(&server, 5)
        .forward(
            &session(),
            ForwardRequest::get("/x?__pagelayer_origin=http%3A%2F%2F127.0.0.1"),
        )
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ProxyError::EscapeRejected(_)));
    assert!(!err.is_upstream_failure());
}

#[tokio::test]
async fn test_unreachable_upstream() {
    let config = ProxyConfig::default();
    let forwarder = Forwarder::new(&config, "http://localhost:3100", assets())
        .unwrap()
        .with_resolver(Arc::new(PinnedResolver::new(
            Url::parse("http://127.0.0.1:1").unwrap(),
        )));

    let err = forwarder
        .forward(&session(), ForwardRequest::get("/"))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ProxyError::Upstream(_)));
}

/// Upstream that sends headers at once, then `chunks` pieces of ten bytes
/// `gap` apart.
async fn trickling_upstream(chunks: usize, gap: Duration) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let head = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: video/mp4\r\ncontent-length: {}\r\n\r\n",
            chunks * 10
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        for _ in 0..chunks {
            tokio::time::sleep(gap).await;
            socket.write_all(&[b'x'; 10]).await.unwrap();
        }
    });
    Url::parse(&format!("http://{}", addr)).unwrap()
}

#[tokio::test]
async fn test_slow_stream_outlives_upstream_timeout() {
    let upstream = trickling_upstream(4, Duration::from_millis(800)).await;
    let config = ProxyConfig {
        upstream_timeout_secs: 2,
        ..ProxyConfig::default()
    };
    let forwarder = Forwarder::new(&config, "http://localhost:3100", assets())
        .unwrap()
        .with_resolver(Arc::new(PinnedResolver::new(upstream)));

    let response = forwarder
        .forward(&session(), ForwardRequest::get("/clip.mp4"))
        .await
        .unwrap();
    assert!(matches!(response.body, ProxiedBody::Stream(_)));

    // 3.2 s in total, longer than the 2 s timeout; no gap exceeds it.
    let body = full_body(response).await;
    assert_eq!(body.len(), 40);
}

#[tokio::test]
async fn test_stalled_upstream_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });
    let config = ProxyConfig {
        upstream_timeout_secs: 1,
        ..ProxyConfig::default()
    };
    let forwarder = Forwarder::new(&config, "http://localhost:3100", assets())
        .unwrap()
        .with_resolver(Arc::new(PinnedResolver::new(
            Url::parse(&format!("http://{}", addr)).unwrap(),
        )));

    let err = forwarder
        .forward(&session(), ForwardRequest::get("/"))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ProxyError::Timeout(1)));
}

#[test]
fn test_switches_to_get() {
    assert!(switches_to_get(StatusCode::SEE_OTHER, &Method::PUT));
    assert!(switches_to_get(StatusCode::FOUND, &Method::POST));
    assert!(!switches_to_get(StatusCode::FOUND, &Method::GET));
    assert!(!switches_to_get(StatusCode::TEMPORARY_REDIRECT, &Method::POST));
}
