use super::*;

fn assets() -> InjectedAssets {
    InjectedAssets {
        style: ".popup{}".into(),
        scripts: vec!["var first = 1;".into(), "var second = 2;".into()],
    }
}

fn rewrite(body: &str) -> Result<String, RewriteError> {
    let page_url = Url::parse("https://news.example.com/blog/post").unwrap();
    let assets = assets();
    let ctx = HtmlContext {
        page_url: &page_url,
        session_origin: "https://news.example.com",
        bound_url: "https://news.example.com/blog/post",
        viewport_height: 770,
        assets: &assets,
    };
    rewrite_html(body, &ctx)
}

#[test]
fn test_injects_before_head_close() {
    let out = rewrite("<html><head><title>t</title></head><body>x</body></html>").unwrap();
    let style_at = out.find(INJECTED_MARKER).unwrap();
    let title_at = out.find("<title>").unwrap();
    let head_close = out.find("</head>").unwrap();
    assert!(title_at < style_at);
    assert!(style_at < head_close);
    assert!(out.contains(r#"window.PageLayer = {"urlToProxy":"https://news.example.com/blog/post"};"#));
}

#[test]
fn test_scripts_keep_order() {
    let out = rewrite("<html><head></head><body></body></html>").unwrap();
    let first = out.find("var first = 1;").unwrap();
    let second = out.find("var second = 2;").unwrap();
    assert!(out.find("window.PageLayer").unwrap() < first);
    assert!(first < second);
}

#[test]
fn test_sets_viewport_unit() {
    let out = rewrite("<html><head></head><body></body></html>").unwrap();
    assert!(out.contains(r#"<html style="--vh: 7.7px;">"#));

    let out = rewrite(r#"<html style="color: red"><head></head></html>"#).unwrap();
    assert!(out.contains(r#"style="--vh: 7.7px; color: red""#));
}

#[test]
fn test_viewport_unit_without_html_tag() {
    let out = rewrite("<head><title>x</title></head><body></body>").unwrap();
    assert!(!out.contains("<html"));
    assert!(out.contains(":root{--vh: 7.7px;}.popup{}</style>"));
}

#[test]
fn test_second_pass_is_noop() {
    let once = rewrite("<html><head></head><body></body></html>").unwrap();
    let twice = rewrite(&once).unwrap();
    assert_eq!(once, twice);
    assert_eq!(twice.matches(INJECTED_MARKER).count(), 1);
}

#[test]
fn test_missing_head_refused() {
    assert!(matches!(
        rewrite("<p>fragment</p>"),
        Err(RewriteError::MissingHead)
    ));
}

#[test]
fn test_uppercase_head_accepted() {
    let out = rewrite("<HTML><HEAD></HEAD><BODY></BODY></HTML>").unwrap();
    assert!(out.contains(INJECTED_MARKER));
}

#[test]
fn test_same_origin_stylesheet_made_relative() {
    let out = rewrite(
        r#"<html><head><link rel="stylesheet" href="https://news.example.com/css/a.css?v=3"></head></html>"#,
    )
    .unwrap();
    assert!(out.contains(r#"href="/css/a.css?v=3""#));

    let out = rewrite(r#"<html><head><link rel="stylesheet" href="../css/b.css"></head></html>"#)
        .unwrap();
    assert!(out.contains(r#"href="/css/b.css""#));
}

#[test]
fn test_foreign_stylesheet_escaped() {
    let out = rewrite(
        r#"<html><head><link rel="preload stylesheet" href="https://cdn.other.org/site.css"></head></html>"#,
    )
    .unwrap();
    assert!(out.contains(r#"href="/site.css?__pagelayer_origin=https%3A%2F%2Fcdn.other.org""#));
}

#[test]
fn test_other_links_untouched() {
    let out = rewrite(
        r#"<html><head><link rel="icon" href="https://cdn.other.org/f.ico"></head></html>"#,
    )
    .unwrap();
    assert!(out.contains(r#"href="https://cdn.other.org/f.ico""#));
}

#[test]
fn test_bound_url_escaped_for_script() {
    let page_url = Url::parse("https://news.example.com/").unwrap();
    let assets = assets();
    let ctx = HtmlContext {
        page_url: &page_url,
        session_origin: "https://news.example.com",
        bound_url: "https://news.example.com/?q=</script>",
        viewport_height: 770,
        assets: &assets,
    };
    let out = rewrite_html("<html><head></head></html>", &ctx).unwrap();
    assert!(!out.contains("q=</script>"));
    assert!(out.contains(r"q=\u003c/script>"));
}
