use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 3100);
    assert!(!config.proxy.allow_http);
    assert!(config.cors.allowed_origins.is_empty());
}

#[test]
fn test_proxy_config_default() {
    let proxy = ProxyConfig::default();
    assert_eq!(proxy.upstream_timeout_secs, 30);
    assert_eq!(proxy.max_redirects, 5);
    assert_eq!(proxy.viewport_width, 1440);
    assert_eq!(proxy.viewport_height, 770);
}

#[test]
fn test_cookie_config_default() {
    let cookie = CookieConfig::default();
    assert_eq!(cookie.name, "pagelayer_proxy_sid");
    assert_eq!(cookie.same_site, SameSitePolicy::None);
    assert!(cookie.secure);
    assert_eq!(cookie.ttl_secs, 3600);
}

#[test]
fn test_browser_config_default() {
    let browser = BrowserConfig::default();
    assert_eq!(browser.endpoint, "http://127.0.0.1:9222");
    assert_eq!(browser.settle_ms, 2000);
    assert_eq!(browser.quiet_ms, 500);
}

#[test]
fn test_logging_config_default() {
    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(logging.dir.is_none());
}

#[test]
fn test_same_site_parse() {
    let cookie: CookieConfig = toml::from_str("same_site = \"strict\"").unwrap();
    assert_eq!(cookie.same_site, SameSitePolicy::Strict);
    assert_eq!(cookie.same_site.as_str(), "Strict");
}

#[test]
fn test_same_site_rejects_unknown() {
    let result: Result<CookieConfig, _> = toml::from_str("same_site = \"sometimes\"");
    assert!(result.is_err());
}

#[test]
fn test_partial_section_keeps_defaults() {
    let config: Config = toml::from_str("[proxy]\nallow_http = true\n").unwrap();
    assert!(config.proxy.allow_http);
    assert_eq!(config.proxy.max_redirects, 5);
    assert_eq!(config.cookie.ttl_secs, 3600);
}

#[test]
fn test_config_serialization_roundtrip() {
    let config = Config::default();
    let text = toml::to_string(&config).unwrap();
    let back: Config = toml::from_str(&text).unwrap();
    assert_eq!(back.server.public_root, config.server.public_root);
    assert_eq!(back.cookie.same_site, config.cookie.same_site);
}

#[test]
fn test_user_config_path() {
    if let Some(path) = Config::user_config_path() {
        assert!(path.ends_with(".pagelayer/config.toml"));
    }
}
