//! Configuration validation.

use crate::error::ConfigError;
use url::Url;

use crate::schema::{Config, SameSitePolicy};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_proxy(config, &mut result);
        Self::validate_cors(config, &mut result);
        Self::validate_cookie(config, &mut result);
        Self::validate_browser(config, &mut result);

        Ok(result)
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }

        match Url::parse(&config.server.public_root) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                if url.path() != "/" {
                    result.add_warning(ValidationWarning::new(
                        "server.public_root",
                        "public_root has a path component, it will be ignored",
                    ));
                }
            }
            _ => result.add_error(ValidationError::new(
                "server.public_root",
                "public_root must be an absolute http:// or https:// URL",
            )),
        }
    }

    fn validate_proxy(config: &Config, result: &mut ValidationResult) {
        let proxy = &config.proxy;

        if proxy.allow_http {
            result.add_warning(ValidationWarning::new(
                "proxy.allow_http",
                "Plain HTTP targets are accepted; only enable this for development",
            ));
        }

        if proxy.upstream_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "proxy.upstream_timeout_secs",
                "upstream_timeout_secs must be greater than 0",
            ));
        }

        if proxy.max_redirects > 20 {
            result.add_warning(ValidationWarning::new(
                "proxy.max_redirects",
                "max_redirects is very high (>20)",
            ));
        }

        if proxy.max_request_body_bytes == 0 {
            result.add_error(ValidationError::new(
                "proxy.max_request_body_bytes",
                "max_request_body_bytes must be greater than 0",
            ));
        }

        if proxy.viewport_width == 0 || proxy.viewport_height == 0 {
            result.add_error(ValidationError::new(
                "proxy.viewport",
                "viewport_width and viewport_height must be greater than 0",
            ));
        }
    }

    fn validate_cors(config: &Config, result: &mut ValidationResult) {
        for origin in &config.cors.allowed_origins {
            let valid = Url::parse(origin)
                .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
                .unwrap_or(false);
            if !valid {
                result.add_error(ValidationError::new(
                    "cors.allowed_origins",
                    format!("Invalid origin '{}'", origin),
                ));
            }
        }

        if config.cors.allowed_origins.is_empty() && config.cors.allow_credentials {
            result.add_warning(ValidationWarning::new(
                "cors.allowed_origins",
                "No origins listed; every request origin will be mirrored with credentials",
            ));
        }
    }

    fn validate_cookie(config: &Config, result: &mut ValidationResult) {
        let cookie = &config.cookie;

        if cookie.name.is_empty()
            || !cookie
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            result.add_error(ValidationError::new(
                "cookie.name",
                "Cookie name must be non-empty and use only letters, digits, '_' or '-'",
            ));
        }

        if cookie.ttl_secs == 0 {
            result.add_error(ValidationError::new(
                "cookie.ttl_secs",
                "ttl_secs must be greater than 0",
            ));
        }

        if cookie.same_site == SameSitePolicy::None && !cookie.secure {
            result.add_error(ValidationError::new(
                "cookie.secure",
                "SameSite=None cookies must be Secure",
            ));
        }
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        let browser = &config.browser;

        if !browser.endpoint.starts_with("http://") && !browser.endpoint.starts_with("https://") {
            result.add_error(ValidationError::new(
                "browser.endpoint",
                "endpoint must start with http:// or https://",
            ));
        }

        if browser.navigation_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "browser.navigation_timeout_secs",
                "navigation_timeout_secs must be greater than 0",
            ));
        }

        if browser.quiet_ms > browser.navigation_timeout_secs * 1000 {
            result.add_warning(ValidationWarning::new(
                "browser.quiet_ms",
                "quiet_ms exceeds the navigation timeout; layout capture will always time out",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
