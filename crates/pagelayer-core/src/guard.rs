//! SSRF guard.
//!
//! Every URL the proxy is about to contact goes through [`SsrfGuard`]: the
//! address a user types, the canonical URL a navigation lands on, the
//! session URL on each request, each redirect hop and each escape origin.

use std::sync::LazyLock;

use regex::Regex;
use url::{Host, Url};

use crate::error::GuardRejection;

/// Longest URL accepted, in bytes.
pub const MAX_URL_LEN: usize = 256;

static DOMAIN_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z]{2,3}$").expect("valid suffix pattern"));

static READABLE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(www\.)?[-a-z0-9@:%._+~#=]{2,256}\.[a-z]{2,6}\b([-a-z0-9@:%_+.~#?&/=]*)")
        .expect("valid url pattern")
});

/// Hostname prefixes of private, loopback and link-local IPv4 space.
const BLOCKED_V4_PREFIXES: &[&str] = &["127.", "0.", "10.", "192.168.", "169.254."];

/// Alternative spellings of 127.0.0.1 that resolvers accept.
const LOOPBACK_ENCODINGS: &[&str] = &[
    "2130706433",
    "0x7f000001",
    "017700000001",
    "0x7f.",
    "0177.",
];

/// Substrings of cloud metadata and loopback-alias hostnames.
const BLOCKED_NAME_PARTS: &[&str] = &["metadata", "instance-data", "localtest"];

const BLOCKED_NAME_SUFFIXES: &[&str] = &[".localhost", ".local", ".internal"];

/// URL admission policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SsrfGuard {
    allow_plain_http: bool,
}

impl SsrfGuard {
    pub fn new(allow_plain_http: bool) -> Self {
        Self { allow_plain_http }
    }

    pub fn is_allowed(&self, url: &str) -> bool {
        self.check(url).is_ok()
    }

    /// Validate `url`, returning it parsed or the first rule it breaks.
    pub fn check(&self, url: &str) -> Result<Url, GuardRejection> {
        if url.len() > MAX_URL_LEN {
            return Err(GuardRejection::TooLong(MAX_URL_LEN));
        }

        let parsed = Url::parse(url).map_err(|_| GuardRejection::Unparsable)?;

        match parsed.scheme() {
            "https" => {}
            "http" if self.allow_plain_http => {}
            other => return Err(GuardRejection::Scheme(other.to_string())),
        }

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(GuardRejection::UserInfo);
        }

        let hostname = match parsed.host() {
            Some(Host::Domain(domain)) => domain.to_ascii_lowercase(),
            Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => return Err(GuardRejection::IpLiteral),
            None => return Err(GuardRejection::Unparsable),
        };

        if !DOMAIN_SUFFIX.is_match(&hostname) {
            return Err(GuardRejection::NoDomainSuffix(hostname));
        }

        if hostname.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(GuardRejection::LeadingDigit(hostname));
        }

        if let Some(port) = parsed.port() {
            return Err(GuardRejection::ExplicitPort(port));
        }

        if is_blocked_hostname(&hostname) {
            return Err(GuardRejection::BlockedHost(hostname));
        }

        let authority = raw_authority(url).to_ascii_lowercase();
        if LOOPBACK_ENCODINGS.iter().any(|enc| authority.contains(enc)) {
            return Err(GuardRejection::EncodedLoopback);
        }

        if !READABLE_URL.is_match(url) {
            return Err(GuardRejection::Shape);
        }

        Ok(parsed)
    }
}

/// Stateless form of [`SsrfGuard::is_allowed`].
pub fn is_allowed(url: &str, allow_plain_http: bool) -> bool {
    SsrfGuard::new(allow_plain_http).is_allowed(url)
}

fn is_blocked_hostname(hostname: &str) -> bool {
    if BLOCKED_V4_PREFIXES.iter().any(|p| hostname.starts_with(p)) {
        return true;
    }

    // 172.16.0.0/12
    if let Some(rest) = hostname.strip_prefix("172.") {
        let second = rest.split('.').next().and_then(|s| s.parse::<u8>().ok());
        if matches!(second, Some(16..=31)) && rest.contains('.') {
            return true;
        }
    }

    if hostname == "localhost" {
        return true;
    }

    BLOCKED_NAME_PARTS.iter().any(|p| hostname.contains(p))
        || BLOCKED_NAME_SUFFIXES.iter().any(|s| hostname.ends_with(s))
}

/// Authority section of a raw URL string, before any normalization.
fn raw_authority(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    &rest[..end]
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
