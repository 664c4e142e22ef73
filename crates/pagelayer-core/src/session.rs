//! Session binding.
//!
//! A client is bound to one target by a cookie whose value is the target
//! URL itself. Nothing is kept server-side: each request rebuilds its
//! [`ProxySession`] from the cookie and re-validates it.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use url::form_urlencoded;
use url::Url;

use pagelayer_config::CookieConfig;

use crate::error::SessionError;
use crate::guard::SsrfGuard;
use crate::target::{resolve_target, TargetDescriptor};

/// The target a request is proxied to, read from the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySession {
    /// Raw cookie value.
    pub token: String,
    pub target: Url,
}

impl ProxySession {
    pub fn target_descriptor(&self) -> Result<TargetDescriptor, SessionError> {
        resolve_target(&self.target)
    }
}

/// A freshly issued binding.
#[derive(Debug, Clone)]
pub struct SessionBinding {
    pub token: String,
    /// Complete `Set-Cookie` header value.
    pub set_cookie: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and reads session cookies.
#[derive(Debug, Clone)]
pub struct SessionBinder {
    cookie: CookieConfig,
    guard: SsrfGuard,
}

impl SessionBinder {
    pub fn new(cookie: CookieConfig, guard: SsrfGuard) -> Self {
        Self { cookie, guard }
    }

    /// Bind the client to `validated`, replacing any earlier binding.
    pub fn bind_session(&self, validated: &Url) -> SessionBinding {
        self.bind_session_at(validated, Utc::now())
    }

    fn bind_session_at(&self, validated: &Url, now: DateTime<Utc>) -> SessionBinding {
        let token = encode_cookie_value(validated.as_str());
        let expires_at = now + Duration::seconds(self.cookie.ttl_secs as i64);

        let mut set_cookie = format!(
            "{}={}; Max-Age={}; Expires={}; Path=/; SameSite={}",
            self.cookie.name,
            token,
            self.cookie.ttl_secs,
            expires_at.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.cookie.same_site.as_str(),
        );
        if self.cookie.secure {
            set_cookie.push_str("; Secure");
        }

        SessionBinding {
            token,
            set_cookie,
            expires_at,
        }
    }

    /// Read the session from the request's `Cookie` header values.
    ///
    /// Returns `None` when no session cookie is present or its URL no
    /// longer passes the guard.
    pub fn current_target<'a, I>(&self, cookie_headers: I) -> Option<ProxySession>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let token = cookie_headers
            .into_iter()
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie.name)
            .map(|(_, value)| value.trim_matches('"').to_string())?;

        let decoded = decode_cookie_value(&token);
        match self.guard.check(&decoded) {
            Ok(target) => Some(ProxySession { token, target }),
            Err(rejection) => {
                debug!("Session cookie rejected: {}", rejection);
                None
            }
        }
    }
}

/// Percent-encode a URL so it is a legal cookie octet string.
pub fn encode_cookie_value(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Inverse of [`encode_cookie_value`]. Values that already look like a raw
/// URL are returned unchanged.
pub fn decode_cookie_value(value: &str) -> String {
    if value.contains("://") {
        return value.to_string();
    }
    form_urlencoded::parse(value.as_bytes())
        .next()
        .map(|(decoded, _)| decoded.into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
