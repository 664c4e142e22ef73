//! Target resolution.

use url::Url;

use crate::error::SessionError;

/// Upstream transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Plain,
    Tls,
}

impl Transport {
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Plain => 80,
            Self::Tls => 443,
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Plain => "http",
            Self::Tls => "https",
        }
    }
}

/// Where a forwarded request goes. Derived per request, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub hostname: String,
    pub port: u16,
    pub transport: Transport,
    /// Path of the bound URL, used for the forwarded `Referer`.
    pub path: String,
}

impl TargetDescriptor {
    /// `scheme://host`, the base every forwarded path is joined onto.
    pub fn origin(&self) -> String {
        if self.port == self.transport.default_port() {
            format!("{}://{}", self.transport.scheme(), self.hostname)
        } else {
            format!("{}://{}:{}", self.transport.scheme(), self.hostname, self.port)
        }
    }

    /// Absolute upstream URL for a request line such as `/a/b?c=d`.
    ///
    /// The request line is appended, never resolved, so `//other.host/`
    /// stays a path on this target.
    pub fn upstream_url(&self, path_and_query: &str) -> Result<Url, SessionError> {
        let separator = if path_and_query.starts_with('/') { "" } else { "/" };
        Ok(Url::parse(&format!("{}{}{}", self.origin(), separator, path_and_query))?)
    }
}

/// Derive the upstream target of an already validated URL.
pub fn resolve_target(url: &Url) -> Result<TargetDescriptor, SessionError> {
    let transport = match url.scheme() {
        "https" => Transport::Tls,
        "http" => Transport::Plain,
        other => return Err(SessionError::UnsupportedScheme(other.to_string())),
    };

    let hostname = url
        .host_str()
        .ok_or_else(|| SessionError::MissingHost(url.to_string()))?
        .to_string();

    Ok(TargetDescriptor {
        hostname,
        port: url.port().unwrap_or(transport.default_port()),
        transport,
        path: url.path().to_string(),
    })
}
