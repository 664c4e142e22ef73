//! Upstream address resolution.

use url::Url;

/// Maps a validated target URL to the address actually contacted.
pub trait UpstreamResolver: Send + Sync {
    fn resolve(&self, url: &Url) -> Url;
}

/// Contacts targets at their own address.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectResolver;

impl UpstreamResolver for DirectResolver {
    fn resolve(&self, url: &Url) -> Url {
        url.clone()
    }
}

/// Sends every request to one fixed origin, keeping path and query.
///
/// Used to put a local stand-in behind public hostnames.
#[derive(Debug, Clone)]
pub struct PinnedResolver {
    origin: Url,
}

impl PinnedResolver {
    pub fn new(origin: Url) -> Self {
        Self { origin }
    }
}

impl UpstreamResolver for PinnedResolver {
    fn resolve(&self, url: &Url) -> Url {
        let mut pinned = self.origin.clone();
        pinned.set_path(url.path());
        pinned.set_query(url.query());
        pinned
    }
}
