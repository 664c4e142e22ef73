//! Application state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use pagelayer_config::Config;
use pagelayer_core::{SessionBinder, SsrfGuard};
use pagelayer_protocols::PageNavigator;
use pagelayer_proxy::{Forwarder, InjectedAssets, LinkPreviewer, UpstreamResolver};

use crate::error::ApiError;

/// Application state shared across handlers.
pub struct AppState {
    pub config: Config,
    pub guard: SsrfGuard,
    pub binder: SessionBinder,
    pub forwarder: Forwarder,
    pub previewer: LinkPreviewer,
    pub navigator: Arc<dyn PageNavigator>,
    start_time: Instant,
    request_count: AtomicU64,
}

impl AppState {
    pub fn new(config: Config, navigator: Arc<dyn PageNavigator>) -> Result<Self, ApiError> {
        let guard = SsrfGuard::new(config.proxy.allow_http);
        let assets = InjectedAssets::load().map_err(|e| ApiError::Startup(e.to_string()))?;
        let forwarder = Forwarder::new(&config.proxy, &config.server.public_root, assets)
            .map_err(|e| ApiError::Startup(e.to_string()))?;
        let previewer =
            LinkPreviewer::new(&config.proxy).map_err(|e| ApiError::Startup(e.to_string()))?;

        Ok(Self {
            binder: SessionBinder::new(config.cookie.clone(), guard),
            guard,
            forwarder,
            previewer,
            navigator,
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        })
    }

    /// Route every upstream fetch through `resolver`.
    pub fn with_resolver(mut self, resolver: Arc<dyn UpstreamResolver>) -> Self {
        self.forwarder = self.forwarder.with_resolver(resolver.clone());
        self.previewer = self.previewer.with_resolver(resolver);
        self
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    pub fn increment_requests(&self) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }
}
