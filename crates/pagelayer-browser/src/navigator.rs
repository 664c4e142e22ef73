//! [`PageNavigator`] over the DevTools protocol.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use pagelayer_config::{BrowserConfig, ProxyConfig};
use pagelayer_core::Debounce;
use pagelayer_protocols::{
    LayoutCapture, LayoutNode, NavigatedPage, NavigatorError, PageDimensions, PageNavigator,
    Snapshot, SnapshotFormat,
};

use crate::cdp::{CdpClient, CdpError, DeviceMetrics, PageSession, PrintOptions};

const PAGE_DIMENSIONS: &str = include_str!("../scripts/page_dimensions.js");
const MUTATION_WATCH: &str = include_str!("../scripts/mutation_watch.js");
const LAYOUT_SNAPSHOT: &str = include_str!("../scripts/layout_snapshot.js");

const QUIET_POLL: Duration = Duration::from_millis(100);

/// Drives a remote Chrome, one fresh tab per operation.
pub struct CdpNavigator {
    config: BrowserConfig,
    viewport: DeviceMetrics,
    client: Mutex<Option<Arc<CdpClient>>>,
}

impl CdpNavigator {
    pub fn new(config: BrowserConfig, proxy: &ProxyConfig) -> Self {
        Self {
            viewport: DeviceMetrics::desktop(proxy.viewport_width, proxy.viewport_height),
            config,
            client: Mutex::new(None),
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.navigation_timeout_secs)
    }

    /// Shared connection, re-established after the browser went away.
    async fn client(&self) -> Result<Arc<CdpClient>, CdpError> {
        let mut slot = self.client.lock().await;
        if let Some(client) = slot.as_ref().filter(|c| c.is_connected()) {
            return Ok(client.clone());
        }

        let client = Arc::new(CdpClient::connect(&self.config.endpoint, self.timeout()).await?);
        info!("Connected to browser at {}", client.endpoint());
        *slot = Some(client.clone());
        Ok(client)
    }

    /// New tab at the configured viewport, navigated to `url`.
    async fn open(&self, url: &str) -> Result<(Arc<CdpClient>, PageSession), CdpError> {
        let client = self.client().await?;
        let page = client.new_page().await?;

        let loaded = async {
            page.set_viewport(self.viewport).await?;
            page.navigate(url, self.timeout()).await
        }
        .await;

        match loaded {
            Ok(()) => Ok((client, page)),
            Err(e) => {
                close(&client, &page).await;
                Err(e)
            }
        }
    }

    async fn measure(&self, page: &PageSession) -> Result<PageDimensions, CdpError> {
        page.evaluate_as(PAGE_DIMENSIONS).await
    }

    /// Block until the page has gone `quiet_ms` without a DOM mutation or
    /// finished transition. Gives up quietly at the navigation timeout.
    async fn wait_for_quiet(&self, page: &PageSession) -> Result<(), CdpError> {
        let quiet = Duration::from_millis(self.config.quiet_ms);
        let deadline = Instant::now() + self.timeout();
        let mut debounce = Debounce::trailing(quiet);

        let mut seen: u64 = page.evaluate_as(MUTATION_WATCH).await?;
        debounce.trigger(Instant::now());

        loop {
            tokio::time::sleep(QUIET_POLL.min(quiet)).await;
            let now = Instant::now();

            let count: u64 = page.evaluate_as(MUTATION_WATCH).await?;
            if count != seen {
                seen = count;
                debounce.trigger(now);
            }
            if debounce.poll(now) {
                return Ok(());
            }
            if now >= deadline {
                debug!("Layout still changing after {:?}, capturing anyway", self.timeout());
                debounce.cancel();
                return Ok(());
            }
        }
    }

    fn fail(&self, e: CdpError) -> NavigatorError {
        match e {
            CdpError::Timeout(_) => NavigatorError::Timeout(self.config.navigation_timeout_secs),
            other => other.into(),
        }
    }
}

async fn close(client: &CdpClient, page: &PageSession) {
    if let Err(e) = client.close_page(page).await {
        warn!("Failed to close tab {}: {}", page.target_id(), e);
    }
}

/// Area actually captured: the measured page, never smaller than the viewport.
fn capture_area(measured: PageDimensions, viewport: DeviceMetrics) -> PageDimensions {
    let width = if measured.width > 0.0 { measured.width } else { f64::from(viewport.width) };
    PageDimensions::new(width, measured.height.max(f64::from(viewport.height)))
}

#[async_trait]
impl PageNavigator for CdpNavigator {
    async fn navigate(&self, url: &str) -> Result<NavigatedPage, NavigatorError> {
        let (client, page) = self.open(url).await.map_err(|e| self.fail(e))?;

        let result: Result<NavigatedPage, CdpError> = async {
            Ok(NavigatedPage {
                final_url: page.current_url().await?,
                dimensions: self.measure(&page).await?,
            })
        }
        .await;

        close(&client, &page).await;
        result.map_err(|e| self.fail(e))
    }

    async fn snapshot(&self, url: &str, format: SnapshotFormat) -> Result<Snapshot, NavigatorError> {
        let (client, page) = self.open(url).await.map_err(|e| self.fail(e))?;

        let result: Result<Snapshot, CdpError> = async {
            tokio::time::sleep(Duration::from_millis(self.config.settle_ms)).await;
            let dimensions = self.measure(&page).await?;
            let area = capture_area(dimensions, self.viewport);

            let bytes = match format {
                SnapshotFormat::Png => page.capture_png(area.width, area.height).await?,
                SnapshotFormat::Pdf => {
                    page.print_pdf(&PrintOptions::single_page(area.width, area.height))
                        .await?
                }
            };
            Ok(Snapshot {
                bytes,
                format,
                dimensions,
            })
        }
        .await;

        close(&client, &page).await;
        match result {
            Ok(snapshot) if snapshot.bytes.is_empty() => {
                Err(NavigatorError::SnapshotFailed("browser returned no data".to_string()))
            }
            other => other.map_err(|e| self.fail(e)),
        }
    }

    async fn capture_layout(&self, url: &str) -> Result<LayoutCapture, NavigatorError> {
        let (client, page) = self.open(url).await.map_err(|e| self.fail(e))?;

        let result: Result<LayoutCapture, CdpError> = async {
            self.wait_for_quiet(&page).await?;
            let tree = page.evaluate(LAYOUT_SNAPSHOT).await?;
            if tree.is_null() {
                return Err(CdpError::InvalidResponse("page has no body".to_string()));
            }
            let root: LayoutNode = serde_json::from_value(tree)?;
            let dimensions = self.measure(&page).await?;
            Ok(LayoutCapture {
                root,
                iframe_height: dimensions.height,
            })
        }
        .await;

        close(&client, &page).await;
        result.map_err(|e| self.fail(e))
    }
}
