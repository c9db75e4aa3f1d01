use std::time::Duration;

use anyhow::{Result, anyhow};
use scout_config::{BrowserConfig, TimingConfig};
use scout_drivers::browser::driver::ScoutDriver;
use scout_drivers::browser::page::ScoutPage;
use scout_extract::{ABOUT_SECTION_SELECTOR, WEBSITE_MARKER_SELECTOR, WebsiteAnchor};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// What the fragment tier could read around the website marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// The marker's anchor, if it had one.
    pub anchor: Option<WebsiteAnchor>,
    /// Serialized about section surrounding the marker.
    pub html: Option<String>,
}

/// Source of profile markup for a single target.
///
/// Implementations may navigate lazily; calling both fetches for the same
/// target must not load the page twice.
#[async_trait::async_trait]
pub trait PageFetcher: Send {
    /// Wait a bounded time for the website marker and read it.
    ///
    /// `Ok(None)` means the marker never appeared.
    async fn fetch_fragment(&mut self, target: &Url) -> Result<Option<Fragment>>;

    /// Serialize the whole rendered page.
    async fn fetch_full_page(&mut self, target: &Url) -> Result<String>;

    /// Tear down the underlying session.
    async fn close(self) -> Result<()>;
}

/// Creates one fresh [`PageFetcher`] per target.
#[async_trait::async_trait]
pub trait SessionLauncher: Send + Sync {
    type Fetcher: PageFetcher;

    async fn launch(&self) -> Result<Self::Fetcher>;
}

/// [`PageFetcher`] backed by a fantoccini WebDriver session.
pub struct BrowserFetcher {
    driver: ScoutDriver,
    page: Option<ScoutPage>,
    loaded: Option<Url>,
    timings: TimingConfig,
}

impl BrowserFetcher {
    pub fn new(driver: ScoutDriver, timings: TimingConfig) -> Self {
        Self {
            driver,
            page: None,
            loaded: None,
            timings,
        }
    }

    fn is_loaded(&self, target: &Url) -> bool {
        self.page.is_some() && self.loaded.as_ref() == Some(target)
    }

    async fn ensure_loaded(&mut self, target: &Url) -> Result<&ScoutPage> {
        if !self.is_loaded(target) {
            let pause = self
                .driver
                .behavioral_engine
                .delay_in(self.timings.pre_navigation_ms)
                .await;
            debug!(target: "scout.browser", url = %target, ?pause, "navigating");
            let page = self.driver.goto(target.as_str()).await?;
            self.page = Some(page);
            self.loaded = Some(target.clone());
        }
        self.page
            .as_ref()
            .ok_or_else(|| anyhow!("page for {target} was not loaded"))
    }
}

#[async_trait::async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch_fragment(&mut self, target: &Url) -> Result<Option<Fragment>> {
        let wait = Duration::from_secs(self.timings.marker_wait_secs);
        let page = self.ensure_loaded(target).await?;

        let marker = match page.wait_for_element(WEBSITE_MARKER_SELECTOR, wait).await {
            Ok(marker) => marker,
            Err(err) => {
                debug!(target: "scout.browser", error = %err, "website marker not found");
                return Ok(None);
            }
        };

        let anchor = match marker.find_element("a").await {
            Ok(link) => Some(WebsiteAnchor {
                href: link.get_attribute("href").await?,
                text: link.get_inner_text().await?,
            }),
            Err(_) => None,
        };

        let html = match page.find_element(ABOUT_SECTION_SELECTOR).await {
            Ok(section) => section.get_outer_html().await.ok(),
            Err(_) => marker.get_outer_html().await.ok(),
        };

        Ok(Some(Fragment { anchor, html }))
    }

    async fn fetch_full_page(&mut self, target: &Url) -> Result<String> {
        let settle = if self.is_loaded(target) {
            self.timings.settle_ms
        } else {
            self.timings.full_page_settle_ms
        };
        self.ensure_loaded(target).await?;
        self.driver.behavioral_engine.delay_in(settle).await;

        let page = self.ensure_loaded(target).await?;
        page.get_content().await
    }

    async fn close(self) -> Result<()> {
        self.driver.close().await
    }
}

/// Launches a [`BrowserFetcher`] from configuration.
#[derive(Debug, Clone, Default)]
pub struct BrowserLauncher {
    pub browser: BrowserConfig,
    pub timings: TimingConfig,
}

impl BrowserLauncher {
    pub fn new(browser: BrowserConfig, timings: TimingConfig) -> Self {
        Self { browser, timings }
    }
}

#[async_trait::async_trait]
impl SessionLauncher for BrowserLauncher {
    type Fetcher = BrowserFetcher;

    async fn launch(&self) -> Result<BrowserFetcher> {
        let driver = ScoutDriver::launch(&self.browser).await?;
        Ok(BrowserFetcher::new(driver, self.timings.clone()))
    }
}
