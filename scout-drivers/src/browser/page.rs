use crate::browser::{
    behavioral::BehavioralEngine, fingerprint::IdentityProfile, stealth::StealthScripts,
};
use anyhow::{Context, Result};
use fantoccini::{elements::Element, Client, Locator};
use scout_common::StealthLevel;
use std::time::Duration;
use tracing::debug;

/// Page wrapper providing navigation, bounded waits and DOM reads.
pub struct ScoutPage {
    pub(crate) client: Client,
    pub(crate) stealth_level: StealthLevel,
    pub(crate) identity: IdentityProfile,
    pub(crate) behavioral_engine: BehavioralEngine,
}

impl ScoutPage {
    /// Construct a page wrapper around an existing WebDriver client.
    pub fn new(
        client: Client,
        stealth_level: StealthLevel,
        identity: IdentityProfile,
        behavioral_engine: BehavioralEngine,
    ) -> Self {
        Self {
            client,
            stealth_level,
            identity,
            behavioral_engine,
        }
    }

    /// Navigate to `url` and apply the stealth scripts for this session.
    pub async fn goto(&mut self, url: &str) -> Result<()> {
        self.client
            .goto(url)
            .await
            .with_context(|| format!("navigation to {url} failed"))?;

        self.apply_stealth().await
    }

    async fn apply_stealth(&mut self) -> Result<()> {
        for script in StealthScripts::for_level(self.stealth_level, &self.identity) {
            self.client
                .execute(&script, vec![])
                .await
                .context("stealth script failed")?;
        }
        Ok(())
    }

    /// Return the full serialized page HTML.
    pub async fn get_content(&self) -> Result<String> {
        self.client.source().await.context("page source unavailable")
    }

    /// Wait at most `timeout` for an element matching `selector`.
    pub async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<ScoutElement> {
        debug!(target: "scout.browser", %selector, ?timeout, "waiting for element");
        let element = self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
            .with_context(|| format!("no element matched {selector} within {timeout:?}"))?;
        Ok(ScoutElement::new(element))
    }

    /// Find a single element by CSS selector without waiting.
    pub async fn find_element(&self, selector: &str) -> Result<ScoutElement> {
        self.behavioral_engine.random_delay(100, 500).await;

        let element = self
            .client
            .find(Locator::Css(selector))
            .await
            .with_context(|| format!("no element matched {selector}"))?;
        Ok(ScoutElement::new(element))
    }
}

#[derive(Clone)]
/// DOM element wrapper with typed helpers consistent with [`ScoutPage`].
pub struct ScoutElement {
    pub element: Element,
}

impl ScoutElement {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    /// Find a child element by CSS selector.
    pub async fn find_element(&self, selector: &str) -> Result<ScoutElement> {
        let element = self
            .element
            .find(Locator::Css(selector))
            .await
            .with_context(|| format!("no child matched {selector}"))?;
        Ok(ScoutElement::new(element))
    }

    /// Read an attribute value.
    pub async fn get_attribute(&self, attribute: &str) -> Result<Option<String>> {
        self.element
            .attr(attribute)
            .await
            .map_err(anyhow::Error::from)
    }

    /// Return the element's visible text.
    pub async fn get_inner_text(&self) -> Result<String> {
        self.element.text().await.map_err(anyhow::Error::from)
    }

    /// Return the element's outer HTML.
    pub async fn get_outer_html(&self) -> Result<String> {
        self.element.html(false).await.map_err(anyhow::Error::from)
    }
}
