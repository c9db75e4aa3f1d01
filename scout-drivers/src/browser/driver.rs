use crate::browser::{
    behavioral::BehavioralEngine,
    fingerprint::{IdentityGenerator, IdentityProfile},
    page::ScoutPage,
    proxy::ProxyPool,
    stealth::build_stealth_arguments,
};
use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder};
use scout_common::StealthLevel;
use scout_config::BrowserConfig;
use serde_json::json;
use tracing::info;
use webdriver::capabilities::Capabilities;

/// Thin wrapper around a `fantoccini` WebDriver client with stealth and
/// behavioral helpers. One driver serves exactly one target.
pub struct ScoutDriver {
    pub client: Client,
    pub behavioral_engine: BehavioralEngine,
    pub identity: IdentityProfile,
    pub stealth_level: StealthLevel,
}

/// `goog:chromeOptions` capabilities for a session.
pub fn chrome_capabilities(
    config: &BrowserConfig,
    identity: &IdentityProfile,
    proxy: Option<&str>,
) -> Capabilities {
    let args = build_stealth_arguments(config.stealth_level, identity, config.headless, proxy);
    let mut chrome_opts = serde_json::Map::new();
    chrome_opts.insert("args".to_string(), json!(args));
    chrome_opts.insert(
        "excludeSwitches".to_string(),
        json!(["enable-automation"]),
    );
    if let Some(binary) = &config.chrome_binary {
        chrome_opts.insert("binary".to_string(), json!(binary.to_string_lossy()));
    }

    let mut caps = Capabilities::new();
    caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));
    caps
}

impl ScoutDriver {
    /// Start a session with a freshly generated identity and, if enabled, a
    /// randomly chosen proxy.
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let (identity, proxy) = {
            let mut rng = rand::thread_rng();
            let identity = IdentityGenerator::new().generate(&mut rng);
            let proxy = ProxyPool::from_config(config)
                .pick(&mut rng)
                .map(str::to_string);
            (identity, proxy)
        };
        Self::new(config, identity, proxy.as_deref()).await
    }

    /// Connect to the WebDriver service named in `config`.
    pub async fn new(
        config: &BrowserConfig,
        identity: IdentityProfile,
        proxy: Option<&str>,
    ) -> Result<Self> {
        let caps = chrome_capabilities(config, &identity, proxy);

        info!(
            target: "scout.browser",
            webdriver = %config.webdriver_url,
            user_agent = %identity.user_agent,
            viewport = ?identity.viewport,
            proxy = proxy.unwrap_or("none"),
            "starting browser session"
        );

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&config.webdriver_url)
            .await
            .with_context(|| format!("could not start a session at {}", config.webdriver_url))?;

        Ok(Self {
            client,
            behavioral_engine: BehavioralEngine::new(),
            identity,
            stealth_level: config.stealth_level,
        })
    }

    /// Navigate to `url` and return a [`ScoutPage`] with stealth scripts applied.
    pub async fn goto(&mut self, url: &str) -> Result<ScoutPage> {
        let mut page = ScoutPage::new(
            self.client.clone(),
            self.stealth_level,
            self.identity.clone(),
            self.behavioral_engine.clone(),
        );
        page.goto(url).await?;
        Ok(page)
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client
            .close()
            .await
            .context("browser session did not close cleanly")?;
        Ok(())
    }
}
