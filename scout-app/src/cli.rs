use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use scout_common::{Result, ScoutError};
use scout_common::observability::init_logging;
use scout_config::{ScoutConfig, ScoutConfigLoader, default_config_path};
use scout_web::{BrowserLauncher, ScrapeMode, ScrapeOutcome, SessionLauncher, scrape_target};
use url::Url;

const APP_NAME: &str = "sitescout";

#[derive(Debug, Parser)]
#[command(
    name = "sitescout",
    version,
    about = "Print the website domain listed on a company profile page"
)]
pub struct Cli {
    /// Company identifier as it appears in the profile address.
    pub slug: String,

    /// Configuration file (YAML, TOML or JSON).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip the quick marker lookup and always serialize the whole page.
    #[arg(long)]
    pub full_page: bool,

    /// Show the browser window.
    #[arg(long)]
    pub headed: bool,

    /// WebDriver endpoint, e.g. a running chromedriver.
    #[arg(long, value_name = "URL")]
    pub webdriver_url: Option<String>,

    /// Proxy to pick from; may be repeated. Enables proxying.
    #[arg(long = "proxy", value_name = "ADDR")]
    pub proxies: Vec<String>,

    /// Mirror log events to stderr.
    #[arg(long)]
    pub log_stderr: bool,
}

impl Cli {
    pub fn mode(&self) -> ScrapeMode {
        if self.full_page {
            ScrapeMode::FullPage
        } else {
            ScrapeMode::FragmentFirst
        }
    }

    /// Flags win over file and environment.
    pub fn apply_overrides(&self, cfg: &mut ScoutConfig) {
        if self.headed {
            cfg.browser.headless = false;
        }
        if let Some(url) = &self.webdriver_url {
            cfg.browser.webdriver_url = url.clone();
        }
        if !self.proxies.is_empty() {
            cfg.browser.use_proxy = true;
            cfg.browser.proxies = self.proxies.clone();
        }
        if self.log_stderr {
            cfg.logging.emit_stderr = true;
        }
    }
}

fn load_config(cli: &Cli) -> Result<ScoutConfig> {
    let loader = ScoutConfigLoader::new();
    let loader = match (&cli.config, default_config_path()) {
        (Some(path), _) => loader.with_file(path),
        (None, Some(path)) => loader.with_optional_file(path),
        (None, None) => loader,
    };
    let mut cfg = loader
        .load()
        .map_err(|e| ScoutError::Config(e.to_string()))?;
    cli.apply_overrides(&mut cfg);
    Ok(cfg)
}

/// Parse-to-exit-status entry point used by `main`.
pub async fn run(cli: Cli) -> u8 {
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();

    let cfg = match load_config(&cli) {
        Ok(cfg) => cfg,
        Err(err) => {
            let _ = writeln!(stderr, "{APP_NAME}: {err}");
            return 1;
        }
    };

    if let Err(err) = init_logging(cfg.logging.to_log_config(APP_NAME)) {
        let _ = writeln!(stderr, "{APP_NAME}: logging disabled: {err:#}");
    }

    let target = match cfg.target.target_url(&cli.slug) {
        Ok(url) => url,
        Err(err) => {
            let err = ScoutError::Usage(err.to_string());
            tracing::warn!(error = %err, "rejected company slug");
            let _ = writeln!(stderr, "{APP_NAME}: {err}");
            return 1;
        }
    };

    let launcher = BrowserLauncher::new(cfg.browser, cfg.timings);
    scrape_and_report(&launcher, &target, cli.mode(), &cli.slug, &mut stdout, &mut stderr).await
}

/// Scrape `target` and print the result: domain on `out`, diagnostics on `err`.
pub async fn scrape_and_report<L, O, E>(
    launcher: &L,
    target: &Url,
    mode: ScrapeMode,
    slug: &str,
    out: &mut O,
    err: &mut E,
) -> u8
where
    L: SessionLauncher,
    O: Write,
    E: Write,
{
    let report = scrape_target(launcher, target, mode).await;
    let written = match &report.outcome {
        ScrapeOutcome::Found(domain) => writeln!(out, "{domain}"),
        ScrapeOutcome::NotFound => writeln!(err, "{APP_NAME}: no website listed for {slug}"),
        ScrapeOutcome::FetchFailed(reason) => {
            writeln!(err, "{APP_NAME}: could not load {target}: {reason}")
        }
    };
    if written.is_err() {
        return 1;
    }
    report.outcome.exit_code() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use scout_config::{BrowserConfig, DelayRange, TimingConfig};
    use scout_web::{Fragment, PageFetcher};

    struct StaticFetcher {
        html: Option<String>,
    }

    #[async_trait::async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch_fragment(&mut self, _target: &Url) -> anyhow::Result<Option<Fragment>> {
            Ok(None)
        }

        async fn fetch_full_page(&mut self, target: &Url) -> anyhow::Result<String> {
            self.html
                .clone()
                .ok_or_else(|| anyhow!("net::ERR_CONNECTION_REFUSED at {target}"))
        }

        async fn close(self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct StaticLauncher(Option<&'static str>);

    #[async_trait::async_trait]
    impl SessionLauncher for StaticLauncher {
        type Fetcher = StaticFetcher;

        async fn launch(&self) -> anyhow::Result<StaticFetcher> {
            Ok(StaticFetcher {
                html: self.0.map(str::to_string),
            })
        }
    }

    fn target() -> Url {
        Url::parse("https://www.linkedin.com/company/acme/").unwrap()
    }

    async fn run_with<L: SessionLauncher>(launcher: &L) -> (u8, String, String) {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = scrape_and_report(
            launcher,
            &target(),
            ScrapeMode::FragmentFirst,
            "acme",
            &mut out,
            &mut err,
        )
        .await;
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn exactly_one_slug_is_accepted() {
        assert!(Cli::try_parse_from(["sitescout"]).is_err());
        assert!(Cli::try_parse_from(["sitescout", "a", "b"]).is_err());
        let cli = Cli::try_parse_from(["sitescout", "acme"]).unwrap();
        assert_eq!(cli.slug, "acme");
        assert_eq!(cli.mode(), ScrapeMode::FragmentFirst);
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "sitescout",
            "acme",
            "--full-page",
            "--headed",
            "--webdriver-url",
            "http://grid:4444",
            "--proxy",
            "http://10.0.0.1:3128",
            "--proxy",
            "http://10.0.0.2:3128",
        ])
        .unwrap();
        let mut cfg = ScoutConfig::default();
        cli.apply_overrides(&mut cfg);

        assert_eq!(cli.mode(), ScrapeMode::FullPage);
        assert!(!cfg.browser.headless);
        assert_eq!(cfg.browser.webdriver_url, "http://grid:4444");
        assert!(cfg.browser.use_proxy);
        assert_eq!(cfg.browser.proxies.len(), 2);
    }

    #[test]
    fn missing_explicit_config_is_a_config_error() {
        let cli = Cli::try_parse_from([
            "sitescout",
            "acme",
            "--config",
            "/nonexistent/sitescout/sitescout.yaml",
        ])
        .unwrap();
        let err = load_config(&cli).unwrap_err();
        assert!(matches!(err, ScoutError::Config(_)), "{err}");
        assert!(err.to_string().starts_with("Configuration error:"));
    }

    #[tokio::test]
    async fn found_domain_goes_to_stdout_only() {
        let launcher = StaticLauncher(Some(r#"<script>{"sameAs":"https://www.acme.com"}</script>"#));
        let (code, out, err) = run_with(&launcher).await;
        assert_eq!(code, 0);
        assert_eq!(out, "acme.com\n");
        assert!(err.is_empty());
    }

    #[tokio::test]
    async fn missing_website_exits_non_zero() {
        let launcher = StaticLauncher(Some("<html><body>Sign in to see more</body></html>"));
        let (code, out, err) = run_with(&launcher).await;
        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert!(err.contains("no website listed for acme"));
    }

    #[tokio::test]
    async fn unfetchable_target_exits_non_zero_with_diagnostic() {
        let (code, out, err) = run_with(&StaticLauncher(None)).await;
        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert!(err.contains("could not load https://www.linkedin.com/company/acme/"));
        assert!(err.contains("ERR_CONNECTION_REFUSED"));
    }

    #[tokio::test]
    async fn unreachable_webdriver_exits_non_zero() {
        let launcher = BrowserLauncher::new(
            BrowserConfig {
                webdriver_url: "http://127.0.0.1:1".to_string(),
                ..BrowserConfig::default()
            },
            TimingConfig {
                pre_navigation_ms: DelayRange(0, 0),
                marker_wait_secs: 0,
                settle_ms: DelayRange(0, 0),
                full_page_settle_ms: DelayRange(0, 0),
            },
        );
        let (code, out, err) = run_with(&launcher).await;
        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert!(err.starts_with("sitescout: could not load"));
    }
}
