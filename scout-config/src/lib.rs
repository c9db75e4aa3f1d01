//! Loader for Scout configuration with YAML + environment overlays.
//!
//! Every section has defaults, so running with no file and no environment
//! reproduces the stock behaviour: LinkedIn company pages, a local
//! chromedriver on port 9515, headless Chrome and the usual wait windows.
//!
//! Precedence (lowest first): built-in defaults, config file(s), inline YAML,
//! `SCOUT__SECTION__KEY` environment variables. `${VAR}` placeholders inside
//! string values are expanded after merging.
use config::{Config, ConfigError, Environment, File};
use scout_common::observability::{LogConfig, LogFormat};
use scout_common::StealthLevel;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use url::Url;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const SLUG_PLACEHOLDER: &str = "{slug}";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub version: Option<String>,
    pub target: TargetConfig,
    pub browser: BrowserConfig,
    pub timings: TimingConfig,
    pub logging: LoggingConfig,
}

/// Where company profiles live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Address pattern; `{slug}` is replaced by the company identifier.
    pub url_template: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url_template: "https://www.linkedin.com/company/{slug}/".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("company slug is empty")]
    EmptySlug,
    #[error("company slug {0:?} contains characters that cannot appear in a path segment")]
    InvalidSlug(String),
    #[error("url template {0:?} has no {{slug}} placeholder")]
    MissingPlaceholder(String),
    #[error("templated target {url:?} is not a valid URL: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl TargetConfig {
    /// Build the profile address for `slug`.
    ///
    /// ```
    /// use scout_config::TargetConfig;
    ///
    /// let url = TargetConfig::default().target_url("acme-corp").unwrap();
    /// assert_eq!(url.as_str(), "https://www.linkedin.com/company/acme-corp/");
    /// ```
    pub fn target_url(&self, slug: &str) -> Result<Url, TargetError> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Err(TargetError::EmptySlug);
        }
        if slug
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#'))
        {
            return Err(TargetError::InvalidSlug(slug.to_string()));
        }
        if !self.url_template.contains(SLUG_PLACEHOLDER) {
            return Err(TargetError::MissingPlaceholder(self.url_template.clone()));
        }

        let raw = self.url_template.replace(SLUG_PLACEHOLDER, slug);
        Url::parse(&raw).map_err(|source| TargetError::InvalidUrl { url: raw, source })
    }
}

/// WebDriver connection and browser identity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Running WebDriver service (chromedriver by default).
    pub webdriver_url: String,
    pub headless: bool,
    /// Explicit Chrome binary; chromedriver's own discovery is used when unset.
    pub chrome_binary: Option<PathBuf>,
    pub stealth_level: StealthLevel,
    /// Route the session through one of `proxies`, picked at random.
    pub use_proxy: bool,
    pub proxies: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            chrome_binary: None,
            stealth_level: StealthLevel::default(),
            use_proxy: false,
            proxies: Vec::new(),
        }
    }
}

/// Inclusive millisecond range a randomized delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange(pub u64, pub u64);

impl DelayRange {
    /// Bounds in ascending order, whatever order they were configured in.
    pub fn bounds(self) -> (u64, u64) {
        (self.0.min(self.1), self.0.max(self.1))
    }
}

/// Fixed per-step wait windows. There is no overall timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Pause after the session starts and before navigating.
    pub pre_navigation_ms: DelayRange,
    /// Bounded wait for the website marker element.
    pub marker_wait_secs: u64,
    /// Pause before serializing the full page after the fragment tier missed.
    pub settle_ms: DelayRange,
    /// Pause before serializing the full page when the fragment tier is skipped.
    pub full_page_settle_ms: DelayRange,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            pre_navigation_ms: DelayRange(2000, 4000),
            marker_wait_secs: 8,
            settle_ms: DelayRange(3000, 5000),
            full_page_settle_ms: DelayRange(5000, 7000),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            emit_stderr: false,
            filter: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn to_log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.dir.clone(),
            emit_stderr: self.emit_stderr,
            format: self.format,
            default_filter: self.filter.clone(),
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Per-user config file: `<config_dir>/sitescout/sitescout.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sitescout").join("sitescout.yaml"))
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct ScoutConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    use_env: bool,
}

impl Default for ScoutConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoutConfigLoader {
    /// Start from built-in defaults; `SCOUT__` env overrides are applied last.
    ///
    /// ```
    /// use scout_config::ScoutConfigLoader;
    ///
    /// let config = ScoutConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert!(config.browser.headless);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            use_env: true,
        }
    }

    /// Skip the `SCOUT__` environment overlay.
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// Attach a required YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when it does not exist.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use scout_common::StealthLevel;
    /// use scout_config::ScoutConfigLoader;
    ///
    /// let cfg = ScoutConfigLoader::new()
    ///     .without_env()
    ///     .with_yaml_str(
    ///         r#"
    /// browser:
    ///   stealth_level: maximum
    ///   proxies: ["http://10.0.0.1:3128"]
    /// timings:
    ///   marker_wait_secs: 3
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.browser.stealth_level, StealthLevel::Maximum);
    /// assert_eq!(cfg.browser.proxies.len(), 1);
    /// assert_eq!(cfg.timings.marker_wait_secs, 3);
    /// assert_eq!(cfg.browser.webdriver_url, "http://localhost:9515");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use scout_config::ScoutConfigLoader;
    ///
    /// unsafe { std::env::set_var("SCOUT_DOC_WEBDRIVER", "http://grid:4444"); }
    ///
    /// let config = ScoutConfigLoader::new()
    ///     .without_env()
    ///     .with_yaml_str(r#"
    /// browser:
    ///   webdriver_url: "${SCOUT_DOC_WEBDRIVER}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.browser.webdriver_url, "http://grid:4444");
    ///
    /// unsafe { std::env::remove_var("SCOUT_DOC_WEBDRIVER"); }
    /// ```
    pub fn load(self) -> Result<ScoutConfig, ConfigError> {
        let mut builder = self.builder;
        if self.use_env {
            builder = builder.add_source(
                Environment::with_prefix("SCOUT")
                    .separator("__")
                    .try_parsing(true),
            );
        }
        let cfg = builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
