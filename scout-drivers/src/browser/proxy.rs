use rand::seq::SliceRandom;
use rand::Rng;
use scout_config::BrowserConfig;

#[derive(Debug, Clone, Default)]
/// Candidate proxies for a session. Empty means a direct connection.
pub struct ProxyPool {
    proxies: Vec<String>,
}

impl ProxyPool {
    pub fn new(proxies: Vec<String>) -> Self {
        let proxies = proxies
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        Self { proxies }
    }

    /// Proxies from `config`, or an empty pool when proxying is disabled.
    pub fn from_config(config: &BrowserConfig) -> Self {
        if config.use_proxy {
            Self::new(config.proxies.clone())
        } else {
            Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.proxies.choose(rng).map(String::as_str)
    }
}
