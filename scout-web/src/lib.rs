//! Page acquisition and the scrape pipeline.
//!
//! - [`fetcher`]: the [`PageFetcher`] seam and its WebDriver-backed implementation
//! - [`scrape`]: fragment-first resolution with a full-page fallback
//!
//! One target is processed per call; a fresh browser session is launched for
//! it and closed before the call returns.

pub mod fetcher;
pub mod scrape;

pub use fetcher::{BrowserFetcher, BrowserLauncher, Fragment, PageFetcher, SessionLauncher};
pub use scrape::{ScrapeMode, ScrapeOutcome, ScrapeReport, ScrapeState, resolve, scrape_target};
