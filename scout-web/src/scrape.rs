//! One best-effort scrape of one target.
//!
//! The fragment tier reads the website marker straight from the live DOM,
//! which is far cheaper than serializing the whole page. Only when the marker
//! (or its anchor) is missing does the full-page tier run. Each tier is tried
//! at most once; there are no retries.

use scout_extract::{CanonicalDomain, WebsiteAnchor, extract_from_html};
use tracing::{Instrument, debug, info, info_span, warn};
use url::Url;
use uuid::Uuid;

use crate::fetcher::{PageFetcher, SessionLauncher};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrapeMode {
    /// Try the live marker first, fall back to the full page.
    #[default]
    FragmentFirst,
    /// Go straight to the full page.
    FullPage,
}

/// Lifecycle of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeState {
    Idle,
    Fetching,
    FragmentReady,
    FullPageReady,
    FetchFailed,
    Extracting,
    Found,
    NotFound,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Found(CanonicalDomain),
    /// Markup was fetched but no strategy produced a domain.
    NotFound,
    /// Neither tier could fetch anything; carries the last error.
    FetchFailed(String),
}

impl ScrapeOutcome {
    pub fn domain(&self) -> Option<&CanonicalDomain> {
        match self {
            ScrapeOutcome::Found(domain) => Some(domain),
            _ => None,
        }
    }

    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            ScrapeOutcome::Found(_) => 0,
            ScrapeOutcome::NotFound | ScrapeOutcome::FetchFailed(_) => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub attempt_id: Uuid,
    pub outcome: ScrapeOutcome,
    /// Every state the attempt passed through, starting at `Idle`.
    pub states: Vec<ScrapeState>,
}

struct Attempt {
    id: Uuid,
    states: Vec<ScrapeState>,
}

impl Attempt {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            states: vec![ScrapeState::Idle],
        }
    }

    fn advance(&mut self, next: ScrapeState) {
        debug!(target: "scout.scrape", attempt = %self.id, state = ?next, "state change");
        self.states.push(next);
    }

    fn found(mut self, domain: CanonicalDomain) -> ScrapeReport {
        self.advance(ScrapeState::Found);
        self.finish(ScrapeOutcome::Found(domain))
    }

    fn not_found(mut self) -> ScrapeReport {
        self.advance(ScrapeState::NotFound);
        self.finish(ScrapeOutcome::NotFound)
    }

    fn fetch_failed(mut self, error: &anyhow::Error) -> ScrapeReport {
        self.advance(ScrapeState::FetchFailed);
        self.finish(ScrapeOutcome::FetchFailed(format!("{error:#}")))
    }

    fn finish(mut self, outcome: ScrapeOutcome) -> ScrapeReport {
        self.advance(ScrapeState::Done);
        ScrapeReport {
            attempt_id: self.id,
            outcome,
            states: self.states,
        }
    }
}

/// Resolve the website domain for `target` using an already launched fetcher.
///
/// The fetcher is left open; closing it is the caller's job.
pub async fn resolve<F: PageFetcher>(fetcher: &mut F, target: &Url, mode: ScrapeMode) -> ScrapeReport {
    run_attempt(Attempt::new(Uuid::new_v4()), fetcher, target, mode).await
}

async fn run_attempt<F: PageFetcher>(
    mut attempt: Attempt,
    fetcher: &mut F,
    target: &Url,
    mode: ScrapeMode,
) -> ScrapeReport {
    attempt.advance(ScrapeState::Fetching);

    if mode == ScrapeMode::FragmentFirst {
        match fetcher.fetch_fragment(target).await {
            Ok(Some(fragment)) => {
                attempt.advance(ScrapeState::FragmentReady);
                attempt.advance(ScrapeState::Extracting);

                let from_anchor = fragment.anchor.as_ref().and_then(WebsiteAnchor::domain);
                let domain =
                    from_anchor.or_else(|| fragment.html.as_deref().and_then(extract_from_html));
                if let Some(domain) = domain {
                    return attempt.found(domain);
                }
                if fragment.anchor.is_some() {
                    return attempt.not_found();
                }
                info!(target: "scout.scrape", "website marker has no link; loading full page");
                attempt.advance(ScrapeState::Fetching);
            }
            Ok(None) => {
                info!(target: "scout.scrape", "website marker did not appear; loading full page");
            }
            Err(error) => {
                warn!(
                    target: "scout.scrape",
                    error = %format!("{error:#}"),
                    "quick extraction failed; loading full page"
                );
            }
        }
    }

    match fetcher.fetch_full_page(target).await {
        Ok(html) => {
            attempt.advance(ScrapeState::FullPageReady);
            attempt.advance(ScrapeState::Extracting);
            debug!(target: "scout.scrape", bytes = html.len(), "full page serialized");
            match extract_from_html(&html) {
                Some(domain) => attempt.found(domain),
                None => attempt.not_found(),
            }
        }
        Err(error) => {
            warn!(target: "scout.scrape", error = %format!("{error:#}"), "page could not be fetched");
            attempt.fetch_failed(&error)
        }
    }
}

/// Launch a fresh session, resolve `target`, and always close the session.
pub async fn scrape_target<L: SessionLauncher>(
    launcher: &L,
    target: &Url,
    mode: ScrapeMode,
) -> ScrapeReport {
    let id = Uuid::new_v4();
    let span = info_span!("scrape", attempt = %id, url = %target);

    async move {
        let mut attempt = Attempt::new(id);
        let mut fetcher = match launcher.launch().await {
            Ok(fetcher) => fetcher,
            Err(error) => {
                warn!(target: "scout.scrape", error = %format!("{error:#}"), "browser session could not start");
                attempt.advance(ScrapeState::Fetching);
                return attempt.fetch_failed(&error);
            }
        };

        let report = run_attempt(attempt, &mut fetcher, target, mode).await;

        if let Err(error) = fetcher.close().await {
            warn!(target: "scout.scrape", error = %format!("{error:#}"), "browser session did not close cleanly");
        }

        match &report.outcome {
            ScrapeOutcome::Found(domain) => info!(target: "scout.scrape", %domain, "website found"),
            ScrapeOutcome::NotFound => info!(target: "scout.scrape", "no website listed"),
            ScrapeOutcome::FetchFailed(reason) => warn!(target: "scout.scrape", %reason, "fetch failed"),
        }
        report
    }
    .instrument(span)
    .await
}
