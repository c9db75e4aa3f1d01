//! Locate the website a company profile links to.
//!
//! Extraction runs a short ordered list of independent strategies over the
//! page markup. The first one that yields a normalizable domain wins; a
//! strategy that finds nothing simply hands over to the next.
//!
//! Every pattern is compiled with `(?s)` so markup split over several lines
//! still matches.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use crate::domain::{CanonicalDomain, normalize};

/// CSS selector for the element carrying the profile's "website" field.
pub const WEBSITE_MARKER_SELECTOR: &str = r#"[data-test-id="about-us__website"]"#;

/// CSS selector for the about section serialized by the fragment fetch.
pub const ABOUT_SECTION_SELECTOR: &str = r#".org-about-company-module, [data-test-id*="about"]"#;

/// Domain serving the network's outbound-link tracking endpoint.
pub const REDIRECT_HOST: &str = "linkedin.com";

/// Path of that endpoint.
pub const REDIRECT_PATH: &str = "/redir/redirect";

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)data-test-id="about-us__website".*?href="([^"]*)".*?>\s*([^<\s][^<]*?)\s*<"#)
        .expect("marker pattern compiles")
});

static SAME_AS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""sameAs"\s*:\s*\[?\s*"([^"]+)""#).expect("sameAs pattern compiles")
});

static GENERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?si)website[^>]*>.*?href="[^"]*".*?>\s*(https?://[^<\s]+)"#)
        .expect("generic pattern compiles")
});

/// `href` and visible text of the anchor inside the website marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteAnchor {
    pub href: Option<String>,
    pub text: String,
}

impl WebsiteAnchor {
    pub fn domain(&self) -> Option<CanonicalDomain> {
        domain_from_anchor(self.href.as_deref(), &self.text)
    }
}

/// Decode the real destination out of a tracking redirect `href`.
///
/// Only absolute links to [`REDIRECT_PATH`] on [`REDIRECT_HOST`] (or one of
/// its subdomains) are unwrapped. Returns `None` for anything else, or when
/// the `url` parameter is missing or blank.
pub fn unwrap_redirect(href: &str) -> Option<String> {
    let parsed = Url::parse(href.trim()).ok()?;
    let host = parsed.host_str()?;
    let on_network = host == REDIRECT_HOST
        || host
            .strip_suffix(REDIRECT_HOST)
            .is_some_and(|rest| rest.ends_with('.'));
    if !on_network || !parsed.path().starts_with(REDIRECT_PATH) {
        return None;
    }

    // markup-escaped hrefs arrive with `&amp;` separators
    let (_, target) = parsed
        .query_pairs()
        .find(|(key, _)| key == "url" || key == "amp;url")?;
    let target = target.trim();
    (!target.is_empty()).then(|| target.to_string())
}

/// Resolve an anchor to a domain.
///
/// A redirect wrapper is unwrapped and its destination alone decides, so a
/// destination that does not normalize yields `None`. Any other `href` is
/// ignored in favour of the visible text, which is the address as shown to
/// readers.
pub fn domain_from_anchor(href: Option<&str>, text: &str) -> Option<CanonicalDomain> {
    match href.and_then(unwrap_redirect) {
        Some(target) => normalize(&target),
        None => normalize(text),
    }
}

/// Strategy 1: the website marker attribute and its anchor.
pub fn structured_marker(html: &str) -> Option<CanonicalDomain> {
    let caps = MARKER_RE.captures(html)?;
    domain_from_anchor(Some(&caps[1]), &caps[2])
}

/// Strategy 2: a `sameAs` field in embedded structured data.
pub fn structured_data(html: &str) -> Option<CanonicalDomain> {
    let caps = SAME_AS_RE.captures(html)?;
    normalize(&caps[1].replace("\\/", "/"))
}

/// Strategy 3: any anchor showing an absolute URL somewhere after the word "Website".
pub fn generic_heuristic(html: &str) -> Option<CanonicalDomain> {
    let caps = GENERIC_RE.captures(html)?;
    normalize(&caps[1])
}

pub type Strategy = fn(&str) -> Option<CanonicalDomain>;

/// Strategies in priority order.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("structured_marker", structured_marker),
    ("structured_data", structured_data),
    ("generic_heuristic", generic_heuristic),
];

/// Run [`STRATEGIES`] over `html` and return the first domain found.
pub fn extract_from_html(html: &str) -> Option<CanonicalDomain> {
    if html.trim().is_empty() {
        return None;
    }

    STRATEGIES.iter().find_map(|(name, strategy)| {
        let found = strategy(html);
        match &found {
            Some(domain) => {
                debug!(target: "scout.extract", strategy = name, %domain, "strategy matched")
            }
            None => trace!(target: "scout.extract", strategy = name, "strategy found nothing"),
        }
        found
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(domain: Option<CanonicalDomain>) -> Option<String> {
        domain.map(CanonicalDomain::into_string)
    }

    #[test]
    fn marker_prefers_text_over_plain_href() {
        let html = r#"<dd data-test-id="about-us__website"><a href="https://redirect/?url=https%3A%2F%2Fexample.com">example.com</a></dd>"#;
        assert_eq!(found(extract_from_html(html)).as_deref(), Some("example.com"));
    }

    #[test]
    fn marker_unwraps_tracking_redirect() {
        let html = r#"
            <div data-test-id="about-us__website">
              <dt>Website</dt>
              <dd>
                <a class="link" rel="noopener"
                   href="https://www.linkedin.com/redir/redirect?url=https%3A%2F%2Fwww%2Eacme%2Eco%2Euk%2Fhome&amp;urlhash=Xyz1">
                  <span>Visit site</span>
                </a>
              </dd>
            </div>"#;
        assert_eq!(found(structured_marker(html)).as_deref(), Some("acme.co.uk"));
    }

    #[test]
    fn marker_falls_back_to_text_when_redirect_is_useless() {
        let html = r#"<div data-test-id="about-us__website">
            <a href="https://www.linkedin.com/redir/redirect?url=%20&amp;urlhash=1">
              https://www.acme.io
            </a></div>"#;
        assert_eq!(found(structured_marker(html)).as_deref(), Some("acme.io"));
    }

    #[test]
    fn marker_skips_nested_tags_to_reach_text() {
        let html = r#"<div data-test-id="about-us__website"><a href="/x" class="c"><span class="t">
            http://Blog.Acme.com
        </span></a></div>"#;
        assert_eq!(found(structured_marker(html)).as_deref(), Some("acme.com"));
    }

    #[test]
    fn structured_data_reads_same_as() {
        let html = r#"<script type="application/ld+json">{"@type":"Organization","sameAs":"https://partner.example.org/page"}</script>"#;
        assert_eq!(found(extract_from_html(html)).as_deref(), Some("example.org"));
    }

    #[test]
    fn structured_data_handles_arrays_and_escaped_slashes() {
        let html = r#"{"name":"Acme", "sameAs" : [ "https:\/\/www.acme.com.au\/" , "https://x.com/acme"]}"#;
        assert_eq!(found(structured_data(html)).as_deref(), Some("acme.com.au"));
    }

    #[test]
    fn generic_heuristic_spans_lines_and_ignores_case() {
        let html = "<dt class=\"label\">WEBSITE</dt>\n<dd>\n<a href=\"#\" class=\"x\">\nhttps://www.acme.net/en\n</a></dd>";
        assert_eq!(found(generic_heuristic(html)).as_deref(), Some("acme.net"));
        assert_eq!(found(extract_from_html(html)).as_deref(), Some("acme.net"));
    }

    #[test]
    fn marker_beats_structured_data() {
        let html = r#"
            <script>{"sameAs":"https://other.example.org"}</script>
            <div data-test-id="about-us__website"><a href="https://acme.com">acme.com</a></div>"#;
        assert_eq!(found(extract_from_html(html)).as_deref(), Some("acme.com"));
    }

    #[test]
    fn unnormalizable_marker_hands_over_to_next_strategy() {
        let html = r#"
            <div data-test-id="about-us__website"><a href="/company/acme">Not listed</a></div>
            <script>{"sameAs":"https://www.acme.org"}</script>"#;
        assert_eq!(found(extract_from_html(html)).as_deref(), Some("acme.org"));
    }

    #[test]
    fn nothing_matching_is_absent() {
        assert_eq!(extract_from_html(""), None);
        assert_eq!(extract_from_html("   \n"), None);
        assert_eq!(
            extract_from_html("<html><body><h1>Acme</h1><p>No links here.</p></body></html>"),
            None
        );
    }

    #[test]
    fn unwrap_redirect_only_touches_redirect_wrappers() {
        assert_eq!(
            unwrap_redirect(
                "https://www.linkedin.com/redir/redirect?url=https%3A%2F%2Facme.com&urlhash=a"
            )
            .as_deref(),
            Some("https://acme.com")
        );
        assert_eq!(unwrap_redirect("https://acme.com/?url=https%3A%2F%2Fevil.com"), None);
        assert_eq!(unwrap_redirect("https://www.linkedin.com/redir/redirect?foo=1"), None);
        assert_eq!(
            unwrap_redirect("https://www.linkedin.com/redir/redirect?urlhash=a&amp;url=https%3A%2F%2Facme.com")
                .as_deref(),
            Some("https://acme.com")
        );
    }

    #[test]
    fn redirects_from_other_hosts_are_not_followed() {
        for href in [
            "https://evil.com/redir/redirect?url=https%3A%2F%2Fevil.org",
            "https://notlinkedin.com/redir/redirect?url=https%3A%2F%2Fevil.org",
            "/redir/redirect?url=https%3A%2F%2Fevil.org",
        ] {
            assert_eq!(unwrap_redirect(href), None, "{href}");
        }

        let html = r#"<div data-test-id="about-us__website"><a href="https://evil.com/redir/redirect?url=https%3A%2F%2Fevil.org">acme.com</a></div>"#;
        assert_eq!(found(structured_marker(html)).as_deref(), Some("acme.com"));
    }

    #[test]
    fn unnormalizable_redirect_destination_is_a_miss() {
        let anchor = WebsiteAnchor {
            href: Some("https://www.linkedin.com/redir/redirect?url=http%3A%2F%2F10.0.0.7%2Fhome".into()),
            text: "acme.com".into(),
        };
        assert_eq!(anchor.domain(), None);
    }

    #[test]
    fn anchor_domain_uses_shared_rule() {
        let anchor = WebsiteAnchor {
            href: Some("https://www.linkedin.com/redir/redirect?url=http%3A%2F%2Fshop.acme.de".into()),
            text: "acme.com".into(),
        };
        assert_eq!(found(anchor.domain()).as_deref(), Some("acme.de"));

        let plain = WebsiteAnchor {
            href: None,
            text: " www.acme.com ".into(),
        };
        assert_eq!(found(plain.domain()).as_deref(), Some("acme.com"));
    }

    #[test]
    fn strategies_are_ordered() {
        let names: Vec<_> = STRATEGIES.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            ["structured_marker", "structured_data", "generic_heuristic"]
        );
    }
}
