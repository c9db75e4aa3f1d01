//! Registrable-domain normalization backed by the Public Suffix List.

use std::fmt;

use serde::Serialize;
use tracing::debug;
use url::Url;

/// `<registrable-label>.<icann-suffix>`, lowercase, with IDN labels in Unicode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalDomain(String);

impl CanonicalDomain {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Why a candidate string could not be reduced to a [`CanonicalDomain`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("input is empty")]
    Empty,
    #[error("not a valid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("{0:?} has no DNS host")]
    NoDomainHost(String),
    #[error("{0:?} is not a valid domain name")]
    InvalidDomain(String),
    #[error("{0:?} does not end in a known public suffix")]
    UnknownSuffix(String),
    #[error("{0:?} has no registrable label in front of its public suffix")]
    NoRegistrableLabel(String),
}

fn has_http_scheme(s: &str) -> bool {
    let starts_with = |prefix: &str| {
        s.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    };
    starts_with("http://") || starts_with("https://")
}

/// Reduce `raw` to its registrable domain, reporting why it could not be.
///
/// Bare hosts are parsed as if `https://` had been prepended. The host is
/// split with the ICANN section of the Public Suffix List, so multi-label
/// suffixes such as `co.uk` are respected while hosting platforms such as
/// `github.io` count as ordinary registrable domains.
pub fn try_normalize(raw: &str) -> Result<CanonicalDomain, NormalizeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NormalizeError::Empty);
    }

    let parsed = if has_http_scheme(trimmed) {
        Url::parse(trimmed)?
    } else {
        Url::parse(&format!("https://{trimmed}"))?
    };

    let host = parsed
        .domain()
        .ok_or_else(|| NormalizeError::NoDomainHost(trimmed.to_string()))?;
    let host = host.strip_suffix('.').unwrap_or(host);

    let name = addr::parse_domain_name(host)
        .map_err(|_| NormalizeError::InvalidDomain(host.to_string()))?;
    if !name.has_known_suffix() {
        return Err(NormalizeError::UnknownSuffix(host.to_string()));
    }

    let suffix =
        icann_suffix(host).ok_or_else(|| NormalizeError::UnknownSuffix(host.to_string()))?;
    let label = host
        .strip_suffix(suffix)
        .and_then(|rest| rest.strip_suffix('.'))
        .and_then(|rest| rest.rsplit('.').next())
        .filter(|label| !label.is_empty())
        .ok_or_else(|| NormalizeError::NoRegistrableLabel(host.to_string()))?;

    Ok(CanonicalDomain(to_unicode(format!("{label}.{suffix}"))))
}

/// Longest ICANN suffix of `host`.
///
/// Private entries (`github.io`, `blogspot.com`, ...) are skipped by dropping
/// their leftmost label and looking up what remains, so a site hosted on such
/// a platform reduces to the platform's own domain.
fn icann_suffix(host: &str) -> Option<&str> {
    let mut candidate = host;
    loop {
        let name = addr::parse_domain_name(candidate).ok()?;
        if !name.has_known_suffix() {
            return None;
        }
        let suffix = &candidate[candidate.len() - name.suffix().len()..];
        if name.is_icann() {
            return Some(suffix);
        }
        candidate = suffix.split_once('.')?.1;
    }
}

/// Punycode labels are shown in their Unicode form; undecodable ones stay ASCII.
fn to_unicode(ascii: String) -> String {
    match idna::domain_to_unicode(&ascii) {
        (unicode, Ok(())) => unicode,
        (_, Err(_)) => ascii,
    }
}

/// Best-effort variant of [`try_normalize`]: failures are logged and become `None`.
pub fn normalize(raw: &str) -> Option<CanonicalDomain> {
    match try_normalize(raw) {
        Ok(domain) => Some(domain),
        Err(error) => {
            debug!(
                target: "scout.extract",
                input = %raw,
                %error,
                "candidate is not a registrable domain"
            );
            None
        }
    }
}
