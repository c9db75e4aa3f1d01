//! Driver layer for browser automation.
//!
//! This crate exposes the WebDriver session and page/element helpers used to
//! read company profile pages while looking like an ordinary visitor.
//!
//! - [`browser::driver::ScoutDriver`]: WebDriver client wrapper, one per target
//! - [`browser::page::ScoutPage`]: navigation, bounded waits and DOM reads
//! - [`browser::fingerprint::IdentityGenerator`]: randomized user agent and viewport
//! - [`browser::proxy::ProxyPool`]: optional proxy selection
//! - [`browser::behavioral::BehavioralEngine`]: human-like pauses
//! - [`browser::stealth`]: Chrome flags and JS evasions per stealth level
pub mod browser;
