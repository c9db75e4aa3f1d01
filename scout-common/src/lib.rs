//! Common types and utilities shared across Scout crates.
//!
//! This crate defines the browser stealth level, observability helpers, and
//! shared error types used throughout the Scout workspace. It is
//! intentionally lightweight so that every crate can depend on it without
//! introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`ScoutError`] and [`Result`]: Shared error handling
//! - [`StealthLevel`]: how aggressively the browser session hides automation
//!
//! # Examples
//!
//! ```rust
//! use scout_common::StealthLevel;
//!
//! let level = StealthLevel::default();
//! assert_eq!(level, StealthLevel::Balanced);
//! assert!(level.at_least(StealthLevel::Lightweight));
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Browser automation stealth level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StealthLevel {
    Lightweight,
    #[default]
    Balanced,
    Maximum,
}

impl StealthLevel {
    /// True when `self` is at least as strict as `other`.
    pub fn at_least(self, other: StealthLevel) -> bool {
        self >= other
    }
}

/// Error types used across the Scout system.
#[derive(thiserror::Error, Debug)]
pub enum ScoutError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The command line could not be used to build a target.
    #[error("Usage error: {0}")]
    Usage(String),
}

/// Convenient alias for results that use [`ScoutError`].
pub type Result<T> = std::result::Result<T, ScoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stealth_levels_are_ordered() {
        assert!(StealthLevel::Maximum.at_least(StealthLevel::Balanced));
        assert!(StealthLevel::Balanced.at_least(StealthLevel::Balanced));
        assert!(!StealthLevel::Lightweight.at_least(StealthLevel::Balanced));
    }

    #[test]
    fn stealth_level_deserializes_lowercase() {
        let level: StealthLevel = serde_json::from_str("\"maximum\"").unwrap();
        assert_eq!(level, StealthLevel::Maximum);
    }

    #[test]
    fn errors_name_their_kind() {
        let err = ScoutError::Config("unknown field `brwoser`".to_string());
        assert_eq!(err.to_string(), "Configuration error: unknown field `brwoser`");
        let err = ScoutError::Usage("slug is empty".to_string());
        assert_eq!(err.to_string(), "Usage error: slug is empty");
    }
}
