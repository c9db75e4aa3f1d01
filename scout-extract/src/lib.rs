//! Website discovery for company profile pages.
//!
//! - [`domain`]: reduce any URL-like string to its registrable domain
//! - [`website`]: ordered pattern strategies over profile markup
//!
//! Nothing here performs I/O; a miss is an ordinary `None`.
//!
//! ```rust
//! use scout_extract::{extract_from_html, normalize};
//!
//! let html = r#"<script>{"sameAs":"https://partner.example.org/page"}</script>"#;
//! assert_eq!(extract_from_html(html).unwrap().as_str(), "example.org");
//! assert_eq!(normalize("www.Example.co.uk/path").unwrap().as_str(), "example.co.uk");
//! ```

pub mod domain;
pub mod website;

pub use domain::{CanonicalDomain, NormalizeError, normalize, try_normalize};
pub use website::{
    ABOUT_SECTION_SELECTOR, WEBSITE_MARKER_SELECTOR, WebsiteAnchor, domain_from_anchor,
    extract_from_html, unwrap_redirect,
};
