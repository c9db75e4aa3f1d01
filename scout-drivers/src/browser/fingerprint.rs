use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Browsing identity presented by one session.
pub struct IdentityProfile {
    pub user_agent: String,
    pub viewport: (u32, u32),
    pub platform: String,
    pub languages: Vec<String>,
}

struct UserAgentEntry {
    user_agent: &'static str,
    platform: &'static str,
}

const DESKTOP_USER_AGENTS: &[UserAgentEntry] = &[
    UserAgentEntry {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        platform: "Win32",
    },
    UserAgentEntry {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36 Edg/130.0.0.0",
        platform: "Win32",
    },
    UserAgentEntry {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        platform: "MacIntel",
    },
    UserAgentEntry {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36",
        platform: "MacIntel",
    },
    UserAgentEntry {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        platform: "Linux x86_64",
    },
];

#[derive(Debug, Clone)]
/// Builds a fresh [`IdentityProfile`] per session.
///
/// Constructed explicitly by the caller and handed to the driver; nothing
/// about the identity outlives the session it was generated for.
pub struct IdentityGenerator {
    widths: RangeInclusive<u32>,
    heights: RangeInclusive<u32>,
    languages: Vec<String>,
}

impl Default for IdentityGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityGenerator {
    /// Desktop user agents with a viewport between 1024x768 and 1280x900.
    pub fn new() -> Self {
        Self {
            widths: 1024..=1280,
            heights: 768..=900,
            languages: vec!["en-US".to_string(), "en".to_string()],
        }
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> IdentityProfile {
        let entry = &DESKTOP_USER_AGENTS[rng.gen_range(0..DESKTOP_USER_AGENTS.len())];
        IdentityProfile {
            user_agent: entry.user_agent.to_string(),
            viewport: (
                rng.gen_range(self.widths.clone()),
                rng.gen_range(self.heights.clone()),
            ),
            platform: entry.platform.to_string(),
            languages: self.languages.clone(),
        }
    }
}
