//! Sub-resource blocking policy
//!
//! Decides, per outbound request, whether a session aborts it. The policy
//! is built once from `BlockOptions` and shared by the session's
//! interception task.

use super::ResourceKind;
use crate::config::{BlockOptions, RequestMatcher};
use crate::utils::constants::KNOWN_THIRD_PARTY;

#[derive(Debug, Clone, Default)]
pub struct BlockPolicy {
    css: bool,
    image: bool,
    media: bool,
    js: bool,
    known_third_party: bool,
    matcher: Option<RequestMatcher>,
}

impl BlockPolicy {
    #[must_use]
    pub fn from_options(options: &BlockOptions) -> Self {
        Self {
            css: options.css,
            image: options.image,
            media: options.media,
            js: options.js,
            known_third_party: options.known_third_party,
            matcher: options.matcher.clone(),
        }
    }

    /// `true` when the request must be aborted
    #[must_use]
    pub fn should_block(&self, url: &str, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::Font => return true,
            ResourceKind::Stylesheet if self.css => return true,
            ResourceKind::Image if self.image => return true,
            ResourceKind::Media if self.media => return true,
            ResourceKind::Script if self.js => return true,
            _ => {}
        }

        if self.known_third_party && is_known_third_party(url) {
            return true;
        }

        self.matcher
            .as_ref()
            .is_some_and(|matcher| matcher.matches(url, kind))
    }
}

/// Advertising/analytics hosts, matched as URL substrings
#[must_use]
pub fn is_known_third_party(url: &str) -> bool {
    KNOWN_THIRD_PARTY.iter().any(|needle| url.contains(needle))
}
