//! Link processing between recursion levels
//!
//! Turns a page's raw link list into the set of canonical URLs this branch
//! is responsible for crawling next.

use log::{debug, warn};

use super::crawl_types::CrawlStats;
use crate::config::UrlCleaner;

/// Canonicalize `links` and claim the ones no branch has visited yet.
///
/// Claiming is an atomic insert-if-absent on the visited set, so a link
/// repeated on this page, or discovered concurrently by a sibling branch,
/// is handed to exactly one branch. Links that fail to canonicalize are
/// dropped. Returned in page order.
pub fn claim_new_links(links: &[String], cleaner: &UrlCleaner, stats: &CrawlStats) -> Vec<String> {
    let mut claimed = Vec::new();

    for link in links {
        let canonical = match cleaner.clean(link) {
            Ok(canonical) => canonical,
            Err(e) => {
                warn!(target: "spa_prerender::crawl", "Dropping link {link}: {e}");
                continue;
            }
        };

        if stats.claim(&canonical) {
            claimed.push(canonical);
        }
    }

    debug!(
        target: "spa_prerender::crawl",
        "{} of {} links are new",
        claimed.len(),
        links.len()
    );
    claimed
}
