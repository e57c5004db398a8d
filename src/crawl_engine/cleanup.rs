//! Browser and resource cleanup
//!
//! Runs after every crawl, successful or not. Failures here are collected
//! and reported, never propagated over the crawl's own result.

use anyhow::Result;
use chromiumoxide::Browser;
use log::{debug, warn};
use tempfile::TempDir;
use tokio::task::JoinHandle;

use crate::browser_session::ChromiumSession;

/// Result of cleanup operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupResult {
    /// All cleanup operations succeeded
    Success,
    /// Some cleanup operations failed, with error details
    PartialFailure(Vec<String>),
}

impl CleanupResult {
    fn from_errors(errors: Vec<String>) -> Self {
        if errors.is_empty() {
            Self::Success
        } else {
            Self::PartialFailure(errors)
        }
    }
}

/// Close every drained page
pub async fn close_sessions(sessions: Vec<ChromiumSession>) -> CleanupResult {
    let mut errors = Vec::new();

    debug!(target: "spa_prerender::cleanup", "Closing {} pages", sessions.len());
    for session in sessions {
        if let Err(e) = session.close().await {
            warn!(target: "spa_prerender::cleanup", "Failed to close page: {e}");
            errors.push(format!("Page close failed: {e}"));
        }
    }

    CleanupResult::from_errors(errors)
}

/// Close the browser, stop its event handler, and remove the profile directory.
///
/// `browser` is `None` when the handle is still shared elsewhere; the
/// process is then left to chromiumoxide's drop handling.
pub async fn cleanup_browser_and_data(
    browser: Option<Browser>,
    handler: JoinHandle<()>,
    user_data_dir: TempDir,
) -> Result<CleanupResult> {
    let mut errors = Vec::new();

    match browser {
        Some(mut browser) => {
            debug!(target: "spa_prerender::cleanup", "Closing browser");
            if let Err(e) = browser.close().await {
                warn!(target: "spa_prerender::cleanup", "Failed to close browser: {e}");
                errors.push(format!("Browser close failed: {e}"));
            }

            // Reap the child so it does not outlive the run
            debug!(target: "spa_prerender::cleanup", "Waiting for browser process to exit");
            if let Err(e) = browser.wait().await {
                warn!(target: "spa_prerender::cleanup", "Failed to wait for browser exit: {e}");
                errors.push(format!("Browser wait failed: {e}"));
            }
        }
        None => {
            warn!(target: "spa_prerender::cleanup", "Browser handle still shared, skipping graceful close");
            errors.push("Browser handle still shared".to_string());
        }
    }

    handler.abort();

    let dir = user_data_dir.path().to_path_buf();
    debug!(target: "spa_prerender::cleanup", "Removing browser profile {}", dir.display());
    if let Err(e) = user_data_dir.close() {
        warn!(target: "spa_prerender::cleanup", "Failed to remove {}: {e}", dir.display());
        errors.push(format!("Directory cleanup failed: {e}"));
    }

    Ok(CleanupResult::from_errors(errors))
}
