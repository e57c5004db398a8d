//! Locating, downloading, and launching Chrome/Chromium

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};

use crate::config::{BrowserOptions, Viewport};
use crate::utils::constants::CHROME_PATH_ENV;

/// A running browser plus everything that must be torn down with it
pub struct LaunchedBrowser {
    pub browser: Browser,
    pub handler: JoinHandle<()>,
    /// Throwaway profile; removed by cleanup
    pub user_data_dir: TempDir,
}

/// Find a Chrome/Chromium executable.
///
/// Checked in order: `explicit`, the `CHROME_PATH` environment variable,
/// well-known install locations, then `which` on unix.
pub fn find_browser_executable(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            info!("Using configured browser: {}", path.display());
            return Ok(path.to_path_buf());
        }
        anyhow::bail!("configured browser executable does not exist: {}", path.display());
    }

    if let Ok(path) = std::env::var(CHROME_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using browser from {CHROME_PATH_ENV}: {}", path.display());
            return Ok(path);
        }
        warn!("{CHROME_PATH_ENV} points to non-existent file: {}", path.display());
    }

    let candidates: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "~/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    for candidate in candidates {
        let path = match candidate.strip_prefix("~/") {
            Some(rest) => match dirs::home_dir() {
                Some(home) => home.join(rest),
                None => continue,
            },
            None => PathBuf::from(candidate),
        };

        if path.exists() {
            info!("Found browser at: {}", path.display());
            return Ok(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in ["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !found.is_empty() {
                    info!("Found browser using 'which': {found}");
                    return Ok(PathBuf::from(found));
                }
            }
        }
    }

    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Download a managed Chromium into the user cache directory.
pub async fn download_managed_browser() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| {
            let fallback = std::env::temp_dir();
            warn!("No user cache directory, downloading under {}", fallback.display());
            fallback
        })
        .join("spa_prerender")
        .join("chromium");

    info!("Downloading managed Chromium into {}", cache_dir.display());
    tokio::fs::create_dir_all(&cache_dir)
        .await
        .context("Failed to create cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );
    let revision = fetcher.fetch().await.context("Failed to fetch browser")?;

    info!("Downloaded Chromium to: {}", revision.folder_path.display());
    Ok(revision.executable_path)
}

/// Launch a browser with a fresh temporary profile.
///
/// Falls back to downloading Chromium only when no executable was
/// configured and none is installed.
pub async fn launch_browser(options: &BrowserOptions, viewport: Option<Viewport>) -> Result<LaunchedBrowser> {
    let executable = match find_browser_executable(options.executable.as_deref()) {
        Ok(path) => path,
        Err(e) if options.executable.is_none() => {
            warn!("{e}, falling back to a managed download");
            download_managed_browser().await?
        }
        Err(e) => return Err(e),
    };

    let user_data_dir = tempfile::Builder::new()
        .prefix("spa_prerender_chrome_")
        .tempdir()
        .context("Failed to create user data directory")?;

    let mut config_builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .user_data_dir(user_data_dir.path())
        .chrome_executable(executable);

    if let Some(viewport) = viewport {
        config_builder = config_builder.window_size(viewport.width, viewport.height);
    }

    config_builder = if options.headless {
        config_builder.headless_mode(HeadlessMode::default())
    } else {
        config_builder.with_head()
    };

    config_builder = config_builder
        .arg("--disable-infobars")
        .arg("--disable-notifications")
        .arg("--disable-extensions")
        .arg("--disable-popup-blocking")
        .arg("--disable-background-networking")
        .arg("--disable-breakpad")
        .arg("--disable-features=TranslateUI")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .arg("--password-store=basic")
        .arg("--use-mock-keychain")
        .arg("--hide-scrollbars")
        .arg("--mute-audio");

    for arg in &options.extra_args {
        config_builder = config_builder.arg(arg.as_str());
    }

    let browser_config = config_builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    debug!("Launching browser with config: {browser_config:?}");
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let message = e.to_string();
                // chromiumoxide cannot decode some newer CDP events; harmless
                let benign = message.contains("data did not match any variant of untagged enum Message")
                    || message.contains("Failed to deserialize WS response");

                if benign {
                    trace!("Suppressed benign CDP serialization error: {message}");
                } else {
                    error!("Browser handler error: {e:?}");
                }
            }
        }
        debug!("Browser handler task completed");
    });

    Ok(LaunchedBrowser {
        browser,
        handler,
        user_data_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_explicit_executable_is_an_error() {
        let missing = Path::new("/definitely/not/a/chrome");
        let err = find_browser_executable(Some(missing)).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn existing_explicit_executable_wins() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(find_browser_executable(Some(file.path())).unwrap(), file.path());
    }
}
