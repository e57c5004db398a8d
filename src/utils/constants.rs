//! Shared defaults for spa_prerender
//!
//! Every tunable the options expose starts from one of these values.

/// Default number of pooled render sessions (and in-flight extractions)
pub const DEFAULT_MAX_CONCURRENT_PAGES: usize = 3;

/// Debounce window for the network-idle readiness heuristic
///
/// Readiness fires once no sub-resource request has finished for this long.
/// Pages that poll faster than this never settle; pair them with a
/// selector readiness condition or the page timeout.
pub const DEFAULT_NETWORK_IDLE_MS: u64 = 150;

/// Per-page deadline covering navigation, readiness and extraction
pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 30;

/// Interval between DOM checks while waiting for a readiness selector
pub const SELECTOR_POLL_INTERVAL_MS: u64 = 100;

/// Default viewport: a tall phone-sized window keeps layout cheap
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 480;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 850;

/// Default seed when the CLI is pointed at a local dev server
pub const DEFAULT_STARTING_URL: &str = "http://localhost:8080";

/// File name appended to every route that does not already end in `.html`
pub const INDEX_FILE_NAME: &str = "index.html";

/// Sitemap artifact written under the output directory
pub const SITEMAP_FILE_NAME: &str = "sitemap.txt";

/// Environment variable that points at a Chrome/Chromium binary
pub const CHROME_PATH_ENV: &str = "CHROME_PATH";

/// URL fragments of advertising and analytics hosts
///
/// Matched as plain substrings of the request URL.
pub const KNOWN_THIRD_PARTY: &[&str] = &[
    "wtg-ads",
    "facebook.com",
    "fbcdn.net",
    "googletagmanager",
    "google-analytics.com",
    "connect.facebook.net",
    "chimpstatic.com",
    "googleadservices.com",
    "browser.sentry-cdn.com",
    "googleads.g.doubleclick.net",
    ".gemius.pl",
    ".mylivechat.com",
    "maps.googleapis.com",
    "youtube.com/embed",
];
