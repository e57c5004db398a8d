//! Options defaults, builder validation and JSON loading

use spa_prerender::CrawlError;
use spa_prerender::browser_session::{BlockPolicy, ResourceKind};
use spa_prerender::config::{PrerenderOptions, RequestMatcher};
use std::io::Write;
use std::time::Duration;

fn minimal() -> PrerenderOptions {
    PrerenderOptions::builder()
        .starting_url("http://localhost:8080")
        .output_dir("dist")
        .build()
        .unwrap()
}

#[test]
fn defaults_match_documented_values() {
    let options = minimal();

    assert_eq!(options.base_url(), "http://localhost:8080");
    assert_eq!(options.max_concurrent_pages(), 3);
    assert_eq!(options.max_in_flight(), 3);
    assert_eq!(options.network_idle(), Duration::from_millis(150));
    assert_eq!(options.page_timeout_secs(), Some(30));
    assert!(!options.meta_prerender_only());
    assert!(options.sitemap_canonical_base_url().is_none());

    let page = options.page_options();
    let viewport = page.viewport.unwrap();
    assert_eq!((viewport.width, viewport.height), (480, 850));
    assert!(page.block.image && page.block.media && page.block.known_third_party);
    assert!(!page.block.css && !page.block.js);
    assert!(options.browser().headless);
}

#[test]
fn explicit_base_url_wins() {
    let options = minimal().into_builder().base_url("http://localhost:8080/app").build().unwrap();
    assert_eq!(options.base_url(), "http://localhost:8080/app");
}

#[test]
fn rejects_non_http_starting_url() {
    let err = PrerenderOptions::builder()
        .starting_url("file:///index.html")
        .output_dir("dist")
        .build()
        .unwrap_err();
    assert!(matches!(err, CrawlError::Config(msg) if msg.contains("starting_url")));
}

#[test]
fn rejects_zero_concurrency() {
    assert!(minimal().into_builder().max_concurrent_pages(0).build().is_err());
    assert!(minimal().into_builder().max_in_flight(0).build().is_err());
}

#[test]
fn rejects_blank_selector_and_bad_canonical_base() {
    assert!(minimal().into_builder().selector_to_wait_for("  ").build().is_err());
    assert!(
        minimal()
            .into_builder()
            .sitemap_canonical_base_url("prod.example")
            .build()
            .is_err()
    );
}

#[test]
fn loads_json_file_with_nested_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "starting_url": "http://localhost:5000/",
            "output_dir": "build",
            "meta_prerender_only": true,
            "page_options": {{ "viewport": null, "block": {{ "js": true }} }}
        }}"#
    )
    .unwrap();

    let options = PrerenderOptions::from_json_file(file.path()).unwrap();

    assert!(options.meta_prerender_only());
    assert!(options.page_options().viewport.is_none());
    assert!(options.page_options().block.js);
    assert!(options.page_options().block.image);
    assert_eq!(options.max_concurrent_pages(), 3);
}

#[test]
fn missing_json_file_is_an_io_error() {
    let err = PrerenderOptions::from_json_file(std::path::Path::new("/no/such/options.json")).unwrap_err();
    assert!(matches!(err, CrawlError::Io { .. }));
}

#[test]
fn block_policy_follows_options() {
    let options = minimal()
        .into_builder()
        .block_css(true)
        .block_images(false)
        .block_matcher(RequestMatcher::new(|url: &str, _| url.contains("/beacon")))
        .build()
        .unwrap();
    let policy = BlockPolicy::from_options(&options.page_options().block);

    assert!(policy.should_block("http://localhost:8080/font.woff2", ResourceKind::Font));
    assert!(policy.should_block("http://localhost:8080/site.css", ResourceKind::Stylesheet));
    assert!(!policy.should_block("http://localhost:8080/hero.png", ResourceKind::Image));
    assert!(policy.should_block("https://www.google-analytics.com/analytics.js", ResourceKind::Script));
    assert!(policy.should_block("http://localhost:8080/beacon?id=1", ResourceKind::Xhr));
    assert!(!policy.should_block("http://localhost:8080/app.js", ResourceKind::Script));
}
