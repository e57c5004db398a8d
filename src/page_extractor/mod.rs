//! Page content extraction.
//!
//! This module drives a render session through one URL and collects the
//! raw source, the rendered output and the outbound links.

// Sub-modules
pub mod extractors;
pub mod js_scripts;
pub mod readiness;
pub mod schema;

// Re-exports for public API
pub use extractors::{PageExtractor, extract_links};
pub use readiness::{NetworkIdle, ReadinessStrategy, SelectorPresent};
pub use schema::{PageInfo, RenderedContent};
