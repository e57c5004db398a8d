//! Configuration for a prerender run
//!
//! This module provides `PrerenderOptions`, its typestate builder and the
//! pluggable function hooks it carries.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod hooks;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::{Complete, PrerenderOptionsBuilder, WithStartingUrl};
pub use hooks::{OutputPathFn, RequestMatcher, UrlCleaner};
pub use types::{BlockOptions, BrowserOptions, PageOptions, PrerenderOptions, Viewport};
