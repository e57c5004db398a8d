//! JavaScript evaluated inside rendered pages

/// Same-origin anchor targets in the rendered DOM
///
/// Compared against the page's own origin, not the crawl's base URL.
pub const LINKS_SCRIPT: &str = r#"
    (() => Array.from(document.querySelectorAll('a'))
        .filter(a => a.href && a.origin === window.location.origin)
        .map(a => a.href))()
"#;

/// Serialized `<title>` and `<meta>` elements of the rendered head
pub const HEAD_META_SCRIPT: &str = r#"
    (() => Array.from(document.head ? document.head.querySelectorAll('title, meta') : [])
        .map(el => el.outerHTML)
        .join(''))()
"#;

/// Registered for every new document of a session.
///
/// Only one tab is focused at a time, and background tabs never run
/// `requestAnimationFrame` callbacks or see themselves as visible. Rendering
/// code gated on either would stall, so both are faked.
pub const ALWAYS_VISIBLE_SCRIPT: &str = r#"
    (() => {
        Object.defineProperty(window.document, 'hidden', {
            get: function () { return false; },
            configurable: true,
        });
        Object.defineProperty(window.document, 'visibilityState', {
            get: function () { return 'visible'; },
            configurable: true,
        });
        window.requestAnimationFrame = callback => setTimeout(callback, 10);
        window.cancelAnimationFrame = id => clearTimeout(id);
    })();
"#;
