//! Deadline wrapper for per-page work
//!
//! A page that never settles must not stall its branch forever. Running
//! out of time is reported as a value so the caller can skip the branch
//! instead of failing the run.

use std::future::Future;
use std::time::Duration;

#[derive(Debug)]
pub enum PageDeadline<T> {
    Completed(T),
    Elapsed(Duration),
}

/// Run `operation`, giving up after `timeout_secs` when set.
pub async fn with_page_timeout<F>(operation: F, timeout_secs: Option<u64>) -> PageDeadline<F::Output>
where
    F: Future,
{
    let Some(secs) = timeout_secs else {
        return PageDeadline::Completed(operation.await);
    };

    let limit = Duration::from_secs(secs);
    match tokio::time::timeout(limit, operation).await {
        Ok(output) => PageDeadline::Completed(output),
        Err(_) => PageDeadline::Elapsed(limit),
    }
}
