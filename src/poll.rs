//! Internal bounded-retry wait loop.
//!
//! Turns a single-shot, fallible search into a wait operation: sleep for the
//! configured interval, attempt the search, and keep going until a match is
//! found or the deadline is exhausted. A single failed attempt never aborts
//! the wait - only a non-retryable error or the deadline does.

use crate::config::PollingConfig;
use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Runs `attempt` repeatedly until it succeeds or the deadline passes.
///
/// Each iteration sleeps for `polling.interval`, then checks the accumulated
/// wait time against `polling.max_wait` before searching again; the loop
/// therefore overshoots the deadline by at most one interval. Retryable
/// failures (no match yet, ambiguous match, transient provider errors) are
/// logged and absorbed; anything else is returned immediately.
pub(crate) async fn wait_until_found<T, F, Fut>(polling: &PollingConfig, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let interval = polling.interval;
    let deadline = polling.max_wait;
    let mut elapsed = Duration::ZERO;

    loop {
        debug!(sleep_ms = interval.as_millis() as u64, "Waiting before next search");
        tokio::time::sleep(interval).await;
        elapsed += interval;

        if elapsed > deadline {
            return Err(Error::WaitTimeout { timeout: deadline });
        }

        match attempt().await {
            Ok(found) => return Ok(found),
            Err(error) if error.is_retryable() => {
                debug!(
                    error = %error,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Search attempt missed, staying in the wait loop"
                );
            }
            Err(error) => return Err(error),
        }
    }
}
