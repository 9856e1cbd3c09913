//! Retry transforms for the raw user call.
//!
//! A transform receives the call already bound to its arguments and returns
//! a wrapped call; the supervisor applies it inside the timeout scope, so
//! all attempts share one deadline. Restarts re-apply the transform and
//! therefore begin with a fresh attempt budget.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use sitters_core::{RawCall, RetryLayer};
use tracing::debug;

/// Retry the call until it succeeds or `attempts` have been spent. The
/// final attempt's error is returned unchanged.
pub fn stop_after_attempt<R>(attempts: usize) -> RetryLayer<R>
where
    R: Send + 'static,
{
    stop_after_attempt_with_delay(attempts, Duration::ZERO)
}

/// Like [`stop_after_attempt`], sleeping `delay` between attempts.
pub fn stop_after_attempt_with_delay<R>(attempts: usize, delay: Duration) -> RetryLayer<R>
where
    R: Send + 'static,
{
    let attempts = attempts.max(1);
    Arc::new(move |call: RawCall<R>| -> RawCall<R> {
        Arc::new(move || {
            let call = call.clone();
            async move {
                let mut attempt = 1;
                loop {
                    match call().await {
                        Ok(value) => return Ok(value),
                        Err(error) if attempt < attempts => {
                            debug!(attempt, error = %error, "attempt failed; retrying");
                            attempt += 1;
                            if !delay.is_zero() {
                                tokio::time::sleep(delay).await;
                            }
                        }
                        Err(error) => return Err(error),
                    }
                }
            }
            .boxed()
        })
    })
}
