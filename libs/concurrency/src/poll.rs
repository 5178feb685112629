//! Interval-based polling.
use std::{future::Future, time::Duration};
use tokio::time::{self, Instant, MissedTickBehavior};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Error returned by `poll()` when the condition didn't hold before the timeout.
#[derive(Debug, thiserror::Error)]
#[error("condition not met within {timeout:?} (last error: {})", .last_error.as_deref().unwrap_or("none"))]
pub struct Timeout {
    /// The budget which was exceeded.
    pub timeout: Duration,
    /// Rendering of the last error returned by the polled function, if any.
    pub last_error: Option<String>,
}

/// Calls `f` every `interval` until it returns `Ok(Some(_))`, or until `timeout` elapses.
///
/// Errors returned by `f` are treated as transient: they are logged and polling continues.
/// The first call happens immediately. A zero `interval` is treated as 1ms.
pub async fn poll<T, Fut, F>(interval: Duration, timeout: Duration, mut f: F) -> Result<T, Timeout>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<Option<T>>>,
{
    let deadline = Instant::now() + timeout;
    let mut ticker = time::interval(interval.max(MIN_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_error = None;
    loop {
        ticker.tick().await;
        match f().await {
            Ok(Some(v)) => return Ok(v),
            Ok(None) => {}
            Err(err) => {
                tracing::debug!("poll: {err:#}");
                last_error = Some(format!("{err:#}"));
            }
        }
        if Instant::now() >= deadline {
            return Err(Timeout {
                timeout,
                last_error,
            });
        }
    }
}
