//! Bounded fixed-delay retry for transient recognition failures.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::types::RecognitionError;

#[cfg(test)]
#[path = "retry_test.rs"]
mod tests;

/// Run `op` up to `1 + retries` times, sleeping a fixed `delay` between
/// attempts. Only errors whose [`RecognitionError::retryable`] is true are
/// retried; validation failures and empty-but-successful responses are
/// returned immediately.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted.
pub async fn with_retry<T, F, Fut>(retries: u32, delay: Duration, mut op: F) -> Result<T, RecognitionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RecognitionError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.retryable() && attempt < retries => {
                attempt += 1;
                warn!(attempt, retries, error = %e, "recognition request failed; retrying");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
