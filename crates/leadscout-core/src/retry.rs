//! Retry with exponential back-off and jitter for the outbound HTTP clients.
//!
//! Each client crate decides which of its errors are transient by
//! implementing [`Retriable`]; [`retry_with_backoff`] does the rest.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

const MAX_DELAY_MS: u64 = 60_000;

/// Classifies an error as transient (worth another attempt) or not.
pub trait Retriable {
    fn is_retriable(&self) -> bool;
}

/// Transient HTTP statuses: 429 and every 5xx.
#[must_use]
pub fn is_retriable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Network-level failures worth retrying: timeouts, connect errors and
/// transient statuses surfaced through `error_for_status`.
#[must_use]
pub fn is_retriable_reqwest(err: &reqwest::Error) -> bool {
    err.is_timeout()
        || err.is_connect()
        || err.status().is_some_and(|s| is_retriable_status(s.as_u16()))
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors.
///
/// The delay before retry `n` is `backoff_base_ms * 2^(n-1)` with ±25 %
/// jitter, capped at 60 s. Non-retriable errors are returned immediately.
///
/// # Errors
///
/// Returns the last error once retries are exhausted, or the first
/// non-retriable error.
pub async fn retry_with_backoff<T, E, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, E>
where
    E: Retriable + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retriable() || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
