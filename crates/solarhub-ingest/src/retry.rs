//! Back-off on HTTP 429 for outbound fetches.
//!
//! [`retry_with_backoff`] retries only [`IngestError::RateLimited`]. Network
//! failures, other statuses and quota errors return immediately: a failed
//! brand is retried by re-selection in a later invocation instead.

use std::future::Future;
use std::time::Duration;

use crate::error::IngestError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
pub(crate) fn is_retriable(err: &IngestError) -> bool {
    matches!(err, IngestError::RateLimited { .. })
}

/// Runs `operation` with up to `max_retries` additional attempts on HTTP 429.
///
/// Back-off schedule with `backoff_base_ms = 1_000`:
///
/// | Attempt | Sleep before next attempt        |
/// |---------|----------------------------------|
/// | 1       | 1 000 ms × 2⁰ ± 25 % jitter     |
/// | 2       | 1 000 ms × 2¹ ± 25 % jitter     |
/// | 3       | 1 000 ms × 2² ± 25 % jitter     |
///
/// Delay is capped at 60 s. With `max_retries = 0` the first error is returned.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, IngestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, IngestError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
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
                    "rate limited, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
