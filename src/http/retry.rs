//! Retry bounds and capped exponential backoff.

use rand::Rng;
use std::time::Duration;

/// Default number of attempts for a dispatch.
pub const MAX_RETRIES: usize = 3;

/// Base delay in seconds, doubled on every retry.
pub const BASE_DELAY_SECS: f64 = 1.0;

/// Upper bound for any backoff delay in seconds.
pub const MAX_DELAY_SECS: f64 = 30.0;

/// Computes `min(base * 2^retry_count + jitter, cap)`.
///
/// `jitter` is expected in `[0, 1)`. Large retry counts saturate at the cap.
pub fn backoff_delay(retry_count: u32, jitter: f64) -> Duration {
    let exp = retry_count.min(62) as i32;
    let delay = (BASE_DELAY_SECS * 2f64.powi(exp) + jitter).min(MAX_DELAY_SECS);
    Duration::from_secs_f64(delay)
}

/// Samples the jitter from `rng` and returns the backoff delay for `retry_count`.
pub fn exponential_backoff<R: Rng + ?Sized>(retry_count: u32, rng: &mut R) -> Duration {
    backoff_delay(retry_count, rng.gen_range(0.0..1.0))
}
