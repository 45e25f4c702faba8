//! Exponential backoff schedule for retry operations.

use crate::constants::{MAX_BACKOFF_DELAY_MS, STARTING_BACKOFF_DELAY_MS};
use std::time::Duration;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Delays between fetch attempts: 100ms, 200ms, 400ms... capped at 2s, jittered.
///
/// Yields exactly `retries` delays, so an operation runs at most
/// `retries + 1` times.
///
/// # Arguments
/// * `retries` - Number of retries after the first attempt
pub fn fetch_backoff(retries: u32) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(STARTING_BACKOFF_DELAY_MS / 2)
        .max_delay(Duration::from_millis(MAX_BACKOFF_DELAY_MS))
        .map(jitter)
        .take(retries as usize)
}
