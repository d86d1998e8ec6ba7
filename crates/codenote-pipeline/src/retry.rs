//! Per-chunk retry with exponential backoff
//!
//! The annotation client never retries; this is the only place a request is
//! repeated, and only for transient errors.

use std::{future::Future, time::Duration};

use codenote_ollama::AnnotationError;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Backoff never grows past this multiple of the initial delay.
const MAX_BACKOFF_FACTOR: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
        }
    }

    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delay before retry number `attempt` (0-based): 1x, 2x, 4x, 8x, 8x, ...
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt).min(MAX_BACKOFF_FACTOR);
        self.initial_backoff.saturating_mul(factor)
    }

    /// Run `op` until it succeeds, fails permanently, or retries run out.
    pub async fn run<F, Fut, T>(&self, mut op: F) -> Result<T, AnnotationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AnnotationError>>,
    {
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    let backoff = self.backoff_for(attempt);
                    warn!(
                        "Transient error on attempt {}/{}, retrying after {}ms: {}",
                        attempt + 1,
                        self.max_retries + 1,
                        backoff.as_millis(),
                        err
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => {
                    if attempt > 0 {
                        debug!("Giving up after {} attempts", attempt + 1);
                    }
                    return Err(err);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}
