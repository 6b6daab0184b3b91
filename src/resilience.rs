// src/resilience.rs
//! Retry-with-backoff and a per-cycle circuit breaker around provider calls.
//!
//! Transient provider errors (network failure, non-2xx, malformed payload)
//! are retried, then isolated by the breaker; nothing here escalates past
//! the ingestion cycle.

use anyhow::Result;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_MS: u64 = 400;

/// Attempt `op` up to `attempts` times. Between failures, wait
/// `base * 2^(try-1)` with jitter in [0.9, 1.1). The last error is returned
/// once attempts are exhausted.
pub async fn retry_with_backoff<T, F, Fut>(attempts: u32, base: Duration, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    let mut tries = 0u32;
    loop {
        tries += 1;
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                if tries >= attempts {
                    return Err(e);
                }
                let jitter: f64 = rand::rng().random_range(0.9..1.1);
                let backoff = base.as_millis() as f64 * 2f64.powi(tries as i32 - 1) * jitter;
                tokio::time::sleep(Duration::from_millis(backoff.round() as u64)).await;
            }
        }
    }
}

/// Consecutive-failure circuit breaker, scoped to a single ingestion cycle.
/// While the counter is at or above the threshold, calls short-circuit to
/// `None` without invoking the operation. Any success resets the counter.
#[derive(Debug)]
pub struct Breaker {
    fails: u32,
    threshold: u32,
}

impl Breaker {
    pub fn new(threshold: u32) -> Self {
        Self {
            fails: 0,
            threshold: threshold.max(1),
        }
    }

    pub fn is_open(&self) -> bool {
        self.fails >= self.threshold
    }

    pub async fn run<T, Fut>(&mut self, label: &str, fut: Fut) -> Option<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        if self.is_open() {
            tracing::warn!(target: "discover", op = label, "breaker open, skipping call");
            return None;
        }
        match fut.await {
            Ok(v) => {
                self.fails = 0;
                Some(v)
            }
            Err(e) => {
                self.fails += 1;
                tracing::warn!(
                    target: "discover",
                    op = label,
                    error = %e,
                    fails = self.fails,
                    "operation failed"
                );
                None
            }
        }
    }
}
