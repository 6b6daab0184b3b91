// src/scheduler.rs
//! Bounded-concurrency fan-out over provider fetch jobs, plus the per-cycle
//! item budget.

use futures::stream::{self, StreamExt};
use std::future::Future;

/// Run `jobs` with at most `limit` concurrently in flight. Output position
/// `i` holds job `i`'s result regardless of completion order, so callers can
/// always map a batch back to the provider that produced it.
pub async fn run_limited<T, Fut>(jobs: Vec<Fut>, limit: usize) -> Vec<T>
where
    Fut: Future<Output = T>,
{
    stream::iter(jobs)
        .buffered(limit.max(1))
        .collect::<Vec<T>>()
        .await
}

/// Hard cap on items ingested per cycle, independent of per-provider limits.
/// Exhaustion is a normal termination condition, not an error: once the cap
/// is reached, remaining items are dropped for the cycle.
#[derive(Debug)]
pub struct CycleBudget {
    total: usize,
    remaining: usize,
}

impl CycleBudget {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            remaining: total,
        }
    }

    /// Consume one unit. Returns false once the budget is spent.
    pub fn admit(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    pub fn spent(&self) -> usize {
        self.total - self.remaining
    }

    pub fn exhausted(&self) -> bool {
        self.remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn results_map_back_to_input_order() {
        // Later jobs finish first; output order must still match input order.
        let jobs: Vec<_> = (0..5u64)
            .map(|i| async move {
                tokio::time::sleep(Duration::from_millis(50 - i * 10)).await;
                i
            })
            .collect();
        let out = run_limited(jobs, 3).await;
        assert_eq!(out, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_limit() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let jobs: Vec<_> = (0..8)
            .map(|_| {
                let active = active.clone();
                let peak = peak.clone();
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    active.fetch_sub(1, Ordering::SeqCst);
                }
            })
            .collect();
        run_limited(jobs, 2).await;
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn budget_admits_exactly_total() {
        let mut b = CycleBudget::new(3);
        assert!(b.admit());
        assert!(b.admit());
        assert!(b.admit());
        assert!(!b.admit());
        assert!(b.exhausted());
        assert_eq!(b.spent(), 3);
    }
}
