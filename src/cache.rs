// src/cache.rs
//! Time-keyed, TTL-gated persistence of a completed fetch cycle's output.
//!
//! Freshness is derived from the stored file's modification time; a missing
//! or corrupt entry is a miss and is recomputed. The reservoir key carries
//! the provider set plus the UTC calendar date, so a new key is minted once
//! per day and cycles within the same day reuse results unless bypassed.

use anyhow::Result;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::store;
use crate::types::ProviderKind;

/// Cache key for one reservoir cycle: provider set + UTC date.
pub fn reservoir_cache_key(providers: &[ProviderKind], date: chrono::NaiveDate) -> String {
    let mut names: Vec<&str> = providers.iter().map(|p| p.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    format!("reservoir-{}-{}.json", names.join("+"), date.format("%Y-%m-%d"))
}

pub fn today_utc() -> chrono::NaiveDate {
    Utc::now().date_naive()
}

fn entry_age(path: &Path) -> Option<std::time::Duration> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    SystemTime::now().duration_since(modified).ok()
}

/// Serve `key` from `dir` while the stored entry is younger than
/// `ttl_hours`; otherwise call `producer`, store its output, and return it.
/// `ttl_hours <= 0` bypasses the cache entirely.
pub async fn with_cache_ttl<T, F, Fut>(
    dir: &Path,
    key: &str,
    ttl_hours: f64,
    producer: F,
) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if ttl_hours <= 0.0 {
        return producer().await;
    }
    let file: PathBuf = dir.join(key);
    if let Some(age) = entry_age(&file) {
        if age.as_secs_f64() < ttl_hours * 3600.0 {
            if let Some(v) = store::read_json::<T>(&file) {
                metrics::counter!("discover_cache_hits_total").increment(1);
                return Ok(v);
            }
        }
    }
    let fresh = producer().await?;
    store::write_json_atomic(&file, &fresh)?;
    Ok(fresh)
}
