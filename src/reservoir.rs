// src/reservoir.rs
//! One ingestion cycle: scheduler fans provider fetches out through the
//! resilience wrapper, the budget caps merged volume, the normalizer cleans
//! and collapses duplicates, and the cache layer persists the cycle so runs
//! within the same TTL window reuse it.

use anyhow::Result;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use std::time::Instant;

use crate::cache::{reservoir_cache_key, today_utc, with_cache_ttl};
use crate::config::DiscoveryConfig;
use crate::health::{HealthLedger, ProviderHealthRecord};
use crate::normalize::{dedupe_by_url_and_similarity, is_denied, normalize_text};
use crate::providers::{build_providers, DiscoveryProvider};
use crate::resilience::{retry_with_backoff, Breaker};
use crate::scheduler::{run_limited, CycleBudget};
use crate::types::{DiscoveryItem, ReservoirRow};

/// One-time metrics registration (so series show up on scrape).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "discover_items_total",
            "Raw items fetched from providers before budget/dedup."
        );
        describe_counter!(
            "discover_kept_total",
            "Items kept after budget, normalization and dedup."
        );
        describe_counter!(
            "discover_denied_total",
            "Items dropped by the text denylist."
        );
        describe_counter!(
            "discover_dedup_total",
            "Items removed as URL or near-duplicates."
        );
        describe_counter!(
            "discover_budget_dropped_total",
            "Items dropped because the cycle budget was exhausted."
        );
        describe_counter!(
            "discover_provider_errors_total",
            "Provider fetches that failed after retries."
        );
        describe_counter!("discover_cache_hits_total", "Cycles served from cache.");
        describe_histogram!("discover_fetch_ms", "Per-provider fetch time in milliseconds.");
        describe_gauge!(
            "discover_last_run_ts",
            "Unix ts when an ingestion cycle last ran."
        );
    });
}

/// Fetch from every provider (bounded concurrency, retry + breaker), record
/// health, then merge, budget-cap, normalize, denylist-filter and dedupe.
async fn ingest_cycle(
    providers: &[Box<dyn DiscoveryProvider>],
    cfg: &DiscoveryConfig,
    ledger: &HealthLedger,
) -> Result<Vec<DiscoveryItem>> {
    let jobs: Vec<_> = providers
        .iter()
        .map(|provider| async move {
            let name = provider.kind().as_str();
            let t0 = Instant::now();
            let mut breaker = Breaker::new(cfg.breaker_threshold);
            let mut last_err: Option<String> = None;
            let fetched = breaker
                .run(name, async {
                    retry_with_backoff(cfg.retry_attempts, cfg.retry_base, || {
                        provider.fetch(cfg.limit_per_provider)
                    })
                    .await
                    .inspect_err(|e| last_err = Some(format!("{e:#}")))
                })
                .await;
            let duration_ms = t0.elapsed().as_millis() as u64;
            histogram!("discover_fetch_ms").record(duration_ms as f64);
            match fetched {
                Some(items) => {
                    let health = ProviderHealthRecord::success(items.len(), duration_ms);
                    (items, health)
                }
                None => {
                    counter!("discover_provider_errors_total").increment(1);
                    let health = ProviderHealthRecord::failure(
                        last_err.unwrap_or_else(|| "breaker open".to_string()),
                        duration_ms,
                    );
                    (Vec::new(), health)
                }
            }
        })
        .collect();

    // Output order matches provider order even though completion interleaves.
    let results = run_limited(jobs, cfg.concurrency).await;

    let mut budget = CycleBudget::new(cfg.budget);
    let mut merged: Vec<DiscoveryItem> = Vec::new();
    let mut raw_total = 0usize;
    let mut denied = 0usize;

    for (provider, (items, health)) in providers.iter().zip(results) {
        let name = provider.kind().as_str();
        if let Err(e) = ledger.record(name, health) {
            tracing::warn!(target: "discover", provider = name, error = %e, "health write failed");
        }
        raw_total += items.len();
        for mut item in items {
            if !budget.admit() {
                continue;
            }
            item.text = normalize_text(&item.text);
            if item.text.is_empty() {
                continue;
            }
            if is_denied(&item.text, &cfg.text_denylist) {
                denied += 1;
                continue;
            }
            merged.push(item);
        }
    }
    let budget_dropped = raw_total.saturating_sub(budget.spent());

    let before_dedup = merged.len();
    let merged = dedupe_by_url_and_similarity(merged, cfg.similarity_threshold);
    let dedup_dropped = before_dedup - merged.len();

    counter!("discover_items_total").increment(raw_total as u64);
    counter!("discover_kept_total").increment(merged.len() as u64);
    counter!("discover_denied_total").increment(denied as u64);
    counter!("discover_dedup_total").increment(dedup_dropped as u64);
    counter!("discover_budget_dropped_total").increment(budget_dropped as u64);
    gauge!("discover_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

    tracing::info!(
        target: "discover",
        raw = raw_total,
        kept = merged.len(),
        denied,
        dedup = dedup_dropped,
        budget_dropped,
        "ingestion cycle"
    );
    Ok(merged)
}

/// Run a cache-aware ingestion cycle over the given providers and return at
/// most `limit` reservoir rows. Test seam and extension point; production
/// callers use [`build_reservoir`].
pub async fn build_reservoir_with(
    providers: &[Box<dyn DiscoveryProvider>],
    cfg: &DiscoveryConfig,
    limit: usize,
) -> Result<Vec<ReservoirRow>> {
    ensure_metrics_described();

    let ledger = HealthLedger::new(&cfg.state_dir);
    let kinds: Vec<_> = providers.iter().map(|p| p.kind()).collect();
    let key = reservoir_cache_key(&kinds, today_utc());
    let ttl_hours = if cfg.nocache { 0.0 } else { cfg.cache_ttl_hours };

    let items = with_cache_ttl(&cfg.state_dir, &key, ttl_hours, || {
        ingest_cycle(providers, cfg, &ledger)
    })
    .await?;

    let rows: Vec<ReservoirRow> = items.iter().take(limit).map(ReservoirRow::from).collect();
    tracing::info!(
        target: "discover",
        providers = %kinds.iter().map(|k| k.as_str()).collect::<Vec<_>>().join("+"),
        rows = rows.len(),
        "reservoir built"
    );
    Ok(rows)
}

/// Resolve the configured provider registry and build the reservoir.
pub async fn build_reservoir(cfg: &DiscoveryConfig, limit: usize) -> Result<Vec<ReservoirRow>> {
    let providers = build_providers(cfg);
    build_reservoir_with(&providers, cfg, limit).await
}
