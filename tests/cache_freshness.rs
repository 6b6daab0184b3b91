// tests/cache_freshness.rs
use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use trend_reservoir::providers::DiscoveryProvider;
use trend_reservoir::types::{DiscoveryItem, ProviderKind};
use trend_reservoir::{build_reservoir_with, DiscoveryConfig};

struct CountingProvider {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl DiscoveryProvider for CountingProvider {
    async fn fetch(&self, _limit: usize) -> Result<Vec<DiscoveryItem>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![DiscoveryItem {
            id: format!("call-{n}"),
            text: format!("payload from call {n}"),
            lang: None,
            source: ProviderKind::Hn,
            url: format!("https://count.test/{n}"),
            ts: 0,
            meta: None,
        }])
    }
    fn kind(&self) -> ProviderKind {
        ProviderKind::Hn
    }
}

fn cfg_with(dir: &std::path::Path, ttl_hours: f64, nocache: bool) -> DiscoveryConfig {
    DiscoveryConfig {
        state_dir: dir.to_path_buf(),
        cache_ttl_hours: ttl_hours,
        nocache,
        retry_attempts: 1,
        ..DiscoveryConfig::default()
    }
}

#[tokio::test]
async fn second_cycle_within_ttl_is_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = cfg_with(dir.path(), 12.0, false);
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let provider: Box<dyn DiscoveryProvider> = Box::new(CountingProvider {
            calls: calls.clone(),
        });
        let rows = build_reservoir_with(&[provider], &cfg, 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "payload from call 0");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn nocache_forces_a_fresh_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let cfg = cfg_with(dir.path(), 12.0, true);
        let provider: Box<dyn DiscoveryProvider> = Box::new(CountingProvider {
            calls: calls.clone(),
        });
        build_reservoir_with(&[provider], &cfg, 10).await.unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn zero_ttl_disables_caching() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = cfg_with(dir.path(), 0.0, false);
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let provider: Box<dyn DiscoveryProvider> = Box::new(CountingProvider {
            calls: calls.clone(),
        });
        build_reservoir_with(&[provider], &cfg, 10).await.unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
