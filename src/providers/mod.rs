// src/providers/mod.rs
pub mod hn;
pub mod reddit;
pub mod rss;
pub mod trends;
pub mod youtube;

use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::config::DiscoveryConfig;
use crate::types::{DiscoveryItem, ProviderKind};

/// One external data source. Adapters are individually fallible; callers
/// treat a failed fetch as retryable, never fatal. Malformed entries inside
/// a successfully fetched payload are skipped, not escalated.
#[async_trait::async_trait]
pub trait DiscoveryProvider: Send + Sync {
    /// Fetch a bounded batch of raw items, normalized to `DiscoveryItem`.
    async fn fetch(&self, limit: usize) -> Result<Vec<DiscoveryItem>>;
    fn kind(&self) -> ProviderKind;
}

/// Shared HTTP client for all adapters. The explicit request timeout is the
/// only cancellation mechanism a hung provider call has.
pub fn build_client(cfg: &DiscoveryConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("trend-reservoir/0.1")
        .timeout(cfg.fetch_timeout)
        .build()
        .unwrap_or_default()
}

/// Resolve the configured provider set into adapter instances. Resolution
/// happens once per cycle; the enum is the single switch point.
pub fn build_providers(cfg: &DiscoveryConfig) -> Vec<Box<dyn DiscoveryProvider>> {
    let client = build_client(cfg);
    cfg.providers
        .iter()
        .map(|kind| -> Box<dyn DiscoveryProvider> {
            match kind {
                ProviderKind::Reddit => Box::new(reddit::RedditProvider::from_http(
                    client.clone(),
                    cfg.reddit_subs.clone(),
                    cfg.breaker_threshold,
                )),
                ProviderKind::Hn => Box::new(hn::HnProvider::from_http(client.clone())),
                ProviderKind::Trends => Box::new(trends::TrendsProvider::from_http(
                    client.clone(),
                    trends::TrendsLocale {
                        geo: cfg.trends_geo.clone(),
                        hl: cfg.trends_hl.clone(),
                        tz: cfg.trends_tz.clone(),
                    },
                )),
                ProviderKind::Youtube => Box::new(youtube::YoutubeProvider::from_http(
                    client.clone(),
                    cfg.yt_api_key.clone(),
                    cfg.yt_query.clone(),
                )),
                ProviderKind::Rss => Box::new(rss::RssProvider::from_http(
                    client.clone(),
                    cfg.rss_feeds.clone(),
                    cfg.breaker_threshold,
                )),
            }
        })
        .collect()
}

/// Stable fallback id for sources without a native one: short hash of the URL.
pub(crate) fn url_id(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(16);
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
