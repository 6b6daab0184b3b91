// src/config.rs
//! Env-driven configuration for the discovery pipeline. Every option has a
//! default so a bare environment still runs (reddit+hn, cached, budgeted).

use std::path::PathBuf;
use std::time::Duration;

use crate::types::ProviderKind;

pub const ENV_PROVIDERS: &str = "DISCOVER_PROVIDERS";
pub const ENV_LIMIT_PER_PROVIDER: &str = "DISCOVER_LIMIT_PER_PROVIDER";
pub const ENV_CONCURRENCY: &str = "DISCOVER_CONCURRENCY";
pub const ENV_BUDGET: &str = "DISCOVER_BUDGET";
pub const ENV_CACHE_TTL_HOURS: &str = "DISCOVER_CACHE_TTL_HOURS";
pub const ENV_NOCACHE: &str = "DISCOVER_NOCACHE";
pub const ENV_BREAKER_THRESHOLD: &str = "DISCOVER_BREAKER_THRESHOLD";
pub const ENV_RETRY_ATTEMPTS: &str = "DISCOVER_RETRY_ATTEMPTS";
pub const ENV_RETRY_BASE_MS: &str = "DISCOVER_RETRY_BASE_MS";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "DISCOVER_FETCH_TIMEOUT_SECS";
pub const ENV_STATE_DIR: &str = "DISCOVER_STATE_DIR";
pub const ENV_SIMILARITY_THRESHOLD: &str = "DISCOVER_SIMILARITY_THRESHOLD";
pub const ENV_EMOJI_DENYLIST: &str = "EMOJI_DENYLIST";
pub const ENV_TEXT_DENYLIST: &str = "TEXT_DENYLIST";
pub const ENV_REDDIT_SUBS: &str = "REDDIT_SUBS";
pub const ENV_RSS_FEEDS: &str = "RSS_FEEDS";
pub const ENV_YT_API_KEY: &str = "YT_API_KEY";
pub const ENV_YT_QUERY: &str = "YT_QUERY";
pub const ENV_TRENDS_GEO: &str = "TRENDS_GEO";
pub const ENV_TRENDS_HL: &str = "TRENDS_HL";
pub const ENV_TRENDS_TZ: &str = "TRENDS_TZ";
pub const ENV_TRENDS_SEEDS: &str = "TRENDS_SEEDS";
pub const ENV_TRENDS_MIN_GROWTH: &str = "TRENDS_MIN_GROWTH";
pub const ENV_WATCHLIST_MAX: &str = "TRENDS_WATCHLIST_MAX";

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Which provider adapters run this cycle, in configured order.
    pub providers: Vec<ProviderKind>,
    pub limit_per_provider: usize,
    pub concurrency: usize,
    /// Total item cap per cycle. Defaults to providers × per-provider limit.
    pub budget: usize,
    /// Hours; `0` disables caching entirely.
    pub cache_ttl_hours: f64,
    /// Force a fresh cycle even when a cached entry is still young.
    pub nocache: bool,
    pub breaker_threshold: u32,
    pub retry_attempts: u32,
    pub retry_base: Duration,
    pub fetch_timeout: Duration,
    pub state_dir: PathBuf,
    pub similarity_threshold: f64,
    pub emoji_denylist: Vec<String>,
    pub text_denylist: Vec<String>,
    pub reddit_subs: Vec<String>,
    pub rss_feeds: Vec<String>,
    pub yt_api_key: Option<String>,
    pub yt_query: String,
    pub trends_geo: String,
    pub trends_hl: String,
    pub trends_tz: String,
    pub trend_seeds: Vec<String>,
    pub min_growth: f64,
    pub watchlist_max: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        let providers = vec![ProviderKind::Reddit, ProviderKind::Hn];
        let limit_per_provider = 100;
        Self {
            budget: providers.len() * limit_per_provider,
            providers,
            limit_per_provider,
            concurrency: 3,
            cache_ttl_hours: 12.0,
            nocache: false,
            breaker_threshold: 3,
            retry_attempts: crate::resilience::DEFAULT_RETRY_ATTEMPTS,
            retry_base: Duration::from_millis(crate::resilience::DEFAULT_RETRY_BASE_MS),
            fetch_timeout: Duration::from_secs(10),
            state_dir: PathBuf::from("data/discovery"),
            similarity_threshold: 0.92,
            emoji_denylist: Vec::new(),
            text_denylist: Vec::new(),
            reddit_subs: split_list("brasil,ProgrammerHumor,explainlikeimfive"),
            rss_feeds: Vec::new(),
            yt_api_key: None,
            yt_query: "emoji meaning".to_string(),
            trends_geo: "US".to_string(),
            trends_hl: "en-US".to_string(),
            trends_tz: "0".to_string(),
            trend_seeds: Vec::new(),
            min_growth: 50.0,
            watchlist_max: 50,
        }
    }
}

impl DiscoveryConfig {
    /// Build from environment variables, falling back to defaults per field.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(raw) = std::env::var(ENV_PROVIDERS) {
            let parsed = parse_provider_list(&raw);
            if !parsed.is_empty() {
                cfg.providers = parsed;
            }
        }
        cfg.limit_per_provider =
            env_parse(ENV_LIMIT_PER_PROVIDER, cfg.limit_per_provider).clamp(1, 500);
        cfg.concurrency = env_parse(ENV_CONCURRENCY, cfg.concurrency).clamp(1, 32);
        cfg.budget = env_parse(
            ENV_BUDGET,
            cfg.providers.len().max(1) * cfg.limit_per_provider,
        )
        .max(1);
        cfg.cache_ttl_hours = env_parse(ENV_CACHE_TTL_HOURS, cfg.cache_ttl_hours).max(0.0);
        cfg.nocache = env_flag(ENV_NOCACHE);
        cfg.breaker_threshold = env_parse(ENV_BREAKER_THRESHOLD, cfg.breaker_threshold).max(1);
        cfg.retry_attempts = env_parse(ENV_RETRY_ATTEMPTS, cfg.retry_attempts).clamp(1, 10);
        cfg.retry_base =
            Duration::from_millis(env_parse(ENV_RETRY_BASE_MS, cfg.retry_base.as_millis() as u64));
        cfg.fetch_timeout = Duration::from_secs(
            env_parse(ENV_FETCH_TIMEOUT_SECS, cfg.fetch_timeout.as_secs()).clamp(1, 120),
        );
        if let Ok(dir) = std::env::var(ENV_STATE_DIR) {
            if !dir.trim().is_empty() {
                cfg.state_dir = PathBuf::from(dir.trim());
            }
        }
        cfg.similarity_threshold =
            env_parse(ENV_SIMILARITY_THRESHOLD, cfg.similarity_threshold).clamp(0.0, 1.0);
        cfg.emoji_denylist = env_list(ENV_EMOJI_DENYLIST);
        cfg.text_denylist = env_list(ENV_TEXT_DENYLIST);
        if let Ok(subs) = std::env::var(ENV_REDDIT_SUBS) {
            let subs = split_list(&subs);
            if !subs.is_empty() {
                cfg.reddit_subs = subs;
            }
        }
        cfg.rss_feeds = env_list(ENV_RSS_FEEDS);
        cfg.yt_api_key = std::env::var(ENV_YT_API_KEY)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if let Ok(q) = std::env::var(ENV_YT_QUERY) {
            if !q.trim().is_empty() {
                cfg.yt_query = q.trim().to_string();
            }
        }
        if let Ok(geo) = std::env::var(ENV_TRENDS_GEO) {
            if !geo.trim().is_empty() {
                cfg.trends_geo = geo.trim().to_string();
            }
        }
        if let Ok(hl) = std::env::var(ENV_TRENDS_HL) {
            if !hl.trim().is_empty() {
                cfg.trends_hl = hl.trim().to_string();
            }
        }
        if let Ok(tz) = std::env::var(ENV_TRENDS_TZ) {
            if !tz.trim().is_empty() {
                cfg.trends_tz = tz.trim().to_string();
            }
        }
        cfg.trend_seeds = env_list(ENV_TRENDS_SEEDS);
        cfg.min_growth = env_parse(ENV_TRENDS_MIN_GROWTH, cfg.min_growth);
        cfg.watchlist_max = env_parse(ENV_WATCHLIST_MAX, cfg.watchlist_max).max(1);

        cfg
    }
}

/// Parse the comma-separated provider list, skipping unknown names with a
/// warning and deduplicating while preserving configured order.
pub fn parse_provider_list(raw: &str) -> Vec<ProviderKind> {
    let mut out = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match ProviderKind::parse(part) {
            Some(kind) if !out.contains(&kind) => out.push(kind),
            Some(_) => {}
            None => tracing::warn!(target: "discover", provider = part, "unknown provider, skipping"),
        }
    }
    out
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn env_list(name: &str) -> Vec<String> {
    std::env::var(name).map(|v| split_list(&v)).unwrap_or_default()
}

fn env_flag(name: &str) -> bool {
    matches!(
        std::env::var(name).unwrap_or_default().trim(),
        "1" | "true" | "TRUE" | "yes"
    )
}

fn env_parse<T: std::str::FromStr>(name: &str, fallback: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_list_dedups_and_skips_unknown() {
        let out = parse_provider_list("reddit, hn, reddit, gopher, rss");
        assert_eq!(
            out,
            vec![ProviderKind::Reddit, ProviderKind::Hn, ProviderKind::Rss]
        );
    }

    #[test]
    fn split_list_trims_and_drops_empty() {
        assert_eq!(split_list(" a ,, b ,"), vec!["a".to_string(), "b".into()]);
        assert!(split_list("").is_empty());
    }

    #[serial_test::serial]
    #[test]
    fn from_env_overrides_and_defaults() {
        std::env::remove_var(ENV_PROVIDERS);
        std::env::remove_var(ENV_BUDGET);
        std::env::remove_var(ENV_NOCACHE);
        std::env::remove_var(ENV_CACHE_TTL_HOURS);

        let cfg = DiscoveryConfig::from_env();
        assert_eq!(cfg.providers, vec![ProviderKind::Reddit, ProviderKind::Hn]);
        assert_eq!(cfg.budget, 200);
        assert!(!cfg.nocache);

        std::env::set_var(ENV_PROVIDERS, "hn,trends");
        std::env::set_var(ENV_LIMIT_PER_PROVIDER, "40");
        std::env::set_var(ENV_NOCACHE, "true");
        std::env::set_var(ENV_CACHE_TTL_HOURS, "0");
        let cfg = DiscoveryConfig::from_env();
        assert_eq!(cfg.providers, vec![ProviderKind::Hn, ProviderKind::Trends]);
        assert_eq!(cfg.limit_per_provider, 40);
        assert_eq!(cfg.budget, 80);
        assert!(cfg.nocache);
        assert_eq!(cfg.cache_ttl_hours, 0.0);

        std::env::remove_var(ENV_PROVIDERS);
        std::env::remove_var(ENV_LIMIT_PER_PROVIDER);
        std::env::remove_var(ENV_NOCACHE);
        std::env::remove_var(ENV_CACHE_TTL_HOURS);
    }
}
