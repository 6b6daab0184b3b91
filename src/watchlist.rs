// src/watchlist.rs
//! Stateful promotion of rising search terms into a durable watchlist.
//!
//! For each configured seed keyword the trend explorer is asked for rising
//! queries once per cache TTL window. A query is promoted when its growth
//! against the median of its recent score history (or its absolute score)
//! clears the threshold, and it reads like an "X meaning" lookup for an
//! emoji or acronym. The watchlist is capped; oldest entries go first.

use anyhow::Result;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::cache::with_cache_ttl;
use crate::config::DiscoveryConfig;
use crate::extract::emoji::extract_emojis;
use crate::providers::trends::TrendsProvider;
use crate::providers::DiscoveryProvider;
use crate::store;

/// How many historical raw scores feed the growth median.
const SCORE_HISTORY: usize = 4;

/// Absolute score that promotes regardless of growth.
const HOT_SCORE: f64 = 70.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchlistState {
    /// Insertion-ordered promoted terms, capped at the configured maximum.
    #[serde(default)]
    pub watchlist: Vec<String>,
    /// Term → date (YYYY-MM-DD) it was last promoted or refreshed.
    #[serde(default)]
    pub last_seen: HashMap<String, String>,
    /// Term → its last few raw scores, newest last.
    #[serde(default)]
    pub seen_scores: HashMap<String, Vec<f64>>,
}

/// Outcome of one promotion cycle, for logging and callers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchlistReport {
    pub promoted: Vec<String>,
    pub evaluated: usize,
    pub evicted: usize,
    pub fallback_used: bool,
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Growth of `score` against the median of the term's prior scores, in
/// percent. With no history the raw score stands in for growth.
pub fn growth_against_history(score: f64, history: &[f64]) -> f64 {
    if history.is_empty() {
        return score;
    }
    let prev = median(history);
    (score - prev) / prev.max(1.0) * 100.0
}

/// Intent filter: the query must read like an "X meaning" lookup where X is
/// an emoji or an acronym-shaped token.
pub fn is_meaning_intent(query: &str) -> bool {
    let lower = query.trim().to_lowercase();
    let Some(subject) = lower
        .strip_suffix("meanings")
        .or_else(|| lower.strip_suffix("meaning"))
    else {
        return false;
    };
    let subject = subject.trim();
    let subject = subject.strip_suffix("emoji").unwrap_or(subject).trim();
    if subject.is_empty() {
        return false;
    }
    if !extract_emojis(subject).is_empty() {
        return true;
    }
    static RE_ACRONYM: OnceCell<Regex> = OnceCell::new();
    let re = RE_ACRONYM.get_or_init(|| Regex::new(r"^[a-z]{2,5}$").unwrap());
    re.is_match(subject)
}

#[derive(Debug)]
pub struct TrendWatchlist {
    path: PathBuf,
    state: WatchlistState,
}

impl TrendWatchlist {
    pub fn load(state_dir: &Path) -> Self {
        let path = state_dir.join("trend-watchlist.json");
        let state = store::read_json(&path).unwrap_or_default();
        Self { path, state }
    }

    pub fn state(&self) -> &WatchlistState {
        &self.state
    }

    pub fn flush(&self) -> Result<()> {
        store::write_json_atomic(&self.path, &self.state)
    }

    /// Append a term if absent; refresh its last-seen date either way.
    fn admit(&mut self, term: &str, today: &str) -> bool {
        let fresh = !self.state.watchlist.iter().any(|t| t == term);
        if fresh {
            self.state.watchlist.push(term.to_string());
        }
        self.state.last_seen.insert(term.to_string(), today.to_string());
        fresh
    }

    /// Evict oldest entries until the cap holds. Returns how many went.
    fn enforce_cap(&mut self, max: usize) -> usize {
        let mut evicted = 0;
        while self.state.watchlist.len() > max {
            let old = self.state.watchlist.remove(0);
            self.state.last_seen.remove(&old);
            evicted += 1;
        }
        evicted
    }

    fn push_score(&mut self, term: &str, score: f64) {
        let h = self.state.seen_scores.entry(term.to_string()).or_default();
        h.push(score);
        if h.len() > SCORE_HISTORY {
            let drop = h.len() - SCORE_HISTORY;
            h.drain(..drop);
        }
    }

    /// One promotion cycle over the configured seeds. Zero seeds, or zero
    /// rising results across all seeds, falls back to the unfiltered daily
    /// trending feed so the signal is never starved.
    pub async fn run_cycle(
        &mut self,
        trends: &TrendsProvider,
        cfg: &DiscoveryConfig,
        today: &str,
    ) -> Result<WatchlistReport> {
        let mut report = WatchlistReport::default();

        for seed in &cfg.trend_seeds {
            let key = format!("rising-{}.json", sanitize_key(seed));
            let rising = match with_cache_ttl(&cfg.state_dir, &key, cfg.cache_ttl_hours, || {
                trends.rising_queries(seed)
            })
            .await
            {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(target: "discover", seed = %seed, error = %e, "rising queries failed");
                    continue;
                }
            };

            for rq in rising {
                report.evaluated += 1;
                let history = self
                    .state
                    .seen_scores
                    .get(&rq.query)
                    .cloned()
                    .unwrap_or_default();
                let growth = growth_against_history(rq.value, &history);
                self.push_score(&rq.query, rq.value);

                let hot = growth >= cfg.min_growth || rq.value >= HOT_SCORE;
                if hot && is_meaning_intent(&rq.query) && self.admit(&rq.query, today) {
                    report.promoted.push(rq.query);
                }
            }
        }

        if cfg.trend_seeds.is_empty() || report.evaluated == 0 {
            report.fallback_used = true;
            match trends.fetch(cfg.limit_per_provider).await {
                Ok(rows) => {
                    for item in rows {
                        if self.admit(&item.text, today) {
                            report.promoted.push(item.text);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(target: "discover", error = %e, "trending fallback failed");
                }
            }
        }

        report.evicted = self.enforce_cap(cfg.watchlist_max);
        self.flush()?;

        tracing::info!(
            target: "discover",
            evaluated = report.evaluated,
            promoted = report.promoted.len(),
            evicted = report.evicted,
            fallback = report.fallback_used,
            size = self.state.watchlist.len(),
            "watchlist cycle"
        );
        Ok(report)
    }
}

fn sanitize_key(seed: &str) -> String {
    seed.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}
