// src/novelty.rs
//! Last-seen store and decay-based freshness scoring. A term surfaced
//! recently is suppressed toward zero and recovers smoothly over about a
//! week; a term never surfaced keeps its full frequency score.

use anyhow::Result;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::extract::emoji::extract_emojis;
use crate::extract::Counts;
use crate::store;
use crate::types::{ReservoirRow, ScoredEmoji};

const SEVEN_DAYS_MS: f64 = 7.0 * 24.0 * 3600.0 * 1000.0;

/// How many ranked terms one scoring pass surfaces (and marks seen).
pub const TOP_SURFACED: usize = 20;

/// Emoji so common that ranking them is never informative.
static COMMON_STOPLIST: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["❤️", "❤", "😂", "🤣", "😍", "😭", "✨", "💕", "🔥", "🙏"]
        .into_iter()
        .collect()
});

/// Term → epoch milliseconds it was last surfaced in a top-N pass.
/// Loaded once, mutated in place, persisted via `flush`.
#[derive(Debug)]
pub struct NoveltyStore {
    path: PathBuf,
    map: HashMap<String, i64>,
}

impl NoveltyStore {
    pub fn load(state_dir: &Path) -> Self {
        let path = state_dir.join("novelty-last-seen.json");
        let map = store::read_json(&path).unwrap_or_default();
        Self { path, map }
    }

    pub fn get(&self, term: &str) -> Option<i64> {
        self.map.get(term).copied()
    }

    pub fn record_seen(&mut self, term: &str, now_ms: i64) {
        self.map.insert(term.to_string(), now_ms);
    }

    pub fn flush(&self) -> Result<()> {
        store::write_json_atomic(&self.path, &self.map)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// `exp(-(now - last_seen) / 7d)` for previously seen terms, else 0.
fn novelty_penalty(last_seen: Option<i64>, now_ms: i64) -> f64 {
    match last_seen {
        Some(last) => (-((now_ms - last) as f64) / SEVEN_DAYS_MS).exp(),
        None => 0.0,
    }
}

/// Decayed score in `[0, freq]`.
pub fn decayed_score(freq: usize, last_seen: Option<i64>, now_ms: i64) -> f64 {
    let score = freq as f64 * (1.0 - novelty_penalty(last_seen, now_ms));
    score.clamp(0.0, freq as f64)
}

/// Rank reservoir emoji by decayed frequency, then mark exactly the surfaced
/// top terms as seen at `now_ms` and flush the store.
pub fn top_emojis_from_reservoir(
    rows: &[ReservoirRow],
    store: &mut NoveltyStore,
    now_ms: i64,
    denylist: &[String],
) -> Result<Vec<ScoredEmoji>> {
    let mut counts = Counts::new();
    for row in rows {
        for m in extract_emojis(&row.text) {
            if COMMON_STOPLIST.contains(m) {
                continue;
            }
            counts.entry(m.to_string()).or_default().bump(&row.url);
        }
    }
    for d in denylist {
        counts.remove(d.trim());
    }

    let unique = counts.len();
    let mut scored: Vec<ScoredEmoji> = counts
        .into_iter()
        .map(|(emoji, v)| {
            let score = decayed_score(v.hits, store.get(&emoji), now_ms);
            ScoredEmoji {
                emoji,
                freq: v.hits,
                score,
            }
        })
        .collect();
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.emoji.cmp(&b.emoji))
    });
    scored.truncate(TOP_SURFACED);

    for e in &scored {
        store.record_seen(&e.emoji, now_ms);
    }
    store.flush()?;

    tracing::info!(
        target: "discover",
        rows = rows.len(),
        unique,
        surfaced = scored.len(),
        "emoji ranking pass"
    );
    Ok(scored)
}
