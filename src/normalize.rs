// src/normalize.rs
//! Text cleanup, denylist filtering, and duplicate collapsing for merged
//! provider output.

use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::HashSet;

use crate::types::DiscoveryItem;

/// Maximum row text length after normalization. Bounds memory per row.
pub const MAX_TEXT_LEN: usize = 240;

/// Normalize text: decode HTML entities, strip markup, collapse whitespace,
/// trim, cap length.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > MAX_TEXT_LEN {
        out = out.chars().take(MAX_TEXT_LEN).collect();
    }
    out
}

/// Case-insensitive substring match against the configured banned list.
pub fn is_denied(text: &str, denylist: &[String]) -> bool {
    if denylist.is_empty() {
        return false;
    }
    let lower = text.to_lowercase();
    denylist
        .iter()
        .any(|d| !d.is_empty() && lower.contains(&d.to_lowercase()))
}

/// Naive language hint: common Portuguese accents mark `pt`, otherwise `en`.
pub fn detect_lang(text: &str) -> &'static str {
    static RE_PT: OnceCell<Regex> = OnceCell::new();
    let re = RE_PT.get_or_init(|| Regex::new(r"(?i)[áéíóúãõâêôç]").unwrap());
    if re.is_match(text) {
        "pt"
    } else {
        "en"
    }
}

fn word_set(s: &str) -> HashSet<String> {
    static RE_SPLIT: OnceCell<Regex> = OnceCell::new();
    let re = RE_SPLIT.get_or_init(|| Regex::new(r"\W+").unwrap());
    re.split(&s.to_lowercase())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// Symmetric word-set Jaccard similarity: intersection over union of
/// lowercased non-word-split tokens.
pub fn similarity(a: &str, b: &str) -> f64 {
    let sa = word_set(a);
    let sb = word_set(b);
    let inter = sa.intersection(&sb).count();
    let union = sa.len() + sb.len() - inter;
    if union == 0 {
        0.0
    } else {
        inter as f64 / union as f64
    }
}

/// Two-stage dedup: drop exact-URL repeats via a seen-set, then drop rows
/// whose text is near-duplicate (similarity >= threshold) of any already
/// accepted row. Quadratic in survivors; per-cycle volume is budget-bounded.
pub fn dedupe_by_url_and_similarity(
    items: Vec<DiscoveryItem>,
    sim_threshold: f64,
) -> Vec<DiscoveryItem> {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut out: Vec<DiscoveryItem> = Vec::with_capacity(items.len());
    for it in items {
        if seen_urls.contains(&it.url) {
            continue;
        }
        if out
            .iter()
            .any(|o| similarity(&it.text, &o.text) >= sim_threshold)
        {
            continue;
        }
        seen_urls.insert(it.url.clone());
        out.push(it);
    }
    out
}
