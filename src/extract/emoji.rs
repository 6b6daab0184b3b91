// src/extract/emoji.rs
//! Emoji extraction: pictographic code points counted across the reservoir,
//! with an evergreen dampening factor so ubiquitous emoji don't permanently
//! own the ranking.

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::collections::HashSet;

use crate::extract::Counts;
use crate::types::{EmojiCandidate, ReservoirRow};

/// Single code points plus an optional trailing variation selector. ZWJ
/// sequences decompose into their parts; acceptable for frequency counting.
fn emoji_regex() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:\p{Emoji_Presentation}|\p{Extended_Pictographic})\x{FE0F}?").unwrap()
    })
}

/// Ubiquitous emoji whose raw counts get dampened ×0.8.
static EVERGREEN: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["❤️", "❤", "😂", "🤣", "😍"].into_iter().collect());

/// At most this many emoji are counted per row; one spammy row should not
/// dominate the cycle.
const MAX_PER_ROW: usize = 6;

pub fn extract_emojis(text: &str) -> Vec<&str> {
    emoji_regex().find_iter(text).map(|m| m.as_str()).collect()
}

/// Count emoji across the reservoir, drop denylisted terms, dampen
/// evergreens, and return the top `top_n` by score (descending).
pub fn extract_emoji_candidates(
    reservoir: &[ReservoirRow],
    top_n: usize,
    denylist: &[String],
) -> Vec<EmojiCandidate> {
    let mut counts = Counts::new();
    for row in reservoir {
        for m in extract_emojis(&row.text).into_iter().take(MAX_PER_ROW) {
            counts.entry(m.to_string()).or_default().bump(&row.url);
        }
    }
    for d in denylist {
        counts.remove(d.trim());
    }

    let mut out: Vec<EmojiCandidate> = counts
        .into_iter()
        .map(|(emoji, v)| {
            let factor = if EVERGREEN.contains(emoji.as_str()) {
                0.8
            } else {
                1.0
            };
            EmojiCandidate {
                term: format!("{emoji} emoji meaning"),
                emoji,
                freq: v.hits,
                score: (v.hits as f64 * factor).round(),
                evidence: v.urls,
            }
        })
        .collect();
    out.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.emoji.cmp(&b.emoji))
    });
    out.truncate(top_n);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(text: &str, url: &str) -> ReservoirRow {
        ReservoirRow {
            text: text.to_string(),
            url: url.to_string(),
            lang: None,
            created_at: None,
        }
    }

    #[test]
    fn denylist_removes_terms_entirely() {
        let rows = vec![
            row("😂 so funny 😂", "https://a.test/1"),
            row("love this ❤️", "https://a.test/2"),
            row("more ❤️ and ❤️", "https://a.test/3"),
        ];
        let deny = vec!["😂".to_string()];
        let out = extract_emoji_candidates(&rows, 20, &deny);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].emoji, "❤️");
        assert_eq!(out[0].freq, 3);
        // evergreen dampening: round(3 * 0.8) = 2
        assert_eq!(out[0].score, 2.0);
        assert!(out.iter().all(|c| c.emoji != "😂"));
    }

    #[test]
    fn counts_cap_per_row_and_keep_three_evidence_urls() {
        let spam = "🪿".repeat(20);
        let rows = vec![
            row(&spam, "https://a.test/1"),
            row("🪿", "https://a.test/2"),
            row("🪿 again", "https://a.test/3"),
            row("🪿 more", "https://a.test/4"),
        ];
        let out = extract_emoji_candidates(&rows, 20, &[]);
        assert_eq!(out[0].emoji, "🪿");
        assert_eq!(out[0].freq, MAX_PER_ROW + 3);
        assert_eq!(out[0].evidence.len(), 3);
    }

    #[test]
    fn sorted_descending_and_truncated() {
        let rows = vec![
            row("🦆 🦆 🦆", "https://a.test/1"),
            row("🪿", "https://a.test/2"),
            row("🎃 🎃", "https://a.test/3"),
        ];
        let out = extract_emoji_candidates(&rows, 2, &[]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].emoji, "🦆");
        assert_eq!(out[1].emoji, "🎃");
    }

    #[test]
    fn term_is_a_meaning_query() {
        let rows = vec![row("🪿", "https://a.test/1")];
        let out = extract_emoji_candidates(&rows, 5, &[]);
        assert_eq!(out[0].term, "🪿 emoji meaning");
    }
}
