// src/extract/acronyms.rs
//! Acronym extraction: whole words of 2-5 consecutive uppercase letters,
//! minus a stoplist of abbreviations everybody already knows.

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::collections::HashSet;

use crate::extract::Counts;
use crate::types::{Candidate, ReservoirRow};

fn acronym_regex() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Z]{2,5}\b").unwrap())
}

static STOPLIST: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "USA", "HTTP", "CPU", "GPU", "API", "WWW", "COVID", "NASA", "FBI", "CIA", "UK", "EU",
        "NBA", "FIFA", "UFC", "SSN", "DOB", "ETA", "DIY",
    ]
    .into_iter()
    .collect()
});

/// Count acronym hits across the reservoir and return the top `top_n` by
/// raw frequency (descending).
pub fn extract_acronym_candidates(reservoir: &[ReservoirRow], top_n: usize) -> Vec<Candidate> {
    let mut counts = Counts::new();
    for row in reservoir {
        for m in acronym_regex().find_iter(&row.text) {
            let tok = m.as_str();
            if STOPLIST.contains(tok) {
                continue;
            }
            counts.entry(tok.to_string()).or_default().bump(&row.url);
        }
    }

    let mut out: Vec<Candidate> = counts
        .into_iter()
        .map(|(term, v)| Candidate {
            term,
            score: v.hits as f64,
            evidence: v.urls,
        })
        .collect();
    out.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.term.cmp(&b.term))
    });
    out.truncate(top_n);
    out
}
