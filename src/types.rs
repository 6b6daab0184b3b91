// src/types.rs
use serde::{Deserialize, Serialize};

/// External sources the pipeline knows how to ingest from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Reddit,
    Hn,
    Trends,
    Youtube,
    Rss,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Reddit => "reddit",
            ProviderKind::Hn => "hn",
            ProviderKind::Trends => "trends",
            ProviderKind::Youtube => "youtube",
            ProviderKind::Rss => "rss",
        }
    }

    /// Parse one entry of the configured provider list. Unknown names map to `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reddit" => Some(ProviderKind::Reddit),
            "hn" => Some(ProviderKind::Hn),
            "trends" => Some(ProviderKind::Trends),
            "youtube" => Some(ProviderKind::Youtube),
            "rss" => Some(ProviderKind::Rss),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw item produced by a provider adapter. Immutable once created;
/// lives for a single ingestion cycle unless the cycle output is cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryItem {
    /// Provider-scoped stable id (native id where the source has one,
    /// otherwise a content hash of the URL).
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    pub source: ProviderKind,
    pub url: String,
    /// Epoch milliseconds; 0 when the source carries no timestamp.
    pub ts: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

/// What downstream extractors consume: a `DiscoveryItem` with provenance dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservoirRow {
    pub text: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<&DiscoveryItem> for ReservoirRow {
    fn from(it: &DiscoveryItem) -> Self {
        let created_at = (it.ts > 0)
            .then(|| chrono::DateTime::from_timestamp_millis(it.ts))
            .flatten()
            .map(|dt| dt.to_rfc3339());
        ReservoirRow {
            text: it.text.clone(),
            url: it.url.clone(),
            lang: it.lang.clone(),
            created_at,
        }
    }
}

/// A scored term surfaced by an extractor. Evidence is capped at three
/// distinct source URLs to bound payload size on hot terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub term: String,
    pub score: f64,
    pub evidence: Vec<String>,
}

/// Emoji candidates additionally carry the bare emoji next to the
/// "<emoji> emoji meaning" search term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmojiCandidate {
    pub term: String,
    pub emoji: String,
    /// Raw occurrence count before evergreen dampening.
    pub freq: usize,
    pub score: f64,
    pub evidence: Vec<String>,
}

/// One entry of the novelty-scored emoji ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEmoji {
    pub emoji: String,
    pub freq: usize,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_parses_case_insensitively() {
        assert_eq!(ProviderKind::parse(" Reddit "), Some(ProviderKind::Reddit));
        assert_eq!(ProviderKind::parse("HN"), Some(ProviderKind::Hn));
        assert_eq!(ProviderKind::parse("mastodon"), None);
    }

    #[test]
    fn reservoir_row_drops_provenance() {
        let it = DiscoveryItem {
            id: "abc".into(),
            text: "goose emoji is trending".into(),
            lang: Some("en".into()),
            source: ProviderKind::Hn,
            url: "https://example.test/1".into(),
            ts: 1_700_000_000_000,
            meta: None,
        };
        let row = ReservoirRow::from(&it);
        assert_eq!(row.text, it.text);
        assert_eq!(row.url, it.url);
        assert!(row.created_at.unwrap().starts_with("2023-11-14"));
    }

    #[test]
    fn reservoir_row_omits_created_at_without_timestamp() {
        let it = DiscoveryItem {
            id: "x".into(),
            text: "t".into(),
            lang: None,
            source: ProviderKind::Rss,
            url: "https://example.test/2".into(),
            ts: 0,
            meta: None,
        };
        assert_eq!(ReservoirRow::from(&it).created_at, None);
    }
}
