// src/providers/youtube.rs
//! Video-search adapter: YouTube Data API v3. Without an API key the adapter
//! contributes nothing rather than failing the cycle.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::providers::DiscoveryProvider;
use crate::types::{DiscoveryItem, ProviderKind};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}
#[derive(Debug, Deserialize)]
struct SearchItem {
    id: Option<VideoId>,
    snippet: Option<Snippet>,
}
#[derive(Debug, Deserialize)]
struct VideoId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}
#[derive(Debug, Deserialize)]
struct Snippet {
    title: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    #[serde(rename = "defaultLanguage")]
    default_language: Option<String>,
}

pub struct YoutubeProvider {
    mode: Mode,
    api_key: Option<String>,
    query: String,
}

enum Mode {
    Fixture(String),
    Http { client: reqwest::Client },
}

impl YoutubeProvider {
    pub fn from_http(client: reqwest::Client, api_key: Option<String>, query: String) -> Self {
        Self {
            mode: Mode::Http { client },
            api_key,
            query,
        }
    }

    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
            api_key: Some("fixture".into()),
            query: "emoji meaning".into(),
        }
    }

    fn parse(body: &str) -> Result<Vec<DiscoveryItem>> {
        let resp: SearchResponse = serde_json::from_str(body).context("parsing youtube search")?;
        let mut out = Vec::new();
        for item in resp.items {
            let Some(video_id) = item.id.and_then(|i| i.video_id).filter(|v| !v.is_empty())
            else {
                continue;
            };
            let Some(snippet) = item.snippet else { continue };
            let Some(title) = snippet.title.filter(|t| !t.is_empty()) else {
                continue;
            };
            let ts = snippet
                .published_at
                .as_deref()
                .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.timestamp_millis())
                .unwrap_or(0);
            out.push(DiscoveryItem {
                id: video_id.clone(),
                text: title,
                lang: Some(snippet.default_language.unwrap_or_else(|| "und".to_string())),
                source: ProviderKind::Youtube,
                url: format!("https://www.youtube.com/watch?v={video_id}"),
                ts,
                meta: None,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl DiscoveryProvider for YoutubeProvider {
    async fn fetch(&self, limit: usize) -> Result<Vec<DiscoveryItem>> {
        let Some(key) = self.api_key.as_deref() else {
            tracing::warn!(target: "discover", "youtube enabled without YT_API_KEY, returning nothing");
            return Ok(Vec::new());
        };
        match &self.mode {
            Mode::Fixture(body) => {
                let mut items = Self::parse(body)?;
                items.truncate(limit);
                Ok(items)
            }
            Mode::Http { client } => {
                let max_results = limit.clamp(1, 50);
                let url = "https://www.googleapis.com/youtube/v3/search";
                let body = client
                    .get(url)
                    .query(&[
                        ("part", "snippet"),
                        ("maxResults", &max_results.to_string()),
                        ("q", &self.query),
                        ("key", key),
                    ])
                    .send()
                    .await
                    .context("GET youtube search")?
                    .error_for_status()
                    .context("youtube status")?
                    .text()
                    .await
                    .context("youtube body")?;
                let mut items = Self::parse(&body)?;
                items.truncate(limit);
                Ok(items)
            }
        }
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Youtube
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH: &str = r#"{
      "items": [
        { "id": { "videoId": "v1" }, "snippet": { "title": "What the 🪿 means", "publishedAt": "2026-08-01T10:00:00Z", "defaultLanguage": "en" } },
        { "id": { "videoId": "v2" }, "snippet": { "title": "Sem idioma" } },
        { "id": {}, "snippet": { "title": "channel result, no videoId" } }
      ]
    }"#;

    #[tokio::test]
    async fn fixture_maps_videos_and_skips_non_videos() {
        let p = YoutubeProvider::from_fixture_str(SEARCH);
        let items = p.fetch(10).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].url, "https://www.youtube.com/watch?v=v1");
        assert!(items[0].ts > 0);
        assert_eq!(items[1].lang.as_deref(), Some("und"));
    }

    #[tokio::test]
    async fn missing_api_key_contributes_nothing() {
        let p = YoutubeProvider {
            mode: Mode::Fixture(SEARCH.to_string()),
            api_key: None,
            query: "emoji meaning".into(),
        };
        assert!(p.fetch(10).await.unwrap().is_empty());
    }
}
