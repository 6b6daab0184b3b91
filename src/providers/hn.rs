// src/providers/hn.rs
//! Social-search adapter: Hacker News front-page stories via the Algolia API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::providers::DiscoveryProvider;
use crate::types::{DiscoveryItem, ProviderKind};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "objectID")]
    object_id: Option<String>,
    title: Option<String>,
    url: Option<String>,
    created_at_i: Option<i64>,
}

pub struct HnProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { client: reqwest::Client },
}

impl HnProvider {
    pub fn from_http(client: reqwest::Client) -> Self {
        Self {
            mode: Mode::Http { client },
        }
    }

    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    fn parse(body: &str) -> Result<Vec<DiscoveryItem>> {
        let resp: SearchResponse = serde_json::from_str(body).context("parsing hn search")?;
        let mut out = Vec::new();
        for hit in resp.hits {
            let Some(id) = hit.object_id else { continue };
            let Some(title) = hit.title.filter(|t| !t.is_empty()) else {
                continue;
            };
            // Story link, or the HN item page for text posts.
            let url = hit
                .url
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| format!("https://news.ycombinator.com/item?id={id}"));
            out.push(DiscoveryItem {
                id,
                text: title,
                lang: Some("en".to_string()),
                source: ProviderKind::Hn,
                url,
                ts: hit.created_at_i.map(|s| s * 1000).unwrap_or(0),
                meta: None,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl DiscoveryProvider for HnProvider {
    async fn fetch(&self, limit: usize) -> Result<Vec<DiscoveryItem>> {
        match &self.mode {
            Mode::Fixture(body) => {
                let mut items = Self::parse(body)?;
                items.truncate(limit);
                Ok(items)
            }
            Mode::Http { client } => {
                let per_page = limit.clamp(10, 100);
                let url = format!(
                    "https://hn.algolia.com/api/v1/search?tags=story&hitsPerPage={per_page}"
                );
                let body = client
                    .get(&url)
                    .send()
                    .await
                    .context("GET hn search")?
                    .error_for_status()
                    .context("hn status")?
                    .text()
                    .await
                    .context("hn body")?;
                let mut items = Self::parse(&body)?;
                items.truncate(limit);
                Ok(items)
            }
        }
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Hn
    }
}
