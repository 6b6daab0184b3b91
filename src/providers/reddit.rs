// src/providers/reddit.rs
//! Link-aggregator adapter: hot listings of the configured subreddits.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::providers::DiscoveryProvider;
use crate::resilience::Breaker;
use crate::types::{DiscoveryItem, ProviderKind};

#[derive(Debug, Deserialize)]
struct Listing {
    data: Option<ListingData>,
}
#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}
#[derive(Debug, Deserialize)]
struct Child {
    data: Option<Post>,
}
#[derive(Debug, Deserialize)]
struct Post {
    id: Option<String>,
    title: Option<String>,
    permalink: Option<String>,
    created_utc: Option<f64>,
}

pub struct RedditProvider {
    mode: Mode,
    subs: Vec<String>,
    breaker_threshold: u32,
}

enum Mode {
    Fixture(String),
    Http { client: reqwest::Client },
}

impl RedditProvider {
    pub fn from_http(client: reqwest::Client, subs: Vec<String>, breaker_threshold: u32) -> Self {
        Self {
            mode: Mode::Http { client },
            subs,
            breaker_threshold,
        }
    }

    /// Single listing payload applied to every configured subreddit.
    pub fn from_fixture_str(s: &str, subs: Vec<String>) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
            subs,
            breaker_threshold: 3,
        }
    }

    fn parse_listing(body: &str, limit: usize) -> Result<Vec<DiscoveryItem>> {
        let listing: Listing = serde_json::from_str(body).context("parsing reddit listing")?;
        let children = listing.data.map(|d| d.children).unwrap_or_default();
        let mut out = Vec::new();
        for child in children.into_iter().take(limit) {
            let Some(post) = child.data else { continue };
            let (Some(id), Some(title), Some(permalink)) = (post.id, post.title, post.permalink)
            else {
                continue;
            };
            if title.is_empty() || permalink.is_empty() {
                continue;
            }
            out.push(DiscoveryItem {
                id,
                text: title,
                lang: Some("en".to_string()),
                source: ProviderKind::Reddit,
                url: format!("https://www.reddit.com{permalink}"),
                ts: post
                    .created_utc
                    .map(|s| (s * 1000.0) as i64)
                    .unwrap_or(0),
                meta: None,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl DiscoveryProvider for RedditProvider {
    async fn fetch(&self, limit: usize) -> Result<Vec<DiscoveryItem>> {
        let per_sub = limit.clamp(1, 100);
        match &self.mode {
            Mode::Fixture(body) => Self::parse_listing(body, per_sub),
            Mode::Http { client } => {
                // A breaker across the per-subreddit requests stops hammering
                // reddit once it starts failing consistently this cycle.
                let mut breaker = Breaker::new(self.breaker_threshold);
                let mut out = Vec::new();
                for sub in &self.subs {
                    let url = format!(
                        "https://www.reddit.com/r/{}/hot.json?limit={}",
                        sub, per_sub
                    );
                    let label = format!("reddit:{sub}");
                    let fetched = breaker
                        .run(&label, async {
                            let resp = client
                                .get(&url)
                                .send()
                                .await
                                .with_context(|| format!("GET {url}"))?;
                            let resp = resp
                                .error_for_status()
                                .with_context(|| format!("status for r/{sub}"))?;
                            let body = resp.text().await.context("reddit body")?;
                            Self::parse_listing(&body, per_sub)
                        })
                        .await;
                    if let Some(items) = fetched {
                        out.extend(items);
                    }
                }
                Ok(out)
            }
        }
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Reddit
    }
}
