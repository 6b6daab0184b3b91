// src/providers/trends.rs
//! Trend-explorer adapter: Google Trends daily trending searches, plus the
//! rising-queries lookup the watchlist promotion uses.
//!
//! Both endpoints prefix their JSON with `)]}'` to prevent XSSI; the prefix
//! is scrubbed before parsing.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::providers::{url_id, DiscoveryProvider};
use crate::types::{DiscoveryItem, ProviderKind};

#[derive(Debug, Clone)]
pub struct TrendsLocale {
    pub geo: String,
    pub hl: String,
    pub tz: String,
}

impl Default for TrendsLocale {
    fn default() -> Self {
        Self {
            geo: "US".into(),
            hl: "en-US".into(),
            tz: "0".into(),
        }
    }
}

// --- daily trending payload ---

#[derive(Debug, Deserialize)]
struct DailyResponse {
    #[serde(default)]
    default: DailyDefault,
}
#[derive(Debug, Deserialize, Default)]
struct DailyDefault {
    #[serde(rename = "trendingSearchesDays", default)]
    days: Vec<Day>,
}
#[derive(Debug, Deserialize)]
struct Day {
    date: Option<String>,
    #[serde(rename = "trendingSearches", default)]
    searches: Vec<TrendingSearch>,
}
#[derive(Debug, Deserialize)]
struct TrendingSearch {
    title: Option<Title>,
    #[serde(default)]
    articles: Vec<Article>,
    #[serde(rename = "formattedTraffic")]
    formatted_traffic: Option<String>,
}
#[derive(Debug, Deserialize)]
struct Title {
    query: Option<String>,
}
#[derive(Debug, Deserialize)]
struct Article {
    url: Option<String>,
}

// --- rising queries payload ---

#[derive(Debug, Deserialize)]
struct RelatedResponse {
    #[serde(default)]
    default: RelatedDefault,
}
#[derive(Debug, Deserialize, Default)]
struct RelatedDefault {
    #[serde(rename = "rankedList", default)]
    ranked_list: Vec<RankedList>,
}
#[derive(Debug, Deserialize)]
struct RankedList {
    #[serde(rename = "rankedKeyword", default)]
    ranked_keyword: Vec<RankedKeyword>,
}
#[derive(Debug, Deserialize)]
struct RankedKeyword {
    query: Option<String>,
    value: Option<f64>,
}

/// One related/rising query with its numeric score.
#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
pub struct RisingQuery {
    pub query: String,
    pub value: f64,
}

pub struct TrendsProvider {
    mode: Mode,
    locale: TrendsLocale,
}

enum Mode {
    Fixture(String),
    Http { client: reqwest::Client },
}

/// Strip the `)]}'` XSSI prefix Google puts in front of the JSON body.
fn scrub_xssi(body: &str) -> &str {
    let trimmed = body.trim_start();
    let rest = trimmed.strip_prefix(")]}'").unwrap_or(trimmed);
    rest.trim_start_matches(',').trim_start()
}

impl TrendsProvider {
    pub fn from_http(client: reqwest::Client, locale: TrendsLocale) -> Self {
        Self {
            mode: Mode::Http { client },
            locale,
        }
    }

    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
            locale: TrendsLocale::default(),
        }
    }

    fn parse_daily(body: &str) -> Result<Vec<DiscoveryItem>> {
        let resp: DailyResponse =
            serde_json::from_str(scrub_xssi(body)).context("parsing daily trends")?;
        let mut out = Vec::new();
        for day in resp.default.days {
            let ts = day
                .date
                .as_deref()
                .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y%m%d").ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc().timestamp_millis())
                .unwrap_or(0);
            for search in day.searches {
                let Some(query) = search.title.and_then(|t| t.query).filter(|q| !q.is_empty())
                else {
                    continue;
                };
                let url = search
                    .articles
                    .first()
                    .and_then(|a| a.url.clone())
                    .filter(|u| !u.is_empty())
                    .unwrap_or_else(|| {
                        format!(
                            "https://www.google.com/search?q={}",
                            urlencode(&query)
                        )
                    });
                let meta = search
                    .formatted_traffic
                    .map(|t| serde_json::json!({ "traffic": t }));
                out.push(DiscoveryItem {
                    id: url_id(&url),
                    text: query,
                    lang: None,
                    source: ProviderKind::Trends,
                    url,
                    ts,
                    meta,
                });
            }
        }
        Ok(out)
    }

    fn parse_rising(body: &str) -> Result<Vec<RisingQuery>> {
        let resp: RelatedResponse =
            serde_json::from_str(scrub_xssi(body)).context("parsing rising queries")?;
        let mut out = Vec::new();
        for list in resp.default.ranked_list {
            for kw in list.ranked_keyword {
                let Some(query) = kw.query.filter(|q| !q.is_empty()) else {
                    continue;
                };
                let Some(value) = kw.value else { continue };
                out.push(RisingQuery { query, value });
            }
        }
        Ok(out)
    }

    /// Rising/related queries for one seed keyword.
    pub async fn rising_queries(&self, seed: &str) -> Result<Vec<RisingQuery>> {
        match &self.mode {
            Mode::Fixture(body) => Self::parse_rising(body),
            Mode::Http { client } => {
                let url = format!(
                    "https://trends.google.com/trends/api/widgetdata/relatedsearches?hl={}&tz={}&geo={}&q={}",
                    self.locale.hl,
                    self.locale.tz,
                    self.locale.geo,
                    urlencode(seed)
                );
                let body = client
                    .get(&url)
                    .send()
                    .await
                    .context("GET rising queries")?
                    .error_for_status()
                    .context("rising queries status")?
                    .text()
                    .await
                    .context("rising queries body")?;
                Self::parse_rising(&body)
            }
        }
    }
}

#[async_trait]
impl DiscoveryProvider for TrendsProvider {
    async fn fetch(&self, limit: usize) -> Result<Vec<DiscoveryItem>> {
        let mut items = match &self.mode {
            Mode::Fixture(body) => Self::parse_daily(body)?,
            Mode::Http { client } => {
                let url = format!(
                    "https://trends.google.com/trends/api/dailytrends?hl={}&tz={}&geo={}",
                    self.locale.hl, self.locale.tz, self.locale.geo
                );
                let body = client
                    .get(&url)
                    .send()
                    .await
                    .context("GET daily trends")?
                    .error_for_status()
                    .context("daily trends status")?
                    .text()
                    .await
                    .context("daily trends body")?;
                Self::parse_daily(&body)?
            }
        };
        items.truncate(limit);
        Ok(items)
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Trends
    }
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => {
                use std::fmt::Write as _;
                let _ = write!(&mut out, "%{:02X}", b);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAILY: &str = ")]}',\n{ \"default\": { \"trendingSearchesDays\": [ { \"date\": \"20260807\", \"trendingSearches\": [ { \"title\": { \"query\": \"goose emoji\" }, \"articles\": [ { \"url\": \"https://example.test/goose\" } ], \"formattedTraffic\": \"50K+\" }, { \"title\": { \"query\": \"\" } }, { \"title\": { \"query\": \"fallback query\" }, \"articles\": [] } ] } ] } }";

    const RISING: &str = ")]}'\n{ \"default\": { \"rankedList\": [ { \"rankedKeyword\": [ { \"query\": \"🪿 meaning\", \"value\": 120 }, { \"query\": \"HQ meaning\", \"value\": 45 }, { \"query\": \"broken\" } ] } ] } }";

    #[tokio::test]
    async fn daily_fixture_scrubs_prefix_and_skips_malformed() {
        let p = TrendsProvider::from_fixture_str(DAILY);
        let items = p.fetch(10).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text, "goose emoji");
        assert_eq!(items[0].url, "https://example.test/goose");
        assert!(items[1].url.contains("google.com/search?q=fallback%20query"));
        assert!(items[0].ts > 0);
    }

    #[tokio::test]
    async fn rising_fixture_parses_scored_queries_only() {
        let p = TrendsProvider::from_fixture_str(RISING);
        let rising = p.rising_queries("emoji").await.unwrap();
        assert_eq!(
            rising,
            vec![
                RisingQuery {
                    query: "🪿 meaning".into(),
                    value: 120.0
                },
                RisingQuery {
                    query: "HQ meaning".into(),
                    value: 45.0
                },
            ]
        );
    }

    #[test]
    fn xssi_scrub_handles_missing_prefix() {
        assert_eq!(scrub_xssi("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(scrub_xssi(")]}',\n{}"), "{}");
    }
}
