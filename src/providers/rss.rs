// src/providers/rss.rs
//! Feed-reader adapter for the configured RSS/Atom feeds. Parsing goes
//! through quick-xml serde structs; RSS 2.0 `channel/item` is tried first,
//! then Atom `feed/entry`. Items missing a title or link are skipped.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

use crate::providers::{url_id, DiscoveryProvider};
use crate::resilience::Breaker;
use crate::types::{DiscoveryItem, ProviderKind};

// --- RSS 2.0 ---

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

// --- Atom ---

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entry: Vec<Entry>,
}
#[derive(Debug, Deserialize)]
struct Entry {
    title: Option<String>,
    #[serde(rename = "link", default)]
    link: Vec<AtomLink>,
    updated: Option<String>,
}
#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

fn parse_rfc2822_to_millis(ts: &str) -> i64 {
    let ts = ts.trim();
    // Obsolete zone names (GMT, UT) are common in feeds but rejected by the
    // strict parser.
    let normalized;
    let ts = if ts.ends_with(" GMT") || ts.ends_with(" UT") {
        normalized = format!("{} +0000", ts.rsplit_once(' ').map(|(l, _)| l).unwrap_or(ts));
        normalized.as_str()
    } else {
        ts
    };
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| (dt.unix_timestamp_nanos() / 1_000_000) as i64)
        .unwrap_or(0)
}

fn parse_rfc3339_to_millis(ts: &str) -> i64 {
    OffsetDateTime::parse(ts.trim(), &Rfc3339)
        .ok()
        .map(|dt| (dt.unix_timestamp_nanos() / 1_000_000) as i64)
        .unwrap_or(0)
}

pub struct RssProvider {
    mode: Mode,
    feeds: Vec<String>,
    breaker_threshold: u32,
}

enum Mode {
    Fixture(String),
    Http { client: reqwest::Client },
}

impl RssProvider {
    pub fn from_http(client: reqwest::Client, feeds: Vec<String>, breaker_threshold: u32) -> Self {
        Self {
            mode: Mode::Http { client },
            feeds,
            breaker_threshold,
        }
    }

    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
            feeds: vec!["fixture".to_string()],
            breaker_threshold: 3,
        }
    }

    fn parse_feed(xml: &str, limit: usize) -> Result<Vec<DiscoveryItem>> {
        let xml = scrub_html_entities_for_xml(xml);
        let xml = xml.as_str();
        if let Ok(rss) = from_str::<Rss>(xml) {
            let mut out = Vec::new();
            for it in rss.channel.item.into_iter() {
                let Some(title) = it.title.filter(|t| !t.trim().is_empty()) else {
                    continue;
                };
                let Some(link) = it.link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty())
                else {
                    continue;
                };
                out.push(DiscoveryItem {
                    id: url_id(&link),
                    lang: Some(crate::normalize::detect_lang(&title).to_string()),
                    text: title,
                    source: ProviderKind::Rss,
                    url: link,
                    ts: it.pub_date.as_deref().map(parse_rfc2822_to_millis).unwrap_or(0),
                    meta: None,
                });
                if out.len() >= limit {
                    break;
                }
            }
            return Ok(out);
        }
        if let Ok(feed) = from_str::<Feed>(xml) {
            let mut out = Vec::new();
            for entry in feed.entry.into_iter() {
                let Some(title) = entry.title.filter(|t| !t.trim().is_empty()) else {
                    continue;
                };
                // Prefer the alternate link; fall back to the first href.
                let href = entry
                    .link
                    .iter()
                    .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
                    .or_else(|| entry.link.first())
                    .and_then(|l| l.href.clone())
                    .map(|h| h.trim().to_string())
                    .filter(|h| !h.is_empty());
                let Some(link) = href else { continue };
                out.push(DiscoveryItem {
                    id: url_id(&link),
                    lang: Some(crate::normalize::detect_lang(&title).to_string()),
                    text: title,
                    source: ProviderKind::Rss,
                    url: link,
                    ts: entry.updated.as_deref().map(parse_rfc3339_to_millis).unwrap_or(0),
                    meta: None,
                });
                if out.len() >= limit {
                    break;
                }
            }
            return Ok(out);
        }
        Err(anyhow!("payload is neither RSS 2.0 nor Atom"))
    }
}

// Feeds in the wild leak HTML entities XML parsers reject.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

#[async_trait]
impl DiscoveryProvider for RssProvider {
    async fn fetch(&self, limit: usize) -> Result<Vec<DiscoveryItem>> {
        let per_feed = limit.max(1);
        match &self.mode {
            Mode::Fixture(xml) => Self::parse_feed(xml, per_feed),
            Mode::Http { client } => {
                let mut breaker = Breaker::new(self.breaker_threshold);
                let mut out = Vec::new();
                for feed in &self.feeds {
                    let fetched = breaker
                        .run(feed, async {
                            let body = client
                                .get(feed)
                                .send()
                                .await
                                .with_context(|| format!("GET {feed}"))?
                                .error_for_status()
                                .with_context(|| format!("status for {feed}"))?
                                .text()
                                .await
                                .context("feed body")?;
                            Self::parse_feed(&body, per_feed)
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
        ProviderKind::Rss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_XML: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <title>Feed</title>
  <item><title>First story 🪿</title><link>https://example.test/a</link><pubDate>Fri, 07 Aug 2026 08:00:00 GMT</pubDate></item>
  <item><title></title><link>https://example.test/missing-title</link></item>
  <item><title>No link here</title></item>
  <item><title>Second story</title><link> https://example.test/b </link></item>
</channel></rss>"#;

    const ATOM_XML: &str = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Feed</title>
  <entry><title>Atom entry</title><link rel="alternate" href="https://example.test/atom1"/><updated>2026-08-07T08:00:00Z</updated></entry>
  <entry><title>Linkless entry</title></entry>
</feed>"#;

    #[tokio::test]
    async fn rss_fixture_skips_malformed_items() {
        let p = RssProvider::from_fixture_str(RSS_XML);
        let items = p.fetch(50).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].url, "https://example.test/a");
        assert!(items[0].ts > 0);
        assert_eq!(items[1].url, "https://example.test/b");
    }

    #[tokio::test]
    async fn atom_fixture_parses_entries() {
        let p = RssProvider::from_fixture_str(ATOM_XML);
        let items = p.fetch(50).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://example.test/atom1");
        assert!(items[0].ts > 0);
    }

    #[tokio::test]
    async fn per_feed_limit_is_respected() {
        let p = RssProvider::from_fixture_str(RSS_XML);
        let items = p.fetch(1).await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn date_parsing_tolerates_garbage() {
        assert_eq!(parse_rfc2822_to_millis("not a date"), 0);
        assert!(parse_rfc2822_to_millis("Fri, 07 Aug 2026 08:00:00 +0000") > 0);
        assert_eq!(
            parse_rfc2822_to_millis("Fri, 07 Aug 2026 08:00:00 GMT"),
            parse_rfc2822_to_millis("Fri, 07 Aug 2026 08:00:00 +0000")
        );
        assert!(parse_rfc3339_to_millis("2026-08-07T08:00:00Z") > 0);
    }
}
