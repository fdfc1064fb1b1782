//! RSS Feed Client for news collection
//!
//! Fetches and parses RSS/Atom feeds from the fixed list of financial sources.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::NewsError;
use crate::types::FeedEntry;

/// Per-request timeout for feed fetches
const FEED_TIMEOUT_SECS: u64 = 10;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; Investment-Helper/1.0)";

/// RSS feed definition
#[derive(Debug, Clone, PartialEq)]
pub struct RssFeed {
    /// Name of the source, stored on every collected item
    pub name: String,
    /// RSS feed URL
    pub url: String,
    /// Category attached to every item of this feed
    pub category: String,
}

impl RssFeed {
    pub fn new(name: &str, url: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            category: category.to_string(),
        }
    }
}

/// Fixed, ordered list of feeds collected on every run
pub fn get_curated_feeds() -> Vec<RssFeed> {
    vec![
        // Korean economy
        RssFeed::new(
            "연합뉴스 경제",
            "https://www.yna.co.kr/rss/economy.xml",
            "korean",
        ),
        RssFeed::new("매일경제", "https://www.mk.co.kr/rss/30000001/", "korean"),
        // Central banks
        RssFeed::new(
            "Federal Reserve News",
            "https://www.federalreserve.gov/feeds/press_all.xml",
            "central_bank",
        ),
        // International business
        RssFeed::new(
            "BBC Business",
            "https://feeds.bbci.co.uk/news/business/rss.xml",
            "international",
        ),
    ]
}

/// Source of raw feed entries
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch and parse a feed into entries, in feed order
    async fn fetch(&self, feed: &RssFeed) -> Result<Vec<FeedEntry>, NewsError>;
}

/// RSS feed client
pub struct RssClient {
    client: Client,
}

impl RssClient {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(FEED_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Parse an RSS or Atom document into entries
    pub fn parse_feed(content: &[u8], feed_url: &str) -> Result<Vec<FeedEntry>, NewsError> {
        // Try parsing as RSS first, then Atom
        if let Ok(channel) = rss::Channel::read_from(content) {
            return Ok(parse_rss_channel(&channel));
        }

        if let Ok(atom_feed) = atom_syndication::Feed::read_from(content) {
            return Ok(parse_atom_feed(&atom_feed));
        }

        Err(NewsError::ParseError(format!(
            "Failed to parse feed: {}",
            feed_url
        )))
    }
}

impl Default for RssClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedFetcher for RssClient {
    async fn fetch(&self, feed: &RssFeed) -> Result<Vec<FeedEntry>, NewsError> {
        debug!("Fetching {} RSS feed: {}", feed.name, feed.url);

        let response = self
            .client
            .get(&feed.url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| NewsError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NewsError::ApiError {
                status: response.status().as_u16(),
                message: format!("Failed to fetch {}", feed.url),
            });
        }

        let content = response
            .bytes()
            .await
            .map_err(|e| NewsError::RequestFailed(e.to_string()))?;

        Self::parse_feed(&content[..], &feed.url)
    }
}

/// Parse RSS channel into entries
fn parse_rss_channel(channel: &rss::Channel) -> Vec<FeedEntry> {
    channel
        .items()
        .iter()
        .map(|item| {
            let published_at = item
                .pub_date()
                .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                .or_else(|| {
                    item.dublin_core_ext()
                        .and_then(|dc| dc.dates().first())
                        .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
                })
                .map(|d| d.with_timezone(&Utc));

            let body = item
                .description()
                .filter(|d| !d.trim().is_empty())
                .or_else(|| item.content())
                .unwrap_or_default()
                .to_string();

            FeedEntry {
                title: item.title().unwrap_or_default().to_string(),
                link: item.link().unwrap_or_default().to_string(),
                body,
                published_at,
            }
        })
        .collect()
}

/// Parse Atom feed into entries
fn parse_atom_feed(atom_feed: &atom_syndication::Feed) -> Vec<FeedEntry> {
    atom_feed
        .entries()
        .iter()
        .map(|entry| {
            let link = entry
                .links()
                .first()
                .map(|l| l.href().to_string())
                .unwrap_or_default();

            let published_at = entry
                .published()
                .copied()
                .unwrap_or_else(|| *entry.updated())
                .with_timezone(&Utc);

            let summary = entry.summary().map(|s| s.as_str()).unwrap_or_default();
            let content = entry.content().and_then(|c| c.value()).unwrap_or_default();
            let body = if !summary.is_empty() { summary } else { content };

            FeedEntry {
                title: entry.title().to_string(),
                link,
                body: body.to_string(),
                published_at: Some(published_at),
            }
        })
        .collect()
}
