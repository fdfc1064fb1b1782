//! News data structures for collected feed items

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A news article collected from an RSS feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    /// Row identifier
    pub id: i64,
    /// Article title (whitespace collapsed)
    pub title: String,
    /// Cleaned article body, at most 2000 characters
    pub content: String,
    /// Article URL, unique across all stored items
    pub url: String,
    /// Name of the feed the item came from
    pub source: String,
    /// Publication date
    pub published_at: DateTime<Utc>,
    /// Keyword matches plus the feed category
    pub tags: Vec<String>,
    /// Category of the originating feed
    pub category: Option<String>,
    /// Whether the item has been consumed by a report
    pub processed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert form of a news item, before the store assigns an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNewsItem {
    pub title: String,
    pub content: String,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub tags: Vec<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub processed: bool,
}

/// Counters over the news table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsStats {
    pub total: usize,
    pub processed: usize,
    pub unprocessed: usize,
    #[serde(rename = "recent24h")]
    pub recent_24h: usize,
    pub collection_time: DateTime<Utc>,
}
