//! Feed-level types shared by the RSS client and the collector

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single entry as read from an RSS or Atom feed, before cleaning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    /// Raw body text, possibly containing HTML
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
}
