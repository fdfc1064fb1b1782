//! News collection clients for the investment helper
//!
//! This crate provides:
//! - The fixed list of financial RSS feeds and a client to fetch them
//! - Body cleaning and keyword tagging applied before items are stored

pub mod content;
pub mod error;
pub mod rss_client;
pub mod types;

pub use content::{clean_content, clean_text, extract_tags, prepare_content, INVESTMENT_KEYWORDS};
pub use error::NewsError;
pub use rss_client::{get_curated_feeds, FeedFetcher, RssClient, RssFeed};
pub use types::FeedEntry;
