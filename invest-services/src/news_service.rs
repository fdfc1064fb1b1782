//! News Service
//!
//! Collects articles from the fixed list of financial RSS feeds into storage
//! and exposes the read side used by report generation and the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use invest_core::{InvestError, NewNewsItem, NewsItem, NewsStats};
use invest_news::{
    clean_text, extract_tags, get_curated_feeds, prepare_content, FeedEntry, FeedFetcher,
    NewsError, RssFeed,
};

use crate::storage::{Storage, StorageError};

/// Unprocessed items handed to a single report
pub const UNPROCESSED_BATCH: usize = 25;
const RECENT_LIMIT: usize = 50;
const CATEGORY_LIMIT: usize = 10;

/// Configuration for the news collector
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Feeds visited on every run, in order
    pub feeds: Vec<RssFeed>,
    /// Entries taken from the head of each feed
    pub max_items_per_feed: usize,
    /// Pause after each successfully collected feed
    pub feed_delay: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            feeds: get_curated_feeds(),
            max_items_per_feed: 15,
            feed_delay: Duration::from_millis(500),
        }
    }
}

/// Outcome of one collection run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub feeds_total: usize,
    pub feeds_succeeded: usize,
    pub items_collected: usize,
}

/// News collector and accessors over the news table
pub struct NewsService {
    storage: Arc<Storage>,
    fetcher: Arc<dyn FeedFetcher>,
    config: CollectorConfig,
}

impl NewsService {
    pub fn new(storage: Arc<Storage>, fetcher: Arc<dyn FeedFetcher>, config: CollectorConfig) -> Self {
        info!("Initializing NewsService with {} feeds", config.feeds.len());
        Self {
            storage,
            fetcher,
            config,
        }
    }

    /// Visit every feed once and store the new entries.
    ///
    /// Per-feed failures are logged and skipped, so this never fails.
    #[instrument(skip(self))]
    pub async fn collect(&self) -> CollectionSummary {
        info!("Starting news collection");

        let mut summary = CollectionSummary {
            feeds_total: self.config.feeds.len(),
            ..CollectionSummary::default()
        };

        for feed in &self.config.feeds {
            match self.collect_feed(feed).await {
                Ok(count) => {
                    summary.feeds_succeeded += 1;
                    summary.items_collected += count;
                    info!("Collected {} new items from {}", count, feed.name);

                    // Pause between successful feeds only
                    if !self.config.feed_delay.is_zero() {
                        tokio::time::sleep(self.config.feed_delay).await;
                    }
                }
                Err(e) => {
                    warn!("Failed to collect from {}: {}", feed.name, e);
                }
            }
        }

        info!(
            "News collection finished: {} items from {}/{} feeds",
            summary.items_collected, summary.feeds_succeeded, summary.feeds_total
        );
        summary
    }

    async fn collect_feed(&self, feed: &RssFeed) -> Result<usize, NewsServiceError> {
        let entries = self.fetcher.fetch(feed).await?;
        debug!("{} returned {} entries", feed.name, entries.len());

        let mut stored = 0;
        for entry in entries.into_iter().take(self.config.max_items_per_feed) {
            if self.store_entry(feed, entry)? {
                stored += 1;
            }
        }
        Ok(stored)
    }

    /// Store one entry. Returns false for skipped and duplicate entries.
    fn store_entry(&self, feed: &RssFeed, entry: FeedEntry) -> Result<bool, NewsServiceError> {
        let title = clean_text(&entry.title);
        let url = entry.link.trim().to_string();
        if title.is_empty() || url.is_empty() {
            return Ok(false);
        }

        if self.storage.news_exists(&url)? {
            debug!("Skipping known article: {}", url);
            return Ok(false);
        }

        let content = prepare_content(&title, &entry.body);
        let tags = extract_tags(&format!("{} {}", title, content), &feed.category);

        let item = NewNewsItem {
            title,
            content,
            url,
            source: feed.name.clone(),
            published_at: entry.published_at.unwrap_or_else(Utc::now),
            tags,
            category: Some(feed.category.clone()),
            processed: false,
        };

        Ok(self.storage.insert_news(&item)?.is_some())
    }

    /// Up to 25 unprocessed items, newest first
    pub fn unprocessed(&self) -> Result<Vec<NewsItem>, NewsServiceError> {
        Ok(self.storage.unprocessed_news(UNPROCESSED_BATCH)?)
    }

    pub fn mark_processed(&self, ids: &[i64]) -> Result<usize, NewsServiceError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let updated = self.storage.mark_news_processed(ids)?;
        debug!("Marked {} news items as processed", updated);
        Ok(updated)
    }

    /// Items published within the last `hours`, newest first
    pub fn recent(&self, hours: u32) -> Result<Vec<NewsItem>, NewsServiceError> {
        let since = Utc::now() - chrono::Duration::hours(i64::from(hours));
        Ok(self.storage.news_since(since, RECENT_LIMIT)?)
    }

    pub fn by_category(&self, category: &str) -> Result<Vec<NewsItem>, NewsServiceError> {
        Ok(self.storage.news_by_category(category, CATEGORY_LIMIT)?)
    }

    pub fn stats(&self) -> Result<NewsStats, NewsServiceError> {
        let total = self.storage.count_news()?;
        let processed = self.storage.count_processed_news()?;
        let recent_24h = self
            .storage
            .count_news_since(Utc::now() - chrono::Duration::hours(24))?;

        Ok(NewsStats {
            total,
            processed,
            unprocessed: total.saturating_sub(processed),
            recent_24h,
            collection_time: Utc::now(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NewsServiceError {
    #[error("Feed error: {0}")]
    Feed(#[from] NewsError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<NewsServiceError> for InvestError {
    fn from(err: NewsServiceError) -> Self {
        match err {
            NewsServiceError::Feed(e) => InvestError::network(e.to_string()),
            NewsServiceError::Storage(e) => e.into(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Fetcher serving canned entries per feed URL; unknown URLs fail
    pub(crate) struct StubFetcher {
        pub feeds: HashMap<String, Vec<FeedEntry>>,
    }

    #[async_trait]
    impl FeedFetcher for StubFetcher {
        async fn fetch(&self, feed: &RssFeed) -> Result<Vec<FeedEntry>, NewsError> {
            self.feeds
                .get(&feed.url)
                .cloned()
                .ok_or_else(|| NewsError::RequestFailed(format!("unreachable: {}", feed.url)))
        }
    }

    pub(crate) fn entry(title: &str, link: &str, body: &str) -> FeedEntry {
        FeedEntry {
            title: title.to_string(),
            link: link.to_string(),
            body: body.to_string(),
            published_at: Some(Utc::now()),
        }
    }

    pub(crate) fn test_config(feeds: Vec<RssFeed>) -> CollectorConfig {
        CollectorConfig {
            feeds,
            max_items_per_feed: 15,
            feed_delay: Duration::ZERO,
        }
    }

    /// Service whose fetcher knows no feeds at all
    pub(crate) fn offline_service(storage: Arc<Storage>) -> NewsService {
        NewsService::new(
            storage,
            Arc::new(StubFetcher {
                feeds: HashMap::new(),
            }),
            test_config(get_curated_feeds()),
        )
    }

    fn service_with(entries: Vec<FeedEntry>) -> (NewsService, Arc<Storage>) {
        let storage = Arc::new(Storage::new_in_memory().unwrap());
        let feed = RssFeed::new("BBC Business", "https://feeds.test/bbc", "international");
        let fetcher = StubFetcher {
            feeds: HashMap::from([(feed.url.clone(), entries)]),
        };
        let service = NewsService::new(storage.clone(), Arc::new(fetcher), test_config(vec![feed]));
        (service, storage)
    }

    #[tokio::test]
    async fn test_collect_stores_cleaned_tagged_items() {
        let long_body = format!("<p>{}</p>", "Bond yields climbed again. ".repeat(100));
        let (service, _) = service_with(vec![
            entry("Rates  rise", "https://news.test/1", &long_body),
            entry("Fed holds", "https://news.test/2", "<b>Short</b> note"),
        ]);

        let summary = service.collect().await;
        assert_eq!(summary.items_collected, 2);
        assert_eq!(summary.feeds_succeeded, 1);

        let items = service.unprocessed().unwrap();
        let long = items.iter().find(|i| i.url == "https://news.test/1").unwrap();
        assert_eq!(long.title, "Rates rise");
        assert_eq!(long.content.chars().count(), 2000);
        assert!(long.tags.contains(&"bond".to_string()));
        assert_eq!(long.tags.last().map(String::as_str), Some("international"));

        let short = items.iter().find(|i| i.url == "https://news.test/2").unwrap();
        assert_eq!(short.content, "Fed holds. Short note");
        assert_eq!(short.source, "BBC Business");
        assert_eq!(short.category.as_deref(), Some("international"));
    }

    #[tokio::test]
    async fn test_collect_twice_creates_no_duplicates() {
        let (service, storage) = service_with(vec![entry("A", "https://news.test/a", "body")]);

        assert_eq!(service.collect().await.items_collected, 1);
        assert_eq!(service.collect().await.items_collected, 0);
        assert_eq!(storage.count_news().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_collect_skips_incomplete_entries_and_caps_per_feed() {
        let mut entries = vec![entry("", "https://news.test/no-title", "x"), entry("No link", "", "x")];
        entries.extend((0..20).map(|i| entry(&format!("T{}", i), &format!("https://news.test/{}", i), "x")));
        let (service, storage) = service_with(entries);

        // The two incomplete entries occupy slots in the first fifteen
        assert_eq!(service.collect().await.items_collected, 13);
        assert_eq!(storage.count_news().unwrap(), 13);
    }

    #[tokio::test]
    async fn test_failing_feed_does_not_stop_collection() {
        let storage = Arc::new(Storage::new_in_memory().unwrap());
        let good = RssFeed::new("Good", "https://feeds.test/good", "korean");
        let bad = RssFeed::new("Bad", "https://feeds.test/bad", "korean");
        let fetcher = StubFetcher {
            feeds: HashMap::from([(good.url.clone(), vec![entry("A", "https://news.test/a", "b")])]),
        };
        let service = NewsService::new(storage, Arc::new(fetcher), test_config(vec![bad, good]));

        let summary = service.collect().await;
        assert_eq!(summary.feeds_total, 2);
        assert_eq!(summary.feeds_succeeded, 1);
        assert_eq!(summary.items_collected, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_follows_successful_feeds_only() {
        let storage = Arc::new(Storage::new_in_memory().unwrap());
        let good = RssFeed::new("Good", "https://feeds.test/good", "korean");
        let bad = (0..3)
            .map(|i| RssFeed::new("Bad", &format!("https://feeds.test/bad{}", i), "korean"))
            .collect::<Vec<_>>();
        let fetcher = StubFetcher {
            feeds: HashMap::from([(good.url.clone(), vec![entry("A", "https://news.test/a", "b")])]),
        };
        let mut feeds = bad;
        feeds.push(good);
        let config = CollectorConfig {
            feed_delay: Duration::from_millis(500),
            ..test_config(feeds)
        };
        let service = NewsService::new(storage, Arc::new(fetcher), config);

        let start = tokio::time::Instant::now();
        let summary = service.collect().await;

        assert_eq!(summary.feeds_succeeded, 1);
        // One pause for the one successful feed, none for the three failures
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(500), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(1000), "{:?}", elapsed);
    }

    #[tokio::test]
    async fn test_stats_and_marking() {
        let (service, _) = service_with(vec![
            entry("A", "https://news.test/a", "b"),
            entry("B", "https://news.test/b", "b"),
        ]);
        service.collect().await;

        let ids: Vec<i64> = service.unprocessed().unwrap().iter().map(|i| i.id).collect();
        assert_eq!(service.mark_processed(&ids[..1]).unwrap(), 1);
        assert_eq!(service.mark_processed(&[]).unwrap(), 0);

        let stats = service.stats().unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.unprocessed, 1);
        assert_eq!(stats.recent_24h, 2);

        assert_eq!(service.recent(24).unwrap().len(), 2);
        assert_eq!(service.by_category("international").unwrap().len(), 2);
    }
}
