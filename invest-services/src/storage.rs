//! Storage Service
//!
//! SQLite-based storage for collected news items and generated reports.

use chrono::{DateTime, Utc};
use invest_core::{InvestError, NewNewsItem, NewReport, NewsItem, Report, ReportType};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Mutex;

const NEWS_COLUMNS: &str = "id, title, content, url, source, published_at, tags, category, processed, created_at, updated_at";

const REPORT_COLUMNS: &str = "id, title, content, summary, news_analysis, investment_recommendations, report_type, created_at, updated_at";

/// Row counters over the reports table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportCounts {
    pub total: usize,
    pub morning: usize,
    pub evening: usize,
}

/// News and report storage using SQLite
pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    /// Open (or create) the database file and its tables
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StorageError::Io(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(db_path)?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;

        Ok(storage)
    }

    /// Create an in-memory Storage (useful for testing)
    pub fn new_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;

        Ok(storage)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS news_sources (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                url TEXT NOT NULL UNIQUE,
                source TEXT NOT NULL,
                published_at INTEGER NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                category TEXT,
                processed INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_news_processed
            ON news_sources(processed, published_at);

            CREATE INDEX IF NOT EXISTS idx_news_category
            ON news_sources(category, published_at);

            CREATE TABLE IF NOT EXISTS reports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                summary TEXT NOT NULL,
                news_analysis TEXT NOT NULL,
                investment_recommendations TEXT NOT NULL,
                report_type TEXT NOT NULL CHECK (report_type IN ('morning', 'evening')),
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_reports_created
            ON reports(created_at);
            "#,
        )?;

        Ok(())
    }

    /// Cheap round trip used by health checks
    pub fn ping(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    // ========================================================================
    // News
    // ========================================================================

    /// Check if a news item with this URL exists
    pub fn news_exists(&self, url: &str) -> Result<bool, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM news_sources WHERE url = ?1)",
            params![url],
            |row| row.get(0),
        )?;

        Ok(exists)
    }

    /// Insert a news item. Returns `None` when the URL is already stored.
    pub fn insert_news(&self, item: &NewNewsItem) -> Result<Option<i64>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        let now = Utc::now().timestamp_millis();
        let tags = serde_json::to_string(&item.tags)?;

        let inserted = conn.execute(
            r#"
            INSERT OR IGNORE INTO news_sources
                (title, content, url, source, published_at, tags, category, processed, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            "#,
            params![
                item.title,
                item.content,
                item.url,
                item.source,
                item.published_at.timestamp_millis(),
                tags,
                item.category,
                item.processed,
                now,
            ],
        )?;

        if inserted == 0 {
            return Ok(None);
        }
        Ok(Some(conn.last_insert_rowid()))
    }

    /// Unprocessed items, newest publication first
    pub fn unprocessed_news(&self, limit: usize) -> Result<Vec<NewsItem>, StorageError> {
        self.query_news(
            &format!(
                "SELECT {} FROM news_sources WHERE processed = 0 \
                 ORDER BY published_at DESC, id DESC LIMIT ?1",
                NEWS_COLUMNS
            ),
            params![sql_count(limit)],
        )
    }

    /// Items published after `since`, newest first
    pub fn news_since(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<NewsItem>, StorageError> {
        self.query_news(
            &format!(
                "SELECT {} FROM news_sources WHERE published_at > ?1 \
                 ORDER BY published_at DESC, id DESC LIMIT ?2",
                NEWS_COLUMNS
            ),
            params![since.timestamp_millis(), sql_count(limit)],
        )
    }

    pub fn news_by_category(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<NewsItem>, StorageError> {
        self.query_news(
            &format!(
                "SELECT {} FROM news_sources WHERE category = ?1 \
                 ORDER BY published_at DESC, id DESC LIMIT ?2",
                NEWS_COLUMNS
            ),
            params![category, sql_count(limit)],
        )
    }

    fn query_news(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<NewsItem>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        let mut stmt = conn.prepare(sql)?;
        let items = stmt
            .query_map(params, news_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Flag the given items as consumed by a report
    pub fn mark_news_processed(&self, ids: &[i64]) -> Result<usize, StorageError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock().map_err(|_| StorageError::LockError)?;
        let now = Utc::now().timestamp_millis();

        let tx = conn.transaction()?;
        let mut updated = 0;
        {
            let mut stmt = tx.prepare(
                "UPDATE news_sources SET processed = 1, updated_at = ?1 WHERE id = ?2",
            )?;
            for id in ids {
                updated += stmt.execute(params![now, id])?;
            }
        }
        tx.commit()?;

        Ok(updated)
    }

    pub fn count_news(&self) -> Result<usize, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM news_sources", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn count_processed_news(&self) -> Result<usize, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM news_sources WHERE processed = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn count_news_since(&self, since: DateTime<Utc>) -> Result<usize, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM news_sources WHERE published_at > ?1",
            params![since.timestamp_millis()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Delete news rows whose URL contains `needle`
    pub fn delete_news_with_url_containing(&self, needle: &str) -> Result<usize, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;
        let deleted = conn.execute(
            "DELETE FROM news_sources WHERE url LIKE ?1",
            params![format!("%{}%", needle)],
        )?;
        Ok(deleted)
    }

    // ========================================================================
    // Reports
    // ========================================================================

    /// Persist a report and return it with its id and timestamps
    pub fn insert_report(&self, report: &NewReport) -> Result<Report, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        let now = Utc::now();
        let news_analysis = serde_json::to_string(&report.news_analysis)?;
        let recommendations = serde_json::to_string(&report.investment_recommendations)?;

        conn.execute(
            r#"
            INSERT INTO reports
                (title, content, summary, news_analysis, investment_recommendations, report_type, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
            params![
                report.title,
                report.content,
                report.summary,
                news_analysis,
                recommendations,
                report.report_type.as_str(),
                now.timestamp_millis(),
            ],
        )?;

        // Stored timestamps carry millisecond precision
        let created_at = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);

        Ok(Report {
            id: conn.last_insert_rowid(),
            title: report.title.clone(),
            content: report.content.clone(),
            summary: report.summary.clone(),
            news_analysis: report.news_analysis.clone(),
            investment_recommendations: report.investment_recommendations.clone(),
            report_type: report.report_type,
            created_at,
            updated_at: created_at,
        })
    }

    pub fn get_report(&self, id: i64) -> Result<Option<Report>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        let report = conn
            .query_row(
                &format!("SELECT {} FROM reports WHERE id = ?1", REPORT_COLUMNS),
                params![id],
                report_from_row,
            )
            .optional()?;

        Ok(report)
    }

    /// One page of reports, newest first
    pub fn list_reports(&self, offset: usize, limit: usize) -> Result<Vec<Report>, StorageError> {
        self.query_reports(
            &format!(
                "SELECT {} FROM reports ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
                REPORT_COLUMNS
            ),
            params![sql_count(limit), sql_count(offset)],
        )
    }

    /// Reports created within `[start, end]`, newest first
    pub fn reports_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Report>, StorageError> {
        self.query_reports(
            &format!(
                "SELECT {} FROM reports WHERE created_at BETWEEN ?1 AND ?2 \
                 ORDER BY created_at DESC, id DESC",
                REPORT_COLUMNS
            ),
            params![start.timestamp_millis(), end.timestamp_millis()],
        )
    }

    fn query_reports(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Report>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        let mut stmt = conn.prepare(sql)?;
        let reports = stmt
            .query_map(params, report_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(reports)
    }

    pub fn report_counts(&self) -> Result<ReportCounts, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        let (total, morning, evening): (i64, i64, i64) = conn.query_row(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(report_type = 'morning'), 0),
                   COALESCE(SUM(report_type = 'evening'), 0)
            FROM reports
            "#,
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(ReportCounts {
            total: total as usize,
            morning: morning as usize,
            evening: evening as usize,
        })
    }

    pub fn count_reports_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<usize, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM reports WHERE created_at >= ?1 AND created_at < ?2",
            params![start.timestamp_millis(), end.timestamp_millis()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn latest_report_time(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;

        let latest: Option<i64> =
            conn.query_row("SELECT MAX(created_at) FROM reports", [], |row| row.get(0))?;

        Ok(latest.and_then(DateTime::from_timestamp_millis))
    }

    /// Delete reports whose title contains `needle`
    pub fn delete_reports_with_title_containing(
        &self,
        needle: &str,
    ) -> Result<usize, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockError)?;
        let deleted = conn.execute(
            "DELETE FROM reports WHERE title LIKE ?1",
            params![format!("%{}%", needle)],
        )?;
        Ok(deleted)
    }
}

/// LIMIT/OFFSET operand; saturates instead of wrapping to a negative value
fn sql_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, millis))
}

/// Decode a JSON text column into its typed record
fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn news_from_row(row: &Row<'_>) -> rusqlite::Result<NewsItem> {
    Ok(NewsItem {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        url: row.get(3)?,
        source: row.get(4)?,
        published_at: timestamp_column(row, 5)?,
        tags: json_column(row, 6)?,
        category: row.get(7)?,
        processed: row.get(8)?,
        created_at: timestamp_column(row, 9)?,
        updated_at: timestamp_column(row, 10)?,
    })
}

fn report_from_row(row: &Row<'_>) -> rusqlite::Result<Report> {
    let report_type: String = row.get(6)?;
    let report_type = report_type
        .parse::<ReportType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, e.into()))?;

    Ok(Report {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        summary: row.get(3)?,
        news_analysis: json_column(row, 4)?,
        investment_recommendations: json_column(row, 5)?,
        report_type,
        created_at: timestamp_column(row, 7)?,
        updated_at: timestamp_column(row, 8)?,
    })
}

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to acquire lock")]
    LockError,
}

impl From<StorageError> for InvestError {
    fn from(err: StorageError) -> Self {
        InvestError::database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use invest_core::{InvestmentRecommendations, NewsAnalysis};

    fn create_test_news(url: &str, hours_ago: i64) -> NewNewsItem {
        NewNewsItem {
            title: format!("Headline for {}", url),
            content: "Stocks rose as bond yields fell.".to_string(),
            url: url.to_string(),
            source: "Test Source".to_string(),
            published_at: Utc::now() - Duration::hours(hours_ago),
            tags: vec!["stock".to_string(), "bond".to_string(), "international".to_string()],
            category: Some("international".to_string()),
            processed: false,
        }
    }

    fn create_test_report(report_type: ReportType) -> NewReport {
        NewReport {
            title: "오전 투자 리포트 - 2024년 12월 6일".to_string(),
            content: "content".to_string(),
            summary: "summary".to_string(),
            news_analysis: NewsAnalysis {
                processed_count: 2,
                key_insights: "insights".to_string(),
                categories: vec!["international".to_string()],
                analyzed_at: Utc::now(),
            },
            investment_recommendations: InvestmentRecommendations::new(
                report_type,
                "recommendations".to_string(),
            ),
            report_type,
        }
    }

    #[test]
    fn test_insert_and_query_news() {
        let storage = Storage::new_in_memory().unwrap();

        let id = storage.insert_news(&create_test_news("https://a.com/1", 1)).unwrap();
        assert!(id.is_some());

        let items = storage.unprocessed_news(25).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].tags, vec!["stock", "bond", "international"]);
        assert_eq!(items[0].category.as_deref(), Some("international"));
        assert!(!items[0].processed);
    }

    #[test]
    fn test_duplicate_url_is_ignored() {
        let storage = Storage::new_in_memory().unwrap();

        let item = create_test_news("https://a.com/1", 1);
        assert!(storage.insert_news(&item).unwrap().is_some());
        assert!(storage.insert_news(&item).unwrap().is_none());

        assert!(storage.news_exists("https://a.com/1").unwrap());
        assert_eq!(storage.count_news().unwrap(), 1);
    }

    #[test]
    fn test_unprocessed_ordering_and_marking() {
        let storage = Storage::new_in_memory().unwrap();

        let old = storage.insert_news(&create_test_news("https://a.com/old", 10)).unwrap().unwrap();
        let new = storage.insert_news(&create_test_news("https://a.com/new", 1)).unwrap().unwrap();

        let items = storage.unprocessed_news(25).unwrap();
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![new, old]);

        assert_eq!(storage.mark_news_processed(&[old]).unwrap(), 1);
        assert_eq!(storage.mark_news_processed(&[]).unwrap(), 0);
        assert_eq!(storage.count_processed_news().unwrap(), 1);
        assert_eq!(storage.unprocessed_news(25).unwrap().len(), 1);
    }

    #[test]
    fn test_news_window_counts() {
        let storage = Storage::new_in_memory().unwrap();

        storage.insert_news(&create_test_news("https://a.com/1", 2)).unwrap();
        storage.insert_news(&create_test_news("https://a.com/2", 48)).unwrap();

        let since = Utc::now() - Duration::hours(24);
        assert_eq!(storage.count_news_since(since).unwrap(), 1);
        assert_eq!(storage.news_since(since, 50).unwrap().len(), 1);
        assert_eq!(storage.news_by_category("international", 10).unwrap().len(), 2);
        assert!(storage.news_by_category("korean", 10).unwrap().is_empty());
    }

    #[test]
    fn test_report_round_trip() {
        let storage = Storage::new_in_memory().unwrap();

        let saved = storage.insert_report(&create_test_report(ReportType::Morning)).unwrap();
        let loaded = storage.get_report(saved.id).unwrap().unwrap();

        assert_eq!(loaded, saved);
        assert!(storage.get_report(saved.id + 100).unwrap().is_none());
    }

    #[test]
    fn test_report_counts_and_listing() {
        let storage = Storage::new_in_memory().unwrap();

        let first = storage.insert_report(&create_test_report(ReportType::Morning)).unwrap();
        let second = storage.insert_report(&create_test_report(ReportType::Evening)).unwrap();

        let counts = storage.report_counts().unwrap();
        assert_eq!(counts, ReportCounts { total: 2, morning: 1, evening: 1 });

        let page = storage.list_reports(0, 10).unwrap();
        assert_eq!(page.iter().map(|r| r.id).collect::<Vec<_>>(), vec![second.id, first.id]);
        assert_eq!(storage.list_reports(1, 10).unwrap().len(), 1);

        assert!(storage.latest_report_time().unwrap().is_some());
    }

    #[test]
    fn test_oversized_page_bounds_saturate() {
        let storage = Storage::new_in_memory().unwrap();
        storage.insert_report(&create_test_report(ReportType::Morning)).unwrap();
        storage.insert_news(&create_test_news("https://a.com/1", 1)).unwrap();

        assert_eq!(storage.list_reports(0, usize::MAX).unwrap().len(), 1);
        assert!(storage.list_reports(usize::MAX, 10).unwrap().is_empty());
        assert_eq!(storage.unprocessed_news(usize::MAX).unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_json_column_is_an_error() {
        let storage = Storage::new_in_memory().unwrap();
        let saved = storage.insert_report(&create_test_report(ReportType::Morning)).unwrap();

        {
            let conn = storage.conn.lock().unwrap();
            conn.execute(
                "UPDATE reports SET news_analysis = '{\"keyInsights\":\"x\"}' WHERE id = ?1",
                params![saved.id],
            )
            .unwrap();
        }

        assert!(storage.get_report(saved.id).is_err());
    }

    #[test]
    fn test_cleanup_helpers() {
        let storage = Storage::new_in_memory().unwrap();

        storage.insert_news(&create_test_news("https://test.example.com/x-1", 1)).unwrap();
        storage.insert_news(&create_test_news("https://real.com/x", 1)).unwrap();

        assert_eq!(storage.delete_news_with_url_containing("test.example.com").unwrap(), 1);
        assert_eq!(storage.count_news().unwrap(), 1);

        let mut report = create_test_report(ReportType::Evening);
        report.title = "Test report".to_string();
        storage.insert_report(&report).unwrap();
        storage.insert_report(&create_test_report(ReportType::Evening)).unwrap();

        assert_eq!(storage.delete_reports_with_title_containing("Test").unwrap(), 1);
        assert_eq!(storage.report_counts().unwrap().total, 1);
    }
}
