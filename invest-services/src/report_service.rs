//! Report Service
//!
//! Turns the current batch of unprocessed news into a stored investment
//! report, and serves the stored reports back.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{info, instrument};

use invest_core::{
    InvestError, InvestResult, InvestmentRecommendations, NewReport, NewsAnalysis, NewsItem,
    Report, ReportStats, ReportType,
};
use invest_llm::{prompts, AnalysisClient};

use crate::news_service::NewsService;
use crate::storage::Storage;

/// At most this many categories are recorded per report
const MAX_CATEGORIES: usize = 8;
/// Tags contributed per news item to the category digest
const TAGS_PER_ITEM: usize = 3;
/// Window used for the "recent news" count in the insights prompt
const RECENT_WINDOW_HOURS: i64 = 12;

/// Report generator and read side
pub struct ReportService {
    storage: Arc<Storage>,
    news: Arc<NewsService>,
    llm: Arc<AnalysisClient>,
    timezone: Tz,
}

impl ReportService {
    pub fn new(
        storage: Arc<Storage>,
        news: Arc<NewsService>,
        llm: Arc<AnalysisClient>,
        timezone: Tz,
    ) -> Self {
        Self {
            storage,
            news,
            llm,
            timezone,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Run the full pipeline for one report: collect news, analyze the
    /// unprocessed batch, write the report, persist it, then mark the batch
    /// processed.
    #[instrument(skip(self))]
    pub async fn generate(&self, report_type: ReportType) -> InvestResult<Report> {
        info!("Starting {} report generation", report_type);

        self.news.collect().await;

        let items = self.news.unprocessed()?;
        info!("Found {} unprocessed news items", items.len());

        let categories = news_categories(&items);

        let (news_analysis, key_insights) = if items.is_empty() {
            (
                prompts::NO_NEWS_ANALYSIS.to_string(),
                prompts::NO_NEWS_INSIGHTS.to_string(),
            )
        } else {
            let analysis = self.llm.summarize_news(&items).await;
            let insights = self.extract_key_insights(&items, &categories).await;
            (analysis, insights)
        };

        info!("Writing {} report body", report_type);
        let body = self
            .llm
            .analyze(&prompts::investment_report(
                report_type,
                &news_analysis,
                &key_insights,
            ))
            .await;
        let content = if items.is_empty() {
            format!("{}\n\n{}", prompts::NO_NEWS_ANALYSIS, body)
        } else {
            body
        };

        let summary = self
            .llm
            .analyze(&prompts::report_summary(&content, report_type))
            .await;

        let recommendations = self
            .llm
            .analyze(&prompts::recommendations(&news_analysis))
            .await;

        let new_report = NewReport {
            title: report_title(report_type, Utc::now().with_timezone(&self.timezone).date_naive()),
            content,
            summary,
            news_analysis: NewsAnalysis {
                processed_count: items.len(),
                key_insights,
                categories,
                analyzed_at: Utc::now(),
            },
            investment_recommendations: InvestmentRecommendations::new(
                report_type,
                recommendations,
            ),
            report_type,
        };

        let report = self.storage.insert_report(&new_report)?;

        let ids: Vec<i64> = items.iter().map(|item| item.id).collect();
        self.news.mark_processed(&ids)?;

        info!("{} report generated: id {}", report_type, report.id);
        Ok(report)
    }

    async fn extract_key_insights(&self, items: &[NewsItem], categories: &[String]) -> String {
        let cutoff = Utc::now() - Duration::hours(RECENT_WINDOW_HOURS);
        let recent_count = items.iter().filter(|i| i.published_at >= cutoff).count();

        self.llm
            .analyze(&prompts::key_insights(items, recent_count, categories))
            .await
    }

    /// One page of reports, newest first, with the total row count
    pub fn list(&self, page: usize, limit: usize) -> InvestResult<(Vec<Report>, usize)> {
        let offset = page.saturating_sub(1).saturating_mul(limit);
        let reports = self.storage.list_reports(offset, limit)?;
        let total = self.storage.report_counts()?.total;
        Ok((reports, total))
    }

    pub fn get(&self, id: i64) -> InvestResult<Option<Report>> {
        Ok(self.storage.get_report(id)?)
    }

    /// Reports created during `date` in the configured timezone
    pub fn by_date(&self, date: NaiveDate) -> InvestResult<Vec<Report>> {
        let (start, next) = day_bounds(self.timezone, date)?;
        self.by_date_range(start, next - Duration::milliseconds(1))
    }

    /// Reports created within `[start, end]`, newest first
    pub fn by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> InvestResult<Vec<Report>> {
        Ok(self.storage.reports_between(start, end)?)
    }

    pub fn stats(&self) -> InvestResult<ReportStats> {
        let counts = self.storage.report_counts()?;
        let today = Utc::now().with_timezone(&self.timezone).date_naive();
        let (start, next) = day_bounds(self.timezone, today)?;

        Ok(ReportStats {
            total: counts.total,
            morning_reports: counts.morning,
            evening_reports: counts.evening,
            today_reports: self.storage.count_reports_between(start, next)?,
            latest_report_time: self.storage.latest_report_time()?,
            stats_time: Utc::now(),
        })
    }
}

/// `"오전 투자 리포트 - 2024년 12월 6일"` style title
pub fn report_title(report_type: ReportType, date: NaiveDate) -> String {
    format!("{} - {}", report_type.title_label(), korean_date(date))
}

/// `2024년 12월 6일`
pub fn korean_date(date: NaiveDate) -> String {
    format!("{}년 {}월 {}일", date.year(), date.month(), date.day())
}

/// Each item's category followed by its first three tags, unique, at most eight
pub fn news_categories(items: &[NewsItem]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .flat_map(|item| {
            item.category
                .iter()
                .chain(item.tags.iter().take(TAGS_PER_ITEM))
        })
        .filter(|c| seen.insert(*c))
        .take(MAX_CATEGORIES)
        .cloned()
        .collect()
}

/// UTC instants of local midnight on `date` and on the following day
fn day_bounds(tz: Tz, date: NaiveDate) -> InvestResult<(DateTime<Utc>, DateTime<Utc>)> {
    let midnight = |d: NaiveDate| {
        d.and_hms_opt(0, 0, 0)
            .and_then(|naive| tz.from_local_datetime(&naive).earliest())
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| InvestError::invalid_input(format!("No local midnight on {}", d)))
    };

    let next = date
        .succ_opt()
        .ok_or_else(|| InvestError::invalid_input(format!("Date out of range: {}", date)))?;

    Ok((midnight(date)?, midnight(next)?))
}
