//! Report data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which slot of the day a report is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Morning,
    Evening,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Morning => "morning",
            ReportType::Evening => "evening",
        }
    }

    /// Korean heading used in report titles
    pub fn title_label(&self) -> &'static str {
        match self {
            ReportType::Morning => "오전 투자 리포트",
            ReportType::Evening => "오후 투자 리포트",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morning" => Ok(ReportType::Morning),
            "evening" => Ok(ReportType::Evening),
            _ => Err(format!("Type must be \"morning\" or \"evening\", got: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Conservative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeHorizon {
    #[serde(rename = "long-term")]
    LongTerm,
}

/// Digest of the news consumed by a report run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsAnalysis {
    /// Number of news items marked processed by this run
    pub processed_count: usize,
    pub key_insights: String,
    /// Categories and leading tags of the consumed items (at most 8)
    pub categories: Vec<String>,
    #[serde(alias = "analysisTime")]
    pub analyzed_at: DateTime<Utc>,
}

/// Generated recommendations plus the fixed investor profile metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentRecommendations {
    pub generated_at: DateTime<Utc>,
    pub report_type: ReportType,
    pub content: String,
    pub risk_level: RiskLevel,
    pub time_horizon: TimeHorizon,
}

impl InvestmentRecommendations {
    pub fn new(report_type: ReportType, content: String) -> Self {
        Self {
            generated_at: Utc::now(),
            report_type,
            content,
            risk_level: RiskLevel::Conservative,
            time_horizon: TimeHorizon::LongTerm,
        }
    }
}

/// A stored investment report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub news_analysis: NewsAnalysis,
    pub investment_recommendations: InvestmentRecommendations,
    pub report_type: ReportType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert form of a report
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub news_analysis: NewsAnalysis,
    pub investment_recommendations: InvestmentRecommendations,
    pub report_type: ReportType,
}

/// Counters over the reports table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub total: usize,
    pub morning_reports: usize,
    pub evening_reports: usize,
    pub today_reports: usize,
    pub latest_report_time: Option<DateTime<Utc>>,
    pub stats_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_type_parsing() {
        assert_eq!("morning".parse::<ReportType>(), Ok(ReportType::Morning));
        assert_eq!("Evening".parse::<ReportType>(), Ok(ReportType::Evening));
        assert!("midday".parse::<ReportType>().is_err());
        assert!("".parse::<ReportType>().is_err());
    }

    #[test]
    fn test_recommendations_serialize_fixed_profile() {
        let recs = InvestmentRecommendations::new(ReportType::Evening, "text".to_string());
        let json = serde_json::to_value(&recs).unwrap();
        assert_eq!(json["riskLevel"], "conservative");
        assert_eq!(json["timeHorizon"], "long-term");
        assert_eq!(json["reportType"], "evening");
    }

    #[test]
    fn test_news_analysis_rejects_missing_count() {
        let raw = r#"{"keyInsights":"x","categories":[],"analyzedAt":"2024-12-06T00:00:00Z"}"#;
        assert!(serde_json::from_str::<NewsAnalysis>(raw).is_err());
    }
}
