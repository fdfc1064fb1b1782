//! Core types for the Investment Helper
//!
//! This crate defines the shared data structures used across the workspace:
//! collected news items, generated reports and the error type.

pub mod error;
pub mod news;
pub mod report;

pub use error::{InvestError, InvestResult};
pub use news::{NewNewsItem, NewsItem, NewsStats};
pub use report::{
    InvestmentRecommendations, NewReport, NewsAnalysis, Report, ReportStats, ReportType,
    RiskLevel, TimeHorizon,
};
