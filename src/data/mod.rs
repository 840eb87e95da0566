//! Market-data providers.
//!
//! Defines the `MarketData` trait the finder and signal evaluators query,
//! and the Yahoo Finance implementation used by the binary.

pub mod yahoo;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::{
    CompanyProfile, EarningsSurprise, EpsRevisions, HistoryRange, InsiderTransaction, PriceBar,
    RatingChange,
};

/// Errors from a market-data provider.
///
/// Callers never propagate these past a single ticker: the finder skips
/// the ticker and evaluators fall back to "no signal".
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("No {module} data for {ticker}")]
    NotFound { ticker: String, module: String },
}

pub type DataResult<T> = std::result::Result<T, DataError>;

/// Abstraction over the external financial-data source.
///
/// Any field may be missing upstream; implementations return `Ok(None)`,
/// an empty `Vec` or a default profile rather than an error when the
/// provider simply has nothing for a ticker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Next scheduled earnings date, if announced.
    async fn next_earnings_date(&self, ticker: &str) -> DataResult<Option<NaiveDate>>;

    /// Name, sector, market cap and current price.
    async fn company_profile(&self, ticker: &str) -> DataResult<CompanyProfile>;

    /// Current-quarter EPS estimate and 7-day revision counts.
    async fn eps_revisions(&self, ticker: &str) -> DataResult<Option<EpsRevisions>>;

    /// Recent insider transactions, any kind.
    async fn insider_transactions(&self, ticker: &str) -> DataResult<Vec<InsiderTransaction>>;

    /// Analyst rating changes, newest first.
    async fn rating_changes(&self, ticker: &str) -> DataResult<Vec<RatingChange>>;

    /// Daily bars, oldest first.
    async fn price_history(&self, ticker: &str, range: HistoryRange)
        -> DataResult<Vec<PriceBar>>;

    /// Quarterly reports, most recent first.
    async fn earnings_history(&self, ticker: &str) -> DataResult<Vec<EarningsSurprise>>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}
