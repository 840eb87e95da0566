//! Candidate finder.
//!
//! Walks the ticker universe in order and keeps tickers whose next
//! earnings date falls inside `[today, today + lookahead]`. Provider
//! errors skip the ticker; there are no retries.

use chrono::{Days, NaiveDate};
use tracing::{debug, info, warn};

use super::pacer::Pacer;
use crate::data::{DataResult, MarketData};
use crate::types::{Candidate, CompanyProfile};

pub const UNKNOWN_SECTOR: &str = "Unknown";

pub struct CandidateFinder<'a> {
    data: &'a dyn MarketData,
    pacer: &'a Pacer,
    lookahead_days: u32,
}

impl<'a> CandidateFinder<'a> {
    pub fn new(data: &'a dyn MarketData, pacer: &'a Pacer, lookahead_days: u32) -> Self {
        Self {
            data,
            pacer,
            lookahead_days,
        }
    }

    /// Inclusive window end.
    pub fn window_end(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_add_days(Days::new(u64::from(self.lookahead_days)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Tickers reporting inside the window, in universe order.
    pub async fn find(&self, universe: &[String], today: NaiveDate) -> Vec<Candidate> {
        let cutoff = self.window_end(today);
        info!(
            tickers = universe.len(),
            from = %today,
            to = %cutoff,
            "Fetching upcoming earnings calendar"
        );

        let mut candidates = Vec::new();
        for ticker in universe {
            match self.check_ticker(ticker, today, cutoff).await {
                Ok(Some(candidate)) => {
                    info!(
                        ticker = %candidate.ticker,
                        earnings_date = %candidate.earnings_date,
                        "Found upcoming earnings"
                    );
                    candidates.push(candidate);
                }
                Ok(None) => {}
                Err(e) => warn!(ticker = %ticker, error = %e, "Skipping ticker"),
            }
            self.pacer.after_ticker().await;
        }

        info!(count = candidates.len(), "Stocks with upcoming earnings");
        candidates
    }

    async fn check_ticker(
        &self,
        ticker: &str,
        today: NaiveDate,
        cutoff: NaiveDate,
    ) -> DataResult<Option<Candidate>> {
        let Some(earnings_date) = self.data.next_earnings_date(ticker).await? else {
            debug!(ticker, "No earnings date");
            return Ok(None);
        };

        if earnings_date < today || earnings_date > cutoff {
            debug!(ticker, %earnings_date, "Earnings outside window");
            return Ok(None);
        }

        let profile = self.data.company_profile(ticker).await?;
        Ok(Some(build_candidate(ticker, earnings_date, profile)))
    }
}

/// Fill in provider metadata, defaulting what is missing.
pub fn build_candidate(ticker: &str, earnings_date: NaiveDate, profile: CompanyProfile) -> Candidate {
    Candidate {
        ticker: ticker.to_string(),
        company: profile.name.unwrap_or_else(|| ticker.to_string()),
        sector: profile.sector.unwrap_or_else(|| UNKNOWN_SECTOR.to_string()),
        earnings_date,
        market_cap: profile.market_cap.unwrap_or(0),
    }
}
