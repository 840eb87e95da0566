//! In-memory market data for integration testing.
//!
//! Every ticker is backed by a `TickerFixture`. Individual endpoints can
//! be forced to fail per ticker, and every call is recorded.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use beatscan::data::{DataError, DataResult, MarketData};
use beatscan::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    EarningsDate,
    Profile,
    Revisions,
    Insiders,
    Ratings,
    Prices,
    History,
}

/// Everything the provider knows about one ticker.
#[derive(Debug, Clone, Default)]
pub struct TickerFixture {
    pub earnings_date: Option<NaiveDate>,
    pub profile: CompanyProfile,
    pub revisions: Option<EpsRevisions>,
    pub insiders: Vec<InsiderTransaction>,
    pub ratings: Vec<RatingChange>,
    pub bars: Vec<PriceBar>,
    pub history: Vec<EarningsSurprise>,
}

impl TickerFixture {
    pub fn reporting(date: NaiveDate, name: &str, sector: &str, price: Option<f64>) -> Self {
        Self {
            earnings_date: Some(date),
            profile: CompanyProfile {
                name: Some(name.to_string()),
                sector: Some(sector.to_string()),
                market_cap: Some(50_000_000_000),
                current_price: price,
            },
            ..Default::default()
        }
    }

    /// Fixture with price history only (sector ETFs, benchmark).
    pub fn etf(closes: &[f64]) -> Self {
        Self {
            bars: bars(closes),
            ..Default::default()
        }
    }

    pub fn revisions(mut self, up: u32, down: u32) -> Self {
        self.revisions = Some(EpsRevisions {
            current_estimate: Some(1.25),
            up_last_7_days: up,
            down_last_7_days: down,
        });
        self
    }

    /// `n` open-market purchases of $100k each, plus one sale.
    pub fn insider_buys(mut self, n: usize, on: NaiveDate) -> Self {
        for i in 0..n {
            self.insiders.push(InsiderTransaction {
                date: on,
                insider: format!("Director {i}"),
                transaction: "Purchase at price 50.00 per share.".into(),
                shares: Some(2_000),
                value: Some(100_000.0),
            });
        }
        self.insiders.push(InsiderTransaction {
            date: on,
            insider: "Chief Financial Officer".into(),
            transaction: "Sale at price 51.00 per share.".into(),
            shares: Some(1_000),
            value: Some(51_000.0),
        });
        self
    }

    pub fn ratings(mut self, grades: &[&str], on: NaiveDate) -> Self {
        for grade in grades {
            self.ratings.push(RatingChange {
                date: on,
                firm: "Example Securities".into(),
                from_grade: Some("Hold".into()),
                to_grade: grade.to_string(),
                action: None,
            });
        }
        self
    }

    pub fn closes(mut self, closes: &[f64]) -> Self {
        self.bars = bars(closes);
        self
    }

    /// Surprise percentages, most recent quarter first.
    pub fn surprises(mut self, surprises: &[f64]) -> Self {
        self.history = surprises
            .iter()
            .enumerate()
            .map(|(i, s)| EarningsSurprise {
                quarter: NaiveDate::from_ymd_opt(2026, 6, 30)
                    .and_then(|d| d.checked_sub_days(Days::new(91 * i as u64)))
                    .unwrap(),
                eps_estimate: Some(1.0),
                eps_actual: Some(1.0 + s / 100.0),
                surprise_pct: Some(*s),
            })
            .collect();
        self
    }
}

/// Daily bars ending 2026-10-16, one per close, high == close.
pub fn bars(closes: &[f64]) -> Vec<PriceBar> {
    let last = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    let n = closes.len() as u64;
    closes
        .iter()
        .enumerate()
        .map(|(i, c)| PriceBar {
            date: last.checked_sub_days(Days::new(n - 1 - i as u64)).unwrap(),
            open: *c,
            high: *c,
            low: *c,
            close: *c,
            volume: 1_000_000,
        })
        .collect()
}

/// A deterministic `MarketData` with no external dependencies.
#[derive(Clone, Default)]
pub struct MockProvider {
    fixtures: Arc<Mutex<HashMap<String, TickerFixture>>>,
    failures: Arc<Mutex<HashSet<(String, Endpoint)>>>,
    calls: Arc<Mutex<Vec<(String, Endpoint)>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, ticker: &str, fixture: TickerFixture) {
        self.fixtures.lock().unwrap().insert(ticker.to_string(), fixture);
    }

    /// Force `endpoint` to fail for `ticker`.
    pub fn fail(&self, ticker: &str, endpoint: Endpoint) {
        self.failures.lock().unwrap().insert((ticker.to_string(), endpoint));
    }

    /// Force every endpoint to fail for `ticker` except the calendar and profile.
    pub fn fail_signals(&self, ticker: &str) {
        for endpoint in [
            Endpoint::Revisions,
            Endpoint::Insiders,
            Endpoint::Ratings,
            Endpoint::Prices,
            Endpoint::History,
        ] {
            self.fail(ticker, endpoint);
        }
    }

    pub fn call_count(&self, ticker: &str, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, e)| t == ticker && *e == endpoint)
            .count()
    }

    fn lookup<T>(
        &self,
        ticker: &str,
        endpoint: Endpoint,
        pick: impl FnOnce(&TickerFixture) -> T,
    ) -> DataResult<T> {
        self.calls.lock().unwrap().push((ticker.to_string(), endpoint));

        if self.failures.lock().unwrap().contains(&(ticker.to_string(), endpoint)) {
            return Err(DataError::Status {
                status: 500,
                url: format!("mock://{ticker}/{endpoint:?}"),
            });
        }

        let fixtures = self.fixtures.lock().unwrap();
        let fixture = fixtures.get(ticker).ok_or_else(|| DataError::NotFound {
            ticker: ticker.to_string(),
            module: format!("{endpoint:?}"),
        })?;
        Ok(pick(fixture))
    }
}

#[async_trait]
impl MarketData for MockProvider {
    async fn next_earnings_date(&self, ticker: &str) -> DataResult<Option<NaiveDate>> {
        self.lookup(ticker, Endpoint::EarningsDate, |f| f.earnings_date)
    }

    async fn company_profile(&self, ticker: &str) -> DataResult<CompanyProfile> {
        self.lookup(ticker, Endpoint::Profile, |f| f.profile.clone())
    }

    async fn eps_revisions(&self, ticker: &str) -> DataResult<Option<EpsRevisions>> {
        self.lookup(ticker, Endpoint::Revisions, |f| f.revisions.clone())
    }

    async fn insider_transactions(&self, ticker: &str) -> DataResult<Vec<InsiderTransaction>> {
        self.lookup(ticker, Endpoint::Insiders, |f| f.insiders.clone())
    }

    async fn rating_changes(&self, ticker: &str) -> DataResult<Vec<RatingChange>> {
        self.lookup(ticker, Endpoint::Ratings, |f| f.ratings.clone())
    }

    async fn price_history(&self, ticker: &str, _range: HistoryRange) -> DataResult<Vec<PriceBar>> {
        let bars = self.lookup(ticker, Endpoint::Prices, |f| f.bars.clone())?;
        if bars.is_empty() {
            return Err(DataError::NotFound {
                ticker: ticker.to_string(),
                module: "chart".into(),
            });
        }
        Ok(bars)
    }

    async fn earnings_history(&self, ticker: &str) -> DataResult<Vec<EarningsSurprise>> {
        self.lookup(ticker, Endpoint::History, |f| f.history.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
