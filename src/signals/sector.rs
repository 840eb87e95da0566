//! Sector relative-strength signal.
//!
//! Compares the candidate's sector SPDR ETF against SPY over the last
//! 10 trading days. A rising sector lifts most of its members into
//! earnings.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use super::{pct_change, SignalEvaluator};
use crate::data::{DataResult, MarketData};
use crate::types::{Candidate, HistoryRange, PriceBar, SignalKind, SignalResult};

pub const BENCHMARK_ETF: &str = "SPY";

const SECTOR_ETFS: &[(&str, &str)] = &[
    ("Technology", "XLK"),
    ("Financial Services", "XLF"),
    ("Healthcare", "XLV"),
    ("Consumer Cyclical", "XLY"),
    ("Industrials", "XLI"),
    ("Energy", "XLE"),
    ("Consumer Defensive", "XLP"),
    ("Real Estate", "XLRE"),
    ("Communication Services", "XLC"),
    ("Utilities", "XLU"),
    ("Basic Materials", "XLB"),
];

/// SPDR ETF tracking a provider sector name (exact match).
pub fn sector_etf(sector: &str) -> Option<&'static str> {
    SECTOR_ETFS
        .iter()
        .find(|(name, _)| *name == sector)
        .map(|(_, etf)| *etf)
}

/// > 2% → 15, > 0% → 10, else 0.
pub fn sector_score(outperformance_pct: f64) -> i32 {
    if outperformance_pct > 2.0 {
        15
    } else if outperformance_pct > 0.0 {
        10
    } else {
        0
    }
}

/// First-to-last close return over the window, in percent.
pub fn period_return(bars: &[PriceBar]) -> Option<f64> {
    let first = bars.first()?;
    let last = bars.last()?;
    pct_change(first.close, last.close)
}

pub fn score(etf: &str, etf_bars: &[PriceBar], benchmark_bars: &[PriceBar]) -> SignalResult {
    let kind = SignalKind::SectorMomentum;
    let (Some(etf_return), Some(benchmark_return)) =
        (period_return(etf_bars), period_return(benchmark_bars))
    else {
        return SignalResult::no_signal(kind);
    };

    let outperformance = etf_return - benchmark_return;
    let score = sector_score(outperformance);
    let label = format!("{etf} vs {BENCHMARK_ETF}");
    let detail = format!("Sector outperforming by {outperformance:.1}%");
    SignalResult::new(kind, score, label, Some(detail))
}

pub struct SectorMomentumSignal;

impl SectorMomentumSignal {
    async fn fetch_pair(
        data: &dyn MarketData,
        etf: &str,
    ) -> DataResult<(Vec<PriceBar>, Vec<PriceBar>)> {
        let etf_bars = data.price_history(etf, HistoryRange::TenDays).await?;
        let benchmark_bars = data.price_history(BENCHMARK_ETF, HistoryRange::TenDays).await?;
        Ok((etf_bars, benchmark_bars))
    }
}

#[async_trait]
impl SignalEvaluator for SectorMomentumSignal {
    fn kind(&self) -> SignalKind {
        SignalKind::SectorMomentum
    }

    async fn evaluate(
        &self,
        data: &dyn MarketData,
        candidate: &Candidate,
        _today: NaiveDate,
    ) -> SignalResult {
        debug!(ticker = %candidate.ticker, sector = %candidate.sector, "Checking sector momentum");

        let Some(etf) = sector_etf(&candidate.sector) else {
            debug!(sector = %candidate.sector, "No sector ETF mapped");
            return SignalResult::no_signal(self.kind());
        };

        match Self::fetch_pair(data, etf).await {
            Ok((etf_bars, benchmark_bars)) => score(etf, &etf_bars, &benchmark_bars),
            Err(e) => {
                warn!(ticker = %candidate.ticker, etf, error = %e, "Sector check failed");
                SignalResult::no_signal(self.kind())
            }
        }
    }
}
