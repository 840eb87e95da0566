//! Price momentum signal.
//!
//! A stock running up into earnings and holding near its 30-day high
//! tends to have buyers positioned for a beat.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use super::{pct_change, SignalEvaluator};
use crate::data::MarketData;
use crate::types::{Candidate, HistoryRange, PriceBar, SignalKind, SignalResult};

/// Fewer bars than this is not enough history.
const MIN_BARS: usize = 6;
const LOOKBACK_BARS: usize = 10;

const STRONG_RUN_PCT: f64 = 5.0;
const RUN_PCT: f64 = 2.0;
const NEAR_HIGH_PCT: f64 = -3.0;

const STRONG_RUN_POINTS: i32 = 15;
const RUN_POINTS: i32 = 10;
const NEAR_HIGH_POINTS: i32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct MomentumReading {
    pub current_price: f64,
    /// Return over the last 10 bars, in percent.
    pub change_10d_pct: f64,
    /// Distance from the period high, in percent (<= 0).
    pub from_high_pct: f64,
}

/// Compute the reading from daily bars (oldest first).
pub fn reading(bars: &[PriceBar]) -> Option<MomentumReading> {
    if bars.len() < MIN_BARS {
        return None;
    }

    let current = bars.last()?.close;
    let reference = if bars.len() >= LOOKBACK_BARS {
        bars[bars.len() - LOOKBACK_BARS].close
    } else {
        bars[0].close
    };
    let high = bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);

    Some(MomentumReading {
        current_price: current,
        change_10d_pct: pct_change(reference, current)?,
        from_high_pct: pct_change(high, current)?,
    })
}

pub fn score(bars: &[PriceBar]) -> SignalResult {
    let kind = SignalKind::PriceMomentum;
    let Some(r) = reading(bars) else {
        return SignalResult::no_signal(kind);
    };

    let mut score = 0;
    let mut details = Vec::new();

    if r.change_10d_pct > STRONG_RUN_PCT {
        score += STRONG_RUN_POINTS;
        details.push(format!("Up {:.1}% in 10 days", r.change_10d_pct));
    } else if r.change_10d_pct > RUN_PCT {
        score += RUN_POINTS;
        details.push(format!("Up {:.1}% in 10 days", r.change_10d_pct));
    }

    if r.from_high_pct > NEAR_HIGH_PCT {
        score += NEAR_HIGH_POINTS;
        details.push("Near 30-day highs".to_string());
    }

    let label = if score > 0 { "Building momentum" } else { "No momentum" };
    SignalResult::with_details(kind, score, label, details)
}

pub struct PriceMomentumSignal;

#[async_trait]
impl SignalEvaluator for PriceMomentumSignal {
    fn kind(&self) -> SignalKind {
        SignalKind::PriceMomentum
    }

    async fn evaluate(
        &self,
        data: &dyn MarketData,
        candidate: &Candidate,
        _today: NaiveDate,
    ) -> SignalResult {
        debug!(ticker = %candidate.ticker, "Checking price momentum");
        match data.price_history(&candidate.ticker, HistoryRange::OneMonth).await {
            Ok(bars) => score(&bars),
            Err(e) => {
                warn!(ticker = %candidate.ticker, error = %e, "Momentum check failed");
                SignalResult::no_signal(self.kind())
            }
        }
    }
}
