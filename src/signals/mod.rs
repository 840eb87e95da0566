//! Bullish pre-earnings signals.
//!
//! Each signal is an independent, stateless evaluator that queries the
//! `MarketData` provider and returns a bounded score with a short
//! justification. Evaluators never fail: missing data or a provider
//! error yields `SignalResult::no_signal`.

pub mod revisions;
pub mod insider;
pub mod analyst;
pub mod momentum;
pub mod beat_rate;
pub mod sector;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};

use crate::data::MarketData;
use crate::types::{Candidate, SignalKind, SignalResult};

/// Lookback used by the insider and analyst signals.
pub const ACTIVITY_LOOKBACK_DAYS: u64 = 30;

/// A single scoring rule.
#[async_trait]
pub trait SignalEvaluator: Send + Sync {
    fn kind(&self) -> SignalKind;

    /// Score one candidate as of `today`.
    async fn evaluate(
        &self,
        data: &dyn MarketData,
        candidate: &Candidate,
        today: NaiveDate,
    ) -> SignalResult;
}

/// The six evaluators in their fixed evaluation order.
pub fn default_evaluators() -> Vec<Box<dyn SignalEvaluator>> {
    vec![
        Box::new(revisions::EstimateRevisionSignal),
        Box::new(insider::InsiderSignal),
        Box::new(analyst::AnalystSignal),
        Box::new(momentum::PriceMomentumSignal),
        Box::new(beat_rate::BeatRateSignal),
        Box::new(sector::SectorMomentumSignal),
    ]
}

/// Records dated strictly after this are "recent".
pub(crate) fn activity_cutoff(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(ACTIVITY_LOOKBACK_DAYS))
        .unwrap_or(NaiveDate::MIN)
}

/// Percentage change from `from` to `to`.
pub(crate) fn pct_change(from: f64, to: f64) -> Option<f64> {
    if from > 0.0 && from.is_finite() && to.is_finite() {
        Some((to - from) / from * 100.0)
    } else {
        None
    }
}
