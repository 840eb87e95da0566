//! Historical beat-rate signal.
//!
//! Companies that beat consensus in most of their last four reported
//! quarters tend to keep doing it.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use super::SignalEvaluator;
use crate::data::MarketData;
use crate::types::{Candidate, EarningsSurprise, SignalKind, SignalResult};

const QUARTERS: usize = 4;

/// >= 75% → 20, >= 50% → 10, else 0.
pub fn beat_rate_score(beats: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    // Integer comparison avoids rounding on 3/4 and 2/4.
    if beats * 4 >= total * 3 {
        20
    } else if beats * 2 >= total {
        10
    } else {
        0
    }
}

/// Score the most recent reported quarters (input is most recent first).
pub fn score(history: &[EarningsSurprise]) -> SignalResult {
    let kind = SignalKind::BeatRate;

    let reported: Vec<f64> = history
        .iter()
        .filter_map(|q| q.surprise_pct)
        .take(QUARTERS)
        .collect();
    if reported.is_empty() {
        return SignalResult::no_signal(kind);
    }

    let total = reported.len();
    let beats = reported.iter().filter(|s| **s > 0.0).count();
    let label = format!("{:.0}% beat rate", beats as f64 / total as f64 * 100.0);
    let detail = format!("{beats}/{total} quarters beat");

    SignalResult::new(kind, beat_rate_score(beats, total), label, Some(detail))
}

pub struct BeatRateSignal;

#[async_trait]
impl SignalEvaluator for BeatRateSignal {
    fn kind(&self) -> SignalKind {
        SignalKind::BeatRate
    }

    async fn evaluate(
        &self,
        data: &dyn MarketData,
        candidate: &Candidate,
        _today: NaiveDate,
    ) -> SignalResult {
        debug!(ticker = %candidate.ticker, "Checking historical beat rate");
        match data.earnings_history(&candidate.ticker).await {
            Ok(history) => score(&history),
            Err(e) => {
                warn!(ticker = %candidate.ticker, error = %e, "Historical check failed");
                SignalResult::no_signal(self.kind())
            }
        }
    }
}
