//! Estimate-revision (ESP-style) signal.
//!
//! More upward than downward EPS revisions in the last 7 days suggests
//! analysts are chasing a beat. 5 points per upward revision, max 30.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use super::SignalEvaluator;
use crate::data::MarketData;
use crate::types::{Candidate, EpsRevisions, SignalKind, SignalResult};

const POINTS_PER_REVISION: i32 = 5;
const MAX_SCORE: i32 = 30;

pub fn revision_score(up: u32, down: u32) -> i32 {
    if up > down {
        (up.min(MAX_SCORE as u32) as i32 * POINTS_PER_REVISION).min(MAX_SCORE)
    } else {
        0
    }
}

pub fn strength_label(score: i32) -> &'static str {
    if score > 20 {
        "Strong"
    } else if score > 10 {
        "Moderate"
    } else {
        "Weak"
    }
}

/// Score revision data; no current-quarter estimate means no signal.
pub fn score(revisions: Option<&EpsRevisions>) -> SignalResult {
    let kind = SignalKind::EstimateRevisions;
    let Some(rev) = revisions.filter(|r| r.current_estimate.is_some()) else {
        return SignalResult::no_signal(kind);
    };

    let score = revision_score(rev.up_last_7_days, rev.down_last_7_days);
    let label = strength_label(score);
    let detail = format!(
        "{label}: {} up / {} down revisions (7d)",
        rev.up_last_7_days, rev.down_last_7_days
    );
    SignalResult::new(kind, score, label, Some(detail))
}

pub struct EstimateRevisionSignal;

#[async_trait]
impl SignalEvaluator for EstimateRevisionSignal {
    fn kind(&self) -> SignalKind {
        SignalKind::EstimateRevisions
    }

    async fn evaluate(
        &self,
        data: &dyn MarketData,
        candidate: &Candidate,
        _today: NaiveDate,
    ) -> SignalResult {
        debug!(ticker = %candidate.ticker, "Calculating ESP");
        match data.eps_revisions(&candidate.ticker).await {
            Ok(revisions) => score(revisions.as_ref()),
            Err(e) => {
                warn!(ticker = %candidate.ticker, error = %e, "ESP calculation failed");
                SignalResult::no_signal(self.kind())
            }
        }
    }
}
