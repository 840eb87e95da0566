//! Analyst rating-change signal.
//!
//! Counts bullish vs bearish target grades among rating changes in the
//! last 30 days. Net upgrades score 7 each (max 20); net downgrades are
//! a flat -10.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use super::{activity_cutoff, SignalEvaluator};
use crate::data::MarketData;
use crate::types::{Candidate, RatingChange, SignalKind, SignalResult};

const POINTS_PER_UPGRADE: i32 = 7;
const MAX_SCORE: i32 = 20;
const DOWNGRADE_PENALTY: i32 = -10;

const BULLISH_GRADES: &[&str] = &["buy", "outperform", "overweight"];
const BEARISH_GRADES: &[&str] = &["sell", "underperform", "underweight"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeBias {
    Bullish,
    Bearish,
    Neutral,
}

/// Classify a target grade (case-insensitive substring match).
/// A grade naming both sides counts as bearish.
pub fn classify_grade(grade: &str) -> GradeBias {
    let g = grade.to_lowercase();
    if BEARISH_GRADES.iter().any(|b| g.contains(b)) {
        GradeBias::Bearish
    } else if BULLISH_GRADES.iter().any(|b| g.contains(b)) {
        GradeBias::Bullish
    } else {
        GradeBias::Neutral
    }
}

pub fn analyst_score(upgrades: usize, downgrades: usize) -> i32 {
    if upgrades > downgrades {
        (upgrades.min(MAX_SCORE as usize) as i32 * POINTS_PER_UPGRADE).min(MAX_SCORE)
    } else if downgrades > upgrades {
        DOWNGRADE_PENALTY
    } else {
        0
    }
}

pub fn score(changes: &[RatingChange], today: NaiveDate) -> SignalResult {
    let kind = SignalKind::AnalystActivity;
    let cutoff = activity_cutoff(today);

    let recent: Vec<&RatingChange> = changes.iter().filter(|c| c.date > cutoff).collect();
    if recent.is_empty() {
        return SignalResult::no_signal(kind);
    }

    let (mut upgrades, mut downgrades) = (0usize, 0usize);
    for change in &recent {
        match classify_grade(&change.to_grade) {
            GradeBias::Bullish => upgrades += 1,
            GradeBias::Bearish => downgrades += 1,
            GradeBias::Neutral => {}
        }
    }

    let score = analyst_score(upgrades, downgrades);
    let (label, detail) = if upgrades > downgrades {
        ("Upgrades", Some(format!("{upgrades} recent upgrade(s)")))
    } else if downgrades > upgrades {
        ("Downgrades", Some(format!("{downgrades} recent downgrade(s)")))
    } else {
        ("Mixed", None)
    };

    SignalResult::new(kind, score, label, detail)
}

pub struct AnalystSignal;

#[async_trait]
impl SignalEvaluator for AnalystSignal {
    fn kind(&self) -> SignalKind {
        SignalKind::AnalystActivity
    }

    async fn evaluate(
        &self,
        data: &dyn MarketData,
        candidate: &Candidate,
        today: NaiveDate,
    ) -> SignalResult {
        debug!(ticker = %candidate.ticker, "Checking analyst activity");
        match data.rating_changes(&candidate.ticker).await {
            Ok(changes) => score(&changes, today),
            Err(e) => {
                warn!(ticker = %candidate.ticker, error = %e, "Analyst check failed");
                SignalResult::no_signal(self.kind())
            }
        }
    }
}
