//! Insider buying signal.
//!
//! Open-market purchases by insiders in the 30 days before earnings.
//! Three or more purchases is treated as cluster buying.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use super::{activity_cutoff, SignalEvaluator};
use crate::data::MarketData;
use crate::types::{Candidate, InsiderTransaction, SignalKind, SignalResult};

const CLUSTER_THRESHOLD: usize = 3;

/// 1 → 10, 2 → 15, 3 or more → 25.
pub fn insider_score(purchases: usize) -> i32 {
    match purchases {
        0 => 0,
        1 => 10,
        2 => 15,
        _ => 25,
    }
}

/// Score the purchases among `transactions` dated after the 30-day cutoff.
pub fn score(transactions: &[InsiderTransaction], today: NaiveDate) -> SignalResult {
    let kind = SignalKind::InsiderActivity;
    let cutoff = activity_cutoff(today);

    let purchases: Vec<&InsiderTransaction> = transactions
        .iter()
        .filter(|t| t.date > cutoff && t.is_purchase())
        .collect();

    if purchases.is_empty() {
        return SignalResult::no_signal(kind);
    }

    let count = purchases.len();
    let label = if count >= CLUSTER_THRESHOLD {
        "Cluster buying"
    } else {
        "Insider buying"
    };

    let total_value: f64 = purchases.iter().filter_map(|t| t.value).sum();
    let detail = if total_value > 0.0 {
        format!("{label}: {count} purchase(s), ${total_value:.0} total")
    } else {
        format!("{label}: {count} purchase(s)")
    };

    SignalResult::new(kind, insider_score(count), label, Some(detail))
}

pub struct InsiderSignal;

#[async_trait]
impl SignalEvaluator for InsiderSignal {
    fn kind(&self) -> SignalKind {
        SignalKind::InsiderActivity
    }

    async fn evaluate(
        &self,
        data: &dyn MarketData,
        candidate: &Candidate,
        today: NaiveDate,
    ) -> SignalResult {
        debug!(ticker = %candidate.ticker, "Checking insider activity");
        match data.insider_transactions(&candidate.ticker).await {
            Ok(transactions) => score(&transactions, today),
            Err(e) => {
                warn!(ticker = %candidate.ticker, error = %e, "Insider check failed");
                SignalResult::no_signal(self.kind())
            }
        }
    }
}
