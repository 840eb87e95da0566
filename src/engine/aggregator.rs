//! Signal aggregation.
//!
//! Runs every evaluator against a candidate, in order, and folds the
//! results into a `StockAnalysis`. Evaluators are isolated from each
//! other: each returns its own result, and a failed one contributes 0.

use chrono::NaiveDate;
use tracing::{debug, info};

use super::pacer::Pacer;
use crate::data::MarketData;
use crate::signals::{default_evaluators, SignalEvaluator};
use crate::types::{Candidate, StockAnalysis};

pub struct Aggregator {
    evaluators: Vec<Box<dyn SignalEvaluator>>,
    threshold: i32,
}

impl Aggregator {
    /// Aggregator over the six standard signals.
    pub fn new(threshold: i32) -> Self {
        Self::with_evaluators(default_evaluators(), threshold)
    }

    pub fn with_evaluators(evaluators: Vec<Box<dyn SignalEvaluator>>, threshold: i32) -> Self {
        Self {
            evaluators,
            threshold,
        }
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Evaluate all signals for one candidate.
    pub async fn analyze(
        &self,
        data: &dyn MarketData,
        candidate: &Candidate,
        today: NaiveDate,
        pacer: &Pacer,
    ) -> StockAnalysis {
        info!(ticker = %candidate.ticker, company = %candidate.company, "Analyzing");

        let mut analysis = StockAnalysis::for_candidate(candidate);
        for (i, evaluator) in self.evaluators.iter().enumerate() {
            if i > 0 {
                pacer.after_signal().await;
            }
            let result = evaluator.evaluate(data, candidate, today).await;
            debug!(
                ticker = %candidate.ticker,
                signal = %result.kind,
                score = result.score,
                has_data = result.has_data,
                "Signal evaluated"
            );
            analysis.record(result);
        }

        info!(ticker = %candidate.ticker, total_score = analysis.total_score, "Total score");
        analysis
    }

    pub fn qualifies(&self, analysis: &StockAnalysis) -> bool {
        analysis.qualifies(self.threshold)
    }
}
