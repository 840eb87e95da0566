//! Scan orchestrator.
//!
//! One pass: find candidates → score each → keep those at or above the
//! alert threshold → alert in descending score order. Every step is
//! awaited in sequence and paced by fixed delays. Nothing is persisted
//! between runs.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::aggregator::Aggregator;
use super::finder::CandidateFinder;
use super::pacer::Pacer;
use crate::config::AppConfig;
use crate::data::MarketData;
use crate::notify::{build_alert, AlertChannel};
use crate::types::{Candidate, StockAnalysis};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Outcome of one scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub scan_date: NaiveDate,
    pub tickers_checked: usize,
    pub candidates: Vec<Candidate>,
    /// Every analysis, in discovery order.
    pub analyses: Vec<StockAnalysis>,
    /// Analyses at or above the threshold, highest score first.
    pub qualifying: Vec<StockAnalysis>,
    pub alerts_sent: usize,
    pub alerts_failed: usize,
}

impl ScanReport {
    fn new(scan_id: Uuid, scan_date: NaiveDate, tickers_checked: usize) -> Self {
        Self {
            scan_id,
            scan_date,
            tickers_checked,
            candidates: Vec::new(),
            analyses: Vec::new(),
            qualifying: Vec::new(),
            alerts_sent: 0,
            alerts_failed: 0,
        }
    }

    pub fn alerts_attempted(&self) -> usize {
        self.alerts_sent + self.alerts_failed
    }

    pub fn qualifying_tickers(&self) -> Vec<&str> {
        self.qualifying.iter().map(|a| a.ticker.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

pub struct Scanner {
    data: Arc<dyn MarketData>,
    channel: Arc<dyn AlertChannel>,
    aggregator: Aggregator,
    pacer: Pacer,
    universe: Vec<String>,
    lookahead_days: u32,
    footer: String,
}

impl Scanner {
    pub fn new(config: &AppConfig, data: Arc<dyn MarketData>, channel: Arc<dyn AlertChannel>) -> Self {
        Self {
            data,
            channel,
            aggregator: Aggregator::new(config.scanner.alert_threshold),
            pacer: Pacer::new(&config.pacing),
            universe: config.scanner.universe.clone(),
            lookahead_days: config.scanner.lookahead_days,
            footer: config.notifier.footer.clone(),
        }
    }

    pub fn with_aggregator(mut self, aggregator: Aggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    /// Run one full scan as of `today`.
    pub async fn run(&self, today: NaiveDate) -> ScanReport {
        let scan_id = Uuid::new_v4();
        let span = info_span!("scan", %scan_id, %today, provider = self.data.name());
        self.run_inner(scan_id, today).instrument(span).await
    }

    async fn run_inner(&self, scan_id: Uuid, today: NaiveDate) -> ScanReport {
        info!(
            threshold = self.aggregator.threshold(),
            lookahead_days = self.lookahead_days,
            "Starting earnings beat scan"
        );
        let mut report = ScanReport::new(scan_id, today, self.universe.len());

        let finder = CandidateFinder::new(self.data.as_ref(), &self.pacer, self.lookahead_days);
        report.candidates = finder.find(&self.universe, today).await;
        if report.candidates.is_empty() {
            info!(lookahead_days = self.lookahead_days, "No upcoming earnings found");
            return report;
        }

        info!(count = report.candidates.len(), "Analyzing candidates");
        for candidate in &report.candidates {
            let analysis = self
                .aggregator
                .analyze(self.data.as_ref(), candidate, today, &self.pacer)
                .await;
            if self.aggregator.qualifies(&analysis) {
                info!(ticker = %analysis.ticker, score = analysis.total_score, "Alert candidate");
            } else {
                info!(ticker = %analysis.ticker, score = analysis.total_score, "Below threshold");
            }
            report.analyses.push(analysis);
            self.pacer.after_candidate().await;
        }

        report.qualifying = report
            .analyses
            .iter()
            .filter(|a| self.aggregator.qualifies(a))
            .cloned()
            .collect();
        // Stable: equal scores keep discovery order.
        report
            .qualifying
            .sort_by(|a, b| b.total_score.cmp(&a.total_score));

        info!(count = report.qualifying.len(), "Sending alerts");
        for analysis in &report.qualifying {
            if self.alert(analysis, today).await {
                report.alerts_sent += 1;
            } else {
                report.alerts_failed += 1;
            }
            self.pacer.after_alert().await;
        }

        info!(
            analyzed = report.analyses.len(),
            qualifying = report.qualifying.len(),
            alerts_sent = report.alerts_sent,
            alerts_failed = report.alerts_failed,
            "Scan complete"
        );
        report
    }

    /// Render and deliver one alert. Returns whether it was accepted.
    async fn alert(&self, analysis: &StockAnalysis, today: NaiveDate) -> bool {
        let price = match self.data.company_profile(&analysis.ticker).await {
            Ok(profile) => profile.current_price,
            Err(e) => {
                warn!(ticker = %analysis.ticker, error = %e, "Price lookup failed, omitting suggested play");
                None
            }
        };

        let payload = build_alert(analysis, price, today, Utc::now(), &self.footer);
        match self.channel.send(&payload).await {
            Ok(()) => {
                info!(ticker = %analysis.ticker, channel = self.channel.name(), "Alert sent");
                true
            }
            Err(e) => {
                warn!(ticker = %analysis.ticker, channel = self.channel.name(), error = %e, "Alert failed");
                false
            }
        }
    }
}
