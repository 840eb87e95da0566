//! Shared types for the BEATSCAN screener.
//!
//! These types form the data model used across all modules.
//! Market-data records come from a `MarketData` provider; candidates,
//! signal results and analyses are built by the engine during one scan
//! and dropped when it finishes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// A ticker with an earnings announcement inside the lookahead window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub ticker: String,
    pub company: String,
    /// Provider sector name, e.g. "Technology". "Unknown" when absent.
    pub sector: String,
    pub earnings_date: NaiveDate,
    /// Market capitalisation in USD (0 when unknown).
    pub market_cap: u64,
}

impl Candidate {
    /// Whole days from `today` until the earnings date.
    pub fn days_until(&self, today: NaiveDate) -> i64 {
        (self.earnings_date - today).num_days()
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) earnings {} [{}]",
            self.ticker,
            self.company,
            self.earnings_date.format("%Y-%m-%d"),
            self.sector,
        )
    }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// The six bullish signals, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    EstimateRevisions,
    InsiderActivity,
    AnalystActivity,
    PriceMomentum,
    BeatRate,
    SectorMomentum,
}

impl SignalKind {
    /// All signals in the order the aggregator runs them.
    pub const ALL: &'static [SignalKind] = &[
        SignalKind::EstimateRevisions,
        SignalKind::InsiderActivity,
        SignalKind::AnalystActivity,
        SignalKind::PriceMomentum,
        SignalKind::BeatRate,
        SignalKind::SectorMomentum,
    ];

    /// Field name used in alerts.
    pub fn display_name(&self) -> &'static str {
        match self {
            SignalKind::EstimateRevisions => "📊 Earnings ESP",
            SignalKind::InsiderActivity => "💼 Insider Activity",
            SignalKind::AnalystActivity => "📈 Analyst Activity",
            SignalKind::PriceMomentum => "📈 Price Momentum",
            SignalKind::BeatRate => "📜 Historical Beat Rate",
            SignalKind::SectorMomentum => "🏭 Sector Momentum",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::EstimateRevisions => write!(f, "estimate_revisions"),
            SignalKind::InsiderActivity => write!(f, "insider_activity"),
            SignalKind::AnalystActivity => write!(f, "analyst_activity"),
            SignalKind::PriceMomentum => write!(f, "price_momentum"),
            SignalKind::BeatRate => write!(f, "beat_rate"),
            SignalKind::SectorMomentum => write!(f, "sector_momentum"),
        }
    }
}

/// Output of a single signal evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    pub kind: SignalKind,
    /// Signed score, bounded by the evaluator's cap.
    pub score: i32,
    /// False when the provider had nothing usable (or failed).
    pub has_data: bool,
    /// Qualitative label, e.g. "Strong" or "Cluster buying".
    pub label: String,
    /// Human-readable justifications shown verbatim in alerts, one
    /// alert line each. Empty falls back to `label`.
    pub details: Vec<String>,
}

impl SignalResult {
    pub fn new(
        kind: SignalKind,
        score: i32,
        label: impl Into<String>,
        detail: Option<String>,
    ) -> Self {
        Self::with_details(kind, score, label, detail.into_iter().collect())
    }

    /// A result that lists several notes, each shown as its own entry.
    pub fn with_details(
        kind: SignalKind,
        score: i32,
        label: impl Into<String>,
        details: Vec<String>,
    ) -> Self {
        Self {
            kind,
            score,
            has_data: true,
            label: label.into(),
            details,
        }
    }

    /// The default "no signal" result: zero score, no data.
    pub fn no_signal(kind: SignalKind) -> Self {
        Self {
            kind,
            score: 0,
            has_data: false,
            label: "No signal".to_string(),
            details: Vec::new(),
        }
    }

    /// Positive contributions are shown in alerts. A beat-rate result
    /// is shown whenever there was history, even at zero.
    pub fn is_displayed(&self) -> bool {
        match self.kind {
            SignalKind::BeatRate => self.has_data,
            _ => self.has_data && self.score > 0,
        }
    }
}

/// One displayed line of a stock analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEntry {
    pub kind: SignalKind,
    pub score: i32,
    pub detail: String,
}

// ---------------------------------------------------------------------------
// Stock analysis
// ---------------------------------------------------------------------------

/// Aggregated signals for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub ticker: String,
    pub company: String,
    pub sector: String,
    pub earnings_date: NaiveDate,
    pub total_score: i32,
    /// Displayed signals in evaluation order.
    pub signals: Vec<SignalEntry>,
}

impl StockAnalysis {
    pub fn for_candidate(candidate: &Candidate) -> Self {
        Self {
            ticker: candidate.ticker.clone(),
            company: candidate.company.clone(),
            sector: candidate.sector.clone(),
            earnings_date: candidate.earnings_date,
            total_score: 0,
            signals: Vec::new(),
        }
    }

    /// Fold one evaluator result into the analysis.
    ///
    /// Every score counts toward the total, negative ones included;
    /// only displayable results are listed, one entry per detail, each
    /// carrying the result's full score.
    pub fn record(&mut self, result: SignalResult) {
        self.total_score += result.score;
        if !result.is_displayed() {
            return;
        }
        let SignalResult { kind, score, label, details, .. } = result;
        let details = if details.is_empty() { vec![label] } else { details };
        self.signals
            .extend(details.into_iter().map(|detail| SignalEntry { kind, score, detail }));
    }

    pub fn qualifies(&self, threshold: i32) -> bool {
        self.total_score >= threshold
    }
}

impl fmt::Display for StockAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): score {} with {} signal(s)",
            self.ticker,
            self.company,
            self.total_score,
            self.signals.len(),
        )
    }
}

// ---------------------------------------------------------------------------
// Market-data records
// ---------------------------------------------------------------------------

/// Company metadata. Every field may be missing upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: Option<String>,
    pub sector: Option<String>,
    pub market_cap: Option<u64>,
    pub current_price: Option<f64>,
}

/// Analyst EPS estimate and revision counts for the current quarter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpsRevisions {
    pub current_estimate: Option<f64>,
    pub up_last_7_days: u32,
    pub down_last_7_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsiderTransaction {
    pub date: NaiveDate,
    pub insider: String,
    /// Free-text description, e.g. "Purchase at price 182.10 per share."
    pub transaction: String,
    pub shares: Option<u64>,
    pub value: Option<f64>,
}

impl InsiderTransaction {
    pub fn is_purchase(&self) -> bool {
        self.transaction.to_lowercase().contains("purchase")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub date: NaiveDate,
    pub firm: String,
    pub from_grade: Option<String>,
    pub to_grade: String,
    /// "up", "down", "main", "init", ...
    pub action: Option<String>,
}

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// A past (or scheduled) quarterly report. `surprise_pct` is `None`
/// until the quarter has been reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsSurprise {
    pub quarter: NaiveDate,
    pub eps_estimate: Option<f64>,
    pub eps_actual: Option<f64>,
    pub surprise_pct: Option<f64>,
}

/// Lookback for daily price history requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryRange {
    TenDays,
    OneMonth,
}

impl HistoryRange {
    pub fn as_query(&self) -> &'static str {
        match self {
            HistoryRange::TenDays => "10d",
            HistoryRange::OneMonth => "1mo",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
