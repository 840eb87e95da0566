//! End-to-end scans over the in-memory provider.

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

use beatscan::config::AppConfig;
use beatscan::engine::{Pacer, ScanReport, Scanner};
use beatscan::notify::alert::{REMINDER_TITLE, SUGGESTED_PLAY_TITLE};
use beatscan::types::{SignalKind, StockAnalysis};

use crate::mock_channel::RecordingChannel;
use crate::mock_provider::{Endpoint, MockProvider, TickerFixture};

const UNIVERSE: &[&str] = &[
    "STRONG", "BOUNDARY", "LATE", "DOWNGRADED", "NODATE", "MODERATE", "BROKEN", "TIE",
];

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, month, day).unwrap()
}

fn today() -> NaiveDate {
    date(10, 18)
}

const STRONG_RUN: &[f64] = &[
    100.0, 100.0, 100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 105.5, 106.0, 106.1, 106.2,
];
const FLAT: &[f64] = &[100.0; 12];

/// Qualifies at exactly 70: revisions 30, insider 10, momentum 10, beat rate 20.
fn seventy(on: NaiveDate, name: &str, sector: &str, price: f64) -> TickerFixture {
    TickerFixture::reporting(on, name, sector, Some(price))
        .revisions(6, 0)
        .insider_buys(1, date(10, 5))
        .closes(FLAT)
        .surprises(&[2.0, -1.0, 1.5, 0.5])
}

fn provider() -> MockProvider {
    let recent = date(10, 5);
    let p = MockProvider::new();

    p.insert(
        "STRONG",
        TickerFixture::reporting(date(10, 21), "Strong Semis Inc", "Technology", Some(250.0))
            .revisions(6, 0)
            .insider_buys(3, recent)
            .ratings(&["Buy", "Overweight"], recent)
            .closes(STRONG_RUN)
            .surprises(&[5.0, 2.0, 1.0, 3.0]),
    );
    p.insert(
        "MODERATE",
        TickerFixture::reporting(date(10, 25), "Moderate Bancorp", "Financial Services", None)
            .revisions(4, 0)
            .insider_buys(1, recent)
            .ratings(&["Buy", "Outperform"], recent)
            .closes(FLAT)
            .surprises(&[2.0, -1.0, 1.5, 0.5]),
    );
    p.insert("BOUNDARY", seventy(date(10, 19), "Boundary Health", "Healthcare", 80.0));
    p.insert(
        "DOWNGRADED",
        seventy(date(10, 23), "Downgraded Energy", "Energy", 40.0)
            .ratings(&["Sell", "Underweight"], recent),
    );
    p.insert("TIE", seventy(date(10, 24), "Tie Utilities", "Utilities", 20.0));
    p.insert(
        "BROKEN",
        TickerFixture::reporting(date(10, 22), "Broken Industries", "Industrials", Some(10.0)),
    );
    p.fail_signals("BROKEN");
    p.insert(
        "LATE",
        TickerFixture::reporting(date(10, 26), "Late Corp", "Technology", Some(10.0))
            .revisions(10, 0),
    );
    p.insert("NODATE", TickerFixture::default());

    p.insert("XLK", TickerFixture::etf(&[100.0, 102.0, 105.0]));
    p.insert("XLF", TickerFixture::etf(&[100.0, 100.5]));
    p.insert("SPY", TickerFixture::etf(&[200.0, 201.0, 202.0]));
    p
}

fn config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.scanner.universe = UNIVERSE.iter().map(|t| t.to_string()).collect();
    cfg
}

async fn run(provider: &MockProvider, channel: &RecordingChannel) -> ScanReport {
    Scanner::new(&config(), Arc::new(provider.clone()), Arc::new(channel.clone()))
        .with_pacer(Pacer::immediate())
        .run(today())
        .await
}

fn analysis<'a>(report: &'a ScanReport, ticker: &str) -> &'a StockAnalysis {
    report
        .analyses
        .iter()
        .find(|a| a.ticker == ticker)
        .unwrap_or_else(|| panic!("no analysis for {ticker}"))
}

fn totals(report: &ScanReport) -> Vec<(&str, i32)> {
    report
        .analyses
        .iter()
        .map(|a| (a.ticker.as_str(), a.total_score))
        .collect()
}

#[tokio::test]
async fn test_full_scan() {
    let provider = provider();
    let channel = RecordingChannel::new();
    let report = run(&provider, &channel).await;

    assert_eq!(report.tickers_checked, 8);
    assert_eq!(report.scan_date, today());
    assert_eq!(
        totals(&report),
        vec![
            ("STRONG", 129),
            ("BOUNDARY", 70),
            ("DOWNGRADED", 60),
            ("MODERATE", 74),
            ("BROKEN", 0),
            ("TIE", 70),
        ]
    );
    assert_eq!(report.qualifying_tickers(), vec!["STRONG", "MODERATE", "BOUNDARY", "TIE"]);
    assert_eq!(report.alerts_sent, 4);
    assert_eq!(report.alerts_failed, 0);
    assert_eq!(
        channel.titles(),
        vec![
            "🎯 EARNINGS OPPORTUNITY: $STRONG",
            "🎯 EARNINGS OPPORTUNITY: $MODERATE",
            "🎯 EARNINGS OPPORTUNITY: $BOUNDARY",
            "🎯 EARNINGS OPPORTUNITY: $TIE",
        ]
    );
}

#[tokio::test]
async fn test_high_confidence_alert_content() {
    let provider = provider();
    let channel = RecordingChannel::new();
    run(&provider, &channel).await;

    let received = channel.received();
    let alert = &received[0];
    assert_eq!(alert.color, 15158332);
    assert_eq!(
        alert.description,
        "**HIGH CONFIDENCE** earnings beat setup\n\
         📅 Earnings: Oct 21, 2026 (3 days)\n\
         ⭐ Score: **129**/100\n\
         🏭 Sector: Technology"
    );

    let fields: Vec<(&str, &str)> =
        alert.fields.iter().map(|f| (f.name.as_str(), f.value.as_str())).collect();
    assert_eq!(
        fields[..6],
        [
            ("📊 Earnings ESP (+30)", "Strong: 6 up / 0 down revisions (7d)"),
            ("💼 Insider Activity (+25)", "Cluster buying: 3 purchase(s), $300000 total"),
            ("📈 Analyst Activity (+14)", "2 recent upgrade(s)"),
            ("📈 Price Momentum (+25)", "Up 6.2% in 10 days"),
            ("📈 Price Momentum (+25)", "Near 30-day highs"),
            ("📜 Historical Beat Rate (+20)", "4/4 quarters beat"),
        ]
    );
    assert_eq!(
        fields[6],
        (
            SUGGESTED_PLAY_TITLE,
            "BUY 20 shares at $250.00\nStop: $232.50 (-7%)\nTarget: $287.50 (+15%)\nRisk/Reward: 1:2.1"
        )
    );
    assert_eq!(fields[7].0, REMINDER_TITLE);
    assert_eq!(fields.len(), 8);
}

#[tokio::test]
async fn test_signal_fields_are_capped_at_six() {
    let provider = provider();
    let channel = RecordingChannel::new();
    let report = run(&provider, &channel).await;

    // All six signals fire; momentum lists two notes, so seven entries.
    let strong = analysis(&report, "STRONG");
    assert_eq!(strong.signals.len(), 7);
    assert_eq!(strong.signals[6].kind, SignalKind::SectorMomentum);
    assert_eq!(strong.signals[6].detail, "Sector outperforming by 4.0%");

    // The alert keeps the first six and drops the sector entry.
    let received = channel.received();
    let alert = &received[0];
    assert!(alert.fields.iter().all(|f| !f.name.starts_with("🏭 Sector Momentum")));
}

#[tokio::test]
async fn test_zero_beat_rate_is_shown() {
    let provider = MockProvider::new();
    provider.insert(
        "SPOTTY",
        TickerFixture::reporting(date(10, 20), "Spotty Labs", "Healthcare", Some(50.0))
            .revisions(6, 0)
            .insider_buys(3, date(10, 5))
            .ratings(&["Buy"], date(10, 5))
            .closes(FLAT)
            .surprises(&[1.0, -1.0, 0.0, -3.0]),
    );
    let channel = RecordingChannel::new();

    let mut cfg = config();
    cfg.scanner.universe = vec!["SPOTTY".into()];
    let report = Scanner::new(&cfg, Arc::new(provider), Arc::new(channel.clone()))
        .with_pacer(Pacer::immediate())
        .run(today())
        .await;

    // 30 + 25 + 7 + 10 + 0, no sector ETF data.
    assert_eq!(report.qualifying_tickers(), vec!["SPOTTY"]);
    assert_eq!(analysis(&report, "SPOTTY").total_score, 72);

    let received = channel.received();
    let field = received[0]
        .field("📜 Historical Beat Rate (+0)")
        .expect("beat rate field");
    assert_eq!(field.value, "1/4 quarters beat");
}

#[tokio::test]
async fn test_missing_price_omits_suggested_play() {
    let provider = provider();
    let channel = RecordingChannel::new();
    run(&provider, &channel).await;

    let received = channel.received();
    let alert = &received[1];
    assert_eq!(alert.title, "🎯 EARNINGS OPPORTUNITY: $MODERATE");
    assert_eq!(alert.color, 16776960);
    assert!(alert.field(SUGGESTED_PLAY_TITLE).is_none());
    // Five positive signals plus the reminder; the lagging sector is hidden.
    assert_eq!(alert.fields.len(), 6);
    assert_eq!(alert.fields.last().unwrap().name, REMINDER_TITLE);
}

#[tokio::test]
async fn test_price_is_refetched_before_alerting() {
    let provider = provider();
    let channel = RecordingChannel::new();
    run(&provider, &channel).await;

    // Finder lookup plus the alert-time refresh.
    assert_eq!(provider.call_count("STRONG", Endpoint::Profile), 2);
    // Below threshold: finder lookup only.
    assert_eq!(provider.call_count("DOWNGRADED", Endpoint::Profile), 1);
    // Outside the window: never profiled.
    assert_eq!(provider.call_count("LATE", Endpoint::Profile), 0);
}

#[tokio::test]
async fn test_downgrades_subtract_but_are_not_shown() {
    let provider = provider();
    let report = run(&provider, &RecordingChannel::new()).await;

    let downgraded = analysis(&report, "DOWNGRADED");
    assert_eq!(downgraded.total_score, 60);
    let kinds: Vec<SignalKind> = downgraded.signals.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            SignalKind::EstimateRevisions,
            SignalKind::InsiderActivity,
            SignalKind::PriceMomentum,
            SignalKind::BeatRate,
        ]
    );
    assert!(!report.qualifying_tickers().contains(&"DOWNGRADED"));
}

#[tokio::test]
async fn test_failing_evaluator_is_isolated() {
    let provider = provider();
    provider.fail("STRONG", Endpoint::Insiders);
    let report = run(&provider, &RecordingChannel::new()).await;

    let strong = analysis(&report, "STRONG");
    assert_eq!(strong.total_score, 104);
    assert!(strong.signals.iter().all(|s| s.kind != SignalKind::InsiderActivity));
    assert_eq!(strong.signals.len(), 6);

    // Every other ticker is untouched.
    assert_eq!(analysis(&report, "MODERATE").total_score, 74);
    assert_eq!(analysis(&report, "BOUNDARY").total_score, 70);
    assert_eq!(analysis(&report, "TIE").total_score, 70);
}

#[tokio::test]
async fn test_all_signals_failing_scores_zero() {
    let provider = provider();
    let report = run(&provider, &RecordingChannel::new()).await;

    let broken = analysis(&report, "BROKEN");
    assert_eq!(broken.total_score, 0);
    assert!(broken.signals.is_empty());
    assert_eq!(broken.company, "Broken Industries");
}

#[tokio::test]
async fn test_calendar_failure_skips_ticker() {
    let provider = provider();
    provider.fail("BOUNDARY", Endpoint::EarningsDate);
    let report = run(&provider, &RecordingChannel::new()).await;

    assert_eq!(report.candidates.len(), 5);
    assert!(report.candidates.iter().all(|c| c.ticker != "BOUNDARY"));
    assert_eq!(report.qualifying_tickers(), vec!["STRONG", "MODERATE", "TIE"]);
}

#[tokio::test]
async fn test_rejected_delivery_does_not_stop_scan() {
    let provider = provider();
    let channel = RecordingChannel::new();
    channel.reject("STRONG");
    let report = run(&provider, &channel).await;

    assert_eq!(report.alerts_failed, 1);
    assert_eq!(report.alerts_sent, 3);
    assert_eq!(channel.received().len(), 4);
}

#[tokio::test]
async fn test_identical_data_gives_identical_results() {
    let provider = provider();
    let first_channel = RecordingChannel::new();
    let second_channel = RecordingChannel::new();

    let first = run(&provider, &first_channel).await;
    let second = run(&provider, &second_channel).await;

    assert_ne!(first.scan_id, second.scan_id);
    assert_eq!(first.candidates, second.candidates);
    assert_eq!(first.analyses, second.analyses);
    assert_eq!(first.qualifying, second.qualifying);

    let strip = |channel: &RecordingChannel| {
        channel
            .received()
            .into_iter()
            .map(|a| (a.title, a.description, a.color, a.fields))
            .collect::<Vec<_>>()
    };
    assert_eq!(strip(&first_channel), strip(&second_channel));
}

#[tokio::test]
async fn test_empty_window_sends_nothing() {
    let provider = MockProvider::new();
    provider.insert("LATE", TickerFixture::reporting(date(11, 30), "Late", "Technology", None));
    let channel = RecordingChannel::new();

    let mut cfg = config();
    cfg.scanner.universe = vec!["LATE".into(), "UNKNOWN".into()];
    let report = Scanner::new(&cfg, Arc::new(provider), Arc::new(channel.clone()))
        .with_pacer(Pacer::immediate())
        .run(today())
        .await;

    assert!(report.candidates.is_empty());
    assert!(report.qualifying.is_empty());
    assert!(channel.received().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_default_pacing() {
    let provider = provider();
    let channel = RecordingChannel::new();
    let scanner = Scanner::new(&config(), Arc::new(provider), Arc::new(channel));

    let start = tokio::time::Instant::now();
    scanner.run(today()).await;
    let elapsed = start.elapsed();

    // 8 tickers × 0.5s + 6 candidates × (5 × 1s + 2s) + 4 alerts × 2s
    let expected = Duration::from_millis(8 * 500 + 6 * (5 * 1_000 + 2_000) + 4 * 2_000);
    assert!(elapsed >= expected, "elapsed {elapsed:?}");
    assert!(elapsed < expected + Duration::from_secs(1), "elapsed {elapsed:?}");
}
