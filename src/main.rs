//! BEATSCAN: pre-earnings beat screener
//!
//! Entry point. Loads configuration, initialises structured logging,
//! runs a single scan over the ticker universe and exits.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{error, info};

use beatscan::config::AppConfig;
use beatscan::data::yahoo::YahooClient;
use beatscan::engine::{ScanReport, Scanner};
use beatscan::notify::DiscordWebhook;

const BANNER: &str = r#"
 ___ ___   _ _____ ___  ___   _   _  _
| _ ) __| /_\_   _/ __|/ __| /_\ | \| |
| _ \ _| / _ \| | \__ \ (__ / _ \| .` |
|___/___/_/ \_\_| |___/\___/_/ \_\_|\_|

  Pre-earnings beat screener
  v0.1.0 (paper trading only)
"#;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var("BEATSCAN_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = AppConfig::load_or_default(&config_path)?;

    init_logging();

    println!("{BANNER}");
    info!(
        config = %config_path,
        tickers = cfg.scanner.universe.len(),
        threshold = cfg.scanner.alert_threshold,
        lookahead_days = cfg.scanner.lookahead_days,
        "BEATSCAN starting up"
    );

    // Missing webhook is the only early exit.
    let webhook_url = match cfg.webhook_url() {
        Ok(url) => url,
        Err(e) => {
            error!(error = %e, "Webhook not configured");
            eprintln!("ERROR: {e}");
            return Ok(());
        }
    };

    let provider = YahooClient::new(&cfg.provider).context("failed to build market data client")?;
    let http = reqwest::Client::builder()
        .timeout(cfg.provider.timeout())
        .build()
        .context("failed to build webhook client")?;
    let webhook = DiscordWebhook::new(webhook_url, cfg.notifier.username.clone(), http);

    let scanner = Scanner::new(&cfg, Arc::new(provider), Arc::new(webhook));
    let report = scanner.run(Utc::now().date_naive()).await;
    log_report(&report);

    Ok(())
}

/// Log a human-readable scan summary.
fn log_report(report: &ScanReport) {
    for analysis in &report.qualifying {
        info!(
            ticker = %analysis.ticker,
            score = analysis.total_score,
            earnings_date = %analysis.earnings_date,
            "Opportunity"
        );
    }
    info!(
        scan_id = %report.scan_id,
        tickers = report.tickers_checked,
        candidates = report.candidates.len(),
        qualifying = report.qualifying.len(),
        alerts_sent = report.alerts_sent,
        alerts_failed = report.alerts_failed,
        "Scan summary"
    );
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("beatscan=info"));

    let json_logging = std::env::var("BEATSCAN_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_current_span(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
