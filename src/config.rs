//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` (optional) and deserializes into strongly-typed
//! structs; every section falls back to built-in defaults. The webhook
//! URL is a secret: the config only names the env var that holds it,
//! and it is resolved at runtime into a `SecretString`.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default ticker universe: liquid large caps across sectors.
pub const DEFAULT_UNIVERSE: &[&str] = &[
    // Tech
    "AAPL", "MSFT", "GOOGL", "AMZN", "META", "NVDA", "TSLA", "AMD", "INTC",
    // Finance
    "JPM", "BAC", "WFC", "GS", "MS", "C",
    // Healthcare
    "JNJ", "UNH", "PFE", "ABBV", "MRK", "TMO",
    // Consumer
    "WMT", "HD", "COST", "NKE", "SBUX", "MCD",
    // Industrial
    "CAT", "BA", "GE", "HON", "UPS", "FDX",
    // Energy
    "XOM", "CVX", "COP", "SLB",
    // Other
    "DIS", "NFLX", "PYPL", "SQ", "SHOP",
];

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub scanner: ScannerConfig,
    pub pacing: PacingConfig,
    pub provider: ProviderConfig,
    pub notifier: NotifierConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScannerConfig {
    /// Earnings lookahead window in days.
    pub lookahead_days: u32,
    /// Minimum total score for an alert.
    pub alert_threshold: i32,
    pub universe: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            lookahead_days: 7,
            alert_threshold: 70,
            universe: DEFAULT_UNIVERSE.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Fixed delays between external calls, in milliseconds.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PacingConfig {
    pub ticker_delay_ms: u64,
    pub signal_delay_ms: u64,
    pub candidate_delay_ms: u64,
    pub alert_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            ticker_delay_ms: 500,
            signal_delay_ms: 1_000,
            candidate_delay_ms: 2_000,
            alert_delay_ms: 2_000,
        }
    }
}

impl PacingConfig {
    /// No delays at all. Used by tests and dry runs.
    pub fn none() -> Self {
        Self {
            ticker_delay_ms: 0,
            signal_delay_ms: 0,
            candidate_delay_ms: 0,
            alert_delay_ms: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base for `quoteSummary` lookups.
    pub base_url: String,
    /// Base for daily price history.
    pub chart_url: String,
    /// Sets the session cookie the crumb is bound to.
    pub cookie_url: String,
    /// Returns the crumb required on `quoteSummary` requests.
    pub crumb_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query2.finance.yahoo.com/v10/finance/quoteSummary".to_string(),
            chart_url: "https://query2.finance.yahoo.com/v8/finance/chart".to_string(),
            cookie_url: "https://fc.yahoo.com".to_string(),
            crumb_url: "https://query2.finance.yahoo.com/v1/test/getcrumb".to_string(),
            user_agent: "Mozilla/5.0 (compatible; beatscan/0.1.0)".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotifierConfig {
    /// Name of the env var holding the webhook URL.
    pub webhook_url_env: String,
    pub footer: String,
    /// Optional display name override for the webhook.
    pub username: Option<String>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url_env: "DISCORD_WEBHOOK_URL".to_string(),
            footer: "Earnings Beat Scanner • Paper Trading Only".to_string(),
            username: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// The webhook URL from the configured env var. Empty counts as unset.
    pub fn webhook_url(&self) -> Result<SecretString> {
        let url = Self::resolve_env(&self.notifier.webhook_url_env)?;
        if url.trim().is_empty() {
            anyhow::bail!(
                "Environment variable is empty: {}",
                self.notifier.webhook_url_env
            );
        }
        Ok(SecretString::new(url))
    }
}
