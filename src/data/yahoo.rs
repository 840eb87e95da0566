//! Yahoo Finance market-data provider.
//!
//! Uses two unofficial endpoints:
//! - `quoteSummary/{ticker}?modules=...` for calendar, profile, estimate
//!   trend, insider, rating-change and earnings-history modules
//! - `chart/{ticker}?range=...&interval=1d` for daily OHLCV bars
//!
//! Auth: `quoteSummary` needs a session cookie plus a matching `crumb`
//! query parameter. The cookie comes from `fc.yahoo.com`, the crumb from
//! `v1/test/getcrumb`; both are cached on the client and refreshed once
//! when Yahoo answers 401. The chart endpoint needs neither.
//! Rate limit: undocumented; the engine paces calls.
//! Numeric fields come wrapped as `{"raw": 1.23, "fmt": "1.23"}` and
//! any module or field can be missing.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{DataError, DataResult, MarketData};
use crate::config::ProviderConfig;
use crate::types::{
    CompanyProfile, EarningsSurprise, EpsRevisions, HistoryRange, InsiderTransaction, PriceBar,
    RatingChange,
};

const PROVIDER_NAME: &str = "yahoo";

// ---------------------------------------------------------------------------
// API response types (Yahoo JSON → Rust)
// ---------------------------------------------------------------------------

/// `{"raw": .., "fmt": ..}` wrapper. Yahoo sends `{}` for missing values.
#[derive(Debug, Default, Deserialize)]
struct RawNum {
    #[serde(default)]
    raw: Option<f64>,
}

fn raw(v: &Option<RawNum>) -> Option<f64> {
    v.as_ref().and_then(|n| n.raw)
}

fn epoch_to_date(secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryEnvelope {
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    #[serde(default)]
    result: Option<Vec<SummaryModules>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Only the modules we request are ever populated.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryModules {
    #[serde(default)]
    calendar_events: Option<CalendarEvents>,
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(default)]
    asset_profile: Option<AssetProfile>,
    #[serde(default)]
    financial_data: Option<FinancialData>,
    #[serde(default)]
    earnings_trend: Option<EarningsTrend>,
    #[serde(default)]
    insider_transactions: Option<InsiderModule>,
    #[serde(default)]
    upgrade_downgrade_history: Option<UpgradeDowngradeModule>,
    #[serde(default)]
    earnings_history: Option<EarningsHistoryModule>,
}

#[derive(Debug, Deserialize)]
struct CalendarEvents {
    #[serde(default)]
    earnings: Option<CalendarEarnings>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarEarnings {
    #[serde(default)]
    earnings_date: Vec<RawNum>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    market_cap: Option<RawNum>,
    #[serde(default)]
    regular_market_price: Option<RawNum>,
}

#[derive(Debug, Deserialize)]
struct AssetProfile {
    #[serde(default)]
    sector: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    #[serde(default)]
    current_price: Option<RawNum>,
}

#[derive(Debug, Deserialize)]
struct EarningsTrend {
    #[serde(default)]
    trend: Vec<TrendPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrendPeriod {
    /// "0q" = current quarter, "+1q" = next, "0y" = current year...
    period: String,
    #[serde(default)]
    eps_trend: Option<EpsTrend>,
    #[serde(default)]
    eps_revisions: Option<RevisionCounts>,
}

#[derive(Debug, Deserialize)]
struct EpsTrend {
    #[serde(default)]
    current: Option<RawNum>,
}

#[derive(Debug, Deserialize)]
struct RevisionCounts {
    #[serde(default, rename = "upLast7days")]
    up_last_7_days: Option<RawNum>,
    #[serde(default, rename = "downLast7days", alias = "downLast7Days")]
    down_last_7_days: Option<RawNum>,
}

#[derive(Debug, Deserialize)]
struct InsiderModule {
    #[serde(default)]
    transactions: Vec<RawInsiderTransaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInsiderTransaction {
    #[serde(default)]
    filer_name: Option<String>,
    #[serde(default)]
    transaction_text: Option<String>,
    #[serde(default)]
    start_date: Option<RawNum>,
    #[serde(default)]
    shares: Option<RawNum>,
    #[serde(default)]
    value: Option<RawNum>,
}

#[derive(Debug, Deserialize)]
struct UpgradeDowngradeModule {
    #[serde(default)]
    history: Vec<RawRatingChange>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRatingChange {
    epoch_grade_date: i64,
    #[serde(default)]
    firm: Option<String>,
    #[serde(default)]
    to_grade: Option<String>,
    #[serde(default)]
    from_grade: Option<String>,
    #[serde(default)]
    action: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EarningsHistoryModule {
    #[serde(default)]
    history: Vec<RawEarningsQuarter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEarningsQuarter {
    #[serde(default)]
    quarter: Option<RawNum>,
    #[serde(default)]
    eps_actual: Option<RawNum>,
    #[serde(default)]
    eps_estimate: Option<RawNum>,
    /// A fraction: 0.05 means a 5% beat.
    #[serde(default)]
    surprise_percent: Option<RawNum>,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

// ---------------------------------------------------------------------------
// Parsing (pure, tested against fixtures)
// ---------------------------------------------------------------------------

fn parse_summary(ticker: &str, body: &str) -> DataResult<SummaryModules> {
    let envelope: QuoteSummaryEnvelope =
        serde_json::from_str(body).map_err(|e| DataError::Parse {
            what: format!("quoteSummary for {ticker}"),
            message: e.to_string(),
        })?;

    if let Some(err) = envelope.quote_summary.error.filter(|e| !e.is_null()) {
        debug!(ticker, error = %err, "quoteSummary returned an error object");
        return Err(DataError::NotFound {
            ticker: ticker.to_string(),
            module: "quoteSummary".to_string(),
        });
    }

    envelope
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| DataError::NotFound {
            ticker: ticker.to_string(),
            module: "quoteSummary".to_string(),
        })
}

fn earliest_earnings_date(modules: &SummaryModules) -> Option<NaiveDate> {
    modules
        .calendar_events
        .as_ref()?
        .earnings
        .as_ref()?
        .earnings_date
        .iter()
        .filter_map(|d| d.raw)
        .filter_map(|secs| epoch_to_date(secs as i64))
        .min()
}

fn to_profile(modules: &SummaryModules) -> CompanyProfile {
    let price = modules.price.as_ref();
    let current_price = modules
        .financial_data
        .as_ref()
        .and_then(|f| raw(&f.current_price))
        .or_else(|| price.and_then(|p| raw(&p.regular_market_price)));

    CompanyProfile {
        name: price.and_then(|p| p.long_name.clone().or_else(|| p.short_name.clone())),
        sector: modules
            .asset_profile
            .as_ref()
            .and_then(|a| a.sector.clone())
            .filter(|s| !s.is_empty()),
        market_cap: price
            .and_then(|p| raw(&p.market_cap))
            .filter(|c| *c > 0.0)
            .map(|c| c as u64),
        current_price,
    }
}

fn to_revisions(modules: &SummaryModules) -> Option<EpsRevisions> {
    let current = modules
        .earnings_trend
        .as_ref()?
        .trend
        .iter()
        .find(|t| t.period == "0q")?;

    let revisions = current.eps_revisions.as_ref();
    let count = |v: Option<&Option<RawNum>>| -> u32 {
        v.and_then(raw).map(|n| n.max(0.0) as u32).unwrap_or(0)
    };

    Some(EpsRevisions {
        current_estimate: current.eps_trend.as_ref().and_then(|t| raw(&t.current)),
        up_last_7_days: count(revisions.map(|r| &r.up_last_7_days)),
        down_last_7_days: count(revisions.map(|r| &r.down_last_7_days)),
    })
}

fn to_insider_transactions(modules: &SummaryModules) -> Vec<InsiderTransaction> {
    let Some(module) = modules.insider_transactions.as_ref() else {
        return Vec::new();
    };

    module
        .transactions
        .iter()
        .filter_map(|t| {
            let date = raw(&t.start_date).and_then(|s| epoch_to_date(s as i64))?;
            Some(InsiderTransaction {
                date,
                insider: t.filer_name.clone().unwrap_or_default(),
                transaction: t.transaction_text.clone().unwrap_or_default(),
                shares: raw(&t.shares).map(|s| s.max(0.0) as u64),
                value: raw(&t.value),
            })
        })
        .collect()
}

fn to_rating_changes(modules: &SummaryModules) -> Vec<RatingChange> {
    let Some(module) = modules.upgrade_downgrade_history.as_ref() else {
        return Vec::new();
    };

    let mut changes: Vec<RatingChange> = module
        .history
        .iter()
        .filter_map(|h| {
            Some(RatingChange {
                date: epoch_to_date(h.epoch_grade_date)?,
                firm: h.firm.clone().unwrap_or_default(),
                from_grade: h.from_grade.clone().filter(|g| !g.is_empty()),
                to_grade: h.to_grade.clone().unwrap_or_default(),
                action: h.action.clone(),
            })
        })
        .collect();
    changes.sort_by(|a, b| b.date.cmp(&a.date));
    changes
}

fn to_earnings_history(modules: &SummaryModules) -> Vec<EarningsSurprise> {
    let Some(module) = modules.earnings_history.as_ref() else {
        return Vec::new();
    };

    let mut quarters: Vec<EarningsSurprise> = module
        .history
        .iter()
        .filter_map(|q| {
            let quarter = raw(&q.quarter).and_then(|s| epoch_to_date(s as i64))?;
            Some(EarningsSurprise {
                quarter,
                eps_estimate: raw(&q.eps_estimate),
                eps_actual: raw(&q.eps_actual),
                surprise_pct: raw(&q.surprise_percent).map(|f| f * 100.0),
            })
        })
        .collect();
    quarters.sort_by(|a, b| b.quarter.cmp(&a.quarter));
    quarters
}

fn parse_chart(ticker: &str, body: &str) -> DataResult<Vec<PriceBar>> {
    let envelope: ChartEnvelope = serde_json::from_str(body).map_err(|e| DataError::Parse {
        what: format!("chart for {ticker}"),
        message: e.to_string(),
    })?;

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    // Bars with any null OHLC value (halts, partial days) are dropped.
    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            Some(PriceBar {
                date: epoch_to_date(*ts)?,
                open: (*quote.open.get(i)?)?,
                high: (*quote.high.get(i)?)?,
                low: (*quote.low.get(i)?)?,
                close: (*quote.close.get(i)?)?,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            })
        })
        .collect();

    Ok(bars)
}

/// The crumb endpoint answers with the bare token as plain text. Anything
/// else (an HTML error page, a rate-limit notice) is not a crumb.
fn parse_crumb(body: &str) -> DataResult<String> {
    let crumb = body.trim();
    let malformed = crumb.contains(|c: char| c.is_whitespace() || c == '<');
    if crumb.is_empty() || crumb.len() > 64 || malformed {
        return Err(DataError::Parse {
            what: "crumb".to_string(),
            message: format!("unexpected crumb response: {:.40}", crumb),
        });
    }
    Ok(crumb.to_string())
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Yahoo Finance client.
pub struct YahooClient {
    http: Client,
    base_url: String,
    chart_url: String,
    cookie_url: String,
    crumb_url: String,
    crumb: RwLock<Option<String>>,
}

impl YahooClient {
    pub fn new(config: &ProviderConfig) -> DataResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chart_url: config.chart_url.trim_end_matches('/').to_string(),
            cookie_url: config.cookie_url.clone(),
            crumb_url: config.crumb_url.clone(),
            crumb: RwLock::new(None),
        })
    }

    // -- Session -----------------------------------------------------------

    /// Pick up a session cookie and fetch a fresh crumb for it.
    async fn refresh_crumb(&self) -> DataResult<String> {
        info!("Fetching Yahoo session crumb");

        // fc.yahoo.com answers 404 but still sets the cookie.
        if let Err(e) = self.http.get(&self.cookie_url).send().await {
            warn!(error = %e, "Yahoo cookie request failed");
        }

        let crumb = parse_crumb(&self.get_text(&self.crumb_url).await?)?;
        *self.crumb.write().await = Some(crumb.clone());
        Ok(crumb)
    }

    /// Cached crumb, fetching one on first use.
    async fn ensure_crumb(&self) -> DataResult<String> {
        let cached = self.crumb.read().await.clone();
        match cached {
            Some(crumb) => Ok(crumb),
            None => self.refresh_crumb().await,
        }
    }

    // -- Requests ----------------------------------------------------------

    async fn get_text(&self, url: &str) -> DataResult<String> {
        debug!(url = %url, "Fetching Yahoo data");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.text().await?)
    }

    fn summary_url(&self, ticker: &str, modules: &str, crumb: &str) -> String {
        format!(
            "{}/{}?modules={}&crumb={}",
            self.base_url,
            urlencoding::encode(ticker),
            modules,
            urlencoding::encode(crumb),
        )
    }

    /// Fetch one or more `quoteSummary` modules for a ticker.
    async fn fetch_modules(&self, ticker: &str, modules: &str) -> DataResult<SummaryModules> {
        let crumb = self.ensure_crumb().await?;
        let body = match self.get_text(&self.summary_url(ticker, modules, &crumb)).await {
            Err(DataError::Status { status: 401, .. }) => {
                // Crumb expired with its cookie; refresh and retry once.
                warn!(ticker = %ticker, "Yahoo rejected crumb, refreshing session");
                let crumb = self.refresh_crumb().await?;
                self.get_text(&self.summary_url(ticker, modules, &crumb)).await?
            }
            other => other?,
        };
        parse_summary(ticker, &body)
    }
}

#[async_trait]
impl MarketData for YahooClient {
    async fn next_earnings_date(&self, ticker: &str) -> DataResult<Option<NaiveDate>> {
        let modules = self.fetch_modules(ticker, "calendarEvents").await?;
        Ok(earliest_earnings_date(&modules))
    }

    async fn company_profile(&self, ticker: &str) -> DataResult<CompanyProfile> {
        let modules = self
            .fetch_modules(ticker, "price,assetProfile,financialData")
            .await?;
        Ok(to_profile(&modules))
    }

    async fn eps_revisions(&self, ticker: &str) -> DataResult<Option<EpsRevisions>> {
        let modules = self.fetch_modules(ticker, "earningsTrend").await?;
        Ok(to_revisions(&modules))
    }

    async fn insider_transactions(&self, ticker: &str) -> DataResult<Vec<InsiderTransaction>> {
        let modules = self.fetch_modules(ticker, "insiderTransactions").await?;
        Ok(to_insider_transactions(&modules))
    }

    async fn rating_changes(&self, ticker: &str) -> DataResult<Vec<RatingChange>> {
        let modules = self.fetch_modules(ticker, "upgradeDowngradeHistory").await?;
        Ok(to_rating_changes(&modules))
    }

    async fn price_history(
        &self,
        ticker: &str,
        range: HistoryRange,
    ) -> DataResult<Vec<PriceBar>> {
        let url = format!(
            "{}/{}?range={}&interval=1d",
            self.chart_url,
            urlencoding::encode(ticker),
            range.as_query(),
        );
        let body = self.get_text(&url).await?;
        parse_chart(ticker, &body)
    }

    async fn earnings_history(&self, ticker: &str) -> DataResult<Vec<EarningsSurprise>> {
        let modules = self.fetch_modules(ticker, "earningsHistory").await?;
        Ok(to_earnings_history(&modules))
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
