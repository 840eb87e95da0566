//! Fixed-delay pacing between external calls.
//!
//! The provider and the webhook are rate limited by sleeping a fixed
//! amount after each call. There is no backoff and no token bucket.

use std::time::Duration;

use crate::config::PacingConfig;

#[derive(Debug, Clone)]
pub struct Pacer {
    ticker: Duration,
    signal: Duration,
    candidate: Duration,
    alert: Duration,
}

impl Pacer {
    pub fn new(config: &PacingConfig) -> Self {
        Self {
            ticker: Duration::from_millis(config.ticker_delay_ms),
            signal: Duration::from_millis(config.signal_delay_ms),
            candidate: Duration::from_millis(config.candidate_delay_ms),
            alert: Duration::from_millis(config.alert_delay_ms),
        }
    }

    /// A pacer that never sleeps.
    pub fn immediate() -> Self {
        Self::new(&PacingConfig::none())
    }

    /// After each ticker checked by the candidate finder.
    pub async fn after_ticker(&self) {
        Self::pause(self.ticker).await;
    }

    /// Between two signal evaluators.
    pub async fn after_signal(&self) {
        Self::pause(self.signal).await;
    }

    /// Between two analysed candidates.
    pub async fn after_candidate(&self) {
        Self::pause(self.candidate).await;
    }

    /// After each alert delivery.
    pub async fn after_alert(&self) {
        Self::pause(self.alert).await;
    }

    async fn pause(delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
