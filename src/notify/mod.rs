//! Alert rendering and delivery.

pub mod alert;
pub mod discord;

use async_trait::async_trait;

pub use alert::{build_alert, AlertPayload, EmbedField};
pub use discord::DiscordWebhook;

/// Errors from an alert channel.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("webhook transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook rejected alert with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("failed to serialize alert: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// An outbound destination for alerts.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Deliver one alert. No retries.
    async fn send(&self, alert: &AlertPayload) -> Result<(), NotifyError>;
    fn name(&self) -> &str;
}
