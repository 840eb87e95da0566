//! Discord webhook channel.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, warn};

use super::{AlertChannel, AlertPayload, NotifyError};

/// Body posted to the webhook: one embed per message.
#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    embeds: [&'a AlertPayload; 1],
}

pub fn webhook_body(alert: &AlertPayload, username: Option<&str>) -> Result<String, NotifyError> {
    let message = WebhookMessage {
        username,
        embeds: [alert],
    };
    Ok(serde_json::to_string(&message)?)
}

pub struct DiscordWebhook {
    url: SecretString,
    username: Option<String>,
    client: Client,
}

impl DiscordWebhook {
    pub fn new(url: SecretString, username: Option<String>, client: Client) -> Self {
        Self {
            url,
            username,
            client,
        }
    }
}

#[async_trait]
impl AlertChannel for DiscordWebhook {
    async fn send(&self, alert: &AlertPayload) -> Result<(), NotifyError> {
        let body = webhook_body(alert, self.username.as_deref())?;

        let resp = self
            .client
            .post(self.url.expose_secret())
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::NO_CONTENT {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Webhook rejected alert");
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(title = %alert.title, "Alert delivered");
        Ok(())
    }

    fn name(&self) -> &str {
        "discord-webhook"
    }
}
