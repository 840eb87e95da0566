//! Alert payload construction.
//!
//! Turns a qualifying `StockAnalysis` into an embed: a title, a short
//! description, up to six signal fields, an optional suggested play and
//! a fixed reminder block.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::strategy::{ConfidenceTier, SuggestedPlay};
use crate::types::StockAnalysis;

pub const MAX_SIGNAL_FIELDS: usize = 6;

pub const SUGGESTED_PLAY_TITLE: &str = "💡 Suggested Play (Paper Trading)";
pub const REMINDER_TITLE: &str = "⚠️ Remember";
const REMINDER_TEXT: &str = "• This is for paper trading only\n\
                             • Earnings are inherently volatile\n\
                             • Do your own research\n\
                             • Expected win rate: 60-70% for 80+ scores";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn block(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// One rendered alert, serialized as a single webhook embed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertPayload {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub timestamp: DateTime<Utc>,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
}

impl AlertPayload {
    pub fn field(&self, name: &str) -> Option<&EmbedField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Build the alert for `analysis`.
///
/// `price` is the latest market price; the suggested play is only
/// included when it is known and positive.
pub fn build_alert(
    analysis: &StockAnalysis,
    price: Option<f64>,
    today: NaiveDate,
    timestamp: DateTime<Utc>,
    footer: &str,
) -> AlertPayload {
    let tier = ConfidenceTier::from_score(analysis.total_score);
    let days_until = (analysis.earnings_date - today).num_days();

    let description = [
        format!("**{}** earnings beat setup", tier.label()),
        format!(
            "📅 Earnings: {} ({} days)",
            analysis.earnings_date.format("%b %d, %Y"),
            days_until
        ),
        format!("⭐ Score: **{}**/100", analysis.total_score),
        format!("🏭 Sector: {}", analysis.sector),
    ]
    .join("\n");

    let mut fields: Vec<EmbedField> = analysis
        .signals
        .iter()
        .take(MAX_SIGNAL_FIELDS)
        .map(|s| EmbedField::block(format!("{} (+{})", s.kind.display_name(), s.score), &s.detail))
        .collect();

    if let Some(play) = price.and_then(|p| SuggestedPlay::for_score(analysis.total_score, p)) {
        fields.push(EmbedField::block(SUGGESTED_PLAY_TITLE, play.render()));
    }
    fields.push(EmbedField::block(REMINDER_TITLE, REMINDER_TEXT));

    AlertPayload {
        title: format!("🎯 EARNINGS OPPORTUNITY: ${}", analysis.ticker),
        description,
        color: tier.color(),
        timestamp,
        fields,
        footer: EmbedFooter {
            text: footer.to_string(),
        },
    }
}
