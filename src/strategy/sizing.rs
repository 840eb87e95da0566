//! Paper-trading position sizing.
//!
//! Each confidence tier carries a fixed notional, stop and target. The
//! suggested play is derived from the latest market price; all money
//! math is done in `Decimal` and rounded to cents.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use super::ConfidenceTier;

/// Per-tier sizing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingRule {
    pub notional: Decimal,
    pub stop_pct: u32,
    pub target_pct: u32,
}

impl SizingRule {
    pub fn for_tier(tier: ConfidenceTier) -> Self {
        match tier {
            ConfidenceTier::High => Self {
                notional: dec!(5000),
                stop_pct: 7,
                target_pct: 15,
            },
            ConfidenceTier::Moderate => Self {
                notional: dec!(3000),
                stop_pct: 8,
                target_pct: 12,
            },
            ConfidenceTier::Low => Self {
                notional: dec!(2000),
                stop_pct: 10,
                target_pct: 10,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedPlay {
    pub tier: ConfidenceTier,
    pub shares: u64,
    pub entry: Decimal,
    pub stop: Decimal,
    pub target: Decimal,
    pub stop_pct: u32,
    pub target_pct: u32,
}

fn to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl SuggestedPlay {
    /// Size a position for `score` at `price`.
    ///
    /// Returns `None` unless the price is finite and positive.
    pub fn for_score(score: i32, price: f64) -> Option<Self> {
        if !price.is_finite() || price <= 0.0 {
            return None;
        }
        let entry = Decimal::from_f64(price)?;
        if entry <= Decimal::ZERO {
            return None;
        }

        let tier = ConfidenceTier::from_score(score);
        let rule = SizingRule::for_tier(tier);
        let shares = rule.notional.checked_div(entry)?.floor().to_u64()?;

        let hundred = dec!(100);
        let stop = entry * (hundred - Decimal::from(rule.stop_pct)) / hundred;
        let target = entry * (hundred + Decimal::from(rule.target_pct)) / hundred;

        Some(Self {
            tier,
            shares,
            entry,
            stop: to_cents(stop),
            target: to_cents(target),
            stop_pct: rule.stop_pct,
            target_pct: rule.target_pct,
        })
    }

    /// Reward per unit of risk (target % / stop %).
    pub fn risk_reward(&self) -> Decimal {
        Decimal::from(self.target_pct) / Decimal::from(self.stop_pct)
    }

    /// Four-line summary shown in the alert.
    pub fn render(&self) -> String {
        format!(
            "BUY {} shares at ${:.2}\nStop: ${:.2} (-{}%)\nTarget: ${:.2} (+{}%)\nRisk/Reward: 1:{:.1}",
            self.shares,
            to_cents(self.entry),
            self.stop,
            self.stop_pct,
            self.target,
            self.target_pct,
            self.risk_reward().round_dp(1),
        )
    }
}
