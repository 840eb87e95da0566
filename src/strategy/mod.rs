//! Confidence tiers and paper-trading position sizing.

pub mod sizing;

use std::fmt;

pub use sizing::SuggestedPlay;

// ---------------------------------------------------------------------------
// Confidence tiers
// ---------------------------------------------------------------------------

/// Confidence bucket for a total score. Drives alert color and sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfidenceTier {
    High,
    Moderate,
    Low,
}

impl ConfidenceTier {
    pub const HIGH_MIN_SCORE: i32 = 80;
    pub const MODERATE_MIN_SCORE: i32 = 70;

    pub fn from_score(score: i32) -> Self {
        if score >= Self::HIGH_MIN_SCORE {
            Self::High
        } else if score >= Self::MODERATE_MIN_SCORE {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "HIGH CONFIDENCE",
            Self::Moderate => "MODERATE CONFIDENCE",
            Self::Low => "LOW CONFIDENCE",
        }
    }

    /// Embed color as a 24-bit RGB integer (red / yellow / blue).
    pub fn color(&self) -> u32 {
        match self {
            Self::High => 15158332,
            Self::Moderate => 16776960,
            Self::Low => 3447003,
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
