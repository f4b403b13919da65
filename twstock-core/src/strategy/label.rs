//! Strategy labels and the signal handed to the presentation layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of strategy categories, in rule-precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyLabel {
    InsufficientData,
    ExtremePanic,
    GoldenBuy,
    Overheated,
    BullishContinuation,
    Consolidating,
}

impl StrategyLabel {
    pub const ALL: [StrategyLabel; 6] = [
        Self::InsufficientData,
        Self::ExtremePanic,
        Self::GoldenBuy,
        Self::Overheated,
        Self::BullishContinuation,
        Self::Consolidating,
    ];

    /// Short display title.
    pub fn title(self) -> &'static str {
        match self {
            Self::InsufficientData => "insufficient data",
            Self::ExtremePanic => "extreme panic",
            Self::GoldenBuy => "golden buy signal",
            Self::Overheated => "overheated / sell zone",
            Self::BullishContinuation => "bullish continuation",
            Self::Consolidating => "consolidating / no clear signal",
        }
    }

    /// Fixed display color (hex) for the label's tag.
    pub fn color(self) -> &'static str {
        match self {
            Self::InsufficientData => "#9e9e9e",
            Self::ExtremePanic => "#d32f2f",
            Self::GoldenBuy => "#2e7d32",
            Self::Overheated => "#ef6c00",
            Self::BullishContinuation => "#1565c0",
            Self::Consolidating => "#757575",
        }
    }

    /// Advisory text shown under the tag.
    pub fn advisory(self) -> &'static str {
        match self {
            Self::InsufficientData => "Not enough price history yet to judge this stock.",
            Self::ExtremePanic => "RSI is deeply oversold; avoid panic selling into the drop.",
            Self::GoldenBuy => {
                "Oversold near the lower band with MACD momentum turning up; a staged entry is reasonable."
            }
            Self::Overheated => "RSI is overbought; the run-up is stretched, consider taking profit.",
            Self::BullishContinuation => {
                "Price above a rising moving-average stack with positive MACD; the uptrend is intact."
            }
            Self::Consolidating => "No clear edge; the market is moving sideways.",
        }
    }
}

impl fmt::Display for StrategyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Classifier output for one instrument at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySignal {
    pub label: StrategyLabel,
    pub color: String,
    pub advisory: String,
}

impl From<StrategyLabel> for StrategySignal {
    fn from(label: StrategyLabel) -> Self {
        Self {
            label,
            color: label.color().to_string(),
            advisory: label.advisory().to_string(),
        }
    }
}
