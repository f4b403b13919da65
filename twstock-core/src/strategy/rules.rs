//! Rule thresholds for the strategy classifier.
//!
//! Three rule-set variants are in circulation and disagree on thresholds
//! (RSI 25/30/35/70/75, band multiplier 1.01/1.02, minimum bars 26/30). None
//! of them is authoritative; each is available as a preset and every value can
//! be overridden from configuration.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::domain::EnrichedBar;

use super::StrategyLabel;

/// A threshold the decision table cannot use.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("{field} must be within [0, 100], got {value}")]
    RsiOutOfRange { field: &'static str, value: f64 },

    #[error("band_multiplier must be positive, got {0}")]
    BandMultiplier(f64),

    #[error("min_bars must be >= 2 when the MACD turn is required, got {0}")]
    MinBarsTooShort(usize),
}

/// Thresholds and switches for the decision table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Fewer enriched rows than this → `InsufficientData`.
    pub min_bars: usize,
    /// `rsi < panic_rsi` → `ExtremePanic`.
    pub panic_rsi: f64,
    /// Upper RSI bound for `GoldenBuy`, checked only when `golden_buy_requires_rsi`.
    pub golden_buy_rsi: f64,
    pub golden_buy_requires_rsi: bool,
    /// `close < lower_band * band_multiplier` counts as touching the band.
    pub band_multiplier: f64,
    /// Require a negative histogram that rose since the previous bar.
    pub require_macd_turn: bool,
    /// `rsi > overheated_rsi` → `Overheated`.
    pub overheated_rsi: f64,
    /// Enable the `BullishContinuation` rule (needs the long SMA).
    pub bullish_continuation: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::canonical()
    }
}

/// The observed rule-set variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulePreset {
    Canonical,
    BandTouch,
    ConfirmedRebound,
}

impl RulePreset {
    pub fn rules(self) -> RuleSet {
        match self {
            Self::Canonical => RuleSet::canonical(),
            Self::BandTouch => RuleSet::band_touch(),
            Self::ConfirmedRebound => RuleSet::confirmed_rebound(),
        }
    }
}

impl FromStr for RulePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "canonical" => Ok(Self::Canonical),
            "band_touch" => Ok(Self::BandTouch),
            "confirmed_rebound" => Ok(Self::ConfirmedRebound),
            other => Err(format!(
                "unknown rule preset '{other}' (expected canonical, band_touch or confirmed_rebound)"
            )),
        }
    }
}

/// Rule evaluation order after the history check. `Consolidating` is the
/// catch-all and never listed.
const RULE_ORDER: [StrategyLabel; 4] = [
    StrategyLabel::ExtremePanic,
    StrategyLabel::GoldenBuy,
    StrategyLabel::Overheated,
    StrategyLabel::BullishContinuation,
];

impl RuleSet {
    /// Richest variant: MACD-confirmed band touch plus the trend-continuation rule.
    pub fn canonical() -> Self {
        Self {
            min_bars: 26,
            panic_rsi: 25.0,
            golden_buy_rsi: 35.0,
            golden_buy_requires_rsi: true,
            band_multiplier: 1.02,
            require_macd_turn: true,
            overheated_rsi: 75.0,
            bullish_continuation: true,
        }
    }

    /// Simplest variant: oversold at RSI 30, bare 1% band touch, overbought at 70.
    pub fn band_touch() -> Self {
        Self {
            min_bars: 30,
            panic_rsi: 30.0,
            golden_buy_rsi: 35.0,
            golden_buy_requires_rsi: false,
            band_multiplier: 1.01,
            require_macd_turn: false,
            overheated_rsi: 70.0,
            bullish_continuation: false,
        }
    }

    /// Canonical thresholds without the continuation rule.
    pub fn confirmed_rebound() -> Self {
        Self {
            bullish_continuation: false,
            ..Self::canonical()
        }
    }

    /// Check that the thresholds are usable.
    pub fn check(&self) -> Result<(), RuleError> {
        for (field, value) in [
            ("panic_rsi", self.panic_rsi),
            ("golden_buy_rsi", self.golden_buy_rsi),
            ("overheated_rsi", self.overheated_rsi),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(RuleError::RsiOutOfRange { field, value });
            }
        }
        if !self.band_multiplier.is_finite() || self.band_multiplier <= 0.0 {
            return Err(RuleError::BandMultiplier(self.band_multiplier));
        }
        if self.require_macd_turn && self.min_bars < 2 {
            return Err(RuleError::MinBarsTooShort(self.min_bars));
        }
        Ok(())
    }

    /// Every rule that holds for `last` (given the row before it), in
    /// precedence order. The classifier takes the first.
    pub fn matching(&self, last: &EnrichedBar, previous: Option<&EnrichedBar>) -> Vec<StrategyLabel> {
        RULE_ORDER
            .iter()
            .copied()
            .filter(|label| self.holds(*label, last, previous))
            .collect()
    }

    /// First matching rule, or `Consolidating`.
    pub fn evaluate(&self, last: &EnrichedBar, previous: Option<&EnrichedBar>) -> StrategyLabel {
        RULE_ORDER
            .iter()
            .copied()
            .find(|label| self.holds(*label, last, previous))
            .unwrap_or(StrategyLabel::Consolidating)
    }

    fn holds(&self, label: StrategyLabel, last: &EnrichedBar, previous: Option<&EnrichedBar>) -> bool {
        match label {
            StrategyLabel::ExtremePanic => below(last.rsi, self.panic_rsi),
            StrategyLabel::GoldenBuy => {
                let rsi_ok = !self.golden_buy_requires_rsi || below(last.rsi, self.golden_buy_rsi);
                let band_ok = last
                    .lower_band
                    .is_some_and(|band| last.close() < band * self.band_multiplier);
                let turn_ok = !self.require_macd_turn || macd_turning_up(last, previous);
                rsi_ok && band_ok && turn_ok
            }
            StrategyLabel::Overheated => above(last.rsi, self.overheated_rsi),
            StrategyLabel::BullishContinuation => {
                self.bullish_continuation
                    && matches!(
                        (last.sma_short, last.sma_long, last.histogram),
                        (Some(short), Some(long), Some(hist))
                            if last.close() > short && short > long && hist > 0.0
                    )
            }
            StrategyLabel::InsufficientData | StrategyLabel::Consolidating => false,
        }
    }
}

fn below(value: Option<f64>, threshold: f64) -> bool {
    value.is_some_and(|v| v < threshold)
}

fn above(value: Option<f64>, threshold: f64) -> bool {
    value.is_some_and(|v| v > threshold)
}

/// Histogram still negative but higher than on the previous bar.
fn macd_turning_up(last: &EnrichedBar, previous: Option<&EnrichedBar>) -> bool {
    match (last.histogram, previous.and_then(|p| p.histogram)) {
        (Some(hist), Some(prev)) => hist < 0.0 && hist > prev,
        _ => false,
    }
}
