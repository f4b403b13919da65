//! Strategy Classifier: maps the latest enriched row to one strategy label.
//!
//! Pure and deterministic. Only the last row (and the one before it, for the
//! MACD turn) is inspected; the full slice length drives the history check.
//! Undefined indicator values make the conditions that use them false.

pub mod label;
pub mod rules;

pub use label::{StrategyLabel, StrategySignal};
pub use rules::{RuleError, RulePreset, RuleSet};

use crate::domain::EnrichedBar;

/// Classify with the canonical rule set.
pub fn classify(bars: &[EnrichedBar]) -> StrategySignal {
    classify_with(bars, &RuleSet::canonical())
}

/// Classify with explicit thresholds.
pub fn classify_with(bars: &[EnrichedBar], rules: &RuleSet) -> StrategySignal {
    classify_label(bars, rules).into()
}

/// Label only, without the presentation payload.
pub fn classify_label(bars: &[EnrichedBar], rules: &RuleSet) -> StrategyLabel {
    match bars {
        [] => StrategyLabel::InsufficientData,
        _ if bars.len() < rules.min_bars => StrategyLabel::InsufficientData,
        [.., previous, last] => rules.evaluate(last, Some(previous)),
        [last] => rules.evaluate(last, None),
    }
}
