//! Indicator window configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A window or multiplier the engine cannot build an indicator from.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("{field} must be >= {min}, got {value}")]
    WindowTooShort {
        field: &'static str,
        min: usize,
        value: usize,
    },

    #[error("band_multiplier must be finite and non-negative, got {0}")]
    BandMultiplier(f64),
}

/// Windows and multipliers used by the indicator engine.
///
/// The lower band shares the short SMA window: it is the short SMA minus
/// `band_multiplier` sample standard deviations over the same bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub sma_short: usize,
    pub sma_long: usize,
    pub band_multiplier: f64,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            sma_short: 20,
            sma_long: 60,
            band_multiplier: 2.0,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

impl IndicatorSettings {
    /// Check that every window can be constructed.
    ///
    /// The band window needs two bars for a sample standard deviation.
    pub fn check(&self) -> Result<(), SettingsError> {
        for (field, min, value) in [
            ("sma_short", 2, self.sma_short),
            ("sma_long", 1, self.sma_long),
            ("rsi_period", 1, self.rsi_period),
            ("macd_fast", 1, self.macd_fast),
            ("macd_slow", 1, self.macd_slow),
            ("macd_signal", 1, self.macd_signal),
        ] {
            if value < min {
                return Err(SettingsError::WindowTooShort { field, min, value });
            }
        }
        if !self.band_multiplier.is_finite() || self.band_multiplier < 0.0 {
            return Err(SettingsError::BandMultiplier(self.band_multiplier));
        }
        Ok(())
    }

    /// Longest window across all rolling statistics.
    pub fn max_window(&self) -> usize {
        self.sma_short.max(self.sma_long).max(self.rsi_period)
    }
}
