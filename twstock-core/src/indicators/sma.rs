//! Simple Moving Average (SMA).
//!
//! Mean of close prices over a trailing window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::{closes, Indicator};
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        rolling_mean(&closes(bars), self.period)
    }
}

/// Trailing mean of `values` over `period` samples.
///
/// Each window is summed from scratch rather than carried as a running sum, so
/// a window of exact zeros averages to exactly zero. Any NaN in a window makes
/// that output NaN.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        result[i] = window_mean(&values[(i + 1 - period)..=i]);
    }

    result
}

/// Mean of one complete window; NaN if the window holds a NaN.
pub(crate) fn window_mean(window: &[f64]) -> f64 {
    if window.is_empty() || window.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    window.iter().sum::<f64>() / window.len() as f64
}
