//! Bollinger-style lower band: moving average minus a multiple of the rolling
//! standard deviation of close.
//!
//! - Middle: SMA(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses sample stddev (divide by N - 1).
//! Lookback: period - 1.

use super::sma::window_mean;
use super::{closes, rolling_mean, Indicator};
use crate::domain::PriceBar;

/// Rolling sample standard deviation of close.
#[derive(Debug, Clone)]
pub struct RollingStdDev {
    period: usize,
    name: String,
}

impl RollingStdDev {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "sample stddev period must be >= 2");
        Self {
            period,
            name: format!("stddev_{period}"),
        }
    }
}

impl Indicator for RollingStdDev {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        rolling_sample_std(&closes(bars), self.period)
    }
}

/// Lower Bollinger band.
#[derive(Debug, Clone)]
pub struct LowerBand {
    period: usize,
    multiplier: f64,
    name: String,
}

impl LowerBand {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period >= 2, "Bollinger period must be >= 2");
        Self {
            period,
            multiplier,
            name: format!("bollinger_lower_{period}_{multiplier}"),
        }
    }
}

impl Indicator for LowerBand {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let values = closes(bars);
        let middle = rolling_mean(&values, self.period);
        let stddev = rolling_sample_std(&values, self.period);
        middle
            .iter()
            .zip(&stddev)
            .map(|(m, s)| m - self.multiplier * s)
            .collect()
    }
}

/// Trailing sample standard deviation of `values` over `period` samples.
///
/// NaN for the warmup, for any window containing NaN, and everywhere when
/// `period < 2` (the sample definition needs two points).
pub fn rolling_sample_std(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period < 2 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        result[i] = window_sample_std(&values[(i + 1 - period)..=i]);
    }

    result
}

/// Sample standard deviation of one complete window; NaN if the window holds
/// a NaN or has fewer than two points.
pub(crate) fn window_sample_std(window: &[f64]) -> f64 {
    let len = window.len();
    if len < 2 {
        return f64::NAN;
    }
    let mean = window_mean(window);
    if mean.is_nan() {
        return f64::NAN;
    }
    let variance = window
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / (len - 1) as f64;
    variance.sqrt()
}
