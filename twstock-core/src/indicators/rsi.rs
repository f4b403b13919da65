//! Relative Strength Index (RSI).
//!
//! Simple rolling means (not Wilder smoothing) of gains and losses:
//! delta[t] = close[t] - close[t-1], delta[0] = 0
//! gain = mean(max(delta, 0)), loss = mean(max(-delta, 0)) over `period` deltas
//! RSI = 100 - 100 / (1 + gain / (loss + 1e-9))
//! Lookback: period - 1.
//!
//! Edge cases: loss == 0 with gain > 0 saturates just below 100 through the
//! epsilon term; a window with no movement at all (gain == loss == 0) is 50.

use super::{closes, rolling_mean, Indicator};
use crate::domain::PriceBar;

/// Guard added to the average loss so a loss-free window never divides by zero.
pub const RSI_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let values = closes(bars);
        let n = values.len();

        let mut gains = vec![0.0; n];
        let mut losses = vec![0.0; n];
        for i in 1..n {
            let delta = values[i] - values[i - 1];
            if delta.is_nan() {
                gains[i] = f64::NAN;
                losses[i] = f64::NAN;
            } else if delta > 0.0 {
                gains[i] = delta;
            } else if delta < 0.0 {
                losses[i] = -delta;
            }
        }

        let avg_gain = rolling_mean(&gains, self.period);
        let avg_loss = rolling_mean(&losses, self.period);

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| rsi_from_averages(g, l))
            .collect()
    }
}

/// RSI from the average gain and average loss of one window.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        f64::NAN
    } else if avg_gain == 0.0 && avg_loss == 0.0 {
        50.0 // no movement
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / (avg_loss + RSI_EPSILON))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn rsi_all_gains_saturates_near_100() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&bars);
        assert!(result[1].is_nan());
        assert!(result[2] < 100.0);
        assert_approx(result[2], 100.0, 1e-6);
        assert_approx(result[5], 100.0, 1e-6);
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let bars = make_bars(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_eq!(result[3], 0.0);
    }

    #[test]
    fn rsi_mixed() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // Window at index 3: gains 0.34, losses 0.73
        // RSI = 100 - 100 / (1 + 0.34/0.73) = 31.7757...
        let bars = make_bars(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = Rsi::new(3).compute(&bars);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[3], 100.0 - 100.0 / (1.0 + 0.34 / 0.73), 1e-6);
    }

    #[test]
    fn rsi_flat_window_is_neutral() {
        let bars = make_bars(&[50.0; 20]);
        let result = Rsi::new(14).compute(&bars);
        assert!(result[12].is_nan());
        assert_eq!(result[13], 50.0);
        assert_eq!(result[19], 50.0);
    }

    #[test]
    fn rsi_first_delta_counts_as_zero() {
        // 14 closes → 13 real deltas plus the zero at index 0 fill the window.
        let closes: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        let result = Rsi::new(14).compute(&make_bars(&closes));
        assert!(!result[13].is_nan());
    }

    #[test]
    fn rsi_bounds() {
        let bars = make_bars(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = Rsi::new(3).compute(&bars);
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!(
                    (0.0..=100.0).contains(&v),
                    "RSI out of bounds at bar {i}: {v}"
                );
            }
        }
    }

    #[test]
    fn rsi_nan_propagation() {
        let mut bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0]);
        bars[2].close = f64::NAN;
        let result = Rsi::new(3).compute(&bars);
        // deltas 2 and 3 are NaN; windows ending at 2..=5 contain one of them
        assert!(result[2].is_nan());
        assert!(result[5].is_nan());
        assert!(!result[6].is_nan());
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 13);
    }
}
