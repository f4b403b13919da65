//! Moving Average Convergence/Divergence (MACD).
//!
//! - Line: EMA(close, fast) - EMA(close, slow)
//! - Signal: EMA(line, signal)
//! - Histogram: line - signal
//!
//! All EMAs are seeded with their first input, so every part is defined from
//! bar 0. Lookback: 0.

use super::{closes, ema_of_series, Indicator};
use crate::domain::PriceBar;

/// Which MACD series an indicator instance produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdPart {
    Line,
    Signal,
    Histogram,
}

/// The three MACD series computed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Compute line, signal and histogram for a close series.
pub fn macd_series(values: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let fast_ema = ema_of_series(values, fast);
    let slow_ema = ema_of_series(values, slow);
    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal = ema_of_series(&line, signal);
    let histogram = line.iter().zip(&signal).map(|(l, s)| l - s).collect();
    MacdSeries {
        line,
        signal,
        histogram,
    }
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    part: MacdPart,
    name: String,
}

impl Macd {
    fn with_part(fast: usize, slow: usize, signal: usize, part: MacdPart) -> Self {
        assert!(
            fast >= 1 && slow >= 1 && signal >= 1,
            "MACD periods must be >= 1"
        );
        let label = match part {
            MacdPart::Line => "line",
            MacdPart::Signal => "signal",
            MacdPart::Histogram => "histogram",
        };
        Self {
            fast,
            slow,
            signal,
            part,
            name: format!("macd_{label}_{fast}_{slow}_{signal}"),
        }
    }

    pub fn line(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_part(fast, slow, signal, MacdPart::Line)
    }

    pub fn signal(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_part(fast, slow, signal, MacdPart::Signal)
    }

    pub fn histogram(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_part(fast, slow, signal, MacdPart::Histogram)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let series = macd_series(&closes(bars), self.fast, self.slow, self.signal);
        match self.part {
            MacdPart::Line => series.line,
            MacdPart::Signal => series.signal,
            MacdPart::Histogram => series.histogram,
        }
    }
}
