//! Incremental enrichment for append-only price feeds.
//!
//! Holds the trailing closes and RSI gain/loss windows in ring buffers and the
//! three EMA states as scalars, so each new bar costs O(window) instead of a
//! full-history recomputation. Rows are identical to the batch engine's.

use std::collections::VecDeque;

use chrono::NaiveDate;

use crate::domain::{EnrichedBar, PriceBar};
use crate::indicators::bollinger::window_sample_std;
use crate::indicators::sma::window_mean;
use crate::indicators::{ema_alpha, rsi_from_averages};

use super::{check_next, warmup_bars, EngineError, IndicatorSettings};

/// Append-only enricher for one instrument.
#[derive(Debug, Clone)]
pub struct StreamingEnricher {
    settings: IndicatorSettings,
    closes: VecDeque<f64>,
    gains: VecDeque<f64>,
    losses: VecDeque<f64>,
    last: Option<(NaiveDate, f64)>,
    ema_fast: Option<f64>,
    ema_slow: Option<f64>,
    ema_signal: Option<f64>,
    count: usize,
}

impl StreamingEnricher {
    /// Empty enricher. Fails if any window in `settings` is unusable.
    pub fn new(settings: IndicatorSettings) -> Result<Self, EngineError> {
        settings.check()?;
        let close_capacity = settings.sma_short.max(settings.sma_long);
        let rsi_capacity = settings.rsi_period;
        Ok(Self {
            settings,
            closes: VecDeque::with_capacity(close_capacity),
            gains: VecDeque::with_capacity(rsi_capacity),
            losses: VecDeque::with_capacity(rsi_capacity),
            last: None,
            ema_fast: None,
            ema_slow: None,
            ema_signal: None,
            count: 0,
        })
    }

    pub fn settings(&self) -> &IndicatorSettings {
        &self.settings
    }

    /// Number of bars consumed so far.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True once every rolling field of the next row will be defined.
    pub fn is_warm(&self) -> bool {
        self.count > warmup_bars(&self.settings)
    }

    /// Consume one bar and return its enriched row.
    ///
    /// The bar must be dated after the previous one and carry finite prices;
    /// otherwise the state is left untouched and an error is returned.
    pub fn push(&mut self, bar: PriceBar) -> Result<EnrichedBar, EngineError> {
        check_next(self.count, self.last.map(|(date, _)| date), &bar)?;

        let delta = self.last.map_or(0.0, |(_, prev)| bar.close - prev);
        push_bounded(
            &mut self.gains,
            if delta > 0.0 { delta } else { 0.0 },
            self.settings.rsi_period,
        );
        push_bounded(
            &mut self.losses,
            if delta < 0.0 { -delta } else { 0.0 },
            self.settings.rsi_period,
        );
        push_bounded(
            &mut self.closes,
            bar.close,
            self.settings.sma_short.max(self.settings.sma_long),
        );

        let multiplier = self.settings.band_multiplier;
        let window = self.closes.make_contiguous();
        let short = tail(window, self.settings.sma_short);
        let sma_short = short.map(window_mean);
        let lower_band = short.map(|w| window_mean(w) - multiplier * window_sample_std(w));
        let sma_long = tail(window, self.settings.sma_long).map(window_mean);

        let rsi = if self.gains.len() == self.settings.rsi_period {
            let avg_gain = window_mean(self.gains.make_contiguous());
            let avg_loss = window_mean(self.losses.make_contiguous());
            Some(rsi_from_averages(avg_gain, avg_loss))
        } else {
            None
        };

        let fast = ema_step(self.ema_fast, bar.close, self.settings.macd_fast);
        let slow = ema_step(self.ema_slow, bar.close, self.settings.macd_slow);
        let line = fast - slow;
        let signal = ema_step(self.ema_signal, line, self.settings.macd_signal);
        self.ema_fast = Some(fast);
        self.ema_slow = Some(slow);
        self.ema_signal = Some(signal);

        self.last = Some((bar.date, bar.close));
        self.count += 1;

        Ok(EnrichedBar {
            bar,
            sma_short,
            sma_long,
            lower_band,
            rsi,
            macd_line: Some(line),
            signal_line: Some(signal),
            histogram: Some(line - signal),
        })
    }

    /// Push a batch of bars in order, stopping at the first rejected bar.
    pub fn extend(&mut self, bars: &[PriceBar]) -> Result<Vec<EnrichedBar>, EngineError> {
        bars.iter().map(|bar| self.push(*bar)).collect()
    }
}

fn push_bounded(buffer: &mut VecDeque<f64>, value: f64, capacity: usize) {
    buffer.push_back(value);
    while buffer.len() > capacity {
        buffer.pop_front();
    }
}

/// Last `period` values, if that many exist.
fn tail(window: &[f64], period: usize) -> Option<&[f64]> {
    if period == 0 || window.len() < period {
        None
    } else {
        Some(&window[window.len() - period..])
    }
}

fn ema_step(prev: Option<f64>, value: f64, period: usize) -> f64 {
    match prev {
        None => value,
        Some(prev) => {
            let alpha = ema_alpha(period);
            alpha * value + (1.0 - alpha) * prev
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute_with;
    use crate::indicators::make_bars;

    fn wavy_closes(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0 + i as f64 * 0.05)
            .collect()
    }

    #[test]
    fn matches_batch_engine() {
        let bars = make_bars(&wavy_closes(120));
        let settings = IndicatorSettings::default();
        let batch = compute_with(&bars, &settings);

        let mut enricher = StreamingEnricher::new(settings).unwrap();
        let streamed = enricher.extend(&bars).unwrap();

        assert_eq!(streamed.len(), batch.len());
        for (i, (s, b)) in streamed.iter().zip(&batch).enumerate() {
            assert_eq!(s, b, "row {i} differs");
        }
    }

    #[test]
    fn rejects_out_of_order_bar_without_mutating() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let mut enricher = StreamingEnricher::new(IndicatorSettings::default()).unwrap();
        enricher.push(bars[0]).unwrap();
        enricher.push(bars[2]).unwrap();

        let err = enricher.push(bars[1]).unwrap_err();
        assert!(matches!(err, EngineError::Unsorted { index: 2, .. }));
        assert_eq!(enricher.len(), 2);
    }

    #[test]
    fn rejects_repeated_date() {
        let bars = make_bars(&[10.0, 11.0]);
        let mut enricher = StreamingEnricher::new(IndicatorSettings::default()).unwrap();
        enricher.push(bars[0]).unwrap();
        let mut repeat = bars[1];
        repeat.date = bars[0].date;
        assert!(matches!(
            enricher.push(repeat),
            Err(EngineError::DuplicateDate { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_unusable_windows() {
        for settings in [
            IndicatorSettings {
                sma_short: 1,
                ..Default::default()
            },
            IndicatorSettings {
                rsi_period: 0,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                StreamingEnricher::new(settings),
                Err(EngineError::InvalidSettings(_))
            ));
        }
    }

    #[test]
    fn warms_after_long_window() {
        let bars = make_bars(&wavy_closes(61));
        let mut enricher = StreamingEnricher::new(IndicatorSettings::default()).unwrap();
        enricher.extend(&bars[..59]).unwrap();
        assert!(!enricher.is_warm());
        let row = enricher.push(bars[59]).unwrap();
        assert!(row.sma_long.is_some());
        assert!(enricher.is_warm());
    }
}
