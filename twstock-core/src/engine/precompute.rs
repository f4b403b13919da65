//! Batch enrichment: every indicator is computed once over the full series,
//! then the series are zipped into `EnrichedBar` rows.

use crate::domain::{defined, EnrichedBar, PriceBar};
use crate::indicators::{closes, macd_series, Indicator, LowerBand, Rsi, Sma};

use super::IndicatorSettings;

/// Compute every derived field for `bars` with the given windows.
///
/// Output length equals input length.
pub fn enrich(bars: &[PriceBar], settings: &IndicatorSettings) -> Vec<EnrichedBar> {
    let sma_short = Sma::new(settings.sma_short).compute(bars);
    let sma_long = Sma::new(settings.sma_long).compute(bars);
    let lower_band = LowerBand::new(settings.sma_short, settings.band_multiplier).compute(bars);
    let rsi = Rsi::new(settings.rsi_period).compute(bars);
    let macd = macd_series(
        &closes(bars),
        settings.macd_fast,
        settings.macd_slow,
        settings.macd_signal,
    );

    for (name, series) in [
        ("sma_short", &sma_short),
        ("sma_long", &sma_long),
        ("lower_band", &lower_band),
        ("rsi", &rsi),
        ("macd_line", &macd.line),
    ] {
        debug_assert_eq!(
            series.len(),
            bars.len(),
            "indicator '{name}' produced {} values for {} bars",
            series.len(),
            bars.len()
        );
    }

    bars.iter()
        .enumerate()
        .map(|(i, bar)| EnrichedBar {
            bar: *bar,
            sma_short: defined(sma_short[i]),
            sma_long: defined(sma_long[i]),
            lower_band: defined(lower_band[i]),
            rsi: defined(rsi[i]),
            macd_line: defined(macd.line[i]),
            signal_line: defined(macd.signal[i]),
            histogram: defined(macd.histogram[i]),
        })
        .collect()
}

/// Maximum lookback across a set of indicators.
///
/// Rows before this index carry at least one undefined field.
pub fn compute_warmup(indicators: &[Box<dyn Indicator>]) -> usize {
    indicators.iter().map(|i| i.lookback()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, Ema, DEFAULT_EPSILON};

    #[test]
    fn enrich_short_windows() {
        let settings = IndicatorSettings {
            sma_short: 3,
            sma_long: 4,
            rsi_period: 2,
            ..Default::default()
        };
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let rows = enrich(&bars, &settings);

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[1].sma_short, None);
        assert_approx(rows[2].sma_short.unwrap(), 11.0, DEFAULT_EPSILON);
        assert_eq!(rows[2].sma_long, None);
        assert_approx(rows[3].sma_long.unwrap(), 11.5, DEFAULT_EPSILON);
        assert_approx(rows[2].lower_band.unwrap(), 9.0, DEFAULT_EPSILON);
        assert_eq!(rows[0].rsi, None);
        assert!(rows[1].rsi.is_some());
        assert!(rows.iter().all(|r| r.macd_line.is_some()));
    }

    #[test]
    fn enrich_preserves_bars() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let rows = enrich(&bars, &IndicatorSettings::default());
        for (row, bar) in rows.iter().zip(&bars) {
            assert_eq!(&row.bar, bar);
        }
    }

    #[test]
    fn enrich_empty_input() {
        assert!(enrich(&[], &IndicatorSettings::default()).is_empty());
    }

    #[test]
    fn compute_warmup_max_lookback() {
        let indicators: Vec<Box<dyn Indicator>> = vec![
            Box::new(Sma::new(5)),  // lookback 4
            Box::new(Rsi::new(14)), // lookback 13
            Box::new(Ema::new(26)), // lookback 0
        ];
        assert_eq!(compute_warmup(&indicators), 13);
    }

    #[test]
    fn compute_warmup_empty() {
        let indicators: Vec<Box<dyn Indicator>> = vec![];
        assert_eq!(compute_warmup(&indicators), 0);
    }
}
