//! Indicator Engine: raw price series in, enriched series out.
//!
//! Two ways to get the same rows:
//!
//! - `compute` / `compute_with`: batch recomputation over the whole history.
//! - `StreamingEnricher`: append-only, keeps ring buffers for the rolling
//!   windows and running EMA state, one row per pushed bar.
//!
//! Every derived field at index i depends only on bars `0..=i`.

pub mod precompute;
pub mod settings;
pub mod streaming;

pub use precompute::{compute_warmup, enrich};
pub use settings::{IndicatorSettings, SettingsError};
pub use streaming::StreamingEnricher;

use crate::domain::{EnrichedBar, PriceBar};
use crate::indicators::{Indicator, LowerBand, Rsi, Sma};
use chrono::NaiveDate;
use thiserror::Error;

/// Precondition violations in a price sequence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("bar {index} dated {date} precedes the previous bar ({previous})")]
    Unsorted {
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("bar {index} repeats date {date}")]
    DuplicateDate { index: usize, date: NaiveDate },

    #[error("bar {index} dated {date} has a non-finite price")]
    NonFinitePrice { index: usize, date: NaiveDate },

    #[error("invalid indicator settings: {0}")]
    InvalidSettings(#[from] SettingsError),
}

/// Enrich `bars` with the default windows (20/60 SMA, 20-bar 2σ band, RSI 14,
/// MACD 12/26/9).
///
/// Precondition: dates strictly increasing, prices finite. Duplicates must be
/// collapsed by the caller (`data::canonicalize`). Violations are not checked
/// here and produce skewed rolling statistics; use `try_compute` to reject
/// them instead. Short input is not an error; it yields undefined leading
/// fields.
pub fn compute(bars: &[PriceBar]) -> Vec<EnrichedBar> {
    enrich(bars, &IndicatorSettings::default())
}

/// `compute` with overridden windows.
///
/// # Panics
/// If `settings` fails `IndicatorSettings::check`. `try_compute` reports it
/// as an error instead.
pub fn compute_with(bars: &[PriceBar], settings: &IndicatorSettings) -> Vec<EnrichedBar> {
    enrich(bars, settings)
}

/// Fail-fast variant of `compute_with`: checks the settings and the bar
/// precondition before computing anything.
pub fn try_compute(
    bars: &[PriceBar],
    settings: &IndicatorSettings,
) -> Result<Vec<EnrichedBar>, EngineError> {
    settings.check()?;
    validate(bars)?;
    Ok(enrich(bars, settings))
}

/// Check ordering, uniqueness and finiteness of a price sequence.
pub fn validate(bars: &[PriceBar]) -> Result<(), EngineError> {
    let mut previous: Option<NaiveDate> = None;
    for (index, bar) in bars.iter().enumerate() {
        check_next(index, previous, bar)?;
        previous = Some(bar.date);
    }
    Ok(())
}

/// Validate one bar against the date of the bar before it.
pub(crate) fn check_next(
    index: usize,
    previous: Option<NaiveDate>,
    bar: &PriceBar,
) -> Result<(), EngineError> {
    if bar.is_void() {
        return Err(EngineError::NonFinitePrice {
            index,
            date: bar.date,
        });
    }
    match previous {
        Some(prev) if bar.date == prev => Err(EngineError::DuplicateDate {
            index,
            date: bar.date,
        }),
        Some(prev) if bar.date < prev => Err(EngineError::Unsorted {
            index,
            previous: prev,
            date: bar.date,
        }),
        _ => Ok(()),
    }
}

/// Number of leading rows that carry at least one undefined rolling field.
pub fn warmup_bars(settings: &IndicatorSettings) -> usize {
    let indicators: Vec<Box<dyn Indicator>> = vec![
        Box::new(Sma::new(settings.sma_short)),
        Box::new(Sma::new(settings.sma_long)),
        Box::new(LowerBand::new(settings.sma_short, settings.band_multiplier)),
        Box::new(Rsi::new(settings.rsi_period)),
    ];
    compute_warmup(&indicators)
}
