//! EnrichedBar: a PriceBar plus the derived indicator fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PriceBar;

/// One row of the enriched series, parallel to the input bars.
///
/// Derived fields are `None` until enough history exists. A field is never
/// zero-filled to stand in for "not yet defined".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnrichedBar {
    #[serde(flatten)]
    pub bar: PriceBar,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub lower_band: Option<f64>,
    pub rsi: Option<f64>,
    pub macd_line: Option<f64>,
    pub signal_line: Option<f64>,
    pub histogram: Option<f64>,
}

impl EnrichedBar {
    /// An enriched row with every derived field undefined.
    pub fn undefined(bar: PriceBar) -> Self {
        Self {
            bar,
            sma_short: None,
            sma_long: None,
            lower_band: None,
            rsi: None,
            macd_line: None,
            signal_line: None,
            histogram: None,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }
}

/// Map the NaN warmup marker used by indicator series to `None`.
pub fn defined(value: f64) -> Option<f64> {
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EnrichedBar {
        let bar = PriceBar::new(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            100.0,
            102.0,
            99.0,
            101.0,
        );
        EnrichedBar {
            sma_short: Some(100.5),
            rsi: Some(48.2),
            macd_line: Some(0.4),
            signal_line: Some(0.3),
            histogram: Some(0.1),
            ..EnrichedBar::undefined(bar)
        }
    }

    #[test]
    fn defined_maps_nan_to_none() {
        assert_eq!(defined(f64::NAN), None);
        assert_eq!(defined(1.5), Some(1.5));
    }

    #[test]
    fn undefined_fields_serialize_as_null() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["close"], 101.0);
        assert!(json["sma_long"].is_null());
        assert!(json["lower_band"].is_null());
        assert_eq!(json["rsi"], 48.2);
    }

    #[test]
    fn serialization_roundtrip() {
        let row = sample();
        let json = serde_json::to_string(&row).unwrap();
        let back: EnrichedBar = serde_json::from_str(&json).unwrap();
        assert_eq!(row, back);
    }
}
