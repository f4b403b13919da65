//! Canonical ordering for raw price rows: sort, dedupe, validate.
//!
//! Runs in the collaborators before anything reaches the engine, which
//! assumes strictly increasing dates and sane prices.

use tracing::debug;

use crate::domain::PriceBar;

/// What canonicalization threw away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CanonicalReport {
    pub dropped_invalid: usize,
    pub dropped_duplicates: usize,
}

/// Sort by date, collapse repeated dates keeping the last row seen, and drop
/// rows with non-finite or inconsistent prices.
pub fn canonicalize(bars: Vec<PriceBar>) -> Vec<PriceBar> {
    canonicalize_with_report(bars).0
}

/// `canonicalize`, also reporting how many rows were dropped.
pub fn canonicalize_with_report(bars: Vec<PriceBar>) -> (Vec<PriceBar>, CanonicalReport) {
    let total = bars.len();
    let mut valid: Vec<PriceBar> = bars.into_iter().filter(|b| b.is_sane()).collect();
    let dropped_invalid = total - valid.len();

    // Stable sort: later input rows stay after earlier ones on equal dates.
    valid.sort_by_key(|b| b.date);

    let mut out: Vec<PriceBar> = Vec::with_capacity(valid.len());
    for bar in valid {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }

    let report = CanonicalReport {
        dropped_invalid,
        dropped_duplicates: total - dropped_invalid - out.len(),
    };
    if report != CanonicalReport::default() {
        debug!(
            dropped_invalid = report.dropped_invalid,
            dropped_duplicates = report.dropped_duplicates,
            kept = out.len(),
            "canonicalized price rows"
        );
    }
    (out, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar::new(
            NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            close,
            close + 1.0,
            close - 1.0,
            close,
        )
    }

    #[test]
    fn sorts_by_date() {
        let out = canonicalize(vec![bar(5, 30.0), bar(1, 10.0), bar(3, 20.0)]);
        let closes: Vec<f64> = out.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn non_positive_low_is_dropped() {
        // close 1.0 puts the low wick at 0.0
        let (out, report) = canonicalize_with_report(vec![bar(1, 1.0), bar(2, 2.0)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].close, 2.0);
        assert_eq!(report.dropped_invalid, 1);
    }

    #[test]
    fn duplicate_dates_keep_last_row() {
        let (out, report) =
            canonicalize_with_report(vec![bar(1, 10.0), bar(2, 11.0), bar(1, 12.0)]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].close, 12.0);
        assert_eq!(report.dropped_duplicates, 1);
    }

    #[test]
    fn drops_invalid_rows() {
        let mut broken = bar(2, 11.0);
        broken.high = broken.low - 1.0;
        let mut nan = bar(3, 12.0);
        nan.close = f64::NAN;
        let (out, report) = canonicalize_with_report(vec![bar(1, 10.0), broken, nan]);
        assert_eq!(out.len(), 1);
        assert_eq!(report.dropped_invalid, 2);
        assert_eq!(report.dropped_duplicates, 0);
    }

    #[test]
    fn empty_input() {
        assert!(canonicalize(Vec::new()).is_empty());
    }
}
