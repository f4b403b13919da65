//! Synthetic price source for developer mode.
//!
//! Produces a seeded random walk per symbol starting at 100.0, one bar per
//! weekday. Deterministic for a given (seed, symbol, start, end).

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataSource, PriceSource};
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct SyntheticSource {
    seed: u64,
    end: Option<NaiveDate>,
}

impl SyntheticSource {
    pub fn new(seed: u64) -> Self {
        Self { seed, end: None }
    }

    /// Pin the last generated date (defaults to today).
    pub fn with_end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    fn rng_for(&self, symbol: &str) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ symbol_hash(symbol))
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(42)
    }
}

impl PriceSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn kind(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch(&self, symbol: &str, start: NaiveDate) -> Result<Vec<PriceBar>, DataError> {
        let end = self.end.unwrap_or_else(|| Local::now().date_naive());
        let bars = generate_walk(&mut self.rng_for(symbol), start, end);
        if bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
                start,
            });
        }
        Ok(bars)
    }
}

fn generate_walk(rng: &mut StdRng, start: NaiveDate, end: NaiveDate) -> Vec<PriceBar> {
    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        bars.push(PriceBar::new(current, open, high, low, close));

        price = close;
        current += Duration::days(1);
    }

    bars
}

/// FNV-1a over the symbol bytes; stable across builds.
fn symbol_hash(symbol: &str) -> u64 {
    symbol.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn deterministic_per_symbol() {
        let source = SyntheticSource::new(7).with_end(date(2024, 6, 28));
        let a = source.fetch("2330", date(2024, 1, 1)).unwrap();
        let b = source.fetch("2330", date(2024, 1, 1)).unwrap();
        let c = source.fetch("2317", date(2024, 1, 1)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn skips_weekends_and_stays_sane() {
        let source = SyntheticSource::default().with_end(date(2024, 3, 31));
        let bars = source.fetch("0050", date(2024, 1, 1)).unwrap();
        assert!(bars
            .iter()
            .all(|b| !matches!(b.date.weekday(), Weekday::Sat | Weekday::Sun)));
        assert!(bars.iter().all(|b| b.is_sane()));
        assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn empty_range_is_no_data() {
        let source = SyntheticSource::default().with_end(date(2024, 1, 1));
        assert!(matches!(
            source.fetch("2330", date(2024, 2, 1)),
            Err(DataError::NoData { .. })
        ));
    }
}
