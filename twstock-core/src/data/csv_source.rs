//! CSV directory source: one `{dir}/{symbol}.csv` file per instrument.
//!
//! Expected columns are `date,open,high,low,close`. The vendor export names
//! high/low `max`/`min`; both spellings are accepted, and extra columns
//! (volume, turnover, stock id) are ignored.

use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::canonicalize::canonicalize;
use super::provider::{DataError, DataSource, PriceSource};
use crate::domain::PriceBar;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High", alias = "max")]
    high: f64,
    #[serde(alias = "Low", alias = "min")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
}

impl From<CsvRow> for PriceBar {
    fn from(row: CsvRow) -> Self {
        PriceBar::new(row.date, row.open, row.high, row.low, row.close)
    }
}

/// Reads daily bars from a directory of per-symbol CSV files.
#[derive(Debug, Clone)]
pub struct CsvDirSource {
    dir: PathBuf,
}

impl CsvDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `symbol`'s history.
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl PriceSource for CsvDirSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn kind(&self) -> DataSource {
        DataSource::CsvImport
    }

    fn fetch(&self, symbol: &str, start: NaiveDate) -> Result<Vec<PriceBar>, DataError> {
        let path = self.path_for(symbol);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
            }
            Err(e) => return Err(DataError::io(&path, e)),
        };

        let bars: Vec<PriceBar> = read_bars(file, &path)?
            .into_iter()
            .filter(|b| b.date >= start)
            .collect();
        let bars = canonicalize(bars);
        debug!(symbol, path = %path.display(), bars = bars.len(), "loaded price file");

        if bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
                start,
            });
        }
        Ok(bars)
    }
}

/// Parse every row of a price CSV. `path` is used for error messages only.
pub fn read_bars<R: Read>(reader: R, path: &Path) -> Result<Vec<PriceBar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    rdr.deserialize::<CsvRow>()
        .map(|row| {
            row.map(PriceBar::from)
                .map_err(|e| DataError::malformed(path, e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_vendor_column_names() {
        let data = "date,stock_id,open,max,min,close,Trading_Volume\n\
                    2024-01-02,2330,590,593,589,593,1000\n\
                    2024-01-03,2330,584,585,576,578,2000\n";
        let bars = read_bars(data.as_bytes(), Path::new("2330.csv")).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].high, 593.0);
        assert_eq!(bars[1].low, 576.0);
    }

    #[test]
    fn reads_capitalized_headers() {
        let data = "Date,Open,High,Low,Close\n2024-01-02,10,11,9,10.5\n";
        let bars = read_bars(data.as_bytes(), Path::new("x.csv")).unwrap();
        assert_eq!(bars[0].close, 10.5);
    }

    #[test]
    fn bad_row_is_malformed() {
        let data = "date,open,high,low,close\n2024-01-02,10,11,9,oops\n";
        let err = read_bars(data.as_bytes(), Path::new("x.csv")).unwrap_err();
        assert!(matches!(err, DataError::Malformed { .. }));
    }

    #[test]
    fn missing_file_is_symbol_not_found() {
        let source = CsvDirSource::new("/nonexistent/price/dir");
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(
            source.fetch("2330", start),
            Err(DataError::SymbolNotFound { .. })
        ));
    }
}
