//! Price source trait and structured error types.
//!
//! `PriceSource` abstracts over where daily bars come from (a directory of CSV
//! exports, a synthetic random walk) so the CLI can swap implementations and
//! tests can mock them. The cache layer wraps this trait; sources don't know
//! about the cache.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::PriceBar;

/// Structured error types for data operations.
///
/// Displayable as-is on a CLI card or log line.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no price data for '{symbol}' since {start}")]
    NoData { symbol: String, start: NaiveDate },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV {}: {message}", path.display())]
    Malformed { path: PathBuf, message: String },

    #[error("validation error: {0}")]
    ValidationError(String),
}

impl DataError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Where a price series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    CsvImport,
    Synthetic,
}

/// Trait for daily price sources.
pub trait PriceSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Provenance tag for bars returned by this source.
    fn kind(&self) -> DataSource;

    /// Daily bars for `symbol` dated on or after `start`, canonical order
    /// (strictly increasing dates, sane prices).
    fn fetch(&self, symbol: &str, start: NaiveDate) -> Result<Vec<PriceBar>, DataError>;
}

impl<S: PriceSource + ?Sized> PriceSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn kind(&self) -> DataSource {
        (**self).kind()
    }

    fn fetch(&self, symbol: &str, start: NaiveDate) -> Result<Vec<PriceBar>, DataError> {
        (**self).fetch(symbol, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_path_and_symbol() {
        let err = DataError::malformed("/tmp/2330.csv", "line 3: bad date");
        assert_eq!(err.to_string(), "malformed CSV /tmp/2330.csv: line 3: bad date");

        let err = DataError::SymbolNotFound {
            symbol: "9999".into(),
        };
        assert_eq!(err.to_string(), "symbol not found: 9999");
    }
}
