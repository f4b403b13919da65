//! Market reference book: code → name, industry, valuation metrics.
//!
//! Loaded from a CSV export with columns `code,name,industry,pe,pb,dividend_yield`.
//! Only four-character codes (ordinary listed shares) are kept. A missing or
//! unparsable PE/PB becomes `NO_VALUATION`, which fails any ordinary screen;
//! a missing dividend yield becomes 0.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::cache::{Clock, TtlCache, REFERENCE_TTL};
use super::provider::DataError;

/// Sentinel for a missing PE or PB.
pub const NO_VALUATION: f64 = 999.0;

/// One listed company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub code: String,
    pub name: String,
    pub industry: String,
    pub pe: f64,
    pub pb: f64,
    pub dividend_yield: f64,
}

impl ReferenceEntry {
    /// `"code name (industry)"`, the form used by the symbol picker.
    pub fn search_label(&self) -> String {
        format!("{} {} ({})", self.code, self.name, self.industry)
    }

    /// `0 < pe <= pe_max` and `0 < pb <= pb_max`.
    pub fn passes_screen(&self, pe_max: f64, pb_max: f64) -> bool {
        self.pe > 0.0 && self.pe <= pe_max && self.pb > 0.0 && self.pb <= pb_max
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(alias = "stock_id")]
    code: String,
    #[serde(default, alias = "stock_name")]
    name: String,
    #[serde(default, alias = "industry_category")]
    industry: String,
    #[serde(default, alias = "PE")]
    pe: Option<String>,
    #[serde(default, alias = "PB", alias = "PBR")]
    pb: Option<String>,
    #[serde(default)]
    dividend_yield: Option<String>,
}

impl RawEntry {
    fn into_entry(self) -> ReferenceEntry {
        ReferenceEntry {
            code: self.code.trim().to_string(),
            name: self.name.trim().to_string(),
            industry: self.industry.trim().to_string(),
            pe: parse_metric(self.pe.as_deref()).unwrap_or(NO_VALUATION),
            pb: parse_metric(self.pb.as_deref()).unwrap_or(NO_VALUATION),
            dividend_yield: parse_metric(self.dividend_yield.as_deref()).unwrap_or(0.0),
        }
    }
}

fn parse_metric(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Reference entries keyed by code, iterated in code order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceBook {
    entries: BTreeMap<String, ReferenceEntry>,
}

impl ReferenceBook {
    /// Build from entries; later duplicates of a code replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = ReferenceEntry>) -> Self {
        let mut book = Self::default();
        for entry in entries {
            if entry.code.chars().count() == 4 {
                book.entries.insert(entry.code.clone(), entry);
            }
        }
        book
    }

    pub fn from_reader<R: Read>(reader: R, path: &Path) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let raw = rdr
            .deserialize::<RawEntry>()
            .map(|row| {
                row.map(RawEntry::into_entry)
                    .map_err(|e| DataError::malformed(path, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let total = raw.len();
        let book = Self::from_entries(raw);
        debug!(path = %path.display(), rows = total, kept = book.len(), "loaded reference book");
        Ok(book)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| DataError::io(path, e))?;
        Self::from_reader(file, path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&ReferenceEntry> {
        self.entries.get(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceEntry> {
        self.entries.values()
    }

    /// Entries with `0 < pe <= pe_max` and `0 < pb <= pb_max`, in code order.
    pub fn screen(&self, pe_max: f64, pb_max: f64) -> Vec<&ReferenceEntry> {
        self.iter()
            .filter(|e| e.passes_screen(pe_max, pb_max))
            .collect()
    }

    /// Sorted `"code name (industry)"` strings.
    pub fn search_options(&self) -> Vec<String> {
        let mut options: Vec<String> = self.iter().map(ReferenceEntry::search_label).collect();
        options.sort();
        options
    }
}

/// Reference book file behind a TTL cache (one hour by default).
pub struct ReferenceStore {
    path: PathBuf,
    cache: TtlCache<(), Arc<ReferenceBook>>,
}

impl ReferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_ttl(path, REFERENCE_TTL)
    }

    pub fn with_ttl(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            cache: TtlCache::new(ttl),
        }
    }

    pub fn with_clock(path: impl Into<PathBuf>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            cache: TtlCache::with_clock(ttl, clock),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current book, reloading the file once the cached copy has expired.
    pub fn book(&self) -> Result<Arc<ReferenceBook>, DataError> {
        self.cache
            .get_or_try_insert_with((), || ReferenceBook::load(&self.path).map(Arc::new))
    }
}
