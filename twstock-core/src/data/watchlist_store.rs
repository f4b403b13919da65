//! CSV-backed watchlist storage.
//!
//! File layout: header `Symbol,Name,Cost,Shares,Note`, one row per holding.
//! Saves are atomic (write to `.tmp`, rename into place).

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::provider::DataError;
use crate::domain::{normalize_symbol, WatchlistEntry};

#[derive(Debug, Clone)]
pub struct WatchlistStore {
    path: PathBuf,
}

impl WatchlistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries in file order. A missing file is an empty watchlist.
    pub fn load(&self) -> Result<Vec<WatchlistEntry>, DataError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DataError::io(&self.path, e)),
        };
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
        let entries = rdr
            .deserialize::<WatchlistEntry>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DataError::malformed(&self.path, e))?;
        debug!(path = %self.path.display(), entries = entries.len(), "loaded watchlist");
        Ok(entries)
    }

    /// Replace the file's contents with `entries`.
    pub fn save(&self, entries: &[WatchlistEntry]) -> Result<(), DataError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
        }

        let tmp_path = self.path.with_extension("csv.tmp");
        {
            let mut wtr = csv::Writer::from_path(&tmp_path)
                .map_err(|e| DataError::malformed(&tmp_path, e))?;
            for entry in entries {
                wtr.serialize(entry)
                    .map_err(|e| DataError::malformed(&tmp_path, e))?;
            }
            wtr.flush().map_err(|e| DataError::io(&tmp_path, e))?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::io(&self.path, e)
        })?;
        debug!(path = %self.path.display(), entries = entries.len(), "saved watchlist");
        Ok(())
    }

    /// Insert `entry`, replacing any existing row with the same symbol.
    pub fn add(&self, entry: WatchlistEntry) -> Result<Vec<WatchlistEntry>, DataError> {
        let mut entries = self.load()?;
        match entries.iter_mut().find(|e| e.symbol == entry.symbol) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        self.save(&entries)?;
        Ok(entries)
    }

    /// Remove `symbol`. Returns false if it was not on the list.
    pub fn remove(&self, symbol: &str) -> Result<bool, DataError> {
        let symbol = normalize_symbol(symbol);
        let mut entries = self.load()?;
        let before = entries.len();
        entries.retain(|e| e.symbol != symbol);
        if entries.len() == before {
            return Ok(false);
        }
        self.save(&entries)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_watchlist() {
        let dir = tempfile::tempdir().unwrap();
        let store = WatchlistStore::new(dir.path().join("watchlist.csv"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn loads_spreadsheet_export_with_short_codes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.csv");
        fs::write(
            &path,
            "Symbol,Name,Cost,Shares,Note\n50,Yuanta 50,120.5,1000,core\n2330,TSMC,550,200,\n",
        )
        .unwrap();

        let entries = WatchlistStore::new(&path).load().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].symbol, "0050");
        assert_eq!(entries[0].note, "core");
        assert_eq!(entries[1].cost, 550.0);
    }

    #[test]
    fn add_replaces_same_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let store = WatchlistStore::new(dir.path().join("w.csv"));
        store.add(WatchlistEntry::new("2330", "TSMC", 500.0, 100.0)).unwrap();
        store.add(WatchlistEntry::new("2884", "E.Sun", 25.0, 2000.0)).unwrap();
        let entries = store.add(WatchlistEntry::new("2330", "TSMC", 520.0, 150.0)).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(store.load().unwrap(), entries);
        assert_eq!(entries[0].cost, 520.0);
    }

    #[test]
    fn remove_normalizes_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let store = WatchlistStore::new(dir.path().join("w.csv"));
        store.add(WatchlistEntry::new("0050", "Yuanta 50", 120.0, 10.0)).unwrap();
        assert!(store.remove("50").unwrap());
        assert!(!store.remove("50").unwrap());
        assert!(store.load().unwrap().is_empty());
    }
}
