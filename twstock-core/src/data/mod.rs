//! Data collaborators: price sources, canonicalization, caching, market
//! reference book and watchlist storage.
//!
//! Everything here runs before or around the core; the engine and classifier
//! never touch files, clocks or caches.

pub mod cache;
pub mod canonicalize;
pub mod csv_source;
pub mod provider;
pub mod reference;
pub mod synthetic;
pub mod watchlist_store;

pub use cache::{CachedSource, Clock, ManualClock, SystemClock, TtlCache, HISTORY_TTL, REFERENCE_TTL};
pub use canonicalize::{canonicalize, canonicalize_with_report, CanonicalReport};
pub use csv_source::CsvDirSource;
pub use provider::{DataError, DataSource, PriceSource};
pub use reference::{ReferenceBook, ReferenceEntry, ReferenceStore, NO_VALUATION};
pub use synthetic::SyntheticSource;
pub use watchlist_store::WatchlistStore;
