//! Domain types for the watchlist dashboard

pub mod bar;
pub mod enriched;
pub mod watchlist;

pub use bar::PriceBar;
pub use enriched::{defined, EnrichedBar};
pub use watchlist::{normalize_symbol, WatchlistEntry};

/// Symbol type alias
pub type Symbol = String;
