//! Watchlist entries: the user's tracked holdings.
//!
//! Only the presentation layer reads cost and share counts. The engine and
//! classifier need nothing but the symbol.

use serde::{Deserialize, Deserializer, Serialize};

/// One tracked holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    #[serde(rename = "Symbol", deserialize_with = "deserialize_symbol")]
    pub symbol: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Cost", default)]
    pub cost: f64,
    #[serde(rename = "Shares", default)]
    pub shares: f64,
    #[serde(rename = "Note", default)]
    pub note: String,
}

impl WatchlistEntry {
    pub fn new(symbol: &str, name: impl Into<String>, cost: f64, shares: f64) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            name: name.into(),
            cost,
            shares,
            note: String::new(),
        }
    }

    /// Unrealized gain in percent against the cost basis. Zero when there is
    /// no positive cost basis to compare against.
    pub fn unrealized_pct(&self, close: f64) -> f64 {
        if self.cost > 0.0 {
            (close - self.cost) / self.cost * 100.0
        } else {
            0.0
        }
    }

    /// Market value of the position at `close`.
    pub fn market_value(&self, close: f64) -> f64 {
        close * self.shares
    }
}

/// Left-pad numeric Taiwan stock codes to four digits ("50" → "0050").
///
/// Spreadsheet exports routinely drop the leading zeros of ETF codes.
pub fn normalize_symbol(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && trimmed.len() < 4 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        format!("{trimmed:0>4}")
    } else {
        trimmed.to_string()
    }
}

fn deserialize_symbol<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(normalize_symbol(&raw))
}
