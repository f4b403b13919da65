//! TOML configuration for the dashboard.
//!
//! Every field is optional in the file; omitted values take the defaults
//! (canonical indicator windows and rule thresholds, 10-minute history cache,
//! one-hour reference cache, one year of history).
//!
//! ```toml
//! history_days = 365
//! preset = "band_touch"
//!
//! [indicators]
//! sma_long = 60
//!
//! [rules]          # overrides the preset entirely when present
//! overheated_rsi = 80.0
//!
//! [cache]
//! history_ttl_secs = 600
//!
//! [data]
//! dir = "data"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::engine::{IndicatorSettings, SettingsError};
use crate::strategy::{RuleError, RulePreset, RuleSet};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid [indicators]: {0}")]
    Indicators(#[from] SettingsError),

    #[error("invalid rules: {0}")]
    Rules(#[from] RuleError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Cache lifetimes, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub history_ttl_secs: u64,
    pub reference_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            history_ttl_secs: 600,
            reference_ttl_secs: 3600,
        }
    }
}

impl CacheSettings {
    pub fn history_ttl(&self) -> Duration {
        Duration::from_secs(self.history_ttl_secs)
    }

    pub fn reference_ttl(&self) -> Duration {
        Duration::from_secs(self.reference_ttl_secs)
    }
}

/// File locations under a single data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub dir: PathBuf,
    pub reference_file: String,
    pub watchlist_file: String,
    pub prices_subdir: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            reference_file: "reference.csv".into(),
            watchlist_file: "watchlist.csv".into(),
            prices_subdir: "prices".into(),
        }
    }
}

impl DataSettings {
    pub fn reference_path(&self) -> PathBuf {
        self.dir.join(&self.reference_file)
    }

    pub fn watchlist_path(&self) -> PathBuf {
        self.dir.join(&self.watchlist_file)
    }

    /// Directory holding `{symbol}.csv` price files.
    pub fn prices_dir(&self) -> PathBuf {
        self.dir.join(&self.prices_subdir)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Calendar days of price history to request.
    pub history_days: u32,
    /// Named rule set used when no `[rules]` table is given.
    pub preset: RulePreset,
    /// Explicit thresholds; missing fields default to the canonical set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<RuleSet>,
    pub indicators: IndicatorSettings,
    pub cache: CacheSettings,
    pub data: DataSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_days: 365,
            preset: RulePreset::Canonical,
            rules: None,
            indicators: IndicatorSettings::default(),
            cache: CacheSettings::default(),
            data: DataSettings::default(),
        }
    }
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Thresholds in effect: the `[rules]` table if present, else the preset.
    pub fn rule_set(&self) -> RuleSet {
        self.rules.clone().unwrap_or_else(|| self.preset.rules())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.indicators.check()?;
        self.rule_set().check()?;
        if self.history_days == 0 {
            return Err(ConfigError::Invalid("history_days must be >= 1".into()));
        }
        Ok(())
    }
}
