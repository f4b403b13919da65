//! twstock core: indicator engine, strategy classifier, data collaborators.
//!
//! - `engine::compute` turns a daily price series into an enriched series
//!   (SMA 20/60, lower Bollinger band, RSI 14, MACD 12/26/9).
//! - `strategy::classify` maps the latest enriched row to one label from a
//!   fixed decision table.
//! - `data` holds everything with side effects: price sources, the TTL cache,
//!   the market reference book and the watchlist file.
//!
//! The engine and classifier are pure functions of their input.

pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod strategy;

pub use engine::{compute, compute_with, try_compute, EngineError, IndicatorSettings};
pub use strategy::{classify, classify_with, RulePreset, RuleSet, StrategyLabel, StrategySignal};
