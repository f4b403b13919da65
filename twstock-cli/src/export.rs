//! Export formats for the `diagnose` command.
//!
//! - **CSV**: the full enriched series, one row per session, undefined fields
//!   left empty
//! - **JSON**: signal plus the latest enriched row

use anyhow::{Context, Result};
use serde_json::{json, Value};
use twstock_core::domain::EnrichedBar;
use twstock_core::strategy::{StrategyLabel, StrategySignal};

const CSV_HEADER: [&str; 12] = [
    "date",
    "open",
    "high",
    "low",
    "close",
    "sma_short",
    "sma_long",
    "lower_band",
    "rsi",
    "macd_line",
    "signal_line",
    "histogram",
];

fn opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

/// Enriched series as CSV text.
pub fn export_enriched_csv(rows: &[EnrichedBar]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;

    for r in rows {
        wtr.write_record([
            r.date().to_string(),
            format!("{:.6}", r.bar.open),
            format!("{:.6}", r.bar.high),
            format!("{:.6}", r.bar.low),
            format!("{:.6}", r.bar.close),
            opt(r.sma_short),
            opt(r.sma_long),
            opt(r.lower_band),
            opt(r.rsi),
            opt(r.macd_line),
            opt(r.signal_line),
            opt(r.histogram),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

/// Diagnosis as a JSON document.
pub fn diagnosis_json(
    symbol: &str,
    name: Option<&str>,
    signal: &StrategySignal,
    also_matched: &[StrategyLabel],
    latest: Option<&EnrichedBar>,
) -> Value {
    json!({
        "symbol": symbol,
        "name": name,
        "signal": signal,
        "title": signal.label.title(),
        "also_matched": also_matched,
        "latest": latest,
    })
}
