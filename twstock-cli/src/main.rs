//! twstock CLI: watchlist diagnosis, portfolio cards, valuation screen.
//!
//! Commands:
//! - `diagnose <symbol>`: strategy signal and latest indicators for one stock
//! - `portfolio`: one card per watchlist entry: close, P/L %, strategy label
//! - `screen`: reference-book entries under PE / PB ceilings
//! - `search <query>`: symbol picker lookup over the reference book
//! - `watchlist list|add|remove`: edit the watchlist file

mod export;

use anyhow::{bail, Context, Result};
use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::prelude::*;

use twstock_core::config::Settings;
use twstock_core::data::{
    CachedSource, CsvDirSource, PriceSource, ReferenceBook, ReferenceStore, SyntheticSource,
    WatchlistStore,
};
use twstock_core::domain::{normalize_symbol, EnrichedBar, WatchlistEntry};
use twstock_core::engine::compute_with;
use twstock_core::strategy::{classify_with, RulePreset, RuleSet, StrategyLabel};

#[derive(Parser)]
#[command(
    name = "twstock",
    about = "twstock: Taiwan stock watchlist dashboard"
)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides the config file).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use synthetic random-walk prices instead of the CSV price files.
    #[arg(long, global = true, default_value_t = false)]
    synthetic: bool,

    /// Rule preset: canonical, band_touch, confirmed_rebound (overrides the config file).
    #[arg(long, global = true)]
    rules: Option<RulePreset>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Strategy signal and latest indicator values for one symbol.
    Diagnose {
        /// Stock code (e.g., 2330). Short numeric codes are zero-padded.
        symbol: String,

        /// Write the full enriched series to this CSV file.
        #[arg(long)]
        export: Option<PathBuf>,

        /// Print the diagnosis as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// One card per watchlist entry: close, unrealized P/L %, strategy label.
    Portfolio,
    /// List reference-book entries with 0 < PE <= --pe and 0 < PB <= --pb.
    Screen {
        /// PE ceiling.
        #[arg(long, default_value_t = 15.0)]
        pe: f64,

        /// PB ceiling.
        #[arg(long, default_value_t = 1.2)]
        pb: f64,

        /// Maximum number of results to print.
        #[arg(long, default_value_t = 30)]
        limit: usize,
    },
    /// Find symbols whose "code name (industry)" label contains the query.
    Search {
        query: String,
    },
    /// Watchlist management commands.
    Watchlist {
        #[command(subcommand)]
        action: WatchlistAction,
    },
}

#[derive(Subcommand)]
enum WatchlistAction {
    /// Print the watchlist.
    List,
    /// Add a holding, replacing any existing row for the same symbol.
    Add {
        symbol: String,

        /// Display name. Defaults to the reference-book name.
        #[arg(long)]
        name: Option<String>,

        /// Cost basis per share.
        #[arg(long, default_value_t = 0.0)]
        cost: f64,

        /// Number of shares held.
        #[arg(long, default_value_t = 0.0)]
        shares: f64,

        #[arg(long, default_value = "")]
        note: String,
    },
    /// Remove a holding.
    Remove { symbol: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(dir) = &cli.data_dir {
        settings.data.dir = dir.clone();
    }
    if let Some(preset) = cli.rules {
        settings.preset = preset;
        settings.rules = None;
    }
    settings.validate().context("invalid settings")?;
    debug!(?settings, "effective settings");

    let app = App::new(settings, cli.synthetic);

    match cli.command {
        Commands::Diagnose {
            symbol,
            export,
            json,
        } => app.diagnose(&symbol, export.as_deref(), json),
        Commands::Portfolio => app.portfolio(),
        Commands::Screen { pe, pb, limit } => app.screen(pe, pb, limit),
        Commands::Search { query } => app.search(&query),
        Commands::Watchlist { action } => match action {
            WatchlistAction::List => app.watchlist_list(),
            WatchlistAction::Add {
                symbol,
                name,
                cost,
                shares,
                note,
            } => app.watchlist_add(&symbol, name, cost, shares, note),
            WatchlistAction::Remove { symbol } => app.watchlist_remove(&symbol),
        },
    }
}

/// Log to stderr; `-v` raises the level for this workspace's crates only.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(
            tracing_subscriber::filter::Targets::new()
                .with_target("twstock_core", level)
                .with_target("twstock", level)
                .with_default(tracing::Level::WARN),
        );
    tracing_subscriber::registry().with(fmt_layer).init();
}

struct App {
    settings: Settings,
    rules: RuleSet,
    prices: CachedSource<Box<dyn PriceSource>>,
    reference: ReferenceStore,
    watchlist: WatchlistStore,
}

/// What one watchlist card shows.
struct Card {
    entry: WatchlistEntry,
    outcome: Result<(f64, StrategyLabel)>,
}

impl App {
    fn new(settings: Settings, synthetic: bool) -> Self {
        let source: Box<dyn PriceSource> = if synthetic {
            Box::new(SyntheticSource::default())
        } else {
            Box::new(CsvDirSource::new(settings.data.prices_dir()))
        };
        info!(source = source.name(), "price source selected");

        Self {
            rules: settings.rule_set(),
            prices: CachedSource::new(source, settings.cache.history_ttl()),
            reference: ReferenceStore::with_ttl(
                settings.data.reference_path(),
                settings.cache.reference_ttl(),
            ),
            watchlist: WatchlistStore::new(settings.data.watchlist_path()),
            settings,
        }
    }

    fn history_start(&self) -> NaiveDate {
        Local::now().date_naive() - Duration::days(i64::from(self.settings.history_days))
    }

    fn enriched(&self, symbol: &str) -> Result<Vec<EnrichedBar>> {
        let bars = self
            .prices
            .fetch(symbol, self.history_start())
            .with_context(|| format!("no price history for {symbol}"))?;
        Ok(compute_with(&bars, &self.settings.indicators))
    }

    /// Reference book, or `None` (with a warning) if it cannot be read.
    fn reference_book(&self) -> Option<std::sync::Arc<ReferenceBook>> {
        match self.reference.book() {
            Ok(book) => Some(book),
            Err(e) => {
                warn!(error = %e, "reference book unavailable");
                None
            }
        }
    }

    fn diagnose(&self, symbol: &str, export_path: Option<&Path>, json: bool) -> Result<()> {
        let symbol = normalize_symbol(symbol);
        let rows = self.enriched(&symbol)?;
        let signal = classify_with(&rows, &self.rules);
        let latest = rows.last();
        let also_matched = match rows.as_slice() {
            [.., previous, last] if rows.len() >= self.rules.min_bars => {
                self.rules.matching(last, Some(previous))
            }
            _ => Vec::new(),
        };

        let book = self.reference_book();
        let name = book
            .as_ref()
            .and_then(|b| b.get(&symbol))
            .map(|e| e.name.clone());

        if let Some(path) = export_path {
            let csv = export::export_enriched_csv(&rows)?;
            std::fs::write(path, csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), rows = rows.len(), "exported enriched series");
        }

        if json {
            let value =
                export::diagnosis_json(&symbol, name.as_deref(), &signal, &also_matched, latest);
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(());
        }

        println!("{} {}", symbol, name.as_deref().unwrap_or(""));
        println!("Signal: {} [{}]", signal.label.title(), signal.color);
        println!("  {}", signal.advisory);
        if also_matched.len() > 1 {
            let others: Vec<&str> = also_matched[1..].iter().map(|l| l.title()).collect();
            println!("  (also matched: {})", others.join(", "));
        }

        if let Some(row) = latest {
            println!();
            println!("As of {} ({} sessions)", row.date(), rows.len());
            print_metric("Close", Some(row.close()));
            print_metric("SMA short", row.sma_short);
            print_metric("SMA long", row.sma_long);
            print_metric("Lower band", row.lower_band);
            print_metric("RSI", row.rsi);
            print_metric("MACD", row.macd_line);
            print_metric("Signal", row.signal_line);
            print_metric("Histogram", row.histogram);
        }
        if let Some(path) = export_path {
            println!();
            println!("Enriched series saved to: {}", path.display());
        }

        Ok(())
    }

    fn portfolio(&self) -> Result<()> {
        let entries = self.watchlist.load()?;
        if entries.is_empty() {
            println!(
                "Watchlist is empty: {} (add one with `twstock watchlist add <symbol>`)",
                self.watchlist.path().display()
            );
            return Ok(());
        }
        info!(entries = entries.len(), "classifying watchlist");

        let cards: Vec<Card> = entries
            .into_par_iter()
            .map(|entry| {
                let outcome = self.enriched(&entry.symbol).and_then(|rows| {
                    let close = rows
                        .last()
                        .map(EnrichedBar::close)
                        .context("empty price history")?;
                    Ok((close, classify_with(&rows, &self.rules).label))
                });
                if let Err(e) = &outcome {
                    warn!(symbol = %entry.symbol, error = %e, "portfolio card without data");
                }
                Card { entry, outcome }
            })
            .collect();

        println!(
            "{:<6} {:<16} {:>10} {:>9}  {}",
            "Symbol", "Name", "Close", "P/L %", "Signal"
        );
        println!("{}", "-".repeat(72));
        let mut market_value = 0.0;
        for card in &cards {
            match &card.outcome {
                Ok((close, label)) => {
                    market_value += card.entry.market_value(*close);
                    println!(
                        "{:<6} {:<16} {:>10.2} {:>+8.2}%  {} [{}]",
                        card.entry.symbol,
                        card.entry.name,
                        close,
                        card.entry.unrealized_pct(*close),
                        label.title(),
                        label.color()
                    );
                }
                Err(_) => println!(
                    "{:<6} {:<16} {:>10} {:>9}  data unavailable",
                    card.entry.symbol, card.entry.name, "-", "-"
                ),
            }
        }
        println!();
        println!("Market value: {market_value:.0}");

        Ok(())
    }

    fn screen(&self, pe_max: f64, pb_max: f64, limit: usize) -> Result<()> {
        let book = self.reference.book().with_context(|| {
            format!(
                "failed to load reference book {}",
                self.reference.path().display()
            )
        })?;
        let hits = book.screen(pe_max, pb_max);
        if hits.is_empty() {
            println!("No stocks with 0 < PE <= {pe_max} and 0 < PB <= {pb_max}.");
            return Ok(());
        }

        println!("Matches: {} (showing up to {limit})", hits.len());
        println!();
        println!(
            "{:<6} {:<16} {:<20} {:>7} {:>6} {:>7}",
            "Code", "Name", "Industry", "PE", "PB", "Yield"
        );
        println!("{}", "-".repeat(67));
        for e in hits.iter().take(limit) {
            println!(
                "{:<6} {:<16} {:<20} {:>7.1} {:>6.2} {:>6.2}%",
                e.code, e.name, e.industry, e.pe, e.pb, e.dividend_yield
            );
        }

        Ok(())
    }

    fn search(&self, query: &str) -> Result<()> {
        let book = self.reference.book().context("failed to load reference book")?;
        let query = query.to_lowercase();
        let matches: Vec<String> = book
            .search_options()
            .into_iter()
            .filter(|label| label.to_lowercase().contains(&query))
            .collect();
        if matches.is_empty() {
            println!("No symbols match '{query}'.");
        }
        for label in matches {
            println!("{label}");
        }
        Ok(())
    }

    fn watchlist_list(&self) -> Result<()> {
        let entries = self.watchlist.load()?;
        if entries.is_empty() {
            println!("Watchlist is empty: {}", self.watchlist.path().display());
            return Ok(());
        }
        println!(
            "{:<6} {:<16} {:>10} {:>10}  {}",
            "Symbol", "Name", "Cost", "Shares", "Note"
        );
        println!("{}", "-".repeat(60));
        for e in &entries {
            println!(
                "{:<6} {:<16} {:>10.2} {:>10.0}  {}",
                e.symbol, e.name, e.cost, e.shares, e.note
            );
        }
        Ok(())
    }

    fn watchlist_add(
        &self,
        symbol: &str,
        name: Option<String>,
        cost: f64,
        shares: f64,
        note: String,
    ) -> Result<()> {
        if cost < 0.0 || shares < 0.0 {
            bail!("cost and shares must be non-negative");
        }
        let symbol = normalize_symbol(symbol);
        let name = match name {
            Some(name) => name,
            None => self
                .reference_book()
                .and_then(|b| b.get(&symbol).map(|e| e.name.clone()))
                .unwrap_or_default(),
        };

        let mut entry = WatchlistEntry::new(&symbol, name, cost, shares);
        entry.note = note;
        let entries = self.watchlist.add(entry)?;
        println!(
            "Saved {symbol} to {} ({} entries)",
            self.watchlist.path().display(),
            entries.len()
        );
        Ok(())
    }

    fn watchlist_remove(&self, symbol: &str) -> Result<()> {
        if self.watchlist.remove(symbol)? {
            println!("Removed {} from the watchlist", normalize_symbol(symbol));
        } else {
            println!("{} is not on the watchlist", normalize_symbol(symbol));
        }
        Ok(())
    }
}

fn print_metric(label: &str, value: Option<f64>) {
    match value {
        Some(v) => println!("  {label:<12} {v:>12.2}"),
        None => println!("  {label:<12} {:>12}", "n/a"),
    }
}
