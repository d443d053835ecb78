// =============================================================================
// CSV-directory Data Source
// =============================================================================
//
// Replays terminal exports from disk.  Layout:
//
//   <dir>/symbols.json          [{ "symbol": "EURUSD", "digits": 5,
//                                  "contract_size": 100000, "leverage": 100 }]
//   <dir>/<SYMBOL>_<GRAN>.csv   time,open,high,low,close,tick_volume,spread,real_volume
//
// `time` is unix seconds (server clock).  `spread` and `real_volume` may be
// left empty.
// =============================================================================

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{AnalyzerError, Result};
use crate::market_data::{Bar, DataSource, Scale};
use crate::types::{Granularity, Tick, TradeAction};

fn default_contract_size() -> f64 {
    100_000.0
}

fn default_leverage() -> f64 {
    100.0
}

/// Static instrument properties normally reported by the terminal.
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolSpec {
    pub symbol: String,
    pub digits: u32,
    #[serde(default = "default_contract_size")]
    pub contract_size: f64,
    #[serde(default = "default_leverage")]
    pub leverage: f64,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    tick_volume: u64,
    #[serde(default)]
    spread: Option<i64>,
    #[serde(default)]
    real_volume: Option<u64>,
}

/// File-backed [`DataSource`].
pub struct CsvDataSource {
    dir: PathBuf,
    specs: Vec<SymbolSpec>,
}

impl CsvDataSource {
    /// Open a data directory and read its `symbols.json`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let content = std::fs::read_to_string(dir.join("symbols.json"))?;
        let specs: Vec<SymbolSpec> = serde_json::from_str(&content)?;
        debug!(dir = %dir.display(), symbols = specs.len(), "csv data source opened");
        Ok(Self { dir, specs })
    }

    fn spec(&self, symbol: &str) -> Result<&SymbolSpec> {
        self.specs
            .iter()
            .find(|s| s.symbol == symbol)
            .ok_or_else(|| AnalyzerError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "symbol not listed in symbols.json".to_string(),
            })
    }

    fn series_path(&self, symbol: &str, granularity: Granularity) -> PathBuf {
        self.dir.join(format!("{symbol}_{}.csv", granularity.label()))
    }

    /// Load every bar of one series file, in file order.
    fn load(&self, symbol: &str, granularity: Granularity) -> Result<Vec<Bar>> {
        let path = self.series_path(symbol, granularity);
        if !path.exists() {
            return Err(AnalyzerError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&path)?;

        let mut bars = Vec::new();
        for (idx, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row?;
            let time = DateTime::<Utc>::from_timestamp(row.time, 0).ok_or_else(|| {
                AnalyzerError::InvalidInput(format!(
                    "{}: timestamp {} out of range on data row {}",
                    path.display(),
                    row.time,
                    idx + 1
                ))
            })?;
            bars.push(Bar {
                time,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                tick_volume: row.tick_volume,
                spread: row.spread,
                real_volume: row.real_volume,
            });
        }

        debug!(path = %path.display(), rows = bars.len(), "series file loaded");
        Ok(bars)
    }
}

impl DataSource for CsvDataSource {
    fn fetch_bars(
        &self,
        symbol: &str,
        granularity: Granularity,
        reference: DateTime<Utc>,
        count: usize,
    ) -> Result<Vec<Bar>> {
        let mut bars = self.load(symbol, granularity)?;
        bars.retain(|b| b.time <= reference);
        let start = bars.len().saturating_sub(count);
        let bars = bars.split_off(start);
        if bars.is_empty() {
            return Err(AnalyzerError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }

    fn fetch_last_tick(&self, symbol: &str) -> Result<Tick> {
        let spec = self.spec(symbol)?;
        let scale = Scale::resolve(symbol, Some(spec.digits));

        // Finest granularity on disk carries the freshest quote.
        let granularity = Granularity::all()
            .iter()
            .copied()
            .find(|g| self.series_path(symbol, *g).exists())
            .ok_or_else(|| AnalyzerError::NoData {
                symbol: symbol.to_string(),
            })?;

        let bars = self.load(symbol, granularity)?;
        let last = bars.last().ok_or_else(|| AnalyzerError::NoData {
            symbol: symbol.to_string(),
        })?;
        let spread = last.spread.unwrap_or(0) as f64 * scale.value();

        Ok(Tick {
            time: last.time,
            bid: last.close,
            ask: last.close + spread,
        })
    }

    fn fetch_symbol_precision(&self, symbol: &str) -> Result<u32> {
        Ok(self.spec(symbol)?.digits)
    }

    fn fetch_margin_estimate(
        &self,
        _action: TradeAction,
        lot_size: f64,
        symbol: &str,
        price: f64,
    ) -> Result<f64> {
        let spec = self.spec(symbol)?;
        if spec.leverage <= 0.0 {
            return Err(AnalyzerError::InvalidInput(format!(
                "leverage for {symbol} must be positive"
            )));
        }
        Ok(lot_size * spec.contract_size * price / spec.leverage)
    }

    fn symbols(&self) -> Result<Vec<String>> {
        Ok(self.specs.iter().map(|s| s.symbol.clone()).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SYMBOLS_JSON: &str = r#"[
        { "symbol": "EURUSD", "digits": 5 },
        { "symbol": "USDJPY", "digits": 3, "contract_size": 100000, "leverage": 50 }
    ]"#;

    const EURUSD_H1: &str = "time,open,high,low,close,tick_volume,spread,real_volume
1704067200,1.1000,1.1050,1.0990,1.1020,1200,12,
1704070800,1.1020,1.1040,1.1010,1.1030,900,10,
1704074400,1.1030,1.1060,1.1025,1.1055,1500,8,
";

    fn fixture() -> (tempfile::TempDir, CsvDataSource) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("symbols.json"), SYMBOLS_JSON).unwrap();
        std::fs::write(dir.path().join("EURUSD_H1.csv"), EURUSD_H1).unwrap();
        let source = CsvDataSource::open(dir.path()).unwrap();
        (dir, source)
    }

    #[test]
    fn fetch_returns_most_recent_bars_oldest_first() {
        let (_dir, source) = fixture();
        let bars = source
            .fetch_bars("EURUSD", Granularity::H1, Utc::now(), 2)
            .unwrap();
        assert_eq!(bars.len(), 2);
        assert!((bars[0].close - 1.1030).abs() < 1e-12);
        assert!((bars[1].close - 1.1055).abs() < 1e-12);
        assert_eq!(bars[1].spread, Some(8));
        assert_eq!(bars[1].real_volume, None);
    }

    #[test]
    fn fetch_respects_reference_time() {
        let (_dir, source) = fixture();
        let reference = Utc.timestamp_opt(1704070800, 0).unwrap();
        let bars = source
            .fetch_bars("EURUSD", Granularity::H1, reference, 10)
            .unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars.last().unwrap().time, reference);
    }

    #[test]
    fn missing_series_file_is_no_data() {
        let (_dir, source) = fixture();
        let err = source
            .fetch_bars("EURUSD", Granularity::D1, Utc::now(), 5)
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::NoData { .. }));
    }

    #[test]
    fn reference_before_history_is_no_data() {
        let (_dir, source) = fixture();
        let reference = Utc.timestamp_opt(1_600_000_000, 0).unwrap();
        assert!(source
            .fetch_bars("EURUSD", Granularity::H1, reference, 5)
            .is_err());
    }

    #[test]
    fn last_tick_adds_spread_to_ask() {
        let (_dir, source) = fixture();
        let tick = source.fetch_last_tick("EURUSD").unwrap();
        assert!((tick.bid - 1.1055).abs() < 1e-12);
        // 8 points of spread at 5 digits
        assert!((tick.ask - 1.10558).abs() < 1e-9);
    }

    #[test]
    fn precision_and_margin_come_from_specs() {
        let (_dir, source) = fixture();
        assert_eq!(source.fetch_symbol_precision("USDJPY").unwrap(), 3);
        let margin = source
            .fetch_margin_estimate(TradeAction::Buy, 0.1, "USDJPY", 150.0)
            .unwrap();
        // 0.1 lot * 100k * 150 / 50
        assert!((margin - 30_000.0).abs() < 1e-6);
        assert!(source.fetch_symbol_precision("GBPUSD").is_err());
    }

    #[test]
    fn symbols_keep_listing_order() {
        let (_dir, source) = fixture();
        assert_eq!(source.symbols().unwrap(), vec!["EURUSD", "USDJPY"]);
    }
}
