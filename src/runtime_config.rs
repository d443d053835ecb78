// =============================================================================
// Runtime Configuration: dashboard settings with atomic save
// =============================================================================
//
// Every tunable of the analyzer lives here: where the bar files are, which
// symbols the dashboard tracks, the broker clock offset and the indicator
// periods.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::IndicatorParams;
use crate::analytics::{correlation, strength};
use crate::risk::DEFAULT_STOP_OUT_LEVEL;
use crate::types::Granularity;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_symbols() -> Vec<String> {
    [
        "EURUSD", "GBPUSD", "USDCHF", "AUDUSD", "NZDUSD", "USDCAD", "USDJPY", "EURJPY", "GBPJPY",
        "AUDJPY", "NZDJPY", "CADJPY", "CHFJPY", "XAUUSD",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_server_utc_offset_hours() -> i64 {
    3
}

fn default_analysis_bar_count() -> usize {
    300
}

fn default_strength_anchor() -> String {
    strength::DEFAULT_ANCHOR.to_string()
}

fn default_strength_lookback() -> usize {
    strength::DEFAULT_LOOKBACK
}

fn default_correlation_lookback() -> usize {
    correlation::DEFAULT_LOOKBACK
}

fn default_stop_out_level() -> f64 {
    DEFAULT_STOP_OUT_LEVEL
}

fn default_width_cache_path() -> PathBuf {
    PathBuf::from("candle_widths.txt")
}

fn default_strength_cache_path() -> PathBuf {
    PathBuf::from("currency_strength.txt")
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration for the analyzer.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Data source & server -----------------------------------------------

    /// Directory holding `symbols.json` and the `<SYMBOL>_<GRANULARITY>.csv`
    /// bar files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Symbols shown on the dashboard.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Broker server clock offset from UTC; bar timestamps are server time.
    #[serde(default = "default_server_utc_offset_hours")]
    pub server_utc_offset_hours: i64,

    // --- Symbol analysis ----------------------------------------------------

    #[serde(default)]
    pub analysis_granularity: Granularity,

    /// Bars fetched per analysis request when the caller gives no count.
    #[serde(default = "default_analysis_bar_count")]
    pub analysis_bar_count: usize,

    #[serde(default)]
    pub indicators: IndicatorParams,

    // --- Cross-symbol analytics ---------------------------------------------

    /// Quote currency of the strength basket; scored at 0.0.
    #[serde(default = "default_strength_anchor")]
    pub strength_anchor: String,

    /// Weekly bars per strength score.
    #[serde(default = "default_strength_lookback")]
    pub strength_lookback: usize,

    /// H4 bars per correlation column.
    #[serde(default = "default_correlation_lookback")]
    pub correlation_lookback: usize,

    // --- Risk ----------------------------------------------------------------

    /// Margin level (fraction) at which the broker force-closes positions.
    #[serde(default = "default_stop_out_level")]
    pub stop_out_level: f64,

    // --- Caches --------------------------------------------------------------

    #[serde(default = "default_width_cache_path")]
    pub width_cache_path: PathBuf,

    #[serde(default = "default_strength_cache_path")]
    pub strength_cache_path: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            bind_addr: default_bind_addr(),
            symbols: default_symbols(),
            server_utc_offset_hours: default_server_utc_offset_hours(),
            analysis_granularity: Granularity::default(),
            analysis_bar_count: default_analysis_bar_count(),
            indicators: IndicatorParams::default(),
            strength_anchor: default_strength_anchor(),
            strength_lookback: default_strength_lookback(),
            correlation_lookback: default_correlation_lookback(),
            stop_out_level: default_stop_out_level(),
            width_cache_path: default_width_cache_path(),
            strength_cache_path: default_strength_cache_path(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = config.symbols.len(),
            data_dir = %config.data_dir.display(),
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Boot-time configuration: the file at `path` (defaults when it cannot be
    /// read) with `FX_ANALYZER_*` overrides from `lookup` applied on top.
    ///
    /// Nothing is written back; overrides only live for this process.
    pub fn load_or_default<F>(path: impl AsRef<Path>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::load(path).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            Self::default()
        });
        config.apply_overrides(lookup);
        config
    }

    /// Apply `FX_ANALYZER_*` overrides from `lookup` (normally `std::env::var`).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("FX_ANALYZER_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(addr) = lookup("FX_ANALYZER_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(syms) = lookup("FX_ANALYZER_SYMBOLS") {
            self.symbols = syms
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if self.symbols.is_empty() {
            self.symbols = default_symbols();
        }
    }

    /// Current time on the broker server clock, used as the `reference` for
    /// every fetch.
    pub fn reference_time(&self) -> DateTime<Utc> {
        Utc::now() + Duration::hours(self.server_utc_offset_hours)
    }
}
