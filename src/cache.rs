// =============================================================================
// Cache Files: `KEY: VALUE` snapshots for the dashboard
// =============================================================================
//
// The candle-width and currency-strength panels are refreshed from small text
// files:
//
//   EURUSD: 600
//   USDJPY: 1300
//   last_updated: 2024/01/12 21:00:00
//
// Entries keep the order they were ranked in; the timestamp line is always
// last.  Writes use the same tmp + rename pattern as the runtime config.
// =============================================================================

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::info;

use crate::error::{AnalyzerError, Result};

const LAST_UPDATED_KEY: &str = "last_updated";
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Parsed cache file.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot {
    pub entries: Vec<(String, String)>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Cache text for a float score: always carries a decimal point, so whole
/// values read `10.0` and the anchor reads `0.0`.
pub fn float_value(value: f64) -> String {
    format!("{value:?}")
}

pub fn render_cache<K, V>(entries: &[(K, V)], last_updated: DateTime<Utc>) -> String
where
    K: AsRef<str>,
    V: std::fmt::Display,
{
    let mut out = String::new();
    for (key, value) in entries {
        out.push_str(&format!("{}: {}\n", key.as_ref(), value));
    }
    out.push_str(&format!(
        "{LAST_UPDATED_KEY}: {}\n",
        last_updated.format(TIMESTAMP_FORMAT)
    ));
    out
}

/// Parse the text produced by [`render_cache`].
///
/// Blank lines are ignored.  A line without a `:`, with an empty key, or a
/// `last_updated` value that is not a timestamp fails with `CacheFormat`
/// (1-based line number).
pub fn parse_cache(text: &str) -> Result<CacheSnapshot> {
    let mut snapshot = CacheSnapshot {
        entries: Vec::new(),
        last_updated: None,
    };

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let malformed = || AnalyzerError::CacheFormat {
            line: i + 1,
            content: raw.to_string(),
        };

        let (key, value) = line.split_once(':').ok_or_else(malformed)?;
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() {
            return Err(malformed());
        }

        if key == LAST_UPDATED_KEY {
            let ts = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| malformed())?;
            snapshot.last_updated = Some(ts.and_utc());
        } else {
            snapshot.entries.push((key.to_string(), value.to_string()));
        }
    }

    Ok(snapshot)
}

/// Render and atomically write a cache file.
pub fn write_cache<K, V>(path: impl AsRef<Path>, entries: &[(K, V)], last_updated: DateTime<Utc>) -> Result<()>
where
    K: AsRef<str>,
    V: std::fmt::Display,
{
    let path = path.as_ref();
    let content = render_cache(entries, last_updated);

    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;

    info!(path = %path.display(), entries = entries.len(), "cache written (atomic)");
    Ok(())
}

pub fn read_cache(path: impl AsRef<Path>) -> Result<CacheSnapshot> {
    parse_cache(&std::fs::read_to_string(path)?)
}
