// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators shown on the
// dashboard.  Every series-producing function returns one `Option<f64>` per
// input sample: `None` marks a warm-up index (or a non-finite result) so that
// callers never render a silently-wrong zero.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ma;
pub mod power;
pub mod rsi;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AnalyzerError, Result};

/// Keep finite values only.
pub(crate) fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Time-aligned indicator columns keyed by name (`rsi`, `atr`, `sma_21`, ...).
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSeries {
    pub times: Vec<DateTime<Utc>>,
    pub columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl IndicatorSeries {
    pub fn new(times: Vec<DateTime<Utc>>) -> Self {
        Self {
            times,
            columns: BTreeMap::new(),
        }
    }

    /// Add a column; it must be aligned with `times`.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        let name = name.into();
        if values.len() != self.times.len() {
            return Err(AnalyzerError::InvalidInput(format!(
                "column '{name}' has {} values for {} timestamps",
                values.len(),
                self.times.len()
            )));
        }
        self.columns.insert(name, values);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Value of `name` at the most recent bar, if available there.
    pub fn latest(&self, name: &str) -> Option<f64> {
        self.columns.get(name)?.last().copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}
