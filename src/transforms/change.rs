// =============================================================================
// Percentage Change
// =============================================================================
//
//   change_t     = (C_t - O_t) / O_t * 100
//   cumulative_t = change_0 + ... + change_t
//
// A zero open makes the ratio undefined and is reported, not papered over.
// =============================================================================

use crate::error::{AnalyzerError, Result};
use crate::market_data::{Bar, Series};

/// Intra-bar change of `bar` in percent. `index` is only used for the error.
pub fn percentage_change(bar: &Bar, index: usize) -> Result<f64> {
    if bar.open == 0.0 {
        return Err(AnalyzerError::ZeroOpenPrice { index });
    }
    Ok((bar.close - bar.open) / bar.open * 100.0)
}

pub fn percentage_changes(series: &Series) -> Result<Vec<f64>> {
    series
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| percentage_change(bar, i))
        .collect()
}

/// Running sum of the per-bar changes over the supplied window.
pub fn cumulative_percentage_change(series: &Series) -> Result<Vec<f64>> {
    let mut total = 0.0;
    Ok(percentage_changes(series)?
        .into_iter()
        .map(|c| {
            total += c;
            total
        })
        .collect())
}
