// =============================================================================
// Close-Price Correlation Matrix
// =============================================================================
//
// Pearson correlation of closing prices for every pair of symbols:
//
//   r(x, y) = Σ (x - x̄)(y - ȳ) / sqrt(Σ (x - x̄)² · Σ (y - ȳ)²)
//
// Series of different lengths are compared over their most recent common
// tail.  Cells are rounded to three decimals; a pair with fewer than two
// points or a constant series has no defined correlation and yields `None`.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use super::strength::round3;
use crate::error::{AnalyzerError, Result};
use crate::market_data::{load_series, DataSource};
use crate::types::Granularity;

pub const DEFAULT_LOOKBACK: usize = 180;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub symbols: Vec<String>,
    /// Row-major, `values[i][j]` correlates `symbols[i]` with `symbols[j]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        self.values[i][j]
    }
}

/// Correlation matrix of named close columns.
///
/// # Errors
/// `InsufficientSymbols` when fewer than two columns are given.
pub fn correlation_matrix(columns: &[(String, Vec<f64>)]) -> Result<CorrelationMatrix> {
    if columns.len() < 2 {
        return Err(AnalyzerError::InsufficientSymbols {
            required: 2,
            got: columns.len(),
        });
    }

    let shortest = columns.iter().map(|(_, c)| c.len()).min().unwrap_or(0);
    let longest = columns.iter().map(|(_, c)| c.len()).max().unwrap_or(0);
    if shortest != longest {
        warn!(
            shortest,
            longest,
            "close series differ in length, aligning on the most recent common tail"
        );
    }
    let tails: Vec<&[f64]> = columns
        .iter()
        .map(|(_, c)| &c[c.len() - shortest..])
        .collect();

    let n = columns.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = Some(1.0);
        for j in i + 1..n {
            let r = pearson(tails[i], tails[j]).map(round3);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        symbols: columns.iter().map(|(s, _)| s.clone()).collect(),
        values,
    })
}

/// Fetch `lookback` H4 closes per symbol and correlate them.
///
/// Unlike the strength table, a symbol that cannot be fetched fails the whole
/// matrix.
pub fn currency_correlations(
    source: &dyn DataSource,
    symbols: &[String],
    reference: DateTime<Utc>,
    lookback: usize,
) -> Result<CorrelationMatrix> {
    if symbols.len() < 2 {
        return Err(AnalyzerError::InsufficientSymbols {
            required: 2,
            got: symbols.len(),
        });
    }

    let columns = symbols
        .iter()
        .map(|symbol| {
            let series = load_series(source, symbol, Granularity::H4, reference, lookback)?;
            Ok((symbol.clone(), series.closes()))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(symbols = symbols.len(), lookback, "correlating close series");
    correlation_matrix(&columns)
}

fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let n_f = n as f64;
    let mean_x = x.iter().sum::<f64>() / n_f;
    let mean_y = y.iter().sum::<f64>() / n_f;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    let r = cov / (var_x * var_y).sqrt();
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}
