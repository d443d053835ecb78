// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), a top band (SMA + k*σ) and
// a bottom band (SMA - k*σ), where σ is the POPULATION standard deviation of
// the same window (divide by `period`, not `period - 1`).
// =============================================================================

use serde::Serialize;

use super::{finite, ma::sma};

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_DEVIATION: f64 = 2.0;

/// Three aligned band series.
#[derive(Debug, Clone, Serialize)]
pub struct BollingerBands {
    pub top: Vec<Option<f64>>,
    pub mid: Vec<Option<f64>>,
    pub bottom: Vec<Option<f64>>,
}

/// Calculate Bollinger Bands over `values`.
///
/// - `top`    = SMA + `deviation` * σ
/// - `mid`    = SMA
/// - `bottom` = SMA - `deviation` * σ
///
/// Indices without a full window are `None` in all three bands.
pub fn bollinger(values: &[f64], period: usize, deviation: f64) -> BollingerBands {
    let mid = sma(values, period);
    let mut top = vec![None; values.len()];
    let mut bottom = vec![None; values.len()];

    for (i, m) in mid.iter().enumerate() {
        let Some(m) = *m else { continue };
        let window = &values[i + 1 - period..=i];
        let variance = window.iter().map(|x| (x - m).powi(2)).sum::<f64>() / period as f64;
        let std_dev = variance.sqrt();
        top[i] = finite(m + deviation * std_dev);
        bottom[i] = finite(m - deviation * std_dev);
    }

    BollingerBands { top, mid, bottom }
}
