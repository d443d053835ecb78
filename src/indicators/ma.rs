// =============================================================================
// Moving Averages: Simple, Smoothed (Wilder) and Exponential
// =============================================================================
//
//   SMA_t  = mean(x_{t-period+1} .. x_t)
//   SMMA   = SMA at index period-1, then
//            SMMA_t = (SMMA_{t-1} * (period - 1) + x_t) / period
//   EMA    = SMA at index period-1, then
//            EMA_t  = x_t * k + EMA_{t-1} * (1 - k),  k = 2 / (period + 1)
//
// The dashboard's `sma_21` / `sma_50` / `sma_200` overlays are SMMA lines;
// the suffix is a role label, the period is configurable.
// =============================================================================

use super::finite;

/// Simple moving average aligned to `values`.
///
/// Indices before `period - 1` are `None`.  `period == 0` or fewer than
/// `period` values yields an all-`None` vector.
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let period_f = period as f64;
    for (i, window) in values.windows(period).enumerate() {
        out[i + period - 1] = finite(window.iter().sum::<f64>() / period_f);
    }
    out
}

/// Smoothed (Wilder) moving average aligned to `values`.
pub fn smma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    recursive_average(values, period, |prev, x, period_f| {
        (prev * (period_f - 1.0) + x) / period_f
    })
}

/// Exponential moving average aligned to `values`.
pub fn ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let multiplier = 2.0 / (period as f64 + 1.0);
    recursive_average(values, period, move |prev, x, _| {
        x * multiplier + prev * (1.0 - multiplier)
    })
}

/// SMA-seeded recursive average shared by SMMA and EMA.
///
/// Once a non-finite value appears the remainder of the series is `None`.
fn recursive_average<F>(values: &[f64], period: usize, step: F) -> Vec<Option<f64>>
where
    F: Fn(f64, f64, f64) -> f64,
{
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let period_f = period as f64;
    let seed = values[..period].iter().sum::<f64>() / period_f;
    let Some(mut prev) = finite(seed) else {
        return out;
    };
    out[period - 1] = Some(prev);

    for (i, &x) in values.iter().enumerate().skip(period) {
        match finite(step(prev, x, period_f)) {
            Some(v) => {
                out[i] = Some(v);
                prev = v;
            }
            None => break,
        }
    }
    out
}
