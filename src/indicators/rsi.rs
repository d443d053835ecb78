// =============================================================================
// Relative Strength Index (RSI): Wilder's Smoothing
// =============================================================================
//
// Step 1: Compute price changes (deltas) from consecutive closes.
// Step 2: Seed average gain / average loss with the SMA of the first `period`
//         gains / losses.
// Step 3: Apply Wilder's exponential smoothing:
//           avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//           avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 4: RS  = avg_gain / avg_loss
//         RSI = 100 - 100 / (1 + RS)
//
// Division guard: avg_loss == 0 => RSI = 100 (this includes a perfectly flat
// window).
// =============================================================================

pub const DEFAULT_PERIOD: usize = 14;

/// Compute the RSI series for `closes`, aligned to the input.
///
/// The first `period` entries are `None` (the first `period` deltas seed the
/// averages, so the first value sits at index `period`).
///
/// # Edge cases
/// - `period == 0` or `closes.len() < period + 1` => all `None`.
/// - Non-finite results end the series; the remainder stays `None`.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return out;
    }

    // --- Compute price deltas ------------------------------------------------
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    // --- Seed averages with SMA of first `period` deltas ---------------------
    let (sum_gain, sum_loss) = deltas[..period].iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
        if d > 0.0 {
            (g + d, l)
        } else {
            (g, l - d)
        }
    });

    let period_f = period as f64;
    let mut avg_gain = sum_gain / period_f;
    let mut avg_loss = sum_loss / period_f;

    match rsi_from_averages(avg_gain, avg_loss) {
        Some(v) => out[period] = Some(v),
        None => return out,
    }

    // --- Wilder's smoothing for subsequent values ----------------------------
    // deltas[i - 1] is the change into close i.
    for i in period + 1..closes.len() {
        let delta = deltas[i - 1];
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);

        avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;

        match rsi_from_averages(avg_gain, avg_loss) {
            Some(v) => out[i] = Some(v),
            None => break,
        }
    }

    out
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if !avg_gain.is_finite() || !avg_loss.is_finite() {
        return None;
    }
    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    let value = 100.0 - 100.0 / (1.0 + rs);
    value.is_finite().then(|| value.clamp(0.0, 100.0))
}
