// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. Compute +DM (positive directional movement) and -DM per bar.
//   2. Compute True Range (TR) per bar.
//   3. Wilder-sum +DM, -DM and TR over bars 1..=period, then
//        S_t = S_{t-1} - S_{t-1} / period + x_t
//   4. +DI = S(+DM) / S(TR) * 100,  -DI = S(-DM) / S(TR) * 100
//   5. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   6. ADX = mean of the first `period` DX values, then Wilder-smoothed.
//
// Alignment: DI and DX start at bar `period`; ADX starts at bar
// `2 * period - 1`.  Zero denominators yield 0 rather than NaN.
// =============================================================================

use serde::Serialize;

use crate::market_data::Bar;

use super::finite;

pub const DEFAULT_PERIOD: usize = 14;

/// ADX together with the directional indicators it is built from.
#[derive(Debug, Clone, Serialize)]
pub struct AdxSeries {
    pub adx: Vec<Option<f64>>,
    pub plus_di: Vec<Option<f64>>,
    pub minus_di: Vec<Option<f64>>,
}

/// Compute the ADX series aligned to `bars`.
///
/// Returns all-`None` columns when `period` is zero; DI columns need at least
/// `period + 1` bars and the ADX column at least `2 * period` bars.
pub fn adx(bars: &[Bar], period: usize) -> AdxSeries {
    let n = bars.len();
    let mut out = AdxSeries {
        adx: vec![None; n],
        plus_di: vec![None; n],
        minus_di: vec![None; n],
    };
    if period == 0 || n < period + 1 {
        return out;
    }

    let period_f = period as f64;

    // ------------------------------------------------------------------
    // Step 1 & 2: Raw +DM, -DM, and True Range (index 0 unused)
    // ------------------------------------------------------------------
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    let mut tr_vals = vec![0.0; n];

    for i in 1..n {
        let (cur, prev) = (&bars[i], &bars[i - 1]);

        tr_vals[i] = (cur.high - cur.low)
            .max((cur.high - prev.close).abs())
            .max((cur.low - prev.close).abs());

        let up_move = cur.high - prev.high;
        let down_move = prev.low - cur.low;

        if up_move > down_move && up_move > 0.0 {
            plus_dm[i] = up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dm[i] = down_move;
        }
    }

    // ------------------------------------------------------------------
    // Step 3-5: Wilder sums, DI and DX from bar `period` onwards
    // ------------------------------------------------------------------
    let mut smooth_plus_dm: f64 = plus_dm[1..=period].iter().sum();
    let mut smooth_minus_dm: f64 = minus_dm[1..=period].iter().sum();
    let mut smooth_tr: f64 = tr_vals[1..=period].iter().sum();

    let mut dx_values: Vec<f64> = Vec::with_capacity(n - period);

    for i in period..n {
        if i > period {
            smooth_plus_dm = smooth_plus_dm - smooth_plus_dm / period_f + plus_dm[i];
            smooth_minus_dm = smooth_minus_dm - smooth_minus_dm / period_f + minus_dm[i];
            smooth_tr = smooth_tr - smooth_tr / period_f + tr_vals[i];
        }

        let (plus_di, minus_di) = directional_indicators(smooth_plus_dm, smooth_minus_dm, smooth_tr);
        let (Some(plus_di), Some(minus_di)) = (finite(plus_di), finite(minus_di)) else {
            return out;
        };
        out.plus_di[i] = Some(plus_di);
        out.minus_di[i] = Some(minus_di);
        dx_values.push(compute_dx(plus_di, minus_di));
    }

    // ------------------------------------------------------------------
    // Step 6: ADX = Wilder's smoothed average of DX
    // ------------------------------------------------------------------
    if dx_values.len() < period {
        return out;
    }

    let first_adx = 2 * period - 1;
    let Some(mut adx) = finite(dx_values[..period].iter().sum::<f64>() / period_f) else {
        return out;
    };
    out.adx[first_adx] = Some(adx);

    for (offset, &dx) in dx_values.iter().enumerate().skip(period) {
        match finite((adx * (period_f - 1.0) + dx) / period_f) {
            Some(v) => {
                adx = v;
                out.adx[period + offset] = Some(v);
            }
            None => break,
        }
    }

    out
}

// =============================================================================
// Internal helpers
// =============================================================================

/// +DI / -DI from the smoothed sums; a zero true range means no movement.
fn directional_indicators(smooth_plus_dm: f64, smooth_minus_dm: f64, smooth_tr: f64) -> (f64, f64) {
    if smooth_tr == 0.0 {
        return (0.0, 0.0);
    }
    (
        (smooth_plus_dm / smooth_tr) * 100.0,
        (smooth_minus_dm / smooth_tr) * 100.0,
    )
}

/// DX from +DI / -DI; both zero means no directional movement.
fn compute_dx(plus_di: f64, minus_di: f64) -> f64 {
    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return 0.0;
    }
    ((plus_di - minus_di).abs() / di_sum) * 100.0
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::bar::tests::bar_at;

    fn trending(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                bar_at(i as i64, base, base + 1.5, base - 0.5, base + 1.0)
            })
            .collect()
    }

    #[test]
    fn adx_period_zero() {
        let out = adx(&trending(50), 0);
        assert!(out.adx.iter().all(Option::is_none));
    }

    #[test]
    fn adx_insufficient_data() {
        let out = adx(&trending(10), 14);
        assert_eq!(out.adx.len(), 10);
        assert!(out.adx.iter().all(Option::is_none));
        assert!(out.plus_di.iter().all(Option::is_none));
    }

    #[test]
    fn adx_alignment() {
        let period = 5;
        let out = adx(&trending(2 * period), period);
        assert_eq!(out.plus_di[period - 1], None);
        assert!(out.plus_di[period].is_some());
        assert_eq!(out.adx[2 * period - 2], None);
        assert!(out.adx[2 * period - 1].is_some());

        // One bar fewer => no ADX at all.
        let short = adx(&trending(2 * period - 1), period);
        assert!(short.adx.iter().all(Option::is_none));
    }

    #[test]
    fn adx_strong_uptrend() {
        let out = adx(&trending(60), 14);
        let value = out.adx[59].unwrap();
        assert!(value > 25.0, "expected ADX > 25 for strong trend, got {value}");
        assert!(out.plus_di[59].unwrap() > out.minus_di[59].unwrap());
    }

    #[test]
    fn adx_flat_market_is_zero() {
        let bars: Vec<Bar> = (0..60).map(|i| bar_at(i, 100.0, 101.0, 99.0, 100.0)).collect();
        let out = adx(&bars, 14);
        assert_eq!(out.adx[59], Some(0.0));
    }

    #[test]
    fn adx_zero_range_market_is_zero() {
        let bars: Vec<Bar> = (0..40).map(|i| bar_at(i, 1.0, 1.0, 1.0, 1.0)).collect();
        let out = adx(&bars, 14);
        assert_eq!(out.plus_di[20], Some(0.0));
        assert_eq!(out.adx[39], Some(0.0));
    }

    #[test]
    fn adx_result_range() {
        let bars: Vec<Bar> = (0..100)
            .map(|i| {
                let base = 50.0 + (i as f64 * 0.3).sin() * 10.0;
                bar_at(i, base - 0.5, base + 1.0, base - 1.0, base + 0.5)
            })
            .collect();
        for value in adx(&bars, 14).adx.into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value), "ADX {value} out of [0,100] range");
        }
    }
}
