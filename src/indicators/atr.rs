// =============================================================================
// Average True Range (ATR): Wilder's Smoothing Method
// =============================================================================
//
// True Range (TR) for each bar:
//   TR_0 = H - L                         (no previous close yet)
//   TR_t = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the Wilder-smoothed average of TR:
//   ATR_{period-1} = SMA of the first `period` TR values
//   ATR_t          = (ATR_{t-1} * (period - 1) + TR_t) / period
//
// Default period: 50 (the dashboard's 4H volatility panel).
// =============================================================================

use crate::market_data::Bar;

use super::ma::smma;

pub const DEFAULT_PERIOD: usize = 50;

/// True range of every bar, aligned to `bars`.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let hl = bar.high - bar.low;
            match i.checked_sub(1).map(|p| bars[p].close) {
                Some(prev_close) => hl
                    .max((bar.high - prev_close).abs())
                    .max((bar.low - prev_close).abs()),
                None => hl,
            }
        })
        .collect()
}

/// ATR series aligned to `bars`; the first `period - 1` entries are `None`.
pub fn atr(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    smma(&true_range(bars), period)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::bar::tests::bar_at;

    #[test]
    fn atr_period_zero() {
        let bars = vec![bar_at(0, 100.0, 105.0, 95.0, 102.0); 1];
        assert!(atr(&bars, 0).iter().all(Option::is_none));
    }

    #[test]
    fn atr_insufficient_data() {
        let bars: Vec<Bar> = (0..10).map(|i| bar_at(i, 100.0, 105.0, 95.0, 102.0)).collect();
        let out = atr(&bars, 14);
        assert_eq!(out.len(), 10);
        assert!(out.iter().all(Option::is_none));
    }

    #[test]
    fn atr_constant_range() {
        let bars: Vec<Bar> = (0..30)
            .map(|i| {
                let base = 100.0 + i as f64 * 0.1;
                bar_at(i, base, base + 5.0, base - 5.0, base)
            })
            .collect();
        let out = atr(&bars, 14);
        assert_eq!(out[12], None);
        let last = out[29].unwrap();
        assert!((last - 10.0).abs() < 1.0, "expected ATR near 10.0, got {last}");
    }

    #[test]
    fn true_range_uses_prev_close() {
        let bars = vec![
            bar_at(0, 100.0, 105.0, 95.0, 95.0),   // close at low
            bar_at(1, 110.0, 115.0, 108.0, 112.0), // gap up: |115-95| = 20 > 7
        ];
        let tr = true_range(&bars);
        assert_eq!(tr, vec![10.0, 20.0]);
    }

    #[test]
    fn atr_exact_minimum_data() {
        let bars = vec![
            bar_at(0, 100.0, 102.0, 98.0, 101.0),
            bar_at(1, 101.0, 104.0, 99.0, 103.0),
            bar_at(2, 103.0, 106.0, 100.0, 105.0),
        ];
        // TR = [4, 5, 6] => seed 5
        let out = atr(&bars, 3);
        assert_eq!(out, vec![None, None, Some(5.0)]);
    }
}
