// =============================================================================
// Heiken-Ashi Candles
// =============================================================================
//
//   HA_close_t = (O_t + H_t + L_t + C_t) / 4
//   HA_open_t  = (HA_open_{t-1} + HA_close_{t-1}) / 2      (HA_open_0 = O_0)
//   HA_high_t  = max(H_t, HA_open_t, HA_close_t)
//   HA_low_t   = min(L_t, HA_open_t, HA_close_t)
//
// Bar 0 only seeds the recursion and is not emitted, so the output holds
// `n - 1` candles.
// =============================================================================

use crate::market_data::{Bar, Series};

/// Smoothed candles for `series`; empty when it has fewer than two bars.
pub fn heiken_ashi(series: &Series) -> Vec<Bar> {
    heiken_ashi_bars(series.bars())
}

pub(crate) fn heiken_ashi_bars(bars: &[Bar]) -> Vec<Bar> {
    let Some(first) = bars.first() else {
        return Vec::new();
    };

    let mut prev_open = first.open;
    let mut prev_close = first.ohlc_average();
    let mut out = Vec::with_capacity(bars.len().saturating_sub(1));

    for bar in &bars[1..] {
        let open = (prev_open + prev_close) / 2.0;
        let close = bar.ohlc_average();
        out.push(Bar {
            open,
            close,
            high: bar.high.max(open).max(close),
            low: bar.low.min(open).min(close),
            ..*bar
        });
        prev_open = open;
        prev_close = close;
    }

    out
}
