// =============================================================================
// Bulls Power / Bears Power (Elder)
// =============================================================================
//
//   Bulls Power_t = High_t - EMA(close, period)_t
//   Bears Power_t = Low_t  - EMA(close, period)_t
//
// Default period: 13.
// =============================================================================

use serde::Serialize;

use crate::market_data::Bar;

use super::{finite, ma::ema};

pub const DEFAULT_PERIOD: usize = 13;

#[derive(Debug, Clone, Serialize)]
pub struct PowerSeries {
    pub bulls: Vec<Option<f64>>,
    pub bears: Vec<Option<f64>>,
}

pub fn bulls_bears_power(bars: &[Bar], period: usize) -> PowerSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let average = ema(&closes, period);

    let (bulls, bears): (Vec<_>, Vec<_>) = bars
        .iter()
        .zip(&average)
        .map(|(bar, avg)| match avg {
            Some(a) => (finite(bar.high - a), finite(bar.low - a)),
            None => (None, None),
        })
        .unzip();

    PowerSeries { bulls, bears }
}
