use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::Result;
use crate::market_data::{Bar, Series};
use crate::types::{Granularity, Tick, TradeAction};

/// Broker-terminal boundary consumed by the analytics.
///
/// Implementations are synchronous and may block; the API layer calls them
/// from `spawn_blocking`. Handles are passed explicitly, so any number of
/// independent sources can coexist (tests, replays, live terminals).
pub trait DataSource: Send + Sync {
    /// The `count` most recent bars with `time <= reference`, oldest first.
    ///
    /// Fails with `NoData` for an unknown symbol or when nothing is available.
    fn fetch_bars(
        &self,
        symbol: &str,
        granularity: Granularity,
        reference: DateTime<Utc>,
        count: usize,
    ) -> Result<Vec<Bar>>;

    fn fetch_last_tick(&self, symbol: &str) -> Result<Tick>;

    /// Number of decimal digits the broker quotes `symbol` with.
    fn fetch_symbol_precision(&self, symbol: &str) -> Result<u32>;

    /// Margin the broker would require for the hypothetical order.
    fn fetch_margin_estimate(
        &self,
        action: TradeAction,
        lot_size: f64,
        symbol: &str,
        price: f64,
    ) -> Result<f64>;

    /// Every symbol the source knows about.
    fn symbols(&self) -> Result<Vec<String>>;
}

/// Fetch and validate `count` bars of `symbol`.
///
/// Broker digits are used for the scale when the source reports them; a
/// precision failure falls back to the symbol heuristic instead of failing
/// the whole request.
pub fn load_series(
    source: &dyn DataSource,
    symbol: &str,
    granularity: Granularity,
    reference: DateTime<Utc>,
    count: usize,
) -> Result<Series> {
    let bars = source.fetch_bars(symbol, granularity, reference, count)?;
    let digits = match source.fetch_symbol_precision(symbol) {
        Ok(d) => Some(d),
        Err(e) => {
            debug!(symbol, error = %e, "precision unavailable, using symbol heuristic");
            None
        }
    };
    Series::normalize(symbol, granularity, bars, digits)
}


#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::testing::MemorySource;
    use super::*;
    use crate::market_data::bar::tests::bars_from_closes;

    fn far_future() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn load_series_uses_broker_digits() {
        let source = MemorySource::new()
            .with_bars("USDJPY", Granularity::H4, bars_from_closes(&[150.0, 150.5]))
            .with_digits("USDJPY", 2);
        let series = load_series(&source, "USDJPY", Granularity::H4, far_future(), 10).unwrap();
        assert!((series.scale().value() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn load_series_falls_back_to_heuristic() {
        let source =
            MemorySource::new().with_bars("USDJPY", Granularity::H4, bars_from_closes(&[150.0, 150.5]));
        let series = load_series(&source, "USDJPY", Granularity::H4, far_future(), 10).unwrap();
        assert!((series.scale().value() - 0.001).abs() < 1e-12);
    }

    #[test]
    fn load_series_takes_most_recent_bars() {
        let source =
            MemorySource::new().with_bars("EURUSD", Granularity::H1, bars_from_closes(&[1.0, 1.1, 1.2, 1.3]));
        let series = load_series(&source, "EURUSD", Granularity::H1, far_future(), 2).unwrap();
        assert_eq!(series.closes(), vec![1.2, 1.3]);
    }
}
