// =============================================================================
// Candle Width Ranking: latest daily high-low range in points
// =============================================================================
//
//   width = |high - low| / scale
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AnalyzerError, Result};
use crate::market_data::{load_series, DataSource};
use crate::transforms::GapMetric;
use crate::types::Granularity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandleWidth {
    pub symbol: String,
    /// High-to-low range of the latest daily bar, in points.
    pub width: i64,
}

/// Symbols ranked by the point width of their most recent daily candle,
/// widest first. Equal widths keep input order.
pub fn candle_width_ranking(
    source: &dyn DataSource,
    symbols: &[String],
    reference: DateTime<Utc>,
) -> Result<Vec<CandleWidth>> {
    let mut ranking = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let series = load_series(source, symbol, Granularity::D1, reference, 1)?;
        let width = series
            .last()
            .map(|bar| GapMetric::Width.measure(bar, series.scale()))
            .ok_or_else(|| AnalyzerError::NoData {
                symbol: symbol.clone(),
            })?;
        ranking.push(CandleWidth {
            symbol: symbol.clone(),
            width,
        });
    }

    ranking.sort_by(|a, b| b.width.cmp(&a.width));
    Ok(ranking)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::market_data::bar::tests::bar_at;
    use crate::market_data::source::testing::MemorySource;

    #[test]
    fn widest_daily_candle_first() {
        let source = MemorySource::new()
            .with_bars(
                "EURUSD",
                Granularity::D1,
                vec![
                    bar_at(0, 1.1000, 1.1900, 1.0900, 1.1000),
                    bar_at(24, 1.1000, 1.1050, 1.0990, 1.1020),
                ],
            )
            .with_digits("EURUSD", 5)
            .with_bars("USDJPY", Granularity::D1, vec![bar_at(24, 150.0, 151.2, 149.9, 151.0)])
            .with_digits("USDJPY", 3);

        let symbols = vec!["EURUSD".to_string(), "USDJPY".to_string()];
        let reference = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let ranking = candle_width_ranking(&source, &symbols, reference).unwrap();

        assert_eq!(
            ranking,
            vec![
                CandleWidth { symbol: "USDJPY".into(), width: 1300 },
                CandleWidth { symbol: "EURUSD".into(), width: 600 },
            ]
        );
    }
}
