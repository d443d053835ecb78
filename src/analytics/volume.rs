// =============================================================================
// Volume Ranking: latest weekly tick volume per symbol
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AnalyzerError, Result};
use crate::market_data::DataSource;
use crate::types::Granularity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeEntry {
    pub symbol: String,
    pub tick_volume: u64,
}

/// Symbols ranked by the tick volume of their latest weekly bar, busiest
/// first. Equal volumes keep input order; a repeated symbol keeps its best
/// rank only.
pub fn volume_ranking(
    source: &dyn DataSource,
    symbols: &[String],
    reference: DateTime<Utc>,
) -> Result<Vec<VolumeEntry>> {
    let mut ranking = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let bars = source.fetch_bars(symbol, Granularity::W1, reference, 1)?;
        let tick_volume = bars
            .last()
            .map(|b| b.tick_volume)
            .ok_or_else(|| AnalyzerError::NoData {
                symbol: symbol.clone(),
            })?;
        ranking.push(VolumeEntry {
            symbol: symbol.clone(),
            tick_volume,
        });
    }

    ranking.sort_by(|a, b| b.tick_volume.cmp(&a.tick_volume));

    let mut seen = std::collections::HashSet::new();
    ranking.retain(|e| seen.insert(e.symbol.clone()));
    Ok(ranking)
}
