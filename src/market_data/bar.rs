use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnalyzerError, Result};
use crate::types::Granularity;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV bar as delivered by the broker terminal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub tick_volume: u64,
    #[serde(default)]
    pub spread: Option<i64>,
    #[serde(default)]
    pub real_volume: Option<u64>,
}

impl Bar {
    /// `low <= min(open, close) <= max(open, close) <= high` with every price
    /// finite.
    pub fn is_well_formed(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return false;
        }
        self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high
    }

    /// Typical four-price average `(o + h + l + c) / 4`.
    pub fn ohlc_average(&self) -> f64 {
        (self.open + self.high + self.low + self.close) / 4.0
    }
}

/// Point value of an instrument (`10^-digits`). Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Scale(f64);

impl Scale {
    /// Largest digit count accepted from a broker.
    pub const MAX_DIGITS: u32 = 10;

    /// Scale from the broker-reported number of quoted decimal digits, or
    /// `None` when `digits` exceeds [`Scale::MAX_DIGITS`].
    pub fn from_digits(digits: u32) -> Option<Self> {
        if digits > Self::MAX_DIGITS {
            return None;
        }
        Some(Self(10f64.powi(-(digits as i32))))
    }

    /// Heuristic used when the broker cannot report precision: gold is quoted
    /// to 2 decimals, JPY crosses to 3, everything else to 5.
    pub fn fallback_for(symbol: &str) -> Self {
        let upper = symbol.to_ascii_uppercase();
        if upper.contains("XAU") {
            Self(1e-2)
        } else if upper.contains("JPY") {
            Self(1e-3)
        } else {
            Self(1e-5)
        }
    }

    /// Broker digits when usable, the symbol heuristic otherwise.
    pub fn resolve(symbol: &str, digits: Option<u32>) -> Self {
        match digits.map(|d| (d, Self::from_digits(d))) {
            Some((_, Some(scale))) => scale,
            Some((d, None)) => {
                debug!(symbol, digits = d, "implausible broker digits, using symbol heuristic");
                Self::fallback_for(symbol)
            }
            None => Self::fallback_for(symbol),
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Signed number of points between two prices: `round((b - a) / scale)`.
    pub fn points(&self, a: f64, b: f64) -> i64 {
        ((b - a) / self.0).round() as i64
    }
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// Validated, chronologically ordered bars for one (symbol, granularity).
#[derive(Debug, Clone, Serialize)]
pub struct Series {
    symbol: String,
    granularity: Granularity,
    scale: Scale,
    bars: Vec<Bar>,
}

impl Series {
    /// Validate raw bars from the data source and tag them with the
    /// instrument scale.
    ///
    /// Fails with:
    /// - `NoData` when `bars` is empty.
    /// - `MalformedBar` when a bar has non-finite prices or breaks the OHLC
    ///   ordering invariant.
    /// - `DataOrder` when timestamps are not strictly ascending.
    pub fn normalize(
        symbol: &str,
        granularity: Granularity,
        bars: Vec<Bar>,
        digits: Option<u32>,
    ) -> Result<Self> {
        if bars.is_empty() {
            return Err(AnalyzerError::NoData {
                symbol: symbol.to_string(),
            });
        }

        if let Some(index) = bars.iter().position(|b| !b.is_well_formed()) {
            return Err(AnalyzerError::MalformedBar {
                symbol: symbol.to_string(),
                index,
            });
        }

        if let Some(pos) = bars.windows(2).position(|w| w[1].time <= w[0].time) {
            return Err(AnalyzerError::DataOrder {
                symbol: symbol.to_string(),
                index: pos + 1,
            });
        }

        let scale = Scale::resolve(symbol, digits);
        debug!(
            symbol,
            granularity = %granularity,
            bars = bars.len(),
            scale = scale.value(),
            "series normalised"
        );

        Ok(Self {
            symbol: symbol.to_string(),
            granularity,
            scale,
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a normalised series; kept for slice-like ergonomics.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn times(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|b| b.time).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Build a bar `hours` hours after a fixed Monday midnight.
    pub(crate) fn bar_at(hours: i64, open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            time: Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap()
                + chrono::Duration::hours(hours),
            open,
            high,
            low,
            close,
            tick_volume: 100,
            spread: None,
            real_volume: None,
        }
    }

    /// Bars whose close walks through `closes`, with a small range around it.
    pub(crate) fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| bar_at(i as i64, c, c + 0.0005, c - 0.0005, c))
            .collect()
    }

    pub(crate) fn series_from_closes(closes: &[f64]) -> Series {
        Series::normalize("EURUSD", Granularity::H1, bars_from_closes(closes), Some(5)).unwrap()
    }

    #[test]
    fn normalize_rejects_empty_input() {
        let err = Series::normalize("EURUSD", Granularity::H1, Vec::new(), None).unwrap_err();
        assert!(matches!(err, AnalyzerError::NoData { ref symbol } if symbol == "EURUSD"));
    }

    #[test]
    fn normalize_rejects_descending_times() {
        let bars = vec![
            bar_at(2, 1.1, 1.2, 1.0, 1.1),
            bar_at(1, 1.1, 1.2, 1.0, 1.1),
        ];
        let err = Series::normalize("EURUSD", Granularity::H1, bars, None).unwrap_err();
        assert!(matches!(err, AnalyzerError::DataOrder { index: 1, .. }));
    }

    #[test]
    fn normalize_rejects_duplicate_times() {
        let bars = vec![
            bar_at(1, 1.1, 1.2, 1.0, 1.1),
            bar_at(1, 1.1, 1.2, 1.0, 1.1),
        ];
        assert!(Series::normalize("EURUSD", Granularity::H1, bars, None).is_err());
    }

    #[test]
    fn normalize_rejects_inverted_range() {
        let bars = vec![
            bar_at(0, 1.1, 1.2, 1.0, 1.1),
            bar_at(1, 1.1, 1.05, 1.0, 1.1), // close above high
        ];
        let err = Series::normalize("EURUSD", Granularity::H1, bars, None).unwrap_err();
        assert!(matches!(err, AnalyzerError::MalformedBar { index: 1, .. }));
    }

    #[test]
    fn normalize_rejects_nan_price() {
        let bars = vec![bar_at(0, f64::NAN, 1.2, 1.0, 1.1)];
        assert!(Series::normalize("EURUSD", Granularity::H1, bars, None).is_err());
    }

    #[test]
    fn weekend_gap_is_not_an_error() {
        let bars = vec![
            bar_at(0, 1.1, 1.2, 1.0, 1.1),
            bar_at(72, 1.1, 1.2, 1.0, 1.1),
        ];
        let series = Series::normalize("EURUSD", Granularity::H1, bars, None).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn scale_prefers_broker_digits() {
        let series = Series::normalize(
            "USDJPY",
            Granularity::H1,
            vec![bar_at(0, 150.0, 150.5, 149.5, 150.2)],
            Some(2),
        )
        .unwrap();
        assert!((series.scale().value() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn scale_fallback_heuristic() {
        assert!((Scale::fallback_for("USDJPY").value() - 0.001).abs() < 1e-12);
        assert!((Scale::fallback_for("XAUUSD").value() - 0.01).abs() < 1e-12);
        assert!((Scale::fallback_for("EURUSD").value() - 0.00001).abs() < 1e-15);
    }

    #[test]
    fn oversized_broker_digits_fall_back_to_heuristic() {
        assert!(Scale::from_digits(400).is_none());
        assert!(Scale::from_digits(u32::MAX).is_none());

        let series = Series::normalize(
            "EURUSD",
            Granularity::D1,
            vec![bar_at(0, 1.1000, 1.1050, 1.0990, 1.1020)],
            Some(400),
        )
        .unwrap();
        let scale = series.scale();
        assert!(scale.value() > 0.0 && scale.value().is_finite());
        assert!((scale.value() - 0.00001).abs() < 1e-15);
        assert_eq!(scale.points(1.0990, 1.1050), 600);
    }

    #[test]
    fn max_digits_still_yields_positive_scale() {
        let scale = Scale::from_digits(Scale::MAX_DIGITS).unwrap();
        assert!(scale.value() > 0.0);
    }

    #[test]
    fn points_between_prices() {
        let scale = Scale::from_digits(5).unwrap();
        assert_eq!(scale.points(1.0990, 1.1050), 600);
        assert_eq!(scale.points(1.1050, 1.0990), -600);
    }

    #[test]
    fn column_accessors_follow_bar_order() {
        let series = series_from_closes(&[1.0, 2.0, 3.0]);
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.times().len(), 3);
        assert!((series.highs()[0] - 1.0005).abs() < 1e-12);
        assert!((series.lows()[2] - 2.9995).abs() < 1e-12);
    }
}
