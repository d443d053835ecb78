// =============================================================================
// Support / Resistance Pivots
// =============================================================================
//
// A five-bar fractal:
//   support at i     iff L[i] < L[i-1] < L[i-2]  and  L[i] < L[i+1] < L[i+2]
//   resistance at i  iff H[i] > H[i-1] > H[i-2]  and  H[i] > H[i+1] > H[i+2]
// Only indices with two bars on each side (2 <= i <= n-3) qualify.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::market_data::Series;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotKind {
    Support,
    Resistance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pivot {
    pub index: usize,
    pub time: DateTime<Utc>,
    pub kind: PivotKind,
    /// Low of the bar for support, high for resistance.
    pub level: f64,
}

/// Every pivot in `series`, ordered by index.
pub fn pivots(series: &Series) -> Vec<Pivot> {
    let bars = series.bars();
    if bars.len() < 5 {
        return Vec::new();
    }

    let mut out = Vec::new();
    for i in 2..=bars.len() - 3 {
        let l = |k: usize| bars[k].low;
        let h = |k: usize| bars[k].high;

        if l(i) < l(i - 1) && l(i - 1) < l(i - 2) && l(i) < l(i + 1) && l(i + 1) < l(i + 2) {
            out.push(Pivot {
                index: i,
                time: bars[i].time,
                kind: PivotKind::Support,
                level: l(i),
            });
        }
        if h(i) > h(i - 1) && h(i - 1) > h(i - 2) && h(i) > h(i + 1) && h(i + 1) > h(i + 2) {
            out.push(Pivot {
                index: i,
                time: bars[i].time,
                kind: PivotKind::Resistance,
                level: h(i),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::bar::tests::series_from_closes;

    #[test]
    fn monotonic_series_has_no_pivots() {
        let up: Vec<f64> = (0..30).map(|i| 1.1 + i as f64 * 0.001).collect();
        assert!(pivots(&series_from_closes(&up)).is_empty());

        let down: Vec<f64> = up.iter().rev().copied().collect();
        assert!(pivots(&series_from_closes(&down)).is_empty());
    }

    #[test]
    fn valley_is_support() {
        let series = series_from_closes(&[1.5, 1.4, 1.3, 1.4, 1.5]);
        let found = pivots(&series);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].index, 2);
        assert_eq!(found[0].kind, PivotKind::Support);
        assert!((found[0].level - 1.2995).abs() < 1e-12);
    }

    #[test]
    fn peak_is_resistance() {
        let series = series_from_closes(&[1.1, 1.2, 1.3, 1.2, 1.1, 1.0]);
        let found = pivots(&series);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, PivotKind::Resistance);
        assert_eq!(found[0].time, series.bars()[2].time);
    }

    #[test]
    fn plateau_is_not_a_pivot() {
        let series = series_from_closes(&[1.5, 1.4, 1.3, 1.3, 1.4, 1.5]);
        assert!(pivots(&series).is_empty());
    }

    #[test]
    fn short_series_has_no_pivots() {
        assert!(pivots(&series_from_closes(&[1.2, 1.1, 1.2, 1.3])).is_empty());
    }
}
