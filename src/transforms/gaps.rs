// =============================================================================
// Point Gaps
// =============================================================================
//
// Distances between two prices expressed in instrument points:
//   points(a, b) = round((b - a) / scale)
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::market_data::{Bar, Scale, Series};

/// Signed number of points from `a` to `b`.
pub fn points(a: f64, b: f64, scale: Scale) -> i64 {
    scale.points(a, b)
}

/// Unsigned distance between `a` and `b` in points.
pub fn points_abs(a: f64, b: f64, scale: Scale) -> u64 {
    scale.points(a, b).unsigned_abs()
}

/// Which intra-bar distance to measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapMetric {
    /// |high - low|, always non-negative.
    Width,
    HighToClose,
    CloseToLow,
    OpenToClose,
}

impl GapMetric {
    pub fn measure(self, bar: &Bar, scale: Scale) -> i64 {
        match self {
            GapMetric::Width => scale.points(bar.low, bar.high).abs(),
            GapMetric::HighToClose => scale.points(bar.high, bar.close),
            GapMetric::CloseToLow => scale.points(bar.close, bar.low),
            GapMetric::OpenToClose => scale.points(bar.open, bar.close),
        }
    }
}

/// `metric` for every bar of `series`.
pub fn gap_series(series: &Series, metric: GapMetric) -> Vec<i64> {
    let scale = series.scale();
    series.bars().iter().map(|b| metric.measure(b, scale)).collect()
}
