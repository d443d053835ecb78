// =============================================================================
// Price Transforms
// =============================================================================
//
// Bar-level derivations that are not indicators in the smoothing sense:
// Heiken-Ashi candles, point gaps, percentage change, swing pivots and the
// calendar dates a series has no bars on.

pub mod calendar;
pub mod change;
pub mod gaps;
pub mod heiken_ashi;
pub mod pivots;

pub use calendar::missing_dates;
pub use change::{cumulative_percentage_change, percentage_change, percentage_changes};
pub use gaps::{gap_series, points, points_abs, GapMetric};
pub use heiken_ashi::heiken_ashi;
pub use pivots::{pivots, Pivot, PivotKind};
