// =============================================================================
// Calendar Gaps: dates with no bars
// =============================================================================
//
// Weekends and market holidays show up as whole calendar days without a
// single bar; the chart hides them as range breaks.
// =============================================================================

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::market_data::Series;

/// Calendar dates between the first and last bar (inclusive) that carry no
/// bar at all. The chart uses them as range breaks.
pub fn missing_dates(series: &Series) -> Vec<NaiveDate> {
    let present: BTreeSet<NaiveDate> = series.bars().iter().map(|b| b.time.date_naive()).collect();
    let (Some(&first), Some(&last)) = (present.first(), present.last()) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| !present.contains(d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::bar::tests::bar_at;
    use crate::types::Granularity;

    #[test]
    fn weekend_dates_are_reported() {
        // Friday 2024-01-12 and Monday 2024-01-15.
        let bars = vec![
            bar_at(96, 1.1, 1.2, 1.0, 1.1),
            bar_at(168, 1.1, 1.2, 1.0, 1.1),
        ];
        let series = Series::normalize("EURUSD", Granularity::D1, bars, None).unwrap();
        assert_eq!(
            missing_dates(&series),
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 13).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
            ]
        );
    }

    #[test]
    fn contiguous_intraday_series_has_no_gaps() {
        let bars: Vec<_> = (0..48).map(|h| bar_at(h, 1.1, 1.2, 1.0, 1.1)).collect();
        let series = Series::normalize("EURUSD", Granularity::H1, bars, None).unwrap();
        assert!(missing_dates(&series).is_empty());
    }
}
