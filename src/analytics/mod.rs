// =============================================================================
// Cross-Symbol Analytics
// =============================================================================
//
// Statistics that combine several instruments: currency strength, close
// correlation, weekly volume ranking and daily candle-width ranking.  Results
// are keyed by symbol or currency and sorted deterministically, so the order
// in which the source answers never leaks into the output.

pub mod correlation;
pub mod strength;
pub mod volume;
pub mod width;

pub use correlation::{correlation_matrix, currency_correlations, CorrelationMatrix};
pub use strength::{currency_strength, round3, strength_basket, CurrencyStrength};
pub use volume::{volume_ranking, VolumeEntry};
pub use width::{candle_width_ranking, CandleWidth};
