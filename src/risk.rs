// =============================================================================
// Risk Calculators
// =============================================================================
//
// Three small calculators behind the dashboard's risk panel:
//   1. Margin:        broker margin for a hypothetical order, priced at the
//                      ask (buy) or bid (sell) of the last tick.
//   2. Stop-out loss: how much of the balance can be lost before the broker
//                      force-closes: balance - margin * stop_out_level.
//   3. Points/trade:  average points each trade must win to reach a profit
//                      target: ceil(target / (min_trades * leverage)).
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnalyzerError, Result};
use crate::market_data::DataSource;
use crate::types::TradeAction;

pub const DEFAULT_STOP_OUT_LEVEL: f64 = 0.20;

/// Margin figure together with the price it was computed at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginQuote {
    pub symbol: String,
    pub action: TradeAction,
    pub lot_size: f64,
    pub price: f64,
    pub margin: f64,
}

/// Ask the source for the margin of a `lot_size` order on `symbol`.
///
/// # Errors
/// `InvalidInput` for a non-positive or non-finite lot size; tick and margin
/// failures from the source propagate.
pub fn calculate_margin(
    source: &dyn DataSource,
    action: TradeAction,
    lot_size: f64,
    symbol: &str,
) -> Result<MarginQuote> {
    if !lot_size.is_finite() || lot_size <= 0.0 {
        return Err(AnalyzerError::InvalidInput(format!(
            "lot size must be a positive number, got {lot_size}"
        )));
    }

    let tick = source.fetch_last_tick(symbol)?;
    let price = match action {
        TradeAction::Buy => tick.ask,
        TradeAction::Sell => tick.bid,
    };
    let margin = source.fetch_margin_estimate(action, lot_size, symbol, price)?;

    debug!(symbol, %action, lot_size, price, margin, "margin estimated");

    Ok(MarginQuote {
        symbol: symbol.to_string(),
        action,
        lot_size,
        price,
        margin,
    })
}

/// Loss the account can absorb before stop-out, never negative.
pub fn max_loss_at_stop_out(balance: f64, margin: f64, stop_out_level: f64) -> f64 {
    (balance - margin * stop_out_level).max(0.0)
}

/// Points each trade must average to hit `profit_target`.
///
/// Returns 0 unless both `min_trades` and `leverage` are positive.
pub fn average_points_per_trade(profit_target: f64, min_trades: u32, leverage: f64) -> f64 {
    if min_trades == 0 || leverage.is_nan() || leverage <= 0.0 {
        return 0.0;
    }
    (profit_target / (min_trades as f64 * leverage)).ceil()
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::market_data::source::testing::MemorySource;
    use crate::types::Tick;

    fn source() -> MemorySource {
        MemorySource::new().with_tick(
            "EURUSD",
            Tick {
                time: Utc::now(),
                ask: 1.1002,
                bid: 1.1000,
            },
        )
    }

    #[test]
    fn buy_uses_ask() {
        let quote = calculate_margin(&source(), TradeAction::Buy, 1.0, "EURUSD").unwrap();
        assert_eq!(quote.price, 1.1002);
        assert!((quote.margin - 1100.2).abs() < 1e-6);
    }

    #[test]
    fn sell_uses_bid() {
        let quote = calculate_margin(&source(), TradeAction::Sell, 0.5, "EURUSD").unwrap();
        assert_eq!(quote.price, 1.1000);
        assert!((quote.margin - 550.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_bad_lot_size() {
        for lot in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = calculate_margin(&source(), TradeAction::Buy, lot, "EURUSD").unwrap_err();
            assert!(matches!(err, AnalyzerError::InvalidInput(_)), "lot {lot}");
        }
    }

    #[test]
    fn missing_tick_propagates() {
        let err = calculate_margin(&source(), TradeAction::Buy, 1.0, "GBPUSD").unwrap_err();
        assert!(matches!(err, AnalyzerError::NoData { .. }));
    }

    #[test]
    fn stop_out_loss() {
        assert!((max_loss_at_stop_out(10_000.0, 1_100.0, DEFAULT_STOP_OUT_LEVEL) - 9_780.0).abs() < 1e-9);
        assert_eq!(max_loss_at_stop_out(100.0, 1_000.0, 0.5), 0.0);
    }

    #[test]
    fn points_per_trade_rounds_up() {
        assert_eq!(average_points_per_trade(1_000.0, 3, 10.0), 34.0);
        assert_eq!(average_points_per_trade(1_000.0, 0, 10.0), 0.0);
        assert_eq!(average_points_per_trade(1_000.0, 3, 0.0), 0.0);
    }
}
