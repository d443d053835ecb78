// =============================================================================
// Currency Strength
// =============================================================================
//
// For every pair quoted against the anchor currency (e.g. `EURJPY`, `USDJPY`
// against `JPY`):
//
//   strength(base) = round3((C_last - C_first) / C_first * 100)
//
// over the last `lookback` weekly bars.  The anchor itself is pinned at 0.0.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{AnalyzerError, Result};
use crate::market_data::{load_series, DataSource};
use crate::types::Granularity;

pub const DEFAULT_ANCHOR: &str = "JPY";
pub const DEFAULT_LOOKBACK: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyStrength {
    pub currency: String,
    pub strength: f64,
}

/// Round to three decimals.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Symbols whose quote currency (characters 3..6) is `anchor`, input order.
pub fn strength_basket(symbols: &[String], anchor: &str) -> Vec<String> {
    symbols
        .iter()
        .filter(|s| s.get(3..6).is_some_and(|quote| quote.eq_ignore_ascii_case(anchor)))
        .cloned()
        .collect()
}

/// Strength table for the base currencies of `basket`, plus the anchor.
///
/// A symbol that cannot be fetched or evaluated is logged and left out; the
/// table is never failed by a single instrument.  Sorted descending by
/// strength, ties by currency code.
pub fn currency_strength(
    source: &dyn DataSource,
    basket: &[String],
    anchor: &str,
    reference: DateTime<Utc>,
    lookback: usize,
) -> Vec<CurrencyStrength> {
    let mut table: Vec<CurrencyStrength> = Vec::with_capacity(basket.len() + 1);

    for symbol in basket {
        let Some(currency) = symbol.get(..3) else {
            warn!(symbol = %symbol, "symbol too short for a currency code, skipped");
            continue;
        };
        let currency = currency.to_ascii_uppercase();
        if table.iter().any(|e| e.currency == currency) {
            debug!(symbol = %symbol, currency = %currency, "currency already scored, skipped");
            continue;
        }

        match symbol_strength(source, symbol, reference, lookback) {
            Ok(strength) => table.push(CurrencyStrength { currency, strength }),
            Err(e) => warn!(symbol = %symbol, error = %e, "strength unavailable, skipped"),
        }
    }

    let anchor = anchor.to_ascii_uppercase();
    table.retain(|e| e.currency != anchor);
    table.push(CurrencyStrength {
        currency: anchor,
        strength: 0.0,
    });

    table.sort_by(|a, b| {
        b.strength
            .total_cmp(&a.strength)
            .then_with(|| a.currency.cmp(&b.currency))
    });
    table
}

fn symbol_strength(
    source: &dyn DataSource,
    symbol: &str,
    reference: DateTime<Utc>,
    lookback: usize,
) -> Result<f64> {
    let series = load_series(source, symbol, Granularity::W1, reference, lookback)?;
    let bars = series.bars();
    let (first, last) = match (bars.first(), bars.last()) {
        (Some(f), Some(l)) => (f.close, l.close),
        _ => {
            return Err(AnalyzerError::NoData {
                symbol: symbol.to_string(),
            })
        }
    };
    if first == 0.0 {
        return Err(AnalyzerError::InvalidInput(format!(
            "first close of {symbol} is zero"
        )));
    }
    Ok(round3((last - first) / first * 100.0))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::market_data::bar::tests::bar_at;
    use crate::market_data::source::testing::MemorySource;
    use crate::market_data::Bar;

    fn weekly(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| bar_at(i as i64 * 168, c, c + 0.5, c - 0.5, c))
            .collect()
    }

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    fn names(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn basket_selects_quote_currency() {
        let all = names(&["EURUSD", "USDJPY", "EURJPY", "GBPJPY", "XAUUSD", "JPY"]);
        assert_eq!(strength_basket(&all, "JPY"), names(&["USDJPY", "EURJPY", "GBPJPY"]));
    }

    #[test]
    fn failing_symbol_is_skipped() {
        let source = MemorySource::new()
            .with_bars("USDJPY", Granularity::W1, weekly(&[100.0, 102.0, 104.0, 106.0, 110.0]))
            .with_bars("EURJPY", Granularity::W1, weekly(&[160.0, 158.0, 156.0, 154.0, 152.0]))
            .failing("GBPJPY");
        let basket = names(&["USDJPY", "EURJPY", "GBPJPY"]);

        let table = currency_strength(&source, &basket, "JPY", reference(), 5);
        let got: Vec<(&str, f64)> = table.iter().map(|e| (e.currency.as_str(), e.strength)).collect();
        assert_eq!(got, vec![("USD", 10.0), ("JPY", 0.0), ("EUR", -5.0)]);
    }

    #[test]
    fn flat_series_has_zero_strength() {
        let source =
            MemorySource::new().with_bars("CHFJPY", Granularity::W1, weekly(&[170.0; 5]));
        let table = currency_strength(&source, &names(&["CHFJPY"]), "JPY", reference(), 5);
        // Tie with the anchor is broken by code.
        assert_eq!(table[0], CurrencyStrength { currency: "CHF".into(), strength: 0.0 });
        assert_eq!(table[1].currency, "JPY");
    }

    #[test]
    fn duplicate_currency_keeps_first_entry() {
        let source = MemorySource::new()
            .with_bars("USDJPY", Granularity::W1, weekly(&[100.0, 101.0]))
            .with_bars("USDJPY.m", Granularity::W1, weekly(&[100.0, 120.0]));
        let table = currency_strength(&source, &names(&["USDJPY", "USDJPY.m"]), "JPY", reference(), 5);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0], CurrencyStrength { currency: "USD".into(), strength: 1.0 });
    }

    #[test]
    fn only_lookback_bars_are_used() {
        let source = MemorySource::new()
            .with_bars("EURJPY", Granularity::W1, weekly(&[50.0, 100.0, 100.0, 100.0, 100.0, 103.3333]));
        let table = currency_strength(&source, &names(&["EURJPY"]), "JPY", reference(), 5);
        assert_eq!(table[0].strength, 3.333);
    }

    #[test]
    fn round3_keeps_three_decimals() {
        assert_eq!(round3(1.23456), 1.235);
        assert_eq!(round3(-2.71828), -2.718);
    }
}
