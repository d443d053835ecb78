// =============================================================================
// Symbol Analysis Pipeline
// =============================================================================
//
// fetch -> normalise -> indicator engines -> one serialisable snapshot that
// the chart layer renders as-is.
//
// Indicator columns:
//   sma_21 / sma_50 / sma_200        SMMA at the fast / medium / slow periods
//   bollinger_top / _mid / _bottom   SMA ± k·σ
//   atr, rsi, adx, plus_di, minus_di
//   bulls_power, bears_power
//
// The `sma_*` names are role labels shared with the dashboard; the periods
// behind them come from `IndicatorParams`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::indicators::{adx, atr, bollinger, ma, power, rsi, IndicatorSeries};
use crate::market_data::{load_series, Bar, DataSource};
use crate::transforms::{self, GapMetric, Pivot};
use crate::types::Granularity;

fn default_rsi_period() -> usize {
    rsi::DEFAULT_PERIOD
}
fn default_atr_period() -> usize {
    atr::DEFAULT_PERIOD
}
fn default_adx_period() -> usize {
    adx::DEFAULT_PERIOD
}
fn default_bollinger_period() -> usize {
    bollinger::DEFAULT_PERIOD
}
fn default_bollinger_deviation() -> f64 {
    bollinger::DEFAULT_DEVIATION
}
fn default_power_period() -> usize {
    power::DEFAULT_PERIOD
}
fn default_ma_fast() -> usize {
    21
}
fn default_ma_medium() -> usize {
    50
}
fn default_ma_slow() -> usize {
    200
}

/// Periods for every indicator column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,
    #[serde(default = "default_adx_period")]
    pub adx_period: usize,
    #[serde(default = "default_bollinger_period")]
    pub bollinger_period: usize,
    #[serde(default = "default_bollinger_deviation")]
    pub bollinger_deviation: f64,
    #[serde(default = "default_power_period")]
    pub power_period: usize,
    #[serde(default = "default_ma_fast")]
    pub ma_fast: usize,
    #[serde(default = "default_ma_medium")]
    pub ma_medium: usize,
    #[serde(default = "default_ma_slow")]
    pub ma_slow: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            atr_period: default_atr_period(),
            adx_period: default_adx_period(),
            bollinger_period: default_bollinger_period(),
            bollinger_deviation: default_bollinger_deviation(),
            power_period: default_power_period(),
            ma_fast: default_ma_fast(),
            ma_medium: default_ma_medium(),
            ma_slow: default_ma_slow(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub symbol: String,
    pub granularity: Granularity,
    pub count: usize,
    /// Latest bar time to include (broker server clock).
    pub reference: DateTime<Utc>,
}

/// Everything the chart needs for one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolAnalysis {
    pub symbol: String,
    pub granularity: Granularity,
    pub scale: f64,
    pub bars: Vec<Bar>,
    pub indicators: IndicatorSeries,
    pub heiken_ashi: Vec<Bar>,
    pub pivots: Vec<Pivot>,
    /// Candle width per bar, in points.
    pub widths: Vec<i64>,
    /// Signed body size per bar, in points.
    pub open_to_close: Vec<i64>,
    pub percentage_change: Vec<f64>,
    pub cumulative_percentage_change: Vec<f64>,
    pub missing_dates: Vec<NaiveDate>,
}

/// Run the full pipeline for `request`.
///
/// Fails when the source has no bars, when the bars break the series
/// invariants, or when a bar opens at zero.  Short histories are not
/// failures: the affected columns simply stay `None`.
pub fn analyze_symbol(
    source: &dyn DataSource,
    request: &AnalysisRequest,
    params: &IndicatorParams,
) -> Result<SymbolAnalysis> {
    let series = load_series(
        source,
        &request.symbol,
        request.granularity,
        request.reference,
        request.count,
    )?;
    let bars = series.bars();
    let closes = series.closes();

    let mut indicators = IndicatorSeries::new(series.times());

    // --- Trend ---------------------------------------------------------------
    indicators.insert("sma_21", ma::smma(&closes, params.ma_fast))?;
    indicators.insert("sma_50", ma::smma(&closes, params.ma_medium))?;
    indicators.insert("sma_200", ma::smma(&closes, params.ma_slow))?;

    let bands = bollinger::bollinger(&closes, params.bollinger_period, params.bollinger_deviation);
    indicators.insert("bollinger_top", bands.top)?;
    indicators.insert("bollinger_mid", bands.mid)?;
    indicators.insert("bollinger_bottom", bands.bottom)?;

    indicators.insert("atr", atr::atr(bars, params.atr_period))?;

    let power = power::bulls_bears_power(bars, params.power_period);
    indicators.insert("bulls_power", power.bulls)?;
    indicators.insert("bears_power", power.bears)?;

    // --- Lagging -------------------------------------------------------------
    indicators.insert("rsi", rsi::rsi(&closes, params.rsi_period))?;

    let directional = adx::adx(bars, params.adx_period);
    indicators.insert("adx", directional.adx)?;
    indicators.insert("plus_di", directional.plus_di)?;
    indicators.insert("minus_di", directional.minus_di)?;

    // --- Transforms ----------------------------------------------------------
    let percentage_change = transforms::percentage_changes(&series)?;
    let cumulative_percentage_change = transforms::cumulative_percentage_change(&series)?;

    let analysis = SymbolAnalysis {
        symbol: series.symbol().to_string(),
        granularity: series.granularity(),
        scale: series.scale().value(),
        indicators,
        heiken_ashi: transforms::heiken_ashi(&series),
        pivots: transforms::pivots(&series),
        widths: transforms::gap_series(&series, GapMetric::Width),
        open_to_close: transforms::gap_series(&series, GapMetric::OpenToClose),
        percentage_change,
        cumulative_percentage_change,
        missing_dates: transforms::missing_dates(&series),
        bars: bars.to_vec(),
    };

    debug!(
        symbol = %analysis.symbol,
        granularity = %analysis.granularity,
        bars = analysis.bars.len(),
        pivots = analysis.pivots.len(),
        rsi = ?analysis.indicators.latest("rsi"),
        "symbol analysed"
    );

    Ok(analysis)
}
