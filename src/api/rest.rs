// =============================================================================
// REST API Endpoints: Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/` and return JSON for the chart layer.
// Core work talks to a blocking data source, so every handler that touches
// it runs on `spawn_blocking`.
//
// Error mapping (`{ "error": message }`):
//   400  bad input, unknown granularity, fewer than two symbols
//   404  no bars for the symbol
//   502  the data source broke its contract (order, malformed bars, outage)
//   500  anything else
//
// CORS is configured permissively for development.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::analysis::{analyze_symbol, AnalysisRequest, SymbolAnalysis};
use crate::analytics::{
    candle_width_ranking, currency_correlations, currency_strength, strength_basket,
    volume_ranking, CandleWidth, CorrelationMatrix, CurrencyStrength, VolumeEntry,
};
use crate::app_state::AppState;
use crate::cache;
use crate::error::{AnalyzerError, Result as CoreResult};
use crate::market_data::DataSource;
use crate::risk::{self, MarginQuote};
use crate::runtime_config::RuntimeConfig;
use crate::types::{Granularity, TradeAction};

type ApiError = (StatusCode, Json<serde_json::Value>);
type ApiResult<T> = Result<Json<T>, ApiError>;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/symbols", get(symbols))
        // ── Charts ──────────────────────────────────────────────────
        .route("/api/v1/analysis/:symbol", get(analysis))
        // ── Cross-symbol panels ─────────────────────────────────────
        .route("/api/v1/strength", get(strength))
        .route("/api/v1/correlation", post(correlation))
        .route("/api/v1/volume-ranking", get(volume))
        .route("/api/v1/candle-widths", get(candle_widths))
        // ── Risk calculators ────────────────────────────────────────
        .route("/api/v1/risk/margin", post(margin))
        .route("/api/v1/risk/average-points", post(average_points))
        // ── Middleware & State ───────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Error mapping & blocking helper
// =============================================================================

fn status_for(err: &AnalyzerError) -> StatusCode {
    match err {
        AnalyzerError::InvalidInput(_)
        | AnalyzerError::InvalidGranularity(_)
        | AnalyzerError::InsufficientSymbols { .. } => StatusCode::BAD_REQUEST,
        AnalyzerError::NoData { .. } => StatusCode::NOT_FOUND,
        AnalyzerError::DataOrder { .. }
        | AnalyzerError::MalformedBar { .. }
        | AnalyzerError::DataUnavailable { .. }
        | AnalyzerError::ZeroOpenPrice { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(state: &AppState, context: &str, err: AnalyzerError) -> ApiError {
    let status = status_for(&err);
    let message = err.to_string();
    if status.is_server_error() {
        error!(context, status = status.as_u16(), error = %message, "request failed");
    } else {
        warn!(context, status = status.as_u16(), error = %message, "request rejected");
    }
    state.push_error(message.clone(), Some(context.to_string()));
    (status, Json(serde_json::json!({ "error": message })))
}

/// Run `work` against the data source on the blocking pool.
async fn run_blocking<T, F>(state: &Arc<AppState>, context: String, work: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn DataSource, &RuntimeConfig) -> CoreResult<T> + Send + 'static,
{
    let source = state.source.clone();
    let config = state.config();

    match tokio::task::spawn_blocking(move || work(&*source, &config)).await {
        Ok(Ok(value)) => Ok(Json(value)),
        Ok(Err(e)) => Err(reject(state, &context, e)),
        Err(join_err) => {
            error!(context = %context, error = %join_err, "blocking task panicked");
            state.push_error(join_err.to_string(), Some(context));
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "internal error" })),
            ))
        }
    }
}

// =============================================================================
// Health & symbols
// =============================================================================

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.health())
}

#[derive(Debug, Serialize)]
struct SymbolsResponse {
    /// Symbols the dashboard tracks.
    configured: Vec<String>,
    /// Symbols the data source can serve.
    available: Vec<String>,
    /// Configured symbols quoted against the strength anchor.
    strength_basket: Vec<String>,
}

async fn symbols(State(state): State<Arc<AppState>>) -> ApiResult<SymbolsResponse> {
    run_blocking(&state, "symbols".into(), |source, config| {
        Ok(SymbolsResponse {
            configured: config.symbols.clone(),
            available: source.symbols()?,
            strength_basket: strength_basket(&config.symbols, &config.strength_anchor),
        })
    })
    .await
}

// =============================================================================
// Symbol analysis
// =============================================================================

#[derive(Debug, Deserialize)]
struct AnalysisQuery {
    #[serde(default)]
    granularity: Option<String>,
    #[serde(default)]
    count: Option<usize>,
}

async fn analysis(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> ApiResult<SymbolAnalysis> {
    let symbol = symbol.trim().to_uppercase();
    let context = format!("analysis/{symbol}");

    run_blocking(&state, context, move |source, config| {
        let granularity = match query.granularity.as_deref() {
            Some(label) => label.parse::<Granularity>()?,
            None => config.analysis_granularity,
        };
        let count = query.count.unwrap_or(config.analysis_bar_count);
        if count == 0 {
            return Err(AnalyzerError::InvalidInput("count must be at least 1".into()));
        }

        let request = AnalysisRequest {
            symbol,
            granularity,
            count,
            reference: config.reference_time(),
        };
        analyze_symbol(source, &request, &config.indicators)
    })
    .await
}

// =============================================================================
// Cross-symbol panels
// =============================================================================

async fn strength(State(state): State<Arc<AppState>>) -> ApiResult<Vec<CurrencyStrength>> {
    run_blocking(&state, "strength".into(), |source, config| {
        let basket = strength_basket(&config.symbols, &config.strength_anchor);
        let reference = config.reference_time();
        let table = currency_strength(
            source,
            &basket,
            &config.strength_anchor,
            reference,
            config.strength_lookback,
        );

        let entries: Vec<(&str, String)> = table
            .iter()
            .map(|e| (e.currency.as_str(), cache::float_value(e.strength)))
            .collect();
        if let Err(e) = cache::write_cache(&config.strength_cache_path, &entries, reference) {
            warn!(path = %config.strength_cache_path.display(), error = %e, "failed to write strength cache");
        }
        Ok(table)
    })
    .await
}

#[derive(Debug, Deserialize)]
struct CorrelationRequest {
    #[serde(default)]
    symbols: Vec<String>,
}

async fn correlation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CorrelationRequest>,
) -> ApiResult<CorrelationMatrix> {
    let symbols: Vec<String> = req.symbols.iter().map(|s| s.trim().to_uppercase()).collect();
    run_blocking(&state, "correlation".into(), move |source, config| {
        currency_correlations(source, &symbols, config.reference_time(), config.correlation_lookback)
    })
    .await
}

async fn volume(State(state): State<Arc<AppState>>) -> ApiResult<Vec<VolumeEntry>> {
    run_blocking(&state, "volume-ranking".into(), |source, config| {
        volume_ranking(source, &config.symbols, config.reference_time())
    })
    .await
}

async fn candle_widths(State(state): State<Arc<AppState>>) -> ApiResult<Vec<CandleWidth>> {
    run_blocking(&state, "candle-widths".into(), |source, config| {
        let reference = config.reference_time();
        let ranking = candle_width_ranking(source, &config.symbols, reference)?;

        let entries: Vec<(&str, i64)> = ranking.iter().map(|w| (w.symbol.as_str(), w.width)).collect();
        if let Err(e) = cache::write_cache(&config.width_cache_path, &entries, reference) {
            warn!(path = %config.width_cache_path.display(), error = %e, "failed to write width cache");
        }
        Ok(ranking)
    })
    .await
}

// =============================================================================
// Risk calculators
// =============================================================================

#[derive(Debug, Deserialize)]
struct MarginRequest {
    action: TradeAction,
    lot_size: f64,
    symbol: String,
    balance: f64,
}

#[derive(Debug, Serialize)]
struct MarginResponse {
    #[serde(flatten)]
    quote: MarginQuote,
    stop_out_level: f64,
    max_loss_at_stop_out: f64,
}

async fn margin(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MarginRequest>,
) -> ApiResult<MarginResponse> {
    let symbol = req.symbol.trim().to_uppercase();
    let context = format!("risk/margin/{symbol}");

    run_blocking(&state, context, move |source, config| {
        let quote = risk::calculate_margin(source, req.action, req.lot_size, &symbol)?;
        let max_loss = risk::max_loss_at_stop_out(req.balance, quote.margin, config.stop_out_level);
        info!(
            symbol = %quote.symbol,
            action = %quote.action,
            margin = quote.margin,
            max_loss,
            "margin calculated"
        );
        Ok(MarginResponse {
            quote,
            stop_out_level: config.stop_out_level,
            max_loss_at_stop_out: max_loss,
        })
    })
    .await
}

#[derive(Debug, Deserialize)]
struct AveragePointsRequest {
    profit_target: f64,
    min_trades: u32,
    leverage: f64,
}

async fn average_points(Json(req): Json<AveragePointsRequest>) -> impl IntoResponse {
    let points = risk::average_points_per_trade(req.profit_target, req.min_trades, req.leverage);
    Json(serde_json::json!({ "average_points": points }))
}
