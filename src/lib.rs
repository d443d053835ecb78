// =============================================================================
// fx-analyzer: technical-indicator engine for a forex dashboard
// =============================================================================
//
// Pipeline: DataSource -> Series::normalize -> indicators / transforms /
// analytics -> JSON for the chart layer.  Everything below `api` is
// synchronous and free of global state; the binary wires it to axum.
// =============================================================================

pub mod analysis;
pub mod analytics;
pub mod api;
pub mod app_state;
pub mod cache;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod risk;
pub mod runtime_config;
pub mod transforms;
pub mod types;

pub use error::{AnalyzerError, Result};
