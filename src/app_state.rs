// =============================================================================
// Central Application State
// =============================================================================
//
// Shared by every API handler via `Arc<AppState>`: the runtime config, the
// injected market-data source and a short log of recent request failures
// for the dashboard's status panel.
//
// Thread safety:
//   - The config is fixed at boot and never mutated.
//   - parking_lot::RwLock for the error log.
//   - The data source is `Send + Sync` and shared behind an `Arc`.
// =============================================================================

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;

use crate::market_data::DataSource;
use crate::runtime_config::RuntimeConfig;

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

/// A recorded error event for the dashboard error log.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub message: String,
    /// Route or operation that failed (e.g. `analysis/EURUSD`).
    pub context: Option<String>,
    /// ISO 8601 timestamp.
    pub at: String,
}

/// Payload of `GET /api/v1/health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub symbols: usize,
    pub data_dir: String,
    pub recent_errors: Vec<ErrorRecord>,
}

pub struct AppState {
    pub runtime_config: RuntimeConfig,
    pub source: Arc<dyn DataSource>,
    pub recent_errors: RwLock<Vec<ErrorRecord>>,
    /// Instant when the server was started. Used for uptime calculations.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: RuntimeConfig, source: Arc<dyn DataSource>) -> Self {
        Self {
            runtime_config: config,
            source,
            recent_errors: RwLock::new(Vec::new()),
            start_time: Instant::now(),
        }
    }

    /// Owned copy of the configuration for work moved onto a blocking thread.
    pub fn config(&self) -> RuntimeConfig {
        self.runtime_config.clone()
    }

    /// Record an error. The log is capped at [`MAX_RECENT_ERRORS`]; oldest
    /// entries are evicted first.
    pub fn push_error(&self, msg: String, context: Option<String>) {
        let record = ErrorRecord {
            message: msg,
            context,
            at: Utc::now().to_rfc3339(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        while errors.len() > MAX_RECENT_ERRORS {
            errors.remove(0);
        }
    }

    pub fn health(&self) -> HealthSnapshot {
        let config = &self.runtime_config;
        HealthSnapshot {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            uptime_secs: self.start_time.elapsed().as_secs(),
            symbols: config.symbols.len(),
            data_dir: config.data_dir.display().to_string(),
            recent_errors: self.recent_errors.read().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::source::testing::MemorySource;

    fn state() -> AppState {
        AppState::new(RuntimeConfig::default(), Arc::new(MemorySource::new()))
    }

    #[test]
    fn error_log_is_capped() {
        let state = state();
        for i in 0..MAX_RECENT_ERRORS + 5 {
            state.push_error(format!("failure {i}"), None);
        }
        let errors = state.recent_errors.read();
        assert_eq!(errors.len(), MAX_RECENT_ERRORS);
        assert_eq!(errors[0].message, "failure 5");
    }

    #[test]
    fn health_reports_config() {
        let state = state();
        state.push_error("no data returned for EURUSD".into(), Some("analysis/EURUSD".into()));
        let health = state.health();
        assert_eq!(health.status, "ok");
        assert_eq!(health.symbols, RuntimeConfig::default().symbols.len());
        assert_eq!(health.recent_errors.len(), 1);
    }
}
