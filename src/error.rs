// =============================================================================
// Analyzer Errors
// =============================================================================
//
// Every fallible operation in the indicator pipeline returns `AnalyzerError`.
// Warm-up gaps are NOT errors: indicators mark unavailable indices with
// `None` so partial series can still be rendered.
// =============================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("no data returned for {symbol}")]
    NoData { symbol: String },

    #[error("bars for {symbol} are not in ascending time order at index {index}")]
    DataOrder { symbol: String, index: usize },

    #[error("bar {index} of {symbol} violates low <= open,close <= high")]
    MalformedBar { symbol: String, index: usize },

    #[error("at least {required} symbols are required, got {got}")]
    InsufficientSymbols { required: usize, got: usize },

    #[error("data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("open price is zero at bar {index}, percentage change is undefined")]
    ZeroOpenPrice { index: usize },

    #[error("unknown granularity '{0}'")]
    InvalidGranularity(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed cache line {line}: '{content}'")]
    CacheFormat { line: usize, content: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
