// =============================================================================
// Shared types used across the analyzer
// =============================================================================

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalyzerError;

/// Bar granularity supported by the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Granularity {
    M1,
    M15,
    M30,
    H1,
    H4,
    D1,
    W1,
}

impl Granularity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::M1 => "M1",
            Self::M15 => "M15",
            Self::M30 => "M30",
            Self::H1 => "H1",
            Self::H4 => "H4",
            Self::D1 => "D1",
            Self::W1 => "W1",
        }
    }

    /// All granularities, finest first.
    pub fn all() -> &'static [Granularity] {
        &[
            Self::M1,
            Self::M15,
            Self::M30,
            Self::H1,
            Self::H4,
            Self::D1,
            Self::W1,
        ]
    }
}

impl Default for Granularity {
    fn default() -> Self {
        Self::H4
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Granularity {
    type Err = AnalyzerError;

    /// Accepts the canonical labels (`H4`) and the dashboard's reversed
    /// aliases (`4H`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "M1" | "1M" => Ok(Self::M1),
            "M15" | "15M" => Ok(Self::M15),
            "M30" | "30M" => Ok(Self::M30),
            "H1" | "1H" => Ok(Self::H1),
            "H4" | "4H" => Ok(Self::H4),
            "D1" | "1D" => Ok(Self::D1),
            "W1" | "1W" => Ok(Self::W1),
            _ => Err(AnalyzerError::InvalidGranularity(s.to_string())),
        }
    }
}

/// Direction of a hypothetical order, used by the margin calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Most recent quote for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub time: DateTime<Utc>,
    pub ask: f64,
    pub bid: f64,
}
