pub mod bar;
pub mod csv_source;
pub mod source;

// Re-export the core types for convenient access (e.g. `use crate::market_data::Series`).
pub use bar::{Bar, Scale, Series};
pub use csv_source::{CsvDataSource, SymbolSpec};
pub use source::{load_series, DataSource};
