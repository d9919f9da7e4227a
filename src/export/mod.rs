//! Export module: CSV serialization and the export run.

pub mod csv;
pub mod exporter;

pub use csv::write_csv;
pub use exporter::{ExportConfig, ExportSummary, Exporter};
