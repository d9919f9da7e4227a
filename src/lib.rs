//! hubcsv: Export HuggingFace Hub datasets to CSV files.
//!
//! Fetches a dataset split over the datasets-server rows API, materializes
//! it as a flat table, and serializes it to a single CSV file. The exported
//! CSV can in turn be indexed and queried through a TCP search service.

pub mod cli;
pub mod error;
pub mod export;
pub mod hub;
pub mod index;
pub mod search;
pub mod table;

// Re-export commonly used error types
pub use error::{ExportError, FetchError, IndexError, SearchError, TableError, WriteError};
