//! On-disk hash index over an exported CSV file.
//!
//! The index maps an `album|artist` composite key to the byte offsets of
//! matching CSV records, so the search server can answer queries without
//! scanning the whole file.

pub mod builder;
pub mod key;
pub mod store;

pub use builder::{build_index, ColumnNames, IndexConfig, IndexSummary, DEFAULT_BUCKETS};
pub use key::{bucket_of, composite_key, extract_artist};
pub use store::{Index, TrackRecord, DEFAULT_INDEX};
