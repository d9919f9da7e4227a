//! TCP search service over the CSV index.
//!
//! Clients connect, send a single `album|artist|song` query, and receive
//! the formatted results in one response.

pub mod client;
pub mod protocol;
pub mod server;

pub use client::send_query;
pub use protocol::{format_results, SearchQuery, INVALID_QUERY, NO_RESULTS};
pub use server::{SearchServer, DEFAULT_PORT};
