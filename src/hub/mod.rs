//! HuggingFace datasets-server client.
//!
//! Fetches dataset rows and split listings over the public rows API.

pub mod rows_api;

pub use rows_api::{FetchedSplit, HubClient, HubClientConfig, SplitInfo};
