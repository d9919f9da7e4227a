//! Client for the HuggingFace datasets-server rows API.
//!
//! The rows API serves dataset contents as paginated JSON without requiring
//! a local parquet download. A whole split is fetched by walking offsets
//! until the server-reported total is reached.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};

/// Base URL for the HuggingFace datasets-server.
const HUGGINGFACE_API_BASE: &str = "https://datasets-server.huggingface.co";

/// Maximum rows per request accepted by the rows API.
const MAX_PAGE_SIZE: usize = 100;

/// Configuration for the hub client.
#[derive(Debug, Clone)]
pub struct HubClientConfig {
    /// Base URL of the datasets-server API.
    pub api_base: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Rows requested per page, capped at the API maximum.
    pub page_size: usize,
}

impl Default for HubClientConfig {
    fn default() -> Self {
        Self {
            api_base: HUGGINGFACE_API_BASE.to_string(),
            timeout_secs: 60,
            page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Client for fetching dataset rows from the HuggingFace Hub.
///
/// # Example
///
/// ```ignore
/// use hubcsv::hub::HubClient;
///
/// let client = HubClient::new();
/// let split = client.fetch_split("bigdata-pw/Spotify", "train").await?;
/// println!("{} rows", split.rows.len());
/// ```
pub struct HubClient {
    /// HTTP client for API requests.
    http_client: Client,
    /// Client configuration.
    config: HubClientConfig,
}

impl HubClient {
    /// Create a new client with default settings.
    pub fn new() -> Self {
        Self::with_config(HubClientConfig::default())
    }

    /// Create a new client with custom settings.
    pub fn with_config(config: HubClientConfig) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            config,
        }
    }

    /// Fetch every row of one split of a dataset.
    ///
    /// Pages through the rows API until the server-reported total is
    /// collected. No retries: the first failure of any page aborts the fetch.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if:
    /// - The HTTP request fails
    /// - The API returns an error status (unknown dataset, missing split)
    /// - The response cannot be parsed or omits the row total
    /// - A page comes back empty before the total is reached
    pub async fn fetch_split(&self, dataset: &str, split: &str) -> FetchResult<FetchedSplit> {
        let page_size = self.config.page_size.min(MAX_PAGE_SIZE);

        let first = self.fetch_page(dataset, split, 0, page_size).await?;
        let features: Vec<String> = first.features.into_iter().map(|f| f.name).collect();
        let expected = first.num_rows_total.ok_or_else(|| {
            FetchError::ParseError("response did not include num_rows_total".to_string())
        })?;

        let mut rows: Vec<Value> = Vec::with_capacity(expected);
        Self::collect_rows(&mut rows, first.rows, dataset, split);

        while rows.len() < expected {
            let page = self
                .fetch_page(dataset, split, rows.len(), page_size)
                .await?;
            if page.rows.is_empty() {
                return Err(FetchError::Truncated {
                    expected,
                    received: rows.len(),
                });
            }
            Self::collect_rows(&mut rows, page.rows, dataset, split);
            debug!(dataset, split, fetched = rows.len(), total = expected, "Fetched page");
        }

        Ok(FetchedSplit {
            split: split.to_string(),
            features,
            rows,
        })
    }

    /// Append a page of rows, surfacing any server-side cell truncation.
    fn collect_rows(rows: &mut Vec<Value>, page: Vec<Row>, dataset: &str, split: &str) {
        for row in page {
            if !row.truncated_cells.is_empty() {
                warn!(
                    dataset,
                    split,
                    row_idx = row.row_idx,
                    cells = ?row.truncated_cells,
                    "Server truncated oversized cells; exported values are incomplete"
                );
            }
            rows.push(row.row);
        }
    }

    /// List the available splits of a dataset.
    pub async fn list_splits(&self, dataset: &str) -> FetchResult<Vec<SplitInfo>> {
        let url = format!("{}/splits?dataset={}", self.config.api_base, dataset);
        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::HttpError(e.to_string()))?;

        let response = Self::check_status(response).await?;
        let body: SplitsResponse = response
            .json()
            .await
            .map_err(|e| FetchError::ParseError(format!("Failed to parse response: {}", e)))?;
        Ok(body.splits)
    }

    /// Fetch a single page of rows.
    async fn fetch_page(
        &self,
        dataset: &str,
        split: &str,
        offset: usize,
        length: usize,
    ) -> FetchResult<RowsResponse> {
        let url = format!(
            "{}/rows?dataset={}&config=default&split={}&offset={}&length={}",
            self.config.api_base, dataset, split, offset, length
        );

        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::HttpError(e.to_string()))?;

        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| FetchError::ParseError(format!("Failed to parse response: {}", e)))
    }

    /// Map non-success statuses to fetch errors, surfacing the body text.
    async fn check_status(response: reqwest::Response) -> FetchResult<reqwest::Response> {
        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok());
            return Err(FetchError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FetchError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

impl Default for HubClient {
    fn default() -> Self {
        Self::new()
    }
}

/// One split of a dataset, fully fetched.
#[derive(Debug, Clone)]
pub struct FetchedSplit {
    /// Name of the split that was fetched.
    pub split: String,
    /// Column names in the order reported by the server.
    pub features: Vec<String>,
    /// Raw records, one JSON value per row.
    pub rows: Vec<Value>,
}

/// One entry from the splits API.
#[derive(Debug, Clone, Deserialize)]
pub struct SplitInfo {
    /// Dataset identifier.
    pub dataset: String,
    /// Config name, usually "default".
    pub config: String,
    /// Split name.
    pub split: String,
}

/// Response structure from the rows API.
#[derive(Debug, Deserialize)]
struct RowsResponse {
    /// Column metadata, in source order.
    #[serde(default)]
    features: Vec<Feature>,
    /// Rows in this page.
    rows: Vec<Row>,
    /// Total number of rows in the split.
    num_rows_total: Option<usize>,
}

/// Column metadata entry.
#[derive(Debug, Deserialize)]
struct Feature {
    /// Column name.
    name: String,
}

/// A single row from the rows API.
#[derive(Debug, Deserialize)]
struct Row {
    /// Row index in the split.
    #[serde(default)]
    row_idx: usize,
    /// Row data containing the actual fields.
    row: Value,
    /// Cells elided by the server for size.
    #[serde(default)]
    truncated_cells: Vec<String>,
}

/// Response structure from the splits API.
#[derive(Debug, Deserialize)]
struct SplitsResponse {
    splits: Vec<SplitInfo>,
}
