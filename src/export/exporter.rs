//! The export run: fetch a split, build the table, write the CSV.
//!
//! Execution is one strict sequence with no retries; the first failure at
//! any stage aborts the rest. The user-facing status lines printed to
//! stdout reproduce the original exporter script verbatim, including its
//! Spanish wording.

use std::path::PathBuf;

use tracing::info;

use crate::error::ExportError;
use crate::export::csv::write_csv;
use crate::hub::HubClient;
use crate::table::Table;

/// Default dataset identifier.
pub const DEFAULT_DATASET: &str = "bigdata-pw/Spotify";

/// Default split to export.
pub const DEFAULT_SPLIT: &str = "train";

/// Default output filename.
pub const DEFAULT_OUTPUT: &str = "spotify_data.csv";

/// Configuration for one export run.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// HuggingFace dataset identifier (e.g. "bigdata-pw/Spotify").
    pub dataset: String,
    /// Split to export.
    pub split: String,
    /// Destination CSV path.
    pub output: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dataset: DEFAULT_DATASET.to_string(),
            split: DEFAULT_SPLIT.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

/// Summary returned after a successful export.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub rows: usize,
    pub columns: usize,
    pub output: PathBuf,
}

/// Fetches one dataset split and writes it to a CSV file.
pub struct Exporter {
    config: ExportConfig,
    client: HubClient,
}

impl Exporter {
    /// Create an exporter for the given configuration.
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            client: HubClient::new(),
        }
    }

    /// Create an exporter with an existing client.
    pub fn with_client(config: ExportConfig, client: HubClient) -> Self {
        Self { config, client }
    }

    /// Run the export: fetch, convert, report, serialize, report.
    ///
    /// On success the output file holds exactly the table that was reported,
    /// header line included. On failure the output path is untouched (the
    /// CSV bytes only replace it through an atomic rename).
    pub async fn run(&self) -> Result<ExportSummary, ExportError> {
        info!(
            dataset = %self.config.dataset,
            split = %self.config.split,
            "Fetching dataset from HuggingFace"
        );
        let split = self
            .client
            .fetch_split(&self.config.dataset, &self.config.split)
            .await?;

        println!("Convirtiendo los datos a un DataFrame de pandas...");
        let table = Table::from_split(&split)?;
        let (rows, columns) = table.shape();
        println!("{}", shape_line(rows, columns));

        let filename = self.config.output.display().to_string();
        println!("\nGuardando los datos unificados en el archivo: '{}'...", filename);
        write_csv(&table, &self.config.output)?;

        println!(
            "\n¡Proceso completado! Todos los archivos han sido unificados en '{}'",
            filename
        );

        Ok(ExportSummary {
            rows,
            columns,
            output: self.config.output.clone(),
        })
    }
}

/// The reported shape line, kept verbatim from the original script.
fn shape_line(rows: usize, columns: usize) -> String {
    format!("El DataFrame unificado tiene {} filas y {} columnas.", rows, columns)
}
