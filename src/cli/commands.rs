//! CLI command definitions for hubcsv.
//!
//! `export` fetches one dataset split and writes it to a CSV file;
//! `info` lists the splits a dataset exposes; `index`, `serve` and
//! `search` build and query a local search index over the exported CSV.

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;

use crate::export::exporter::{DEFAULT_DATASET, DEFAULT_OUTPUT, DEFAULT_SPLIT};
use crate::export::{ExportConfig, Exporter};
use crate::hub::HubClient;
use crate::index::{build_index, ColumnNames, Index, IndexConfig, DEFAULT_BUCKETS, DEFAULT_INDEX};
use crate::search::{send_query, SearchQuery, SearchServer, DEFAULT_PORT};

/// HuggingFace dataset to CSV exporter.
#[derive(Parser)]
#[command(name = "hubcsv")]
#[command(about = "Export HuggingFace Hub datasets to CSV files")]
#[command(version)]
#[command(
    long_about = "hubcsv fetches a dataset split from the HuggingFace datasets-server and writes it to a single CSV file with a header row.\n\nExample usage:\n  hubcsv export --dataset bigdata-pw/Spotify --split train --output spotify_data.csv"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "warn", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Fetch a dataset split and export it as CSV.
    #[command(alias = "run")]
    Export(ExportArgs),

    /// List the splits a dataset exposes.
    Info(InfoArgs),

    /// Build a search index over an exported CSV file.
    Index(IndexArgs),

    /// Serve album/artist searches over TCP.
    Serve(ServeArgs),

    /// Query a running search server.
    Search(SearchArgs),
}

/// Arguments for `hubcsv export`.
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// HuggingFace dataset identifier (owner/name).
    #[arg(short, long, default_value = DEFAULT_DATASET)]
    pub dataset: String,

    /// Dataset split to export.
    #[arg(short, long, default_value = DEFAULT_SPLIT)]
    pub split: String,

    /// Output CSV file path.
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,
}

/// Arguments for `hubcsv info`.
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// HuggingFace dataset identifier (owner/name).
    #[arg(short, long, default_value = DEFAULT_DATASET)]
    pub dataset: String,
}

/// Arguments for `hubcsv index`.
#[derive(Parser, Debug)]
pub struct IndexArgs {
    /// CSV file to index.
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub csv: PathBuf,

    /// Output index file path.
    #[arg(short, long, default_value = DEFAULT_INDEX)]
    pub index: PathBuf,

    /// Number of hash buckets.
    #[arg(short, long, default_value_t = DEFAULT_BUCKETS)]
    pub buckets: u64,
}

/// Arguments for `hubcsv serve`.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// CSV file the index was built from.
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub csv: PathBuf,

    /// Index file path.
    #[arg(short, long, default_value = DEFAULT_INDEX)]
    pub index: PathBuf,

    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

/// Arguments for `hubcsv search`.
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Server address.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Server port.
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Album title to search for (exact match).
    #[arg(short, long)]
    pub album: String,

    /// Artist name to search for (exact match).
    #[arg(long)]
    pub artist: String,

    /// Optional track title filter (case-insensitive substring).
    #[arg(short, long)]
    pub song: Option<String>,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Export(args) => run_export_command(args).await,
        Commands::Info(args) => run_info_command(args).await,
        Commands::Index(args) => run_index_command(args).await,
        Commands::Serve(args) => run_serve_command(args).await,
        Commands::Search(args) => run_search_command(args).await,
    }
}

async fn run_export_command(args: ExportArgs) -> anyhow::Result<()> {
    let config = ExportConfig {
        dataset: args.dataset,
        split: args.split,
        output: args.output,
    };

    match Exporter::new(config).run().await {
        Ok(summary) => {
            info!(
                rows = summary.rows,
                columns = summary.columns,
                output = %summary.output.display(),
                "Export completed"
            );
            Ok(())
        }
        Err(e) => {
            // The error line goes to stdout, matching the original script;
            // the exit status is the machine-readable failure signal.
            println!("Ocurrió un error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_info_command(args: InfoArgs) -> anyhow::Result<()> {
    let client = HubClient::new();
    let splits = client.list_splits(&args.dataset).await?;

    if splits.is_empty() {
        println!("No splits found for '{}'", args.dataset);
        return Ok(());
    }

    println!("Splits for '{}':", args.dataset);
    for split in splits {
        println!("  {} ({})", split.split, split.config);
    }
    Ok(())
}

async fn run_index_command(args: IndexArgs) -> anyhow::Result<()> {
    println!("Generando index...");
    let config = IndexConfig {
        buckets: args.buckets,
        columns: ColumnNames::default(),
    };
    let summary = build_index(&args.csv, &args.index, &config)?;
    info!(
        records = summary.records,
        entries = summary.entries,
        "Index build completed"
    );
    println!(
        "¡Índice creado exitosamente en '{}'!",
        args.index.display()
    );
    Ok(())
}

async fn run_serve_command(args: ServeArgs) -> anyhow::Result<()> {
    let index = Index::open(&args.csv, &args.index, &ColumnNames::default())?;
    let listener = TcpListener::bind((args.host.as_str(), args.port)).await?;
    println!("Servidor de búsqueda escuchando en el puerto {}", args.port);
    SearchServer::new(index).serve(listener).await?;
    Ok(())
}

async fn run_search_command(args: SearchArgs) -> anyhow::Result<()> {
    let query = SearchQuery {
        album: args.album,
        artist: args.artist,
        song: args.song,
    };
    let addr = format!("{}:{}", args.host, args.port);
    let response = send_query(&addr, &query).await?;
    println!("{}", response);
    Ok(())
}
