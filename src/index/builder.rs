//! Index construction over an exported CSV file.
//!
//! One pass over the CSV records the byte offset of every record, chains
//! the offsets into hash buckets keyed by `album|artist`, and writes the
//! whole structure to disk atomically.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::IndexError;
use crate::export::csv::{parse_record, read_record};
use crate::index::key::{bucket_of, composite_key, extract_artist};
use crate::index::store::{EMPTY, HEADER_LEN, MAGIC, NODE_LEN};

/// Default number of hash buckets.
pub const DEFAULT_BUCKETS: u64 = 500_000;

/// Names of the CSV columns the index and search server read.
#[derive(Debug, Clone)]
pub struct ColumnNames {
    /// Album title column.
    pub album: String,
    /// Artists cell column (Python-repr list, see [`extract_artist`]).
    pub artists: String,
    /// Track title column.
    pub track: String,
    /// Track duration in milliseconds.
    pub duration_ms: String,
    /// Popularity score column.
    pub popularity: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            album: "album_name".to_string(),
            artists: "artists".to_string(),
            track: "track_name".to_string(),
            duration_ms: "duration_ms".to_string(),
            popularity: "popularity".to_string(),
        }
    }
}

/// Resolved positions of the indexed columns within a CSV header.
///
/// Album and artists are required to key the index; the display columns are
/// optional and render as "N/A" when absent.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub album: usize,
    pub artists: usize,
    pub track: Option<usize>,
    pub duration_ms: Option<usize>,
    pub popularity: Option<usize>,
}

impl ColumnMap {
    /// Resolve column positions from a parsed header record.
    pub fn resolve(header: &[String], names: &ColumnNames) -> Result<Self, IndexError> {
        let position = |name: &str| header.iter().position(|c| c == name);
        Ok(Self {
            album: position(&names.album)
                .ok_or_else(|| IndexError::MissingColumn(names.album.clone()))?,
            artists: position(&names.artists)
                .ok_or_else(|| IndexError::MissingColumn(names.artists.clone()))?,
            track: position(&names.track),
            duration_ms: position(&names.duration_ms),
            popularity: position(&names.popularity),
        })
    }
}

/// Configuration for an index build.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Number of hash buckets in the index file.
    pub buckets: u64,
    /// CSV column names to index.
    pub columns: ColumnNames,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            buckets: DEFAULT_BUCKETS,
            columns: ColumnNames::default(),
        }
    }
}

/// Summary returned after a successful index build.
#[derive(Debug, Clone)]
pub struct IndexSummary {
    /// CSV records scanned.
    pub records: usize,
    /// Records that produced an index entry.
    pub entries: usize,
}

/// Build a hash index over `csv_path` and write it to `index_path`.
///
/// Records whose album and artist are both empty are skipped, like the
/// header line. The index file is written atomically: a failed build leaves
/// any previous index untouched.
pub fn build_index(
    csv_path: &Path,
    index_path: &Path,
    config: &IndexConfig,
) -> Result<IndexSummary, IndexError> {
    let mut reader = BufReader::new(File::open(csv_path)?);
    let (header, header_len) = read_record(&mut reader)?
        .ok_or_else(|| IndexError::EmptyCsv(csv_path.display().to_string()))?;
    let columns = ColumnMap::resolve(&parse_record(&header), &config.columns)?;

    let mut buckets = vec![EMPTY; config.buckets as usize];
    let mut nodes: Vec<(u64, i64)> = Vec::new();
    let node_base = HEADER_LEN + buckets.len() as u64 * 8;

    let mut offset = header_len;
    let mut records = 0usize;
    while let Some((record, consumed)) = read_record(&mut reader)? {
        let fields = parse_record(&record);
        if let (Some(album), Some(artists)) =
            (fields.get(columns.album), fields.get(columns.artists))
        {
            let artist = extract_artist(artists);
            let key = composite_key(album, &artist);
            if key.len() > 1 {
                let bucket = bucket_of(&key, config.buckets) as usize;
                let node_offset = (node_base + nodes.len() as u64 * NODE_LEN) as i64;
                nodes.push((offset, buckets[bucket]));
                buckets[bucket] = node_offset;
            }
        }
        offset += consumed;
        records += 1;
        if records % 100_000 == 0 {
            info!(records, "Indexing CSV records");
        }
    }

    let dir = index_path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new_in(".")?,
    };
    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        out.write_all(&MAGIC)?;
        out.write_all(&config.buckets.to_le_bytes())?;
        for head in &buckets {
            out.write_all(&head.to_le_bytes())?;
        }
        for (csv_offset, next) in &nodes {
            out.write_all(&csv_offset.to_le_bytes())?;
            out.write_all(&next.to_le_bytes())?;
        }
        out.flush()?;
    }
    tmp.persist(index_path)
        .map_err(|e| IndexError::Corrupt(format!("failed to persist index: {}", e)))?;

    info!(
        records,
        entries = nodes.len(),
        path = %index_path.display(),
        "Index written"
    );

    Ok(IndexSummary {
        records,
        entries: nodes.len(),
    })
}
