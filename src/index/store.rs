//! On-disk index format and lookup.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! magic            8 bytes  "HUBIDX01"
//! bucket_count     u64
//! buckets          bucket_count x i64   file offset of chain head, -1 = empty
//! nodes            16 bytes each: csv_offset u64, next i64
//! ```
//!
//! Each node points at the byte offset of one CSV record; chains collect
//! every record sharing a bucket. Because different keys can share a bucket,
//! lookups re-read each candidate record and verify the key fields.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::IndexError;
use crate::export::csv::{parse_record, read_record};
use crate::index::builder::{ColumnMap, ColumnNames};
use crate::index::key::{bucket_of, composite_key, extract_artist};

/// Default index filename.
pub const DEFAULT_INDEX: &str = "spotify.index";

/// Index file magic.
pub(crate) const MAGIC: [u8; 8] = *b"HUBIDX01";

/// Byte length of the fixed header (magic + bucket count).
pub(crate) const HEADER_LEN: u64 = 16;

/// Byte length of one chain node.
pub(crate) const NODE_LEN: u64 = 16;

/// Empty bucket / end-of-chain marker.
pub(crate) const EMPTY: i64 = -1;

/// One matching CSV record, with the display fields pulled out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    pub album: String,
    pub artist: String,
    pub track: Option<String>,
    pub duration_ms: Option<String>,
    pub popularity: Option<String>,
}

/// An opened index over a CSV file.
///
/// The bucket table is held in memory; chain nodes and CSV records are read
/// from disk per lookup.
#[derive(Debug)]
pub struct Index {
    csv_path: PathBuf,
    index_path: PathBuf,
    buckets: Vec<i64>,
    columns: ColumnMap,
}

impl Index {
    /// Open an index file and the CSV it was built over.
    pub fn open(
        csv_path: &Path,
        index_path: &Path,
        columns: &ColumnNames,
    ) -> Result<Self, IndexError> {
        let mut index_file = File::open(index_path)?;

        let mut magic = [0u8; 8];
        index_file.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(IndexError::Corrupt("bad magic".to_string()));
        }

        let mut count_bytes = [0u8; 8];
        index_file.read_exact(&mut count_bytes)?;
        let bucket_count = u64::from_le_bytes(count_bytes);
        if bucket_count == 0 {
            return Err(IndexError::Corrupt("zero bucket count".to_string()));
        }

        let mut table = vec![0u8; bucket_count as usize * 8];
        index_file.read_exact(&mut table)?;
        let buckets: Vec<i64> = table
            .chunks_exact(8)
            .map(|c| i64::from_le_bytes(c.try_into().expect("chunk is 8 bytes")))
            .collect();

        let mut csv_reader = BufReader::new(File::open(csv_path)?);
        let (header, _) = read_record(&mut csv_reader)?
            .ok_or_else(|| IndexError::EmptyCsv(csv_path.display().to_string()))?;
        let columns = ColumnMap::resolve(&parse_record(&header), columns)?;

        Ok(Self {
            csv_path: csv_path.to_path_buf(),
            index_path: index_path.to_path_buf(),
            buckets,
            columns,
        })
    }

    /// Number of hash buckets in the index.
    pub fn bucket_count(&self) -> u64 {
        self.buckets.len() as u64
    }

    /// Find every record matching `album` and `artist` exactly, optionally
    /// narrowed to tracks whose title contains `song` (case-insensitive).
    pub fn lookup(
        &self,
        album: &str,
        artist: &str,
        song: Option<&str>,
    ) -> Result<Vec<TrackRecord>, IndexError> {
        let key = composite_key(album, artist);
        let bucket = bucket_of(&key, self.bucket_count()) as usize;

        let mut index_file = File::open(&self.index_path)?;
        let mut csv_reader = BufReader::new(File::open(&self.csv_path)?);

        let mut hits = Vec::new();
        let mut node_offset = self.buckets[bucket];
        while node_offset != EMPTY {
            let (csv_offset, next) = read_node(&mut index_file, node_offset as u64)?;
            csv_reader.seek(SeekFrom::Start(csv_offset))?;
            if let Some((record, _)) = read_record(&mut csv_reader)? {
                let fields = parse_record(&record);
                if let Some(hit) = self.match_record(&fields, album, artist, song) {
                    hits.push(hit);
                }
            }
            node_offset = next;
        }
        Ok(hits)
    }

    /// Check one candidate record against the query, filtering out bucket
    /// collisions.
    fn match_record(
        &self,
        fields: &[String],
        album: &str,
        artist: &str,
        song: Option<&str>,
    ) -> Option<TrackRecord> {
        let record_album = fields.get(self.columns.album)?;
        let record_artist = extract_artist(fields.get(self.columns.artists)?);
        if record_album != album || record_artist != artist {
            return None;
        }

        let field_at = |i: Option<usize>| i.and_then(|i| fields.get(i)).cloned();
        let track = field_at(self.columns.track);
        if let Some(song) = song {
            let title = track.as_deref()?;
            if !title.to_lowercase().contains(&song.to_lowercase()) {
                return None;
            }
        }

        Some(TrackRecord {
            album: record_album.clone(),
            artist: record_artist,
            track,
            duration_ms: field_at(self.columns.duration_ms),
            popularity: field_at(self.columns.popularity),
        })
    }
}

/// Read one chain node at `offset`.
fn read_node(index_file: &mut File, offset: u64) -> Result<(u64, i64), IndexError> {
    index_file.seek(SeekFrom::Start(offset))?;
    let mut buf = [0u8; NODE_LEN as usize];
    index_file.read_exact(&mut buf)?;
    let csv_offset = u64::from_le_bytes(buf[..8].try_into().expect("slice is 8 bytes"));
    let next = i64::from_le_bytes(buf[8..].try_into().expect("slice is 8 bytes"));
    Ok((csv_offset, next))
}
