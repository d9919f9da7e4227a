//! Wire protocol for the search service.
//!
//! A query is one line of `album|artist|song`, the song part optional. The
//! response is plain text: one formatted block per hit, or a fixed message
//! when nothing matched or the query was malformed. The wording is kept
//! verbatim from the original service so existing clients keep working.

use crate::index::TrackRecord;

/// Response sent when no record matched the query.
pub const NO_RESULTS: &str = "No se encontraron resultados para la búsqueda.";

/// Response sent for a malformed query.
pub const INVALID_QUERY: &str = "Error: Consulta inválida.";

/// A parsed search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Album title, exact match.
    pub album: String,
    /// Artist name, exact match.
    pub artist: String,
    /// Optional case-insensitive track title filter.
    pub song: Option<String>,
}

impl SearchQuery {
    /// Parse a raw query line. Album and artist are required.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim_end_matches(['\r', '\n']);
        let mut parts = raw.splitn(3, '|');
        let album = parts.next()?.to_string();
        let artist = parts.next()?.to_string();
        if album.is_empty() || artist.is_empty() {
            return None;
        }
        let song = parts
            .next()
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        Some(Self {
            album,
            artist,
            song,
        })
    }

    /// Render the query in wire form.
    pub fn to_wire(&self) -> String {
        format!(
            "{}|{}|{}",
            self.album,
            self.artist,
            self.song.as_deref().unwrap_or("")
        )
    }
}

/// Format the full response for a set of hits.
pub fn format_results(hits: &[TrackRecord]) -> String {
    if hits.is_empty() {
        return NO_RESULTS.to_string();
    }
    hits.iter().map(format_record).collect()
}

/// Format a single hit as a display block.
fn format_record(record: &TrackRecord) -> String {
    let duration = record
        .duration_ms
        .as_deref()
        .and_then(|ms| ms.parse::<i64>().ok())
        .map(|ms| format!("{} min {} seg", ms / 60_000, (ms % 60_000) / 1000))
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "Álbum: {}\nArtista: {}\nCanción: {}\nDuración: {}\nPopularidad: {}\n{}\n",
        record.album,
        record.artist,
        record.track.as_deref().unwrap_or("N/A"),
        duration,
        record.popularity.as_deref().unwrap_or("N/A"),
        "-".repeat(50)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TrackRecord {
        TrackRecord {
            album: "Night Album".to_string(),
            artist: "Alice".to_string(),
            track: Some("Opening Song".to_string()),
            duration_ms: Some("185000".to_string()),
            popularity: Some("61".to_string()),
        }
    }

    #[test]
    fn test_parse_full_query() {
        let query = SearchQuery::parse("Night Album|Alice|Opening").unwrap();
        assert_eq!(query.album, "Night Album");
        assert_eq!(query.artist, "Alice");
        assert_eq!(query.song.as_deref(), Some("Opening"));
    }

    #[test]
    fn test_parse_query_without_song() {
        let query = SearchQuery::parse("Night Album|Alice").unwrap();
        assert_eq!(query.song, None);
        let query = SearchQuery::parse("Night Album|Alice|").unwrap();
        assert_eq!(query.song, None);
    }

    #[test]
    fn test_parse_rejects_missing_parts() {
        assert!(SearchQuery::parse("Night Album").is_none());
        assert!(SearchQuery::parse("|Alice").is_none());
        assert!(SearchQuery::parse("Night Album|").is_none());
        assert!(SearchQuery::parse("").is_none());
    }

    #[test]
    fn test_parse_trims_line_ending() {
        let query = SearchQuery::parse("Night Album|Alice|Opening\r\n").unwrap();
        assert_eq!(query.song.as_deref(), Some("Opening"));
    }

    #[test]
    fn test_wire_roundtrip() {
        let query = SearchQuery::parse("Night Album|Alice|Opening").unwrap();
        assert_eq!(query.to_wire(), "Night Album|Alice|Opening");
        let query = SearchQuery::parse("Night Album|Alice").unwrap();
        assert_eq!(query.to_wire(), "Night Album|Alice|");
    }

    #[test]
    fn test_format_record_block() {
        let formatted = format_results(&[record()]);
        assert!(formatted.contains("Álbum: Night Album\n"));
        assert!(formatted.contains("Artista: Alice\n"));
        assert!(formatted.contains("Canción: Opening Song\n"));
        assert!(formatted.contains("Duración: 3 min 5 seg\n"));
        assert!(formatted.contains("Popularidad: 61\n"));
        assert!(formatted.contains("-----"));
    }

    #[test]
    fn test_format_missing_fields_as_na() {
        let record = TrackRecord {
            album: "Night Album".to_string(),
            artist: "Alice".to_string(),
            track: None,
            duration_ms: Some("not a number".to_string()),
            popularity: None,
        };
        let formatted = format_results(&[record]);
        assert!(formatted.contains("Canción: N/A\n"));
        assert!(formatted.contains("Duración: N/A\n"));
        assert!(formatted.contains("Popularidad: N/A\n"));
    }

    #[test]
    fn test_format_empty_hits() {
        assert_eq!(format_results(&[]), NO_RESULTS);
    }
}
