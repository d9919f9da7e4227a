//! Key derivation for the CSV index.
//!
//! Records are bucketed by an `album|artist` composite key. The artist name
//! is pulled out of the dataset's artists cell, which holds a Python-style
//! repr of the artist list rather than strict JSON.

/// Build the composite lookup key for a record.
pub fn composite_key(album: &str, artist: &str) -> String {
    format!("{}|{}", album, artist)
}

/// djb2 hash of `key`, reduced to a bucket number.
///
/// The bucket count is part of the index file format: build and lookup must
/// use the same value for chains to resolve.
pub fn bucket_of(key: &str, buckets: u64) -> u64 {
    let mut hash: u64 = 5381;
    for byte in key.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(byte as u64);
    }
    hash % buckets
}

/// Extract the first artist name from an artists cell.
///
/// The cell looks like `[{'artist_gid': '...', 'artist_name': 'NormanBate$',
/// 'role': '...'}]`; only the first `artist_name` match is taken. Cells that
/// don't carry the marker are returned verbatim so plain-text artist columns
/// still work.
pub fn extract_artist(raw: &str) -> String {
    const MARKER: &str = "'artist_name': '";
    if let Some(start) = raw.find(MARKER) {
        let rest = &raw[start + MARKER.len()..];
        if let Some(end) = rest.find('\'') {
            return rest[..end].to_string();
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_key() {
        assert_eq!(composite_key("Album", "Artist"), "Album|Artist");
        assert_eq!(composite_key("", ""), "|");
    }

    #[test]
    fn test_bucket_of_is_stable() {
        let a = bucket_of("Album|Artist", 500_000);
        let b = bucket_of("Album|Artist", 500_000);
        assert_eq!(a, b);
        assert!(a < 500_000);
    }

    #[test]
    fn test_bucket_of_small_table() {
        for key in ["a", "bb", "ccc", "Album|Artist"] {
            assert!(bucket_of(key, 4) < 4);
        }
    }

    #[test]
    fn test_extract_artist_from_repr() {
        let cell = "[{'artist_gid': 'f81b117976f14636ba5caea759b82e67', 'artist_name': 'NormanBate$', 'role': 'ARTIST_ROLE_MAIN_ARTIST'}]";
        assert_eq!(extract_artist(cell), "NormanBate$");
    }

    #[test]
    fn test_extract_artist_takes_first_match() {
        let cell = "[{'artist_name': 'First'}, {'artist_name': 'Second'}]";
        assert_eq!(extract_artist(cell), "First");
    }

    #[test]
    fn test_extract_artist_falls_back_to_raw_cell() {
        assert_eq!(extract_artist("Plain Artist"), "Plain Artist");
        assert_eq!(extract_artist("{'artist_name': 'Unterminated"), "{'artist_name': 'Unterminated");
    }
}
