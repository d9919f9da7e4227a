//! CSV serialization for tables.
//!
//! Writes a header row of column names followed by one line per record,
//! with standard quote escaping. The file lands on disk atomically: bytes
//! are serialized into a temp file next to the destination and renamed
//! into place, so the output path is never left truncated.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::WriteError;
use crate::table::Table;

/// Serialize a table to a CSV file at `path`, replacing any existing file.
pub fn write_csv(table: &Table, path: &Path) -> Result<(), WriteError> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new_in(".")?,
    };

    write_rows(tmp.as_file_mut(), table)?;
    tmp.as_file_mut().flush()?;

    tmp.persist(path)
        .map_err(|e| WriteError::Persist(e.to_string()))?;

    debug!(path = %path.display(), rows = table.shape().0, "Wrote CSV file");
    Ok(())
}

/// Write the header and all data rows to `out`.
fn write_rows<W: Write>(out: &mut W, table: &Table) -> std::io::Result<()> {
    let header: Vec<String> = table.columns().iter().map(|c| escape_field(c)).collect();
    out.write_all(header.join(",").as_bytes())?;
    out.write_all(b"\n")?;

    for row in table.rows() {
        let fields: Vec<String> = row.iter().map(|v| escape_field(v)).collect();
        out.write_all(fields.join(",").as_bytes())?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Escape a field if it contains a comma, quote, or line break.
fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        // Wrap in quotes and escape internal quotes by doubling them
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Split one CSV record into its fields, undoing quote escaping.
pub fn parse_record(record: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = record.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Read one CSV record from `reader`, honoring line breaks inside quoted
/// fields. Returns the record without its trailing newline plus the number
/// of bytes consumed (newline included), or `None` at end of input.
pub fn read_record<R: std::io::BufRead>(reader: &mut R) -> std::io::Result<Option<(String, u64)>> {
    let mut raw = String::new();
    let mut consumed = 0u64;
    loop {
        let n = reader.read_line(&mut raw)?;
        if n == 0 {
            if raw.is_empty() {
                return Ok(None);
            }
            break;
        }
        consumed += n as u64;
        // Quotes pair up within a complete record, so odd parity means the
        // newline fell inside a quoted field.
        if raw.matches('"').count() % 2 == 0 {
            break;
        }
    }
    if raw.ends_with('\n') {
        raw.pop();
        if raw.ends_with('\r') {
            raw.pop();
        }
    }
    Ok(Some((raw, consumed)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::FetchedSplit;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_table() -> Table {
        let split = FetchedSplit {
            split: "train".to_string(),
            features: vec!["track".to_string(), "artist".to_string()],
            rows: vec![
                json!({"track": "Song A", "artist": "Alice"}),
                json!({"track": "Song B", "artist": "Bob"}),
                json!({"track": "Song C", "artist": "Carol"}),
            ],
        };
        Table::from_split(&split).unwrap()
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("simple"), "simple");
        assert_eq!(escape_field("with,comma"), "\"with,comma\"");
        assert_eq!(escape_field("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_field("with\nnewline"), "\"with\nnewline\"");
    }

    #[test]
    fn test_write_csv_line_counts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let table = sample_table();

        write_csv(&table, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        // 1 header + 3 data rows
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "track,artist");
        assert_eq!(lines[0].split(',').count(), 2);
        assert_eq!(lines[3], "Song C,Carol");
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_write_csv_escapes_special_characters() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let split = FetchedSplit {
            split: "train".to_string(),
            features: vec!["text".to_string()],
            rows: vec![
                json!({"text": "Hello, world!"}),
                json!({"text": "Quote: \"test\""}),
            ],
        };
        let table = Table::from_split(&split).unwrap();

        write_csv(&table, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"Hello, world!\""));
        assert!(content.contains("\"Quote: \"\"test\"\"\""));
    }

    #[test]
    fn test_rewrite_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let table = sample_table();

        write_csv(&table, &path).unwrap();
        let first = std::fs::read(&path).unwrap();
        write_csv(&table, &path).unwrap();
        let second = std::fs::read(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_overwrite_replaces_whole_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale content that is much longer than the new file\n").unwrap();

        let split = FetchedSplit {
            split: "train".to_string(),
            features: vec!["a".to_string()],
            rows: vec![json!({"a": "1"})],
        };
        let table = Table::from_split(&split).unwrap();
        write_csv(&table, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "a\n1\n");
    }

    #[test]
    fn test_write_to_missing_directory_fails_without_touching_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let table = sample_table();

        let err = write_csv(&table, &path);
        assert!(err.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_parse_record_roundtrip() {
        let values = ["simple", "with,comma", "with\"quote", "with\nnewline", ""];
        let line: Vec<String> = values.iter().map(|v| escape_field(v)).collect();
        let parsed = parse_record(&line.join(","));
        assert_eq!(parsed, values);
    }

    #[test]
    fn test_parse_record_plain_fields() {
        assert_eq!(parse_record("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_record("a,,c"), vec!["a", "", "c"]);
        assert_eq!(parse_record(""), vec![""]);
    }

    #[test]
    fn test_read_record_tracks_offsets() {
        let data = "track,artist\nSong A,Alice\n\"Line\nbreak\",Bob\n";
        let mut reader = std::io::Cursor::new(data);

        let (header, n0) = read_record(&mut reader).unwrap().unwrap();
        assert_eq!(header, "track,artist");
        assert_eq!(n0, 13);

        let (first, n1) = read_record(&mut reader).unwrap().unwrap();
        assert_eq!(first, "Song A,Alice");
        assert_eq!(&data[n0 as usize..(n0 + n1) as usize], "Song A,Alice\n");

        // Quoted newline spans two physical lines but is one record
        let (second, _) = read_record(&mut reader).unwrap().unwrap();
        assert_eq!(parse_record(&second), vec!["Line\nbreak", "Bob"]);

        assert!(read_record(&mut reader).unwrap().is_none());
    }

    #[test]
    fn test_read_record_without_trailing_newline() {
        let mut reader = std::io::Cursor::new("a,b");
        let (record, n) = read_record(&mut reader).unwrap().unwrap();
        assert_eq!(record, "a,b");
        assert_eq!(n, 3);
    }

    #[test]
    fn test_empty_table_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let split = FetchedSplit {
            split: "train".to_string(),
            features: vec!["track".to_string(), "artist".to_string()],
            rows: vec![],
        };
        let table = Table::from_split(&split).unwrap();

        write_csv(&table, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "track,artist\n");
    }
}
