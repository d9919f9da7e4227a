//! In-memory tabular view of a fetched split.
//!
//! Columns come from the split's feature metadata in source order; every
//! record is rendered into one row of cells. The table is built once and
//! only read afterwards.

use serde_json::Value;

use crate::error::TableError;
use crate::hub::FetchedSplit;

/// A flat table of named columns and string cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from a fetched split.
    ///
    /// Column names and order are taken verbatim from the split's features.
    /// A record missing a key renders an empty cell; a record that is not a
    /// key/value object fails the conversion.
    pub fn from_split(split: &FetchedSplit) -> Result<Self, TableError> {
        if split.features.is_empty() {
            return Err(TableError::NoColumns(split.split.clone()));
        }

        let columns = split.features.clone();
        let mut rows = Vec::with_capacity(split.rows.len());
        for (index, record) in split.rows.iter().enumerate() {
            let object = record.as_object().ok_or_else(|| TableError::NotAnObject {
                index,
                value: record.to_string(),
            })?;
            let cells = columns
                .iter()
                .map(|name| render_cell(object.get(name)))
                .collect();
            rows.push(cells);
        }

        Ok(Self { columns, rows })
    }

    /// Column names in output order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows of rendered cells, one per record.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// (row count, column count), fixed at creation.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }
}

/// Render one JSON value as a cell.
///
/// Strings are taken verbatim, null and absent values become empty cells,
/// and nested arrays/objects are kept as compact JSON text.
fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(nested) => nested.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_split() -> FetchedSplit {
        FetchedSplit {
            split: "train".to_string(),
            features: vec!["track".to_string(), "artist".to_string()],
            rows: vec![
                json!({"track": "Song A", "artist": "Alice"}),
                json!({"track": "Song B", "artist": "Bob"}),
                json!({"track": "Song C", "artist": "Carol"}),
            ],
        }
    }

    #[test]
    fn test_shape_matches_records_and_fields() {
        let table = Table::from_split(&sample_split()).unwrap();
        assert_eq!(table.shape(), (3, 2));
        assert_eq!(table.columns(), ["track", "artist"]);
        assert_eq!(table.rows()[2], vec!["Song C", "Carol"]);
    }

    #[test]
    fn test_column_order_follows_features_not_record_keys() {
        let split = FetchedSplit {
            split: "train".to_string(),
            features: vec!["artist".to_string(), "track".to_string()],
            rows: vec![json!({"track": "Song A", "artist": "Alice"})],
        };
        let table = Table::from_split(&split).unwrap();
        assert_eq!(table.columns(), ["artist", "track"]);
        assert_eq!(table.rows()[0], vec!["Alice", "Song A"]);
    }

    #[test]
    fn test_missing_key_renders_empty_cell() {
        let split = FetchedSplit {
            split: "train".to_string(),
            features: vec!["track".to_string(), "artist".to_string()],
            rows: vec![json!({"track": "Song A"})],
        };
        let table = Table::from_split(&split).unwrap();
        assert_eq!(table.rows()[0], vec!["Song A", ""]);
    }

    #[test]
    fn test_value_rendering() {
        let split = FetchedSplit {
            split: "train".to_string(),
            features: vec![
                "name".to_string(),
                "plays".to_string(),
                "explicit".to_string(),
                "genres".to_string(),
                "label".to_string(),
            ],
            rows: vec![json!({
                "name": "Song A",
                "plays": 1234,
                "explicit": false,
                "genres": ["pop", "rock"],
                "label": null
            })],
        };
        let table = Table::from_split(&split).unwrap();
        assert_eq!(
            table.rows()[0],
            vec!["Song A", "1234", "false", r#"["pop","rock"]"#, ""]
        );
    }

    #[test]
    fn test_non_object_record_fails() {
        let split = FetchedSplit {
            split: "train".to_string(),
            features: vec!["track".to_string()],
            rows: vec![json!(42)],
        };
        let err = Table::from_split(&split).unwrap_err();
        assert!(matches!(err, TableError::NotAnObject { index: 0, .. }));
    }

    #[test]
    fn test_empty_features_fails() {
        let split = FetchedSplit {
            split: "train".to_string(),
            features: vec![],
            rows: vec![],
        };
        let err = Table::from_split(&split).unwrap_err();
        assert!(matches!(err, TableError::NoColumns(_)));
    }

    #[test]
    fn test_empty_split_yields_zero_rows() {
        let split = FetchedSplit {
            split: "train".to_string(),
            features: vec!["track".to_string()],
            rows: vec![],
        };
        let table = Table::from_split(&split).unwrap();
        assert_eq!(table.shape(), (0, 1));
    }
}
