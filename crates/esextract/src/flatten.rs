//! Document flattening.
//!
//! The single shared projection from a nested `_source` document onto a flat
//! list of requested columns. Both file sinks and the in-memory collector
//! consume this output, so the rules live in exactly one place:
//!
//! - a simple field name copies the value verbatim, or the empty-string
//!   sentinel when absent;
//! - a dot-path walks the document key by key; a list encountered mid-path
//!   projects the remaining path across every element, keeping one projected
//!   value per source element;
//! - any absent key yields the empty string for that cell only, never an
//!   error for the row.

use serde_json::Value;

/// A single flattened output row.
///
/// Cells are ordered to match the column list the row was produced against,
/// so every row of an export has the same width.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    /// Projected cell values, one per column.
    pub cells: Vec<Value>,
}

impl FlatRow {
    /// Zips the row back into a JSON record keyed by column name.
    pub fn to_record(&self, columns: &[String]) -> Value {
        let mut record = serde_json::Map::new();
        for (column, cell) in columns.iter().zip(&self.cells) {
            record.insert(column.clone(), cell.clone());
        }
        Value::Object(record)
    }
}

/// Flattens one document against the requested column list.
pub fn flatten_document(source: &Value, columns: &[String]) -> FlatRow {
    FlatRow {
        cells: columns
            .iter()
            .map(|column| project_field(source, column))
            .collect(),
    }
}

/// Projects a single requested field out of a document.
pub fn project_field(source: &Value, field: &str) -> Value {
    if !field.contains('.') {
        return source.get(field).cloned().unwrap_or_else(empty_cell);
    }
    let segments: Vec<&str> = field.split('.').collect();
    project_path(source, &segments)
}

fn project_path(value: &Value, segments: &[&str]) -> Value {
    let Some((head, rest)) = segments.split_first() else {
        return value.clone();
    };

    match value {
        // A list mid-path projects the remaining path across every element.
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| project_path(item, segments))
                .collect(),
        ),
        Value::Object(map) => match map.get(*head) {
            Some(child) => project_path(child, rest),
            None => empty_cell(),
        },
        // Scalars cannot be walked further; the remaining path is absent.
        _ => empty_cell(),
    }
}

/// The sentinel written for absent fields.
fn empty_cell() -> Value {
    Value::String(String::new())
}
