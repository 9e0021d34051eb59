//! Resumption state for `search_after` pagination.

use serde_json::{Value, json};

use crate::error::TransportError;

/// The sort-key values of the last document of a page.
///
/// Passed back to the engine as `search_after` so the next page starts
/// strictly after the documents already seen.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportCursor {
    last_time: Value,
    last_id: Value,
}

impl ExportCursor {
    /// Extracts the paging-field values from a hit `_source` document.
    ///
    /// Fails when the document lacks either field, since pagination cannot
    /// advance without both sort keys.
    pub fn from_document(
        doc: &Value,
        time_field: &str,
        id_field: &str,
    ) -> Result<Self, TransportError> {
        Ok(Self {
            last_time: paging_value(doc, time_field)?,
            last_id: paging_value(doc, id_field)?,
        })
    }

    /// The `search_after` array: time value first, id value second, matching
    /// the sort order of the search body.
    pub fn search_after(&self) -> Value {
        json!([self.last_time, self.last_id])
    }
}

fn paging_value(doc: &Value, field: &str) -> Result<Value, TransportError> {
    doc.get(field)
        .cloned()
        .ok_or_else(|| TransportError::MalformedResponse {
            operation: "search",
            message: format!("document is missing paging field {field:?}"),
        })
}
