//! Query construction.
//!
//! High-level search parameters are assembled into the engine's nested
//! boolean query structure by [`QueryBuilder`]. The built [`Query`] is
//! immutable; paging state lives with the exporter, never inside the query.

pub mod builder;

pub use builder::{Query, QueryBuilder};

use serde::{Deserialize, Serialize};

/// One full-text constraint: a query string matched over named fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerm {
    /// The fields the query string is matched against.
    pub fields: Vec<String>,
    /// The query string.
    pub query: String,
}

impl SearchTerm {
    /// Creates a search term over the given fields.
    pub fn new(
        fields: impl IntoIterator<Item = impl Into<String>>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            query: query.into(),
        }
    }
}

/// How multiple constraints are combined in the boolean query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineMode {
    /// All constraints must match (AND). The default.
    #[default]
    Must,
    /// Any constraint may match (OR).
    Should,
}

impl CombineMode {
    /// The boolean-query slot key this mode selects.
    pub fn key(&self) -> &'static str {
        match self {
            CombineMode::Must => "must",
            CombineMode::Should => "should",
        }
    }
}
