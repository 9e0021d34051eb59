//! Boolean query assembly.
//!
//! Translates the small parameter set this tool supports (search terms,
//! exists checks, match-all, inclusive date range) into the engine's
//! Query DSL JSON.

use chrono::NaiveDate;
use serde_json::{Value, json};

use crate::error::{ConfigError, ExtractResult, InputError};

use super::{CombineMode, SearchTerm};

/// A built, immutable query body.
///
/// Holds only the `query` portion of a search request; paging state
/// (`search_after`), sorting, and sizing are composed per request by the
/// exporter.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    body: Value,
}

impl Query {
    /// The request body fragment: `{"query": {"bool": {...}}}`.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// The body for a count request.
    ///
    /// The count API accepts only the query portion, which is exactly what a
    /// built query holds.
    pub fn count_body(&self) -> Value {
        self.body.clone()
    }
}

/// Builds a [`Query`] from high-level search parameters.
///
/// Validation is eager: an impossible parameter set fails at [`build`]
/// time, before anything touches the network.
///
/// [`build`]: QueryBuilder::build
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    search_terms: Vec<SearchTerm>,
    exists_fields: Vec<String>,
    match_all: bool,
    combine: CombineMode,
    date_field: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl QueryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a query-string constraint over the given fields.
    pub fn with_search(
        mut self,
        fields: impl IntoIterator<Item = impl Into<String>>,
        query: impl Into<String>,
    ) -> Self {
        self.search_terms.push(SearchTerm::new(fields, query));
        self
    }

    /// Adds a constraint that the given field must have a value.
    pub fn with_exists(mut self, field: impl Into<String>) -> Self {
        self.exists_fields.push(field.into());
        self
    }

    /// Matches every document, overriding any search/exists constraints.
    /// A date range still applies.
    pub fn with_match_all(mut self, match_all: bool) -> Self {
        self.match_all = match_all;
        self
    }

    /// Selects how multiple constraints combine (default: AND).
    pub fn with_combine_mode(mut self, mode: CombineMode) -> Self {
        self.combine = mode;
        self
    }

    /// Names the date field the range filter applies to.
    pub fn with_date_field(mut self, field: impl Into<String>) -> Self {
        self.date_field = Some(field.into());
        self
    }

    /// Sets the inclusive lower bound of the date range (`yyyy-MM-dd`).
    pub fn with_start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    /// Sets the inclusive upper bound of the date range (`yyyy-MM-dd`, or the
    /// literal `"now"`).
    pub fn with_end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    /// Validates the parameter set and assembles the query body.
    pub fn build(self) -> ExtractResult<Query> {
        if !self.match_all && self.search_terms.is_empty() && self.exists_fields.is_empty() {
            return Err(InputError::EmptyQuery.into());
        }

        let range = self.build_range()?;

        let slot = if self.match_all {
            json!({ "match_all": {} })
        } else {
            let mut clauses: Vec<Value> = Vec::new();
            for term in &self.search_terms {
                clauses.push(json!({
                    "query_string": { "query": term.query, "fields": term.fields }
                }));
            }
            for field in &self.exists_fields {
                clauses.push(json!({ "exists": { "field": field } }));
            }

            // A single constraint stays a bare clause object, not a
            // one-element list.
            if clauses.len() == 1 {
                clauses.remove(0)
            } else {
                Value::Array(clauses)
            }
        };

        let mut bool_query = json!({});
        bool_query[self.combine.key()] = slot;
        if let Some(range) = range {
            bool_query["filter"] = range;
        }

        Ok(Query {
            body: json!({ "query": { "bool": bool_query } }),
        })
    }

    /// Builds the `filter.range` clause, validating the date pair first.
    fn build_range(&self) -> ExtractResult<Option<Value>> {
        let (start, end) = match (&self.start_date, &self.end_date) {
            (None, None) => return Ok(None),
            (Some(start), Some(end)) => (start, end),
            _ => return Err(InputError::IncompleteDateRange.into()),
        };

        validate_date(start)?;
        if end != "now" {
            validate_date(end)?;
        }

        let field = self
            .date_field
            .as_deref()
            .ok_or(ConfigError::DateFieldUnresolved)?;

        let mut bounds = serde_json::Map::new();
        bounds.insert("gte".to_string(), json!(start));
        bounds.insert("lte".to_string(), json!(end));
        bounds.insert("format".to_string(), json!("yyyy-MM-dd"));

        let mut range = serde_json::Map::new();
        range.insert(field.to_string(), Value::Object(bounds));

        Ok(Some(json!({ "range": Value::Object(range) })))
    }
}

fn validate_date(value: &str) -> Result<(), InputError> {
    // chrono tolerates unpadded month and day numbers, but the range clause
    // declares strict yyyy-MM-dd, so the literal must round-trip unchanged.
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) if date.format("%Y-%m-%d").to_string() == value => Ok(()),
        _ => Err(InputError::InvalidDate {
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;

    #[test]
    fn test_match_all() {
        let query = QueryBuilder::new().with_match_all(true).build().unwrap();
        assert_eq!(
            query.body()["query"]["bool"]["must"],
            json!({ "match_all": {} })
        );
    }

    #[test]
    fn test_match_all_overrides_constraints() {
        let query = QueryBuilder::new()
            .with_search(["full_text"], "vaccine")
            .with_exists("entities.urls.expanded_url")
            .with_match_all(true)
            .build()
            .unwrap();
        assert_eq!(
            query.body()["query"]["bool"]["must"],
            json!({ "match_all": {} })
        );
    }

    #[test]
    fn test_single_search_term_is_bare_clause() {
        let query = QueryBuilder::new()
            .with_search(["full_text"], "vaccine")
            .build()
            .unwrap();
        let must = &query.body()["query"]["bool"]["must"];
        assert!(must.is_object());
        assert_eq!(must["query_string"]["query"], "vaccine");
        assert_eq!(must["query_string"]["fields"], json!(["full_text"]));
    }

    #[test]
    fn test_single_exists_is_bare_clause() {
        let query = QueryBuilder::new()
            .with_exists("entities.urls.expanded_url")
            .build()
            .unwrap();
        let must = &query.body()["query"]["bool"]["must"];
        assert_eq!(
            *must,
            json!({ "exists": { "field": "entities.urls.expanded_url" } })
        );
    }

    #[test]
    fn test_multiple_constraints_keep_input_order() {
        let query = QueryBuilder::new()
            .with_search(["full_text"], "vaccine")
            .with_search(["title"], "trial")
            .with_exists("author")
            .build()
            .unwrap();
        let must = &query.body()["query"]["bool"]["must"];
        let clauses = must.as_array().expect("clause list");
        assert_eq!(clauses.len(), 3);
        assert_eq!(clauses[0]["query_string"]["query"], "vaccine");
        assert_eq!(clauses[1]["query_string"]["query"], "trial");
        assert_eq!(clauses[2]["exists"]["field"], "author");
    }

    #[test]
    fn test_should_combine_mode() {
        let query = QueryBuilder::new()
            .with_search(["full_text"], "vaccine")
            .with_exists("author")
            .with_combine_mode(CombineMode::Should)
            .build()
            .unwrap();
        let bool_query = &query.body()["query"]["bool"];
        assert!(bool_query.get("must").is_none());
        assert_eq!(bool_query["should"].as_array().map(|c| c.len()), Some(2));
    }

    #[test]
    fn test_date_range_filter() {
        let query = QueryBuilder::new()
            .with_match_all(true)
            .with_date_field("created_at")
            .with_start_date("2020-01-01")
            .with_end_date("2020-06-30")
            .build()
            .unwrap();
        let range = &query.body()["query"]["bool"]["filter"]["range"]["created_at"];
        assert_eq!(range["gte"], "2020-01-01");
        assert_eq!(range["lte"], "2020-06-30");
        assert_eq!(range["format"], "yyyy-MM-dd");
    }

    #[test]
    fn test_end_date_accepts_now_literal() {
        let query = QueryBuilder::new()
            .with_match_all(true)
            .with_date_field("created_at")
            .with_start_date("2020-01-01")
            .with_end_date("now")
            .build()
            .unwrap();
        let range = &query.body()["query"]["bool"]["filter"]["range"]["created_at"];
        assert_eq!(range["lte"], "now");
    }

    #[test]
    fn test_lone_date_is_rejected() {
        let result = QueryBuilder::new()
            .with_match_all(true)
            .with_date_field("created_at")
            .with_start_date("2020-01-01")
            .build();
        assert!(matches!(
            result,
            Err(ExtractError::Input(InputError::IncompleteDateRange))
        ));
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let result = QueryBuilder::new()
            .with_match_all(true)
            .with_date_field("created_at")
            .with_start_date("01/01/2020")
            .with_end_date("now")
            .build();
        assert!(matches!(
            result,
            Err(ExtractError::Input(InputError::InvalidDate { .. }))
        ));
    }

    #[test]
    fn test_non_padded_date_is_rejected() {
        let result = QueryBuilder::new()
            .with_match_all(true)
            .with_date_field("created_at")
            .with_start_date("2020-1-1")
            .with_end_date("2020-06-30")
            .build();
        assert!(matches!(
            result,
            Err(ExtractError::Input(InputError::InvalidDate { value })) if value == "2020-1-1"
        ));
    }

    #[test]
    fn test_range_without_date_field_is_rejected() {
        let result = QueryBuilder::new()
            .with_match_all(true)
            .with_start_date("2020-01-01")
            .with_end_date("2020-06-30")
            .build();
        assert!(matches!(
            result,
            Err(ExtractError::Config(ConfigError::DateFieldUnresolved))
        ));
    }

    #[test]
    fn test_empty_query_is_rejected() {
        let result = QueryBuilder::new().build();
        assert!(matches!(
            result,
            Err(ExtractError::Input(InputError::EmptyQuery))
        ));
    }

    #[test]
    fn test_count_body_is_query_only() {
        let query = QueryBuilder::new().with_match_all(true).build().unwrap();
        let count_body = query.count_body();
        assert!(count_body.get("query").is_some());
        assert_eq!(count_body.as_object().map(|o| o.len()), Some(1));
    }

    #[test]
    fn test_no_filter_key_without_range() {
        let query = QueryBuilder::new().with_match_all(true).build().unwrap();
        assert!(query.body()["query"]["bool"].get("filter").is_none());
    }
}
