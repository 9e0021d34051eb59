//! Shared test infrastructure: scripted search sources and document builders.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use esextract::error::{ExtractResult, TransportError};
use esextract::export::SearchSource;

/// An in-memory search source over a fixed document set.
///
/// Pages honor `size`, the ascending `(time, id)` sort and `search_after`
/// the way the real engine does, so pagination behavior can be exercised
/// without a cluster. Every received search body is recorded for inspection.
pub struct ScriptedSource {
    docs: Vec<Value>,
    time_field: String,
    id_field: String,
    requests: Mutex<Vec<Value>>,
}

impl ScriptedSource {
    /// Creates a source over `docs`, sorted and paged by the given fields.
    pub fn new(docs: Vec<Value>, time_field: &str, id_field: &str) -> Self {
        Self {
            docs,
            time_field: time_field.to_string(),
            id_field: id_field.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// The search bodies received so far, in order.
    pub fn search_requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    fn sort_key(&self, doc: &Value) -> (String, String) {
        (
            text_of(doc, &self.time_field),
            text_of(doc, &self.id_field),
        )
    }
}

fn text_of(doc: &Value, field: &str) -> String {
    match doc.get(field) {
        Some(value) => render(value),
        None => String::new(),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SearchSource for ScriptedSource {
    async fn count(&self, _index: &str, _body: &Value) -> ExtractResult<u64> {
        Ok(self.docs.len() as u64)
    }

    async fn search_page(&self, _index: &str, body: &Value) -> ExtractResult<Vec<Value>> {
        self.requests.lock().unwrap().push(body.clone());

        let size = body.get("size").and_then(|s| s.as_u64()).unwrap_or(10_000) as usize;
        let after = body
            .get("search_after")
            .and_then(|a| a.as_array())
            .map(|values| {
                (
                    values.first().map(render).unwrap_or_default(),
                    values.get(1).map(render).unwrap_or_default(),
                )
            });

        let mut sorted: Vec<&Value> = self.docs.iter().collect();
        sorted.sort_by_key(|doc| self.sort_key(doc));

        Ok(sorted
            .into_iter()
            .filter(|doc| match &after {
                Some(after_key) => self.sort_key(doc) > *after_key,
                None => true,
            })
            .take(size)
            .cloned()
            .collect())
    }
}

/// Delegates to a [`ScriptedSource`] until a set number of search pages have
/// been served, then fails every further search request.
pub struct FailingSource {
    inner: ScriptedSource,
    pages_before_failure: usize,
    served: AtomicUsize,
}

impl FailingSource {
    /// Wraps `inner`, serving `pages_before_failure` pages before erroring.
    pub fn new(inner: ScriptedSource, pages_before_failure: usize) -> Self {
        Self {
            inner,
            pages_before_failure,
            served: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SearchSource for FailingSource {
    async fn count(&self, index: &str, body: &Value) -> ExtractResult<u64> {
        self.inner.count(index, body).await
    }

    async fn search_page(&self, index: &str, body: &Value) -> ExtractResult<Vec<Value>> {
        let served = self.served.fetch_add(1, Ordering::SeqCst);
        if served >= self.pages_before_failure {
            return Err(TransportError::ErrorStatus {
                operation: "search",
                status: 503,
                body: "scripted mid-export failure".to_string(),
            }
            .into());
        }
        self.inner.search_page(index, body).await
    }
}

/// A flat tweet-shaped document.
pub fn tweet(id: &str, created_at: &str, text: &str) -> Value {
    json!({ "id": id, "created_at": created_at, "text": text })
}
