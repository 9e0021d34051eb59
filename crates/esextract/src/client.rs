//! Elasticsearch transport client.

use std::time::Duration;

use async_trait::async_trait;
use elasticsearch::auth::Credentials;
use elasticsearch::cert::CertificateValidation;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use elasticsearch::{CountParts, Elasticsearch, SearchParts};
use serde_json::Value;
use tracing::debug;

use crate::config::{ElasticAuth, ExtractConfig};
use crate::error::{ConfigError, ExtractResult, TransportError};
use crate::export::SearchSource;

/// A thin wrapper around the official client exposing the two operations the
/// exporter consumes.
pub struct ElasticClient {
    client: Elasticsearch,
}

impl ElasticClient {
    /// Builds a client from configuration.
    ///
    /// No connection is attempted here; a bad host only surfaces on the
    /// first request.
    pub fn new(config: &ExtractConfig) -> ExtractResult<Self> {
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

fn build_client(config: &ExtractConfig) -> ExtractResult<Elasticsearch> {
    let url = config.node_url();
    let parsed_url: elasticsearch::http::Url =
        url.parse().map_err(|e| ConfigError::InvalidNodeUrl {
            url: url.clone(),
            message: format!("{e}"),
        })?;

    let conn_pool = SingleNodeConnectionPool::new(parsed_url);

    let mut builder = TransportBuilder::new(conn_pool)
        .timeout(Duration::from_millis(config.request_timeout_ms));

    if config.disable_certificate_validation {
        builder = builder.cert_validation(CertificateValidation::None);
    }

    if let Some(ref auth) = config.auth {
        builder = match auth {
            ElasticAuth::Basic { username, password } => {
                builder.auth(Credentials::Basic(username.clone(), password.clone()))
            }
            ElasticAuth::Bearer { token } => builder.auth(Credentials::Bearer(token.clone())),
        };
    }

    let transport = builder.build().map_err(|e| TransportError::ClientBuild {
        message: e.to_string(),
    })?;

    debug!(node = %url, "built elasticsearch transport");
    Ok(Elasticsearch::new(transport))
}

#[async_trait]
impl SearchSource for ElasticClient {
    async fn count(&self, index: &str, body: &Value) -> ExtractResult<u64> {
        let response = self
            .client
            .count(CountParts::Index(&[index]))
            .body(body)
            .send()
            .await
            .map_err(TransportError::Request)?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::ErrorStatus {
                operation: "count",
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TransportError::MalformedResponse {
                operation: "count",
                message: e.to_string(),
            })?;

        body.get("count").and_then(|c| c.as_u64()).ok_or_else(|| {
            TransportError::MalformedResponse {
                operation: "count",
                message: "response has no numeric count field".to_string(),
            }
            .into()
        })
    }

    async fn search_page(&self, index: &str, body: &Value) -> ExtractResult<Vec<Value>> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(body)
            .send()
            .await
            .map_err(TransportError::Request)?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::ErrorStatus {
                operation: "search",
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TransportError::MalformedResponse {
                operation: "search",
                message: e.to_string(),
            })?;

        let hits = body
            .get("hits")
            .and_then(|h| h.get("hits"))
            .and_then(|h| h.as_array())
            .cloned()
            .unwrap_or_default();

        let mut docs = Vec::with_capacity(hits.len());
        for hit in &hits {
            // Hits without a _source carry nothing exportable.
            if let Some(source) = hit.get("_source") {
                docs.push(source.clone());
            }
        }
        Ok(docs)
    }
}
