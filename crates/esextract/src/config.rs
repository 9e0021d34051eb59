//! Connection and fallback configuration.
//!
//! All environment access lives here. The query builder and exporter take
//! resolved values only; callers resolve them through the helpers on
//! [`ExtractConfig`], which fall back to the environment contract of the
//! original tooling:
//!
//! | Env var | Meaning |
//! |---------|---------|
//! | `ELASTIC_HOST` | Cluster host (default `localhost`) |
//! | `ELASTIC_PORT` | Cluster port (default `9200`) |
//! | `ELASTIC_USER` / `ELASTIC_SECRET` | Basic auth credentials |
//! | `DEFAULT_INDEX` | Index used when none is supplied |
//! | `DEFAULT_DATE_FIELD` | Date field used when a range is requested without one |
//! | `PAGE_ID_FIELD` | Paging id field used when none is supplied |
//! | `PAGE_TIME_FIELD` | Paging time field used when none is supplied |

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Authentication configuration for the cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ElasticAuth {
    /// Basic username/password authentication.
    Basic {
        /// The username for basic auth.
        username: String,
        /// The password for basic auth.
        password: String,
    },
    /// Bearer token authentication.
    Bearer {
        /// The bearer token.
        token: String,
    },
}

/// Connection settings plus field-name fallbacks for query building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Cluster host. A bare host name is composed into `https://{host}:{port}`;
    /// a value carrying a scheme (`http://...`) is used verbatim and the port
    /// field is ignored.
    #[serde(default = "default_host")]
    pub host: String,

    /// Cluster port (default: 9200).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Optional authentication.
    #[serde(default)]
    pub auth: Option<ElasticAuth>,

    /// Whether to disable certificate validation (default: true, matching the
    /// self-signed clusters this tool is pointed at).
    #[serde(default = "default_disable_certificate_validation")]
    pub disable_certificate_validation: bool,

    /// Request timeout in milliseconds (default: 30000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Index used when the caller does not name one.
    #[serde(default)]
    pub default_index: Option<String>,

    /// Date field used when a range is requested without naming one.
    #[serde(default)]
    pub default_date_field: Option<String>,

    /// Paging id field used when the caller does not name one.
    #[serde(default)]
    pub page_id_field: Option<String>,

    /// Paging time field used when the caller does not name one.
    #[serde(default)]
    pub page_time_field: Option<String>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    9200
}

fn default_disable_certificate_validation() -> bool {
    true
}

fn default_request_timeout_ms() -> u64 {
    30000
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            auth: None,
            disable_certificate_validation: default_disable_certificate_validation(),
            request_timeout_ms: default_request_timeout_ms(),
            default_index: None,
            default_date_field: None,
            page_id_field: None,
            page_time_field: None,
        }
    }
}

impl ExtractConfig {
    /// Creates a configuration from the process environment.
    ///
    /// Unset or empty variables fall back to defaults; basic auth is only
    /// configured when both `ELASTIC_USER` and `ELASTIC_SECRET` are present.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(host) = get("ELASTIC_HOST") {
            config.host = host;
        }
        if let Some(port) = get("ELASTIC_PORT") {
            config.port = port
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::InvalidEnvValue {
                    name: "ELASTIC_PORT",
                    value: port.clone(),
                    message: e.to_string(),
                })?;
        }

        config.auth = match (get("ELASTIC_USER"), get("ELASTIC_SECRET")) {
            (Some(username), Some(password)) => Some(ElasticAuth::Basic { username, password }),
            _ => None,
        };

        config.default_index = get("DEFAULT_INDEX");
        config.default_date_field = get("DEFAULT_DATE_FIELD");
        config.page_id_field = get("PAGE_ID_FIELD");
        config.page_time_field = get("PAGE_TIME_FIELD");

        Ok(config)
    }

    /// Returns the node URL the transport should connect to.
    pub fn node_url(&self) -> String {
        if self.host.contains("://") {
            self.host.clone()
        } else {
            format!("https://{}:{}", self.host, self.port)
        }
    }

    /// Resolves the index to search: the explicit value if given, otherwise
    /// the configured default.
    pub fn index(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
        explicit
            .map(str::to_string)
            .or_else(|| self.default_index.clone())
            .ok_or(ConfigError::IndexUnresolved)
    }

    /// Resolves the date field for a range query, if any is available.
    ///
    /// Returning `None` is not an error here; the query builder rejects a
    /// range without a date field only when a range is actually requested.
    pub fn date_field(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(str::to_string)
            .or_else(|| self.default_date_field.clone())
    }

    /// Resolves the paging id field.
    pub fn paging_id_field(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
        explicit
            .map(str::to_string)
            .or_else(|| self.page_id_field.clone())
            .ok_or(ConfigError::PagingIdUnresolved)
    }

    /// Resolves the paging time field.
    pub fn paging_time_field(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
        explicit
            .map(str::to_string)
            .or_else(|| self.page_time_field.clone())
            .ok_or(ConfigError::PagingTimeUnresolved)
    }
}
