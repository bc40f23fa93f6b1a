//! JSON-over-HTTP paging source
//!
//! Loads pages from a REST endpoint returning JSON. Three key strategies are
//! supported:
//! - `page_number` - `?page=3&per_page=20`
//! - `offset` - `?offset=40&limit=20`
//! - `cursor` - `?cursor=abc123`, next cursor read from the response body

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::types::{LoadParams, LoadResult, PagingSource};
use crate::error::{Error, Result};
use crate::types::StringMap;
use async_trait::async_trait;
use jsonpath_rust::JsonPath;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

// ============================================================================
// Keys and Strategies
// ============================================================================

/// Key of one HTTP page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HttpPageKey {
    /// Page number
    Page(u32),
    /// Record offset
    Offset(u64),
    /// Opaque cursor, `None` for the first page
    Cursor(Option<String>),
}

/// How page keys map to query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HttpPageStrategy {
    /// Page number pagination
    PageNumber {
        /// Query parameter name for the page number
        #[serde(default = "default_page_param")]
        page_param: String,
        /// Optional query parameter name for the page size
        #[serde(default)]
        size_param: Option<String>,
        /// First page number (usually 0 or 1)
        #[serde(default = "default_start_page")]
        start_page: u32,
    },

    /// Offset/limit pagination
    Offset {
        /// Query parameter name for the offset
        #[serde(default = "default_offset_param")]
        offset_param: String,
        /// Query parameter name for the limit
        #[serde(default = "default_limit_param")]
        limit_param: String,
    },

    /// Cursor pagination (e.g., Stripe, Slack)
    Cursor {
        /// Query parameter name for the cursor
        cursor_param: String,
        /// Dotted path to the next cursor in the response body
        cursor_path: String,
        /// Optional query parameter name for the page size
        #[serde(default)]
        size_param: Option<String>,
    },
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_start_page() -> u32 {
    1
}

fn default_offset_param() -> String {
    "offset".to_string()
}

fn default_limit_param() -> String {
    "limit".to_string()
}

impl HttpPageStrategy {
    /// Page number strategy with a page size parameter
    pub fn page_number(
        page_param: impl Into<String>,
        size_param: impl Into<String>,
        start_page: u32,
    ) -> Self {
        Self::PageNumber {
            page_param: page_param.into(),
            size_param: Some(size_param.into()),
            start_page,
        }
    }

    /// Offset strategy
    pub fn offset(offset_param: impl Into<String>, limit_param: impl Into<String>) -> Self {
        Self::Offset {
            offset_param: offset_param.into(),
            limit_param: limit_param.into(),
        }
    }

    /// Cursor strategy
    pub fn cursor(cursor_param: impl Into<String>, cursor_path: impl Into<String>) -> Self {
        Self::Cursor {
            cursor_param: cursor_param.into(),
            cursor_path: cursor_path.into(),
            size_param: None,
        }
    }

    /// Key of the first page
    pub fn initial_key(&self) -> HttpPageKey {
        match self {
            Self::PageNumber { start_page, .. } => HttpPageKey::Page(*start_page),
            Self::Offset { .. } => HttpPageKey::Offset(0),
            Self::Cursor { .. } => HttpPageKey::Cursor(None),
        }
    }

    /// Query parameters selecting the page for `key`
    fn query_params(&self, key: &HttpPageKey, load_size: usize) -> Result<Vec<(String, String)>> {
        let mut params = Vec::new();
        match (self, key) {
            (
                Self::PageNumber {
                    page_param,
                    size_param,
                    ..
                },
                HttpPageKey::Page(page),
            ) => {
                params.push((page_param.clone(), page.to_string()));
                if let Some(size_param) = size_param {
                    params.push((size_param.clone(), load_size.to_string()));
                }
            }
            (
                Self::Offset {
                    offset_param,
                    limit_param,
                },
                HttpPageKey::Offset(offset),
            ) => {
                params.push((offset_param.clone(), offset.to_string()));
                params.push((limit_param.clone(), load_size.to_string()));
            }
            (
                Self::Cursor {
                    cursor_param,
                    size_param,
                    ..
                },
                HttpPageKey::Cursor(cursor),
            ) => {
                if let Some(cursor) = cursor {
                    params.push((cursor_param.clone(), cursor.clone()));
                }
                if let Some(size_param) = size_param {
                    params.push((size_param.clone(), load_size.to_string()));
                }
            }
            (strategy, key) => {
                return Err(Error::load(format!(
                    "key {key:?} does not match strategy {strategy:?}"
                )));
            }
        }
        Ok(params)
    }

    /// Key of the page after `key`, or `None` when the direction is exhausted
    fn next_key(
        &self,
        key: &HttpPageKey,
        load_size: usize,
        records: usize,
        body: &Value,
    ) -> Option<HttpPageKey> {
        if records == 0 {
            return None;
        }
        match (self, key) {
            (Self::PageNumber { .. }, HttpPageKey::Page(page)) if records >= load_size => {
                page.checked_add(1).map(HttpPageKey::Page)
            }
            (Self::Offset { .. }, HttpPageKey::Offset(offset)) if records >= load_size => offset
                .checked_add(records as u64)
                .map(HttpPageKey::Offset),
            (Self::Cursor { cursor_path, .. }, _) => extract_string(body, cursor_path)
                .filter(|cursor| !cursor.is_empty())
                .map(|cursor| HttpPageKey::Cursor(Some(cursor))),
            _ => None,
        }
    }
}

// ============================================================================
// Source Config
// ============================================================================

/// Configuration for an HTTP paging source
///
/// ```yaml
/// url: https://api.example.com/v1/users
/// records_path: $.data
/// strategy:
///   type: page_number
///   page_param: page
///   size_param: per_page
/// headers:
///   Authorization: Bearer abc
/// rate_limit:
///   requests_per_second: 5
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSourceConfig {
    /// Endpoint URL
    pub url: String,
    /// Path to the records (`$.data`, `$.data[*]`; `None` means the body is the array)
    #[serde(default)]
    pub records_path: Option<String>,
    /// Key strategy
    pub strategy: HttpPageStrategy,
    /// Extra query parameters sent with every load
    #[serde(default)]
    pub query: StringMap,
    /// Extra headers sent with every load
    #[serde(default)]
    pub headers: StringMap,
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Optional rate limit
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,
    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    format!("solidafy-paging/{}", env!("CARGO_PKG_VERSION"))
}

impl HttpSourceConfig {
    /// Create a config for `url` using `strategy`
    pub fn new(url: impl Into<String>, strategy: HttpPageStrategy) -> Self {
        Self {
            url: url.into(),
            records_path: None,
            strategy,
            query: StringMap::new(),
            headers: StringMap::new(),
            timeout_ms: default_timeout_ms(),
            rate_limit: None,
            user_agent: default_user_agent(),
        }
    }

    /// Set the records path
    #[must_use]
    pub fn with_records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = Some(path.into());
        self
    }

    /// Add a query parameter sent with every load
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header sent with every load
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Throttle loads
    #[must_use]
    pub fn with_rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }

    /// Parse a YAML config
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a config file, picking the format from its extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            Ok(serde_json::from_str(&contents)?)
        } else {
            Self::from_yaml_str(&contents)
        }
    }
}

// ============================================================================
// Source
// ============================================================================

/// Paging source backed by a JSON HTTP endpoint
///
/// Performs no retries of its own: a failed request surfaces as a load
/// failure and is retried only when the caller asks.
#[derive(Debug, Clone)]
pub struct HttpPagingSource {
    config: HttpSourceConfig,
    url: Url,
    client: Client,
    rate_limiter: Option<RateLimiter>,
}

impl HttpPagingSource {
    /// Create a source from its config
    pub fn new(config: HttpSourceConfig) -> Result<Self> {
        let url = Url::parse(&config.url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "unsupported URL scheme '{}' in {}",
                url.scheme(),
                config.url
            )));
        }
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            config,
            url,
            client,
            rate_limiter,
        })
    }

    /// Key of the first page
    pub fn initial_key(&self) -> HttpPageKey {
        self.config.strategy.initial_key()
    }

    /// Get the config
    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    /// Fetch one page, returning its records and the next key
    pub async fn fetch_page(
        &self,
        params: &LoadParams<HttpPageKey>,
    ) -> Result<(Vec<Value>, Option<HttpPageKey>)> {
        let key = params.key();
        let load_size = params.load_size();
        let page_params = self.config.strategy.query_params(key, load_size)?;

        if let Some(limiter) = &self.rate_limiter {
            limiter.wait().await;
        }

        let mut req = self.client.get(self.url.clone());
        for (name, value) in &self.config.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        let mut query: Vec<(String, String)> = self
            .config
            .query
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        query.extend(page_params);
        req = req.query(&query);

        debug!("Loading {} page {:?} from {}", params.load_type(), key, self.url);

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_ms: self.config.timeout_ms,
                }
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        let body: Value = response.json().await?;
        let records = extract_records(&body, self.config.records_path.as_deref())?;
        let next_key = self
            .config
            .strategy
            .next_key(key, load_size, records.len(), &body);

        debug!(
            "Loaded {} records, next key {:?}",
            records.len(),
            next_key
        );
        Ok((records, next_key))
    }
}

#[async_trait]
impl PagingSource<HttpPageKey, Value> for HttpPagingSource {
    async fn load(&self, params: LoadParams<HttpPageKey>) -> LoadResult<HttpPageKey, Value> {
        self.fetch_page(&params).await.into()
    }
}

// ============================================================================
// JSON helpers
// ============================================================================

/// Follow a dotted path (`$.data.items`, `data[-1]`) into a JSON value
///
/// A segment may end in `[n]`; negative indices count from the end.
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix('$').unwrap_or(path);
    let path = path.strip_prefix('.').unwrap_or(path);
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        let (name, index) = match part.split_once('[') {
            Some((name, rest)) => (name, Some(rest.strip_suffix(']')?.parse::<i64>().ok()?)),
            None => (part, None),
        };
        if !name.is_empty() {
            current = current.as_object()?.get(name)?;
        }
        if let Some(index) = index {
            let items = current.as_array()?;
            let position = if index < 0 {
                items.len().checked_sub(index.unsigned_abs() as usize)?
            } else {
                index as usize
            };
            current = items.get(position)?;
        }
    }
    Some(current)
}

/// Whether `path` needs a full JSONPath evaluation
fn needs_jsonpath(path: &str) -> bool {
    path.contains('*') || path.contains('?') || path.contains("..")
}

/// Evaluate a JSONPath expression, every match becoming one record
fn extract_with_jsonpath(body: &Value, path: &str) -> Result<Vec<Value>> {
    let jp = JsonPath::try_from(path).map_err(|e| Error::json_path(path, e.to_string()))?;
    match jp.find(body) {
        Value::Array(records) => Ok(records),
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![other]),
    }
}

/// Extract the records array
///
/// Wildcard, filter and recursive paths go through JSONPath. Plain paths are
/// walked directly: an array is the record list, an object a single record.
fn extract_records(body: &Value, path: Option<&str>) -> Result<Vec<Value>> {
    let path = path.unwrap_or("$");
    if needs_jsonpath(path) {
        return extract_with_jsonpath(body, path);
    }
    match lookup(body, path) {
        Some(Value::Array(records)) => Ok(records.clone()),
        Some(Value::Null) => Ok(Vec::new()),
        Some(record @ Value::Object(_)) => Ok(vec![record.clone()]),
        Some(other) => Err(Error::record_extraction(
            path,
            format!("expected an array, found {}", json_type_name(other)),
        )),
        None => Err(Error::record_extraction(path, "path not found in response")),
    }
}

/// Extract a scalar as a string
fn extract_string(body: &Value, path: &str) -> Option<String> {
    match lookup(body, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
