//! Pipeshell HTTP Client
//!
//! A small HTTP client that delivers framed log records to a collector.
//!
//! Every record is sent as its own POST request with a JSON content type and
//! any static headers configured on the client. The client reports failures
//! through [`ClientError`]; deciding what to do with them (the runner logs
//! and drops them) is left to the caller.
//!
//! # Example
//!
//! ```no_run
//! use pipeshell_client::CollectorClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = CollectorClient::builder("http://localhost:8080/logs")
//!         .header("Authorization", "Bearer secret")
//!         .build()?;
//!
//!     client
//!         .send_record(br#"{"level":"info","msg":"hello"}"#.to_vec())
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod error;
mod records;

pub use error::{ClientError, Result};

use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Content type declared on every record
pub const RECORD_CONTENT_TYPE: &str = "application/json";

/// HTTP client for a single collector endpoint
#[derive(Debug, Clone)]
pub struct CollectorClient {
    /// Full URL records are posted to (e.g., "http://localhost:8080/logs")
    endpoint: String,
    /// HTTP client instance
    client: Client,
    /// Headers attached to every request
    headers: HeaderMap,
}

impl CollectorClient {
    /// Create a client with the default timeout and no extra headers
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::builder(endpoint).build()
    }

    /// Start building a client for the given endpoint
    pub fn builder(endpoint: impl Into<String>) -> CollectorClientBuilder {
        CollectorClientBuilder {
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
            headers: Vec::new(),
        }
    }

    /// Create a collector client with a custom HTTP client
    ///
    /// This allows you to configure proxies, TLS settings, etc. The timeout of
    /// the given client is used as-is.
    ///
    /// # Example
    /// ```
    /// use pipeshell_client::CollectorClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(10))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = CollectorClient::with_client("http://localhost:8080/logs", http_client).unwrap();
    /// ```
    pub fn with_client(endpoint: impl Into<String>, client: Client) -> Result<Self> {
        let endpoint = endpoint.into();
        validate_endpoint(&endpoint)?;

        Ok(Self {
            endpoint,
            client,
            headers: merge_headers(&[])?,
        })
    }

    /// Get the endpoint records are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get the headers sent with every record
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Builder for [`CollectorClient`]
#[derive(Debug, Clone)]
pub struct CollectorClientBuilder {
    endpoint: String,
    timeout: Duration,
    headers: Vec<(String, String)>,
}

impl CollectorClientBuilder {
    /// Sets the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a static header; a later header with the same name replaces it
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds several static headers in order
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Validates the endpoint and headers and builds the client
    pub fn build(self) -> Result<CollectorClient> {
        validate_endpoint(&self.endpoint)?;

        if self.timeout.is_zero() {
            return Err(ClientError::InvalidRequest(
                "timeout must be greater than 0".to_string(),
            ));
        }

        let headers = merge_headers(&self.headers)?;
        let client = Client::builder().timeout(self.timeout).build()?;

        Ok(CollectorClient {
            endpoint: self.endpoint,
            client,
            headers,
        })
    }
}

fn validate_endpoint(endpoint: &str) -> Result<()> {
    let url = reqwest::Url::parse(endpoint)
        .map_err(|e| ClientError::InvalidRequest(format!("invalid endpoint '{}': {}", endpoint, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ClientError::InvalidRequest(format!(
            "endpoint must use http or https, got '{}'",
            other
        ))),
    }
}

/// Builds the request headers: the JSON content type first, then the caller's
/// headers in order, each replacing any earlier value of the same name.
fn merge_headers(extra: &[(String, String)]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(RECORD_CONTENT_TYPE));

    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClientError::InvalidRequest(format!("invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            ClientError::InvalidRequest(format!("invalid value for header '{}': {}", name, e))
        })?;
        headers.insert(name, value);
    }

    Ok(headers)
}
