//! Forwarding configuration
//!
//! Describes where records are forwarded, how long a single delivery may
//! take and which headers accompany each request.

use pipeshell_client::{CollectorClient, DEFAULT_TIMEOUT};
use std::time::Duration;

use crate::error::{Result, ShellError};

/// How forwarded records relate to local output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardMode {
    /// Keep writing to the local sink and forward as well
    Tee,
    /// Forward only, nothing is written locally
    Only,
}

/// Forwarding configuration
#[derive(Debug, Clone)]
pub struct ForwardingConfig {
    /// Collector URL records are posted to (e.g., "http://localhost:8080/logs")
    pub url: String,

    pub mode: ForwardMode,

    /// Maximum time a single delivery may take
    pub timeout: Duration,

    /// Extra headers, applied in order after the default content type
    pub headers: Vec<(String, String)>,
}

impl ForwardingConfig {
    /// Creates a configuration with the default timeout and no headers
    pub fn new(url: impl Into<String>, mode: ForwardMode) -> Self {
        Self {
            url: url.into(),
            mode,
            timeout: DEFAULT_TIMEOUT,
            headers: Vec::new(),
        }
    }

    /// Adds a header sent with every record
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(ShellError::InvalidConfig(
                "HTTP stream URL cannot be empty".to_string(),
            ));
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ShellError::InvalidConfig(format!(
                "HTTP stream URL must start with http:// or https://, got '{}'",
                self.url
            )));
        }

        if self.timeout.is_zero() {
            return Err(ShellError::InvalidConfig(
                "HTTP stream timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Builds the collector client described by this configuration
    pub fn client(&self) -> Result<CollectorClient> {
        self.validate()?;

        let client = CollectorClient::builder(self.url.clone())
            .timeout(self.timeout)
            .headers(self.headers.iter().cloned())
            .build()?;

        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_forwarding_config() {
        let config = ForwardingConfig::new("http://localhost:8080/logs", ForwardMode::Tee);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.headers.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_forwarding_config_validation() {
        let mut config = ForwardingConfig::new("http://localhost:8080/logs", ForwardMode::Only);

        // Valid config should pass
        assert!(config.validate().is_ok());

        // Empty URL should fail
        config.url = String::new();
        assert!(config.validate().is_err());

        // Invalid scheme should fail
        config.url = "ftp://localhost/logs".to_string();
        assert!(matches!(config.validate(), Err(ShellError::InvalidConfig(_))));

        config.url = "https://collector.example.com/logs".to_string();
        assert!(config.validate().is_ok());

        // Zero timeout should fail
        config.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_client_carries_headers() {
        let config = ForwardingConfig::new("http://localhost:8080/logs/auth", ForwardMode::Tee)
            .with_header("Authorization", "Bearer secret")
            .with_header("X-Source", "ci");

        let client = config.client().unwrap();

        assert_eq!(client.endpoint(), "http://localhost:8080/logs/auth");
        assert_eq!(client.headers()["authorization"], "Bearer secret");
        assert_eq!(client.headers()["x-source"], "ci");
        assert_eq!(client.headers()["content-type"], "application/json");
    }

    #[test]
    fn test_client_rejects_invalid_header() {
        let config = ForwardingConfig::new("http://localhost:8080/logs", ForwardMode::Only)
            .with_header("bad header", "value");

        assert!(matches!(config.client(), Err(ShellError::Client(_))));
    }
}
