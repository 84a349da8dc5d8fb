//! Collector configuration

/// Default listen address
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Collector configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Address the HTTP server listens on (e.g., "0.0.0.0:8080")
    pub bind_addr: String,
}

impl CollectorConfig {
    pub fn new(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - COLLECTOR_BIND_ADDR (optional, default: 0.0.0.0:8080)
    pub fn from_env() -> Self {
        Self::from_bind_addr(std::env::var("COLLECTOR_BIND_ADDR").ok())
    }

    fn from_bind_addr(bind_addr: Option<String>) -> Self {
        match bind_addr {
            Some(addr) if !addr.trim().is_empty() => Self::new(addr.trim()),
            _ => Self::default(),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        let Some((host, port)) = self.bind_addr.rsplit_once(':') else {
            anyhow::bail!("bind_addr must be in host:port form, got '{}'", self.bind_addr);
        };

        if host.is_empty() {
            anyhow::bail!("bind_addr host cannot be empty");
        }

        if port.parse::<u16>().is_err() {
            anyhow::bail!("bind_addr port must be a number between 0 and 65535, got '{}'", port);
        }

        Ok(())
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BIND_ADDR)
    }
}
