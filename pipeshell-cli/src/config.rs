//! Configuration module
//!
//! Handles the global CLI options: where records are forwarded and which
//! attributes they carry.

use anyhow::Result;
use pipeshell_runner::Shell;
use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Collector URL records are forwarded to, if any
    pub http_url: Option<String>,
    /// Forward only, without printing records locally
    pub http_only: bool,
    /// Headers sent with every forwarded record
    pub headers: Vec<(String, String)>,
    /// Attributes added to every record
    pub attributes: Vec<(String, String)>,
    /// Per-record delivery timeout
    pub http_timeout: Duration,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.http_only && self.http_url.is_none() {
            anyhow::bail!("--http-only requires --http-url or PIPESHELL_HTTP_URL");
        }

        if self.http_timeout.is_zero() {
            anyhow::bail!("--http-timeout must be greater than 0");
        }

        Ok(())
    }

    /// Applies the logging and forwarding options to a shell
    pub fn apply(&self, mut shell: Shell) -> Shell {
        for (key, value) in &self.attributes {
            shell = shell.log_kv(key, value);
        }
        for (key, value) in &self.headers {
            shell = shell.header(key, value);
        }

        shell = shell.http_timeout(self.http_timeout);

        match &self.http_url {
            Some(url) if self.http_only => shell.http_stream_only(url),
            Some(url) => shell.http_stream(url),
            None => shell,
        }
    }
}

/// Parses a `KEY=VALUE` pair
///
/// Only the first `=` separates key and value, so values may contain `=`.
pub fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;

    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{}'", s));
    }

    Ok((key.to_string(), value.to_string()))
}
