//! Log domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A log record produced from one line of process output
///
/// Records are immutable once built. They are encoded exactly once by a
/// [`RecordFormat`](crate::format::RecordFormat) and then dropped; the
/// encoded shape is defined there, not by this struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Unix timestamp in seconds
    pub timestamp: i64,
    pub level: LogLevel,
    pub message: String,
    /// Static key/value attributes merged into the encoded record
    pub attributes: BTreeMap<String, String>,
}

impl LogRecord {
    /// Creates a record stamped with the current time
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp(),
            level,
            message: message.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Attaches static attributes to the record
    pub fn with_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
