//! Record logger
//!
//! Turns captured lines into encoded records and hands them to a sink.

use pipeshell_core::{LogLevel, LogRecord, RecordFormat};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use crate::sinks::RecordSink;

/// Writes one encoded record per message to a shared sink
///
/// Cloning is cheap; the capture tasks for stdout and stderr each hold a
/// clone pointing at the same sink.
#[derive(Clone)]
pub struct RecordLogger {
    sink: Arc<dyn RecordSink>,
    format: Arc<RecordFormat>,
    attributes: Arc<BTreeMap<String, String>>,
}

impl RecordLogger {
    /// Creates a logger without attributes
    ///
    /// # Arguments
    /// * `sink` - Destination for encoded records
    /// * `format` - Field names used when encoding
    pub fn new(sink: Arc<dyn RecordSink>, format: RecordFormat) -> Self {
        Self {
            sink,
            format: Arc::new(format),
            attributes: Arc::new(BTreeMap::new()),
        }
    }

    /// Attaches key/value pairs added to every record
    pub fn with_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes = Arc::new(attributes);
        self
    }

    /// Encodes and writes a single record
    ///
    /// A failing sink is reported through tracing and otherwise ignored;
    /// logging never interrupts the command being captured.
    pub fn log(&self, level: LogLevel, message: &str) {
        let record = LogRecord::new(level, message).with_attributes((*self.attributes).clone());
        let line = self.format.encode(&record);

        if let Err(e) = self.sink.write(&line) {
            warn!(error = %e, level = %level, "failed to write log record");
        }
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}
