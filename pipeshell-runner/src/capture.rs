//! Output stream capture
//!
//! Each output pipe of a child process is drained by its own task. Lines are
//! read as bytes and decoded lossily, so a tool that emits invalid UTF-8
//! does not stop the capture. Stdout lines become info records and stderr
//! lines become error records.

use pipeshell_core::LogLevel;
use std::fmt;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::logger::RecordLogger;

/// Which pipe a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    Stdout,
    Stderr,
}

impl StreamSource {
    /// Level assigned to every line read from this pipe
    pub fn level(self) -> LogLevel {
        match self {
            StreamSource::Stdout => LogLevel::Info,
            StreamSource::Stderr => LogLevel::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StreamSource::Stdout => "stdout",
            StreamSource::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads newline-terminated lines from an async byte stream
pub struct LineReader<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(stream: R) -> Self {
        Self {
            reader: BufReader::new(stream),
            buf: Vec::with_capacity(1024),
        }
    }

    /// Next line without its `\n` or `\r\n` terminator
    ///
    /// Returns `None` at end of stream. A read error also ends the sequence.
    pub async fn next_line(&mut self) -> Option<String> {
        self.buf.clear();

        match self.reader.read_until(b'\n', &mut self.buf).await {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(String::from_utf8_lossy(&self.buf).into_owned())
            }
            Err(e) => {
                debug!(error = %e, "output reader stopping on read error");
                None
            }
        }
    }
}

/// Spawns a task that logs every non-empty line of `stream`
///
/// The task ends when the pipe closes and yields the captured lines in the
/// order they were read.
///
/// # Arguments
/// * `stream` - Child pipe to drain
/// * `source` - Pipe identity, decides the record level
/// * `logger` - Logger shared with the other capture task
pub fn spawn_capture<R>(stream: R, source: StreamSource, logger: RecordLogger) -> JoinHandle<Vec<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = LineReader::new(stream);
        let mut lines = Vec::new();
        let level = source.level();

        while let Some(line) = reader.next_line().await {
            if line.is_empty() {
                continue;
            }
            logger.log(level, &line);
            lines.push(line);
        }

        debug!(stream = %source, lines = lines.len(), "capture task finished");
        lines
    })
}
