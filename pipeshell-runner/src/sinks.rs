//! Record sinks
//!
//! A sink receives encoded record bytes from a [`RecordLogger`](crate::RecordLogger).
//! Sinks are shared between the stdout and stderr capture tasks, so every
//! implementation must accept concurrent writes.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Destination for encoded records
pub trait RecordSink: Send + Sync {
    /// Writes the bytes and returns how many were accepted
    fn write(&self, bytes: &[u8]) -> io::Result<usize>;
}

/// Writes records to the process stdout
///
/// Writes block the calling runtime worker until stdout accepts the line.
/// Pass a custom sink through [`Shell::sink`](crate::Shell::sink) when stdout
/// may be a slow pipe.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl RecordSink for ConsoleSink {
    fn write(&self, bytes: &[u8]) -> io::Result<usize> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()?;
        Ok(bytes.len())
    }
}

/// Duplicates every write to all inner sinks
///
/// Each sink gets the write even if an earlier one failed; the first error
/// is returned after all sinks have been tried.
#[derive(Clone)]
pub struct FanOutSink {
    sinks: Vec<Arc<dyn RecordSink>>,
}

impl FanOutSink {
    pub fn new(sinks: Vec<Arc<dyn RecordSink>>) -> Self {
        Self { sinks }
    }
}

impl RecordSink for FanOutSink {
    fn write(&self, bytes: &[u8]) -> io::Result<usize> {
        let mut first_error = None;

        for sink in &self.sinks {
            if let Err(e) = sink.write(bytes) {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(bytes.len()),
        }
    }
}

/// Keeps every written byte in memory
///
/// Useful to capture records when running embedded or under test.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn contents(&self) -> Vec<u8> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Written content split into lines, lossily decoded
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.contents())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl RecordSink for MemorySink {
    fn write(&self, bytes: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(bytes);
        Ok(bytes.len())
    }
}
