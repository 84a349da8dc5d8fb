//! Ingest sinks
//!
//! Where the collector puts the bodies it receives.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Destination for received request bodies
pub trait IngestSink: Send + Sync {
    /// Stores one body exactly as received
    fn ingest(&self, body: &[u8]) -> io::Result<()>;
}

/// Copies bodies to the process stdout, one per line
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutIngest;

impl StdoutIngest {
    pub fn new() -> Self {
        Self
    }
}

impl IngestSink for StdoutIngest {
    fn ingest(&self, body: &[u8]) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(body)?;
        if body.last() != Some(&b'\n') {
            stdout.write_all(b"\n")?;
        }
        stdout.flush()
    }
}

/// Keeps received bodies in memory, in arrival order
#[derive(Debug, Default, Clone)]
pub struct MemoryIngest {
    bodies: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MemoryIngest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bodies received so far, lossily decoded
    pub fn bodies(&self) -> Vec<String> {
        self.bodies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bodies.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IngestSink for MemoryIngest {
    fn ingest(&self, body: &[u8]) -> io::Result<()> {
        self.bodies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(body.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_ingest_keeps_bodies_verbatim() {
        let sink = MemoryIngest::new();
        assert!(sink.is_empty());

        sink.ingest(b"{\"msg\":\"a\"}").unwrap();
        sink.ingest(b"not json at all\n").unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.bodies(), vec!["{\"msg\":\"a\"}", "not json at all\n"]);
    }

    #[test]
    fn test_memory_ingest_clones_share_storage() {
        let sink = MemoryIngest::new();
        let clone = sink.clone();

        clone.ingest(b"shared").unwrap();
        assert_eq!(sink.bodies(), vec!["shared"]);
    }
}
