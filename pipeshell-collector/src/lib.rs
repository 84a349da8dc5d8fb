//! Pipeshell Collector
//!
//! A minimal HTTP endpoint that receives forwarded log records and copies
//! each request body verbatim to an ingest sink. It never rejects a record:
//! every ingest route answers `200 OK`.

pub mod api;
pub mod config;
pub mod ingest;

pub use api::create_router;
pub use config::CollectorConfig;
pub use ingest::{IngestSink, MemoryIngest, StdoutIngest};
