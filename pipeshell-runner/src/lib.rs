//! Pipeshell Runner
//!
//! Runs external commands and turns their output into structured log
//! records, optionally forwarding every record to an HTTP collector.
//!
//! The crate is organized in layers:
//! - Repository: stateless HTTP delivery of single records
//! - Service: record framing and the dispatch writer that tracks deliveries
//! - Capture: one reading task per output pipe
//! - Shell: the command builder tying everything together
//!
//! # Example
//!
//! ```no_run
//! use pipeshell_runner::Shell;
//!
//! # async fn run() -> pipeshell_runner::Result<()> {
//! let stdout = Shell::new()
//!     .args(["git", "rev-parse", "HEAD"])
//!     .http_stream_only("http://localhost:8080/logs")
//!     .exec()
//!     .await?;
//! println!("{}", stdout);
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod execution;
pub mod logger;
pub mod repository;
pub mod service;
pub mod shell;
pub mod sinks;

pub use config::{ForwardMode, ForwardingConfig};
pub use error::{Result, ShellError};
pub use execution::{CaptureState, CapturedOutput};
pub use logger::RecordLogger;
pub use service::{DispatchWriter, RecordFramer};
pub use shell::Shell;
pub use sinks::{ConsoleSink, FanOutSink, MemorySink, RecordSink};
