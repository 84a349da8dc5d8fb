//! Pipeshell Core
//!
//! Core types shared by the pipeshell crates.
//!
//! This crate contains:
//! - Domain types: log records and levels produced from process output
//! - Record format: how a record is encoded as one JSON line

pub mod domain;
pub mod format;

pub use domain::log::{LogLevel, LogRecord};
pub use format::RecordFormat;
