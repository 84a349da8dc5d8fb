//! Core domain types
//!
//! This module contains the domain structures shared between the runner
//! (which produces records from process output), the CLI, and the collector.

pub mod log;
