//! Error types for running commands

use pipeshell_client::ClientError;
use std::io;
use thiserror::Error;

/// Result type alias for runner operations
pub type Result<T> = std::result::Result<T, ShellError>;

/// Errors surfaced to the caller of [`Shell::exec`](crate::Shell::exec) and
/// [`Shell::stream`](crate::Shell::stream)
///
/// Only process-level conditions end up here. Delivery failures towards a
/// collector are logged by the dispatch writer and never reach the caller.
#[derive(Debug, Error)]
pub enum ShellError {
    /// No command was configured
    #[error("no command specified - use arg() or command() to set the command")]
    NoCommand,

    /// The configuration was rejected before anything was started
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The collector client could not be built from the configuration
    #[error("invalid HTTP stream configuration: {0}")]
    Client(#[from] ClientError),

    /// HTTP streaming was requested outside of a Tokio runtime
    #[error("HTTP streaming requires a running Tokio runtime")]
    NoRuntime,

    /// The process could not be started (binary missing, permission denied, ...)
    #[error("failed to start command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// A requested output pipe was not available on the child
    #[error("failed to open {0} pipe")]
    MissingPipe(&'static str),

    /// Waiting for the process failed
    #[error("failed waiting for command: {0}")]
    Wait(#[source] io::Error),

    /// The process ran and exited unsuccessfully
    #[error("command '{command}' failed with {}", describe_exit(.code))]
    Exit {
        command: String,
        /// Exit code, `None` when the process was terminated by a signal
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

impl ShellError {
    /// Check if the command ran but exited unsuccessfully
    pub fn is_exit(&self) -> bool {
        matches!(self, Self::Exit { .. })
    }

    /// Check if the command could not be started at all
    pub fn is_spawn(&self) -> bool {
        matches!(self, Self::Spawn { .. })
    }

    /// Exit code of an unsuccessful run, if the process reported one
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exit { code, .. } => *code,
            _ => None,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
