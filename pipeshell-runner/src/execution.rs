//! Execution types for a single command invocation
//!
//! These types only exist while a command runs and once it returns. They are
//! not persisted or sent over the network.

use std::fmt;
use tracing::debug;

/// Lifecycle of a streamed invocation
///
/// Variants are ordered; an invocation only ever moves to a later state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CaptureState {
    NotStarted,
    /// The process was spawned
    Started,
    /// Both pipes are being read
    StreamsOpen,
    /// The process exited; remaining deliveries are being drained
    Draining,
    /// Pipes reached end-of-stream and the dispatch writer is idle
    Completed,
}

impl CaptureState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureState::NotStarted => "not_started",
            CaptureState::Started => "started",
            CaptureState::StreamsOpen => "streams_open",
            CaptureState::Draining => "draining",
            CaptureState::Completed => "completed",
        }
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the state of one command invocation
#[derive(Debug)]
pub struct Invocation {
    command: String,
    state: CaptureState,
}

impl Invocation {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            state: CaptureState::NotStarted,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Moves to `next` if it is later than the current state
    ///
    /// Returns whether the transition happened.
    pub fn advance(&mut self, next: CaptureState) -> bool {
        if next <= self.state {
            debug!(
                command = %self.command,
                from = %self.state,
                to = %next,
                "ignoring backwards state transition"
            );
            return false;
        }

        debug!(command = %self.command, from = %self.state, to = %next, "invocation state");
        self.state = next;
        true
    }
}

/// Output of a streamed invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Exit code, `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Non-empty stdout lines joined with `\n`
    pub stdout: String,
    /// Non-empty stderr lines joined with `\n`
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}
