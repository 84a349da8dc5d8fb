//! Command builder and runner
//!
//! [`Shell`] collects the command, its environment and the logging setup,
//! then runs the command in one of two modes:
//!
//! - [`Shell::exec`] waits for the command and logs its whole stdout and
//!   stderr as one record each.
//! - [`Shell::stream`] logs every output line as its own record while the
//!   command runs.
//!
//! In both modes records go to the local sink (stdout by default) and, when
//! configured, are forwarded to a collector over HTTP. Forwarding failures
//! never change the outcome of the command.

use pipeshell_core::RecordFormat;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::capture::{StreamSource, spawn_capture};
use crate::config::{ForwardMode, ForwardingConfig};
use crate::error::{Result, ShellError};
use crate::execution::{CaptureState, CapturedOutput, Invocation};
use crate::logger::RecordLogger;
use crate::repository::HttpDelivery;
use crate::service::DispatchWriter;
use crate::sinks::{ConsoleSink, FanOutSink, RecordSink};

/// Builder for a single command and its logging pipeline
///
/// # Example
///
/// ```no_run
/// use pipeshell_runner::Shell;
///
/// # async fn run() -> pipeshell_runner::Result<()> {
/// let output = Shell::new()
///     .args(["cargo", "build", "--release"])
///     .log_kv("job", "release")
///     .http_stream("http://localhost:8080/logs")
///     .stream()
///     .await?;
///
/// assert!(output.success());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Shell {
    command: Option<String>,
    args: Vec<String>,
    dir: Option<PathBuf>,
    env: Vec<(String, String)>,
    log_kvs: BTreeMap<String, String>,
    http_target: Option<(String, ForwardMode)>,
    http_headers: Vec<(String, String)>,
    http_timeout: Duration,
    sink: Option<Arc<dyn RecordSink>>,
    format: RecordFormat,
}

impl Default for Shell {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            dir: None,
            env: Vec::new(),
            log_kvs: BTreeMap::new(),
            http_target: None,
            http_headers: Vec::new(),
            http_timeout: pipeshell_client::DEFAULT_TIMEOUT,
            sink: None,
            format: RecordFormat::default(),
        }
    }
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shell")
            .field("command", &self.command)
            .field("args", &self.args)
            .field("dir", &self.dir)
            .field("env", &self.env)
            .field("log_kvs", &self.log_kvs)
            .field("http_target", &self.http_target)
            .field("http_headers", &self.http_headers.len())
            .field("http_timeout", &self.http_timeout)
            .field("custom_sink", &self.sink.is_some())
            .field("format", &self.format)
            .finish()
    }
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an argument; the first one becomes the command
    ///
    /// An empty command counts as unset, so the next argument replaces it.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        let arg = arg.into();
        if self.command.as_deref().is_none_or(str::is_empty) {
            self.command = Some(arg);
        } else {
            self.args.push(arg);
        }
        self
    }

    /// Adds several arguments
    ///
    /// Without a command yet, the first item becomes the command. An empty
    /// iterator changes nothing.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Sets or replaces the command
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Working directory of the child; inherited when not set
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Adds an environment variable on top of the inherited environment
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Adds a static attribute to every record
    pub fn log_kv(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.log_kvs.insert(key.into(), value.into());
        self
    }

    pub fn clear_log_kv(mut self) -> Self {
        self.log_kvs.clear();
        self
    }

    /// Adds an HTTP header sent with every forwarded record
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.http_headers.push((key.into(), value.into()));
        self
    }

    /// Forwards records to `url` and keeps local output
    pub fn http_stream(mut self, url: impl Into<String>) -> Self {
        self.http_target = Some((url.into(), ForwardMode::Tee));
        self
    }

    /// Forwards records to `url` without local output
    pub fn http_stream_only(mut self, url: impl Into<String>) -> Self {
        self.http_target = Some((url.into(), ForwardMode::Only));
        self
    }

    /// Maximum time a single forwarded record may take
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Replaces the default stdout sink
    pub fn sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sets the record field names
    pub fn format(mut self, format: RecordFormat) -> Self {
        self.format = format;
        self
    }

    /// Forwarding configuration, if forwarding was requested
    pub fn forwarding(&self) -> Option<ForwardingConfig> {
        self.http_target.as_ref().map(|(url, mode)| ForwardingConfig {
            url: url.clone(),
            mode: *mode,
            timeout: self.http_timeout,
            headers: self.http_headers.clone(),
        })
    }

    /// Validates the configuration without running anything
    pub fn validate(&self) -> Result<()> {
        match &self.command {
            Some(command) if !command.is_empty() => {}
            _ => return Err(ShellError::NoCommand),
        }

        self.format.validate().map_err(ShellError::InvalidConfig)?;

        if let Some(forwarding) = self.forwarding() {
            forwarding.validate()?;
        }

        Ok(())
    }

    /// Runs the command to completion and logs its output in two records
    ///
    /// Stderr is logged first as one error record, then stdout as one info
    /// record; empty output is not logged. Returns the trimmed stdout.
    pub async fn exec(&self) -> Result<String> {
        self.validate()?;
        let (logger, writer) = self.pipeline()?;

        let result = self.run_buffered(&logger).await;

        if let Some(writer) = writer {
            writer.close().await;
        }

        result
    }

    /// Runs the command and logs every output line as it is produced
    ///
    /// Both pipes are read concurrently and fully drained before the exit
    /// status is collected. Forwarded records have all been delivered (or
    /// given up on) by the time this returns.
    pub async fn stream(&self) -> Result<CapturedOutput> {
        self.validate()?;
        let (logger, writer) = self.pipeline()?;
        let mut invocation = Invocation::new(self.display_command());

        let result = self.run_streaming(&logger, &mut invocation).await;

        if let Some(writer) = writer {
            writer.close().await;
        }
        if matches!(result, Ok(_) | Err(ShellError::Exit { .. })) {
            invocation.advance(CaptureState::Completed);
        }

        result
    }

    /// Builds the logger and, when forwarding, the dispatch writer behind it
    fn pipeline(&self) -> Result<(RecordLogger, Option<Arc<DispatchWriter>>)> {
        let local: Arc<dyn RecordSink> = match &self.sink {
            Some(sink) => Arc::clone(sink),
            None => Arc::new(ConsoleSink::new()),
        };

        let (sink, writer): (Arc<dyn RecordSink>, _) = match self.forwarding() {
            None => (local, None),
            Some(forwarding) => {
                let delivery = HttpDelivery::new(forwarding.client()?);
                let writer = Arc::new(DispatchWriter::new(Arc::new(delivery))?);
                let forwarded = Arc::clone(&writer) as Arc<dyn RecordSink>;

                let sink = match forwarding.mode {
                    ForwardMode::Tee => Arc::new(FanOutSink::new(vec![local, forwarded])) as Arc<dyn RecordSink>,
                    ForwardMode::Only => forwarded,
                };
                (sink, Some(writer))
            }
        };

        let logger = RecordLogger::new(sink, self.format.clone()).with_attributes(self.log_kvs.clone());
        Ok((logger, writer))
    }

    fn build_command(&self) -> Command {
        let program = self.command.as_deref().unwrap_or_default();
        let mut command = Command::new(program);

        command
            .args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }

        command
    }

    fn display_command(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.extend(self.command.as_deref());
        parts.extend(self.args.iter().map(String::as_str));
        parts.join(" ")
    }

    async fn run_buffered(&self, logger: &RecordLogger) -> Result<String> {
        let command = self.display_command();
        let child = self
            .build_command()
            .spawn()
            .map_err(|source| ShellError::Spawn {
                command: command.clone(),
                source,
            })?;
        info!(command = %command, pid = ?child.id(), "command started");

        let output = child.wait_with_output().await.map_err(ShellError::Wait)?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !stderr.is_empty() {
            logger.error(&stderr);
        }
        if !stdout.is_empty() {
            logger.info(&stdout);
        }

        let code = output.status.code();
        info!(command = %command, code = ?code, "command exited");

        if !output.status.success() {
            return Err(ShellError::Exit {
                command,
                code,
                stdout,
                stderr,
            });
        }

        Ok(stdout)
    }

    async fn run_streaming(
        &self,
        logger: &RecordLogger,
        invocation: &mut Invocation,
    ) -> Result<CapturedOutput> {
        let mut child = self
            .build_command()
            .spawn()
            .map_err(|source| ShellError::Spawn {
                command: invocation.command().to_string(),
                source,
            })?;
        info!(command = %invocation.command(), pid = ?child.id(), "command started");
        invocation.advance(CaptureState::Started);

        let stdout = child.stdout.take().ok_or(ShellError::MissingPipe("stdout"))?;
        let stderr = child.stderr.take().ok_or(ShellError::MissingPipe("stderr"))?;

        let stdout_task = spawn_capture(stdout, StreamSource::Stdout, logger.clone());
        let stderr_task = spawn_capture(stderr, StreamSource::Stderr, logger.clone());
        invocation.advance(CaptureState::StreamsOpen);

        let (stdout_lines, stderr_lines) = tokio::join!(
            join_capture(stdout_task, StreamSource::Stdout),
            join_capture(stderr_task, StreamSource::Stderr),
        );

        let status = child.wait().await.map_err(ShellError::Wait)?;
        invocation.advance(CaptureState::Draining);

        let output = CapturedOutput {
            exit_code: status.code(),
            stdout: stdout_lines.join("\n"),
            stderr: stderr_lines.join("\n"),
        };
        info!(command = %invocation.command(), code = ?output.exit_code, "command exited");

        if !status.success() {
            return Err(ShellError::Exit {
                command: invocation.command().to_string(),
                code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        Ok(output)
    }
}

async fn join_capture(task: JoinHandle<Vec<String>>, source: StreamSource) -> Vec<String> {
    match task.await {
        Ok(lines) => lines,
        Err(e) => {
            warn!(stream = %source, error = %e, "capture task failed");
            Vec::new()
        }
    }
}
