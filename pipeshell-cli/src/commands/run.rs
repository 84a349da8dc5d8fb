//! Command execution
//!
//! Runs the child command through a [`Shell`] and reports the outcome.

use anyhow::Result;
use clap::Args;
use colored::*;
use pipeshell_runner::{Shell, ShellError};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::{Config, parse_key_value};

/// Arguments shared by `exec` and `stream`
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Working directory of the command
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Extra environment variable (KEY=VALUE), can be repeated
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub env: Vec<(String, String)>,

    /// Command to run followed by its arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl RunArgs {
    fn shell(&self, config: &Config) -> Shell {
        let mut shell = Shell::new().args(self.command.iter().cloned());

        if let Some(dir) = &self.dir {
            shell = shell.dir(dir);
        }
        for (key, value) in &self.env {
            shell = shell.env(key, value);
        }

        config.apply(shell)
    }

    fn display(&self) -> String {
        self.command.join(" ")
    }
}

/// Runs the command in buffered mode and prints its stdout
pub async fn handle_exec(args: RunArgs, config: &Config) -> Result<i32> {
    let shell = args.shell(config);
    let started = Instant::now();

    match shell.exec().await {
        Ok(stdout) => {
            if !stdout.is_empty() {
                println!("{}", stdout);
            }
            print_success(&args.display(), started.elapsed());
            Ok(0)
        }
        Err(e) => report_failure(&args.display(), e, started.elapsed()),
    }
}

/// Runs the command in streaming mode
pub async fn handle_stream(args: RunArgs, config: &Config) -> Result<i32> {
    let shell = args.shell(config);
    let started = Instant::now();

    match shell.stream().await {
        Ok(_) => {
            print_success(&args.display(), started.elapsed());
            Ok(0)
        }
        Err(e) => report_failure(&args.display(), e, started.elapsed()),
    }
}

fn print_success(command: &str, elapsed: Duration) {
    eprintln!(
        "{} {} {}",
        "✓".green(),
        command.bold(),
        format!("({:.2?})", elapsed).dimmed()
    );
}

/// Turns an unsuccessful exit into the mirrored exit code; any other error
/// is returned to the caller
fn report_failure(command: &str, error: ShellError, elapsed: Duration) -> Result<i32> {
    match error {
        ShellError::Exit { code, .. } => {
            let status = match code {
                Some(code) => format!("exited with code {}", code),
                None => "terminated by signal".to_string(),
            };
            eprintln!(
                "{} {} {} {}",
                "✗".red(),
                command.bold(),
                status.red(),
                format!("({:.2?})", elapsed).dimmed()
            );
            Ok(code.unwrap_or(1))
        }
        other => Err(other.into()),
    }
}
