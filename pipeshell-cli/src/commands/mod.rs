//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod run;

pub use run::RunArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a command and log its whole stdout and stderr once it exits
    Exec(RunArgs),
    /// Run a command and log every output line as it is produced
    Stream(RunArgs),
}

/// Handle a CLI command
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
///
/// # Returns
/// The exit code the CLI should terminate with
pub async fn handle_command(command: Commands, config: &Config) -> Result<i32> {
    match command {
        Commands::Exec(args) => run::handle_exec(args, config).await,
        Commands::Stream(args) => run::handle_stream(args, config).await,
    }
}
