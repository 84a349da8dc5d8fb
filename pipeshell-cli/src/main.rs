//! Pipeshell CLI
//!
//! Runs a command and turns its output into JSON log records, optionally
//! forwarding them to a collector.

mod commands;
mod config;

use clap::Parser;
use colored::*;
use commands::{Commands, handle_command};
use config::{Config, parse_key_value};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pipeshell")]
#[command(about = "Run commands with structured, forwardable logs", long_about = None)]
struct Cli {
    /// Collector URL records are forwarded to
    #[arg(long, env = "PIPESHELL_HTTP_URL")]
    http_url: Option<String>,

    /// Forward records only, without printing them locally
    #[arg(long)]
    http_only: bool,

    /// HTTP header sent with every record (KEY=VALUE), can be repeated
    #[arg(short = 'H', long = "header", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    headers: Vec<(String, String)>,

    /// Attribute added to every record (KEY=VALUE), can be repeated
    #[arg(long = "kv", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    attributes: Vec<(String, String)>,

    /// Timeout for a single record delivery, in seconds
    #[arg(long, default_value_t = 30)]
    http_timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            http_url: self.http_url.clone(),
            http_only: self.http_only,
            headers: self.headers.clone(),
            attributes: self.attributes.clone(),
            http_timeout: Duration::from_secs(self.http_timeout),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Records own stdout; diagnostics go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    let result = match config.validate() {
        Ok(()) => handle_command(cli.command, &config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stream_command() {
        let cli = Cli::try_parse_from([
            "pipeshell",
            "--http-url",
            "http://localhost:8080/logs",
            "-H",
            "Authorization=Bearer secret",
            "--kv",
            "job=build",
            "stream",
            "--env",
            "RUST_LOG=debug",
            "--",
            "cargo",
            "build",
            "--release",
        ])
        .unwrap();

        let config = cli.config();
        assert_eq!(config.http_url.as_deref(), Some("http://localhost:8080/logs"));
        assert_eq!(
            config.headers,
            vec![("Authorization".to_string(), "Bearer secret".to_string())]
        );
        assert_eq!(config.attributes, vec![("job".to_string(), "build".to_string())]);
        assert_eq!(config.http_timeout, Duration::from_secs(30));

        match cli.command {
            Commands::Stream(args) => {
                assert_eq!(args.command, vec!["cargo", "build", "--release"]);
                assert_eq!(args.env, vec![("RUST_LOG".to_string(), "debug".to_string())]);
            }
            Commands::Exec(_) => panic!("expected stream command"),
        }
    }

    #[test]
    fn test_command_is_required() {
        assert!(Cli::try_parse_from(["pipeshell", "exec"]).is_err());
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        assert!(Cli::try_parse_from(["pipeshell", "-H", "novalue", "exec", "--", "true"]).is_err());
    }
}
