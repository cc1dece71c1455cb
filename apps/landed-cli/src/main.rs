//! # Landed CLI
//!
//! Runs landed-core operations over JSON documents.
//!
//! ## Usage
//! ```text
//! landed [--config PATH] <command> [FILE|-]
//!
//!   price       pricing record(s)             → outcome(s)
//!   allocate    { shipment, pricing_mode, allocation }
//!   rollup      { status, items, allocations }
//!   transition  { kind, from, to }
//!   claims      { email, profile? }
//! ```
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          landed (binary)                                │
//! │                                                                         │
//! │  args ──► CliConfig::load ──► tracing (stderr)                          │
//! │                                                                         │
//! │  FILE | stdin ──► serde_json ──► commands::run ──► stdout               │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                                   landed-core                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Exit status is non-zero only for usage, I/O, JSON, config or domain
//! errors. A pricing record that fails validation is a normal result.

mod commands;
mod config;
mod error;

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::commands::Command;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

const USAGE: &str = "landed [--config PATH] <price|allocate|rollup|transition|claims> [FILE|-]";

/// Parsed command-line arguments.
#[derive(Debug, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    command: Command,
    /// `None` reads stdin.
    input: Option<PathBuf>,
}

impl Args {
    fn parse<I>(args: I) -> CliResult<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = None;
        let mut positional = Vec::new();

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = iter
                        .next()
                        .ok_or_else(|| CliError::Usage(format!("--config needs a path\n{USAGE}")))?;
                    config = Some(PathBuf::from(path));
                }
                "-h" | "--help" => return Err(CliError::Usage(USAGE.to_string())),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let command = positional
            .next()
            .ok_or_else(|| CliError::Usage(USAGE.to_string()))?
            .parse()?;
        let input = match positional.next() {
            Some(p) if p == "-" => None,
            Some(p) => Some(PathBuf::from(p)),
            None => None,
        };
        if let Some(extra) = positional.next() {
            return Err(CliError::Usage(format!("unexpected argument '{extra}'\n{USAGE}")));
        }

        Ok(Args {
            config,
            command,
            input,
        })
    }
}

fn read_document(input: Option<&PathBuf>) -> CliResult<Value> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        })?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(CliError::Stdin)?;
            buf
        }
    };
    Ok(serde_json::from_str(&text)?)
}

fn init_tracing(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse(std::env::args().skip(1))?;

    let config = CliConfig::load(args.config.clone()).context("Failed to load configuration")?;
    init_tracing(&config);

    info!(command = %args.command, input = ?args.input, "Starting landed");

    let doc = read_document(args.input.as_ref())?;
    let output = commands::run(args.command, doc, &config.shipment_defaults)?;

    let rendered = if config.output.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> CliResult<Args> {
        Args::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_command_and_file() {
        let parsed = args(&["--config", "/tmp/l.toml", "price", "order.json"]).unwrap();
        assert_eq!(
            parsed,
            Args {
                config: Some(PathBuf::from("/tmp/l.toml")),
                command: Command::Price,
                input: Some(PathBuf::from("order.json")),
            }
        );
    }

    #[test]
    fn test_dash_reads_stdin() {
        let parsed = args(&["rollup", "-"]).unwrap();
        assert_eq!(parsed.command, Command::Rollup);
        assert_eq!(parsed.input, None);
        assert_eq!(args(&["claims"]).unwrap().input, None);
    }

    #[test]
    fn test_usage_errors() {
        assert!(matches!(args(&[]), Err(CliError::Usage(_))));
        assert!(matches!(args(&["--config"]), Err(CliError::Usage(_))));
        assert!(matches!(args(&["bill"]), Err(CliError::Usage(_))));
        assert!(matches!(args(&["price", "a.json", "b.json"]), Err(CliError::Usage(_))));
    }

    #[test]
    fn test_read_missing_file() {
        let path = PathBuf::from("/definitely/not/here.json");
        assert!(matches!(read_document(Some(&path)), Err(CliError::Read { .. })));
    }
}
