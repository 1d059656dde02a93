//! Entry point for lso.
//!
//! This file handles high-level application flow:
//! 1. Parse command-line arguments using `clap`.
//! 2. Install the `tracing` subscriber on standard error.
//! 3. List a single file, or scan a directory tree.
//! 4. Print the rendered listing, or `Error: ...` and exit with status 1.

use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use lso::config::Config;
use lso::output::format_output;
use lso::{parse_shared_object, scan, Error, ScanResult};

fn main() -> ExitCode {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .with_writer(io::stderr)
        .init();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!("{:?}", err);
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<()> {
    let path = &config.path;

    let result = if path.is_file() {
        // Single files are always listed as plain, sorted names.
        ScanResult::Names(parse_shared_object(path, config.include_static)?)
    } else if path.is_dir() {
        scan(path, config.include_static, config.verbose)?
    } else {
        return Err(Error::not_found(path).into());
    };

    let output = format_output(&result);
    if !output.is_empty() {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", output)?;
        stdout.flush()?;
    }
    Ok(())
}
