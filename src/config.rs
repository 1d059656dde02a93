//! Configuration module.
//!
//! This module defines the command-line interface (CLI) using `clap`.
//! It decodes the path to inspect and the flags that shape the listing.

use clap::Parser;
use std::path::PathBuf;

/// List functions exported by shared objects.
///
/// Given a single ELF file, prints its function symbols sorted by name.
/// Given a directory, scans every `*.so` and `*.so.*` file beneath it.
#[derive(Parser, Debug)]
#[command(name = "lso", author, version, about, long_about = None)]
pub struct Config {
    /// Path to a shared object or a directory
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Include static/local functions
    #[arg(short = 's', long = "static")]
    pub include_static: bool,

    /// Prefix each function with the file it was found in (directories only)
    #[arg(short, long)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", help = "Set the logging level")]
    pub log_level: String,
}
