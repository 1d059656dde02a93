//! Shared object function lister.
//!
//! This library provides the components behind the `lso` tool.
//! It is organized into several modules:
//! - `config`: CLI configuration.
//! - `elf`: ELF header and section table reading.
//! - `symbol`: Symbol table decoding and function classification.
//! - `discover`: Recursive shared object discovery.
//! - `scanner`: Per-file and per-directory listing.
//! - `output`: Rendering of listings.
//! - `error`: Error kinds.

pub mod config;
pub mod discover;
pub mod elf;
pub mod error;
pub mod output;
pub mod scanner;
pub mod symbol;

pub use error::{ElfError, Error, Result};
pub use scanner::{parse_shared_object, scan, ScanResult};
