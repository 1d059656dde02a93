//! Error types.
//!
//! `ElfError` describes what is wrong with the bytes of a single file.
//! `Error` is what the public operations return: either the path does not
//! exist, or it exists but could not be interpreted as ELF.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Format-level failures raised while reading an ELF image.
#[derive(Error, Debug)]
pub enum ElfError {
    #[error("failed to read file")]
    Io(#[from] std::io::Error),
    #[error("file is too short to hold an ELF identification header")]
    TooShort,
    #[error("bad ELF magic")]
    BadMagic,
    #[error("unsupported ELF class: {0}")]
    UnsupportedClass(u8),
    #[error("unsupported ELF data encoding: {0}")]
    UnsupportedEncoding(u8),
    #[error("malformed ELF headers: {0}")]
    Malformed(#[from] object::read::Error),
    #[error("section {index} does not exist")]
    MissingSection { index: usize },
    #[error("section {index} extends beyond the end of the file")]
    SectionOutOfBounds { index: usize },
    #[error("section {index} has invalid entry size {entsize}")]
    BadEntrySize { index: usize, entsize: u64 },
    #[error("symbol {index} could not be decoded")]
    BadSymbol { index: usize },
    #[error("symbol {index} has name offset {offset} outside its string table")]
    BadSymbolName { index: usize, offset: u32 },
}

/// Errors returned by the public operations of this crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Invalid ELF file: {}", .path.display())]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: ElfError,
    },
}

impl Error {
    pub fn not_found(path: &Path) -> Self {
        Error::NotFound(path.to_path_buf())
    }

    pub fn invalid_format(path: &Path, source: impl Into<ElfError>) -> Self {
        Error::InvalidFormat {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    pub fn is_invalid_format(&self) -> bool {
        matches!(self, Error::InvalidFormat { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
