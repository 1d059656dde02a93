//! Symbol listing for single files and directory trees.
//!
//! A single file runs the whole pipeline: map, validate, pick the symbol
//! table, decode, classify. A directory scan runs it for every discovered
//! shared object and drops the files that fail.

use std::path::{Path, PathBuf};

use crate::discover::find_shared_objects;
use crate::elf::ElfFile;
use crate::error::{Error, Result};
use crate::symbol::{classify, decode_symbols};

/// Aggregated output of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanResult {
    /// Function names of every file, concatenated in discovery order.
    Names(Vec<String>),
    /// `(file, function)` pairs in discovery order.
    Annotated(Vec<(PathBuf, String)>),
}

impl ScanResult {
    pub fn new(verbose: bool) -> Self {
        if verbose {
            ScanResult::Annotated(Vec::new())
        } else {
            ScanResult::Names(Vec::new())
        }
    }

    /// Appends the functions found in `path`.
    pub fn extend(&mut self, path: &Path, functions: Vec<String>) {
        match self {
            ScanResult::Names(names) => names.extend(functions),
            ScanResult::Annotated(pairs) => pairs.extend(
                functions
                    .into_iter()
                    .map(|name| (path.to_path_buf(), name)),
            ),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ScanResult::Names(names) => names.len(),
            ScanResult::Annotated(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lists the function symbols of one ELF file in symbol table order.
///
/// A file with neither `.symtab` nor `.dynsym` lists nothing.
pub fn parse_shared_object(path: impl AsRef<Path>, include_static: bool) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = ElfFile::open(path)?;
    let image = file.image()?;

    let Some(symtab) = image.symbol_table() else {
        tracing::trace!("{} has no symbol table", file.path().display());
        return Ok(Vec::new());
    };
    tracing::trace!("Reading {} from {}", symtab.name(), path.display());

    let records = decode_symbols(&image, symtab)
        .and_then(|symbols| symbols.collect::<Result<Vec<_>, _>>())
        .map_err(|e| Error::invalid_format(path, e))?;
    Ok(classify(records, include_static))
}

/// Lists the function symbols of every shared object under `root`.
///
/// Files that cannot be read as ELF are skipped; only a missing `root`
/// fails the scan.
pub fn scan(root: impl AsRef<Path>, include_static: bool, verbose: bool) -> Result<ScanResult> {
    let root = root.as_ref();
    if !root.exists() {
        return Err(Error::not_found(root));
    }

    let mut result = ScanResult::new(verbose);
    for path in find_shared_objects(root)? {
        match parse_shared_object(&path, include_static) {
            Ok(functions) => result.extend(&path, functions),
            Err(Error::InvalidFormat { source, .. }) => {
                tracing::debug!("Skipping {}: {}", path.display(), source);
            }
            // Dangling symlink, or removed after discovery.
            Err(Error::NotFound(_)) => {
                tracing::debug!("Skipping {}: no longer exists", path.display());
            }
        }
    }
    Ok(result)
}
