//! ELF reader.
//!
//! Validates the identification header, decodes the section header table
//! and resolves section names. Both ELF classes and both byte orders are
//! handled by dispatching on the declared class to `object`'s typed
//! header layouts.

use memmap2::Mmap;
use object::elf::{FileHeader32, FileHeader64, ELFCLASS32, ELFCLASS64, ELFDATA2LSB, ELFDATA2MSB, ELFMAG, SHT_NOBITS};
use object::read::elf::{FileHeader, SectionHeader};
use object::Endianness;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{ElfError, Error, Result};

const EI_CLASS: usize = 4;
const EI_DATA: usize = 5;
const EI_NIDENT: usize = 16;

/// Name of the full symbol table, present in unstripped files.
pub const SYMTAB: &str = ".symtab";
/// Name of the dynamic symbol table.
pub const DYNSYM: &str = ".dynsym";

/// Declared bit-width of an ELF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfClass {
    Elf32,
    Elf64,
}

/// A file on disk, mapped for the duration of one parse.
pub struct ElfFile {
    path: PathBuf,
    map: Mmap,
}

impl ElfFile {
    /// Maps `path` into memory.
    ///
    /// Existence is checked before anything is read; every other failure
    /// is reported as `InvalidFormat`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::not_found(path));
        }
        let map = map_file(path).map_err(|e| Error::invalid_format(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            map,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validates the mapped bytes and returns a view over them.
    pub fn image(&self) -> Result<ElfImage<'_>> {
        ElfImage::parse(&self.map).map_err(|e| Error::invalid_format(&self.path, e))
    }
}

fn map_file(path: &Path) -> Result<Mmap, ElfError> {
    let file = File::open(path)?;
    // The mapping is read-only and dropped before the next file is opened.
    let map = unsafe { Mmap::map(&file)? };
    Ok(map)
}

/// A section header with its name resolved.
///
/// Borrows the name from the image; the section's bytes are only sliced
/// on request through [`ElfImage::section_data`].
#[derive(Debug, Clone, Copy)]
pub struct Section<'data> {
    pub index: usize,
    pub name: &'data [u8],
    pub sh_type: u32,
    pub offset: u64,
    pub size: u64,
    pub entsize: u64,
    /// For symbol tables, the index of the associated string table.
    pub link: u32,
}

impl Section<'_> {
    pub fn name(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(self.name)
    }
}

/// A validated ELF image.
#[derive(Debug)]
pub struct ElfImage<'data> {
    data: &'data [u8],
    class: ElfClass,
    endian: Endianness,
    shoff: u64,
    shentsize: u16,
    sections: Vec<Section<'data>>,
}

impl<'data> ElfImage<'data> {
    /// Parses the identification header and the section header table.
    pub fn parse(data: &'data [u8]) -> Result<Self, ElfError> {
        let ident = data.get(..EI_NIDENT).ok_or(ElfError::TooShort)?;
        if ident[..4] != ELFMAG {
            return Err(ElfError::BadMagic);
        }
        match ident[EI_DATA] {
            ELFDATA2LSB | ELFDATA2MSB => {}
            other => return Err(ElfError::UnsupportedEncoding(other)),
        }
        match ident[EI_CLASS] {
            ELFCLASS32 => Self::parse_class::<FileHeader32<Endianness>>(data, ElfClass::Elf32),
            ELFCLASS64 => Self::parse_class::<FileHeader64<Endianness>>(data, ElfClass::Elf64),
            other => Err(ElfError::UnsupportedClass(other)),
        }
    }

    fn parse_class<Elf>(data: &'data [u8], class: ElfClass) -> Result<Self, ElfError>
    where
        Elf: FileHeader<Endian = Endianness>,
    {
        let header = Elf::parse(data)?;
        let endian = header.endian()?;
        // Rejects a section header table that lies outside the file.
        let table = header.sections(endian, data)?;

        let sections = table
            .iter()
            .enumerate()
            .map(|(index, sh)| Section {
                index,
                // A section without a resolvable name can never match a lookup.
                name: table.section_name(endian, sh).unwrap_or(&[]),
                sh_type: sh.sh_type(endian),
                offset: sh.sh_offset(endian).into(),
                size: sh.sh_size(endian).into(),
                entsize: sh.sh_entsize(endian).into(),
                link: sh.sh_link(endian),
            })
            .collect();

        Ok(Self {
            data,
            class,
            endian,
            shoff: header.e_shoff(endian).into(),
            shentsize: header.e_shentsize(endian),
            sections,
        })
    }

    pub fn class(&self) -> ElfClass {
        self.class
    }

    pub fn endian(&self) -> Endianness {
        self.endian
    }

    pub fn section_header_offset(&self) -> u64 {
        self.shoff
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn section_entry_size(&self) -> u16 {
        self.shentsize
    }

    /// Finds the first section whose name is exactly `name`.
    pub fn find_section(&self, name: &str) -> Option<&Section<'data>> {
        self.sections.iter().find(|s| s.name == name.as_bytes())
    }

    pub fn section_by_index(&self, index: usize) -> Result<&Section<'data>, ElfError> {
        self.sections
            .get(index)
            .ok_or(ElfError::MissingSection { index })
    }

    /// The symbol table to list: `.symtab` if present, else `.dynsym`.
    pub fn symbol_table(&self) -> Option<&Section<'data>> {
        self.find_section(SYMTAB).or_else(|| self.find_section(DYNSYM))
    }

    /// Returns the file bytes covered by `section`.
    pub fn section_data(&self, section: &Section<'data>) -> Result<&'data [u8], ElfError> {
        if section.sh_type == SHT_NOBITS {
            return Ok(&[]);
        }
        let start = usize::try_from(section.offset).ok();
        let size = usize::try_from(section.size).ok();
        start
            .zip(size)
            .and_then(|(start, size)| Some(start..start.checked_add(size)?))
            .and_then(|range| self.data.get(range))
            .ok_or(ElfError::SectionOutOfBounds {
                index: section.index,
            })
    }
}
