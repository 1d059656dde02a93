//! Symbol table decoding and classification.
//!
//! Walks a located symbol table entry by entry, resolving each name through
//! the linked string table, and filters the records down to the function
//! symbols a listing should show.

use object::elf::{
    Sym32, Sym64, STB_GLOBAL, STB_GNU_UNIQUE, STB_LOCAL, STB_WEAK, STT_COMMON, STT_FILE,
    STT_FUNC, STT_GNU_IFUNC, STT_NOTYPE, STT_OBJECT, STT_SECTION, STT_TLS,
};
use object::read::elf::Sym;
use object::read::StringTable;
use object::Endianness;
use std::borrow::Cow;
use std::mem;

use crate::elf::{ElfClass, ElfImage, Section};
use crate::error::ElfError;

/// Symbol type, the low nibble of `st_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolType {
    NoType,
    Object,
    Func,
    Section,
    File,
    Common,
    Tls,
    GnuIfunc,
    Other(u8),
}

impl From<u8> for SymbolType {
    fn from(value: u8) -> Self {
        match value {
            STT_NOTYPE => SymbolType::NoType,
            STT_OBJECT => SymbolType::Object,
            STT_FUNC => SymbolType::Func,
            STT_SECTION => SymbolType::Section,
            STT_FILE => SymbolType::File,
            STT_COMMON => SymbolType::Common,
            STT_TLS => SymbolType::Tls,
            STT_GNU_IFUNC => SymbolType::GnuIfunc,
            other => SymbolType::Other(other),
        }
    }
}

/// Symbol binding, the high nibble of `st_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolBinding {
    Local,
    Global,
    Weak,
    GnuUnique,
    Other(u8),
}

impl From<u8> for SymbolBinding {
    fn from(value: u8) -> Self {
        match value {
            STB_LOCAL => SymbolBinding::Local,
            STB_GLOBAL => SymbolBinding::Global,
            STB_WEAK => SymbolBinding::Weak,
            STB_GNU_UNIQUE => SymbolBinding::GnuUnique,
            other => SymbolBinding::Other(other),
        }
    }
}

/// One decoded symbol table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRecord<'data> {
    pub name: Cow<'data, str>,
    pub kind: SymbolType,
    pub binding: SymbolBinding,
}

impl<'data> SymbolRecord<'data> {
    /// Splits a raw `st_info` byte into type and binding.
    pub fn new(name: impl Into<Cow<'data, str>>, st_info: u8) -> Self {
        Self {
            name: name.into(),
            kind: SymbolType::from(st_info & 0xf),
            binding: SymbolBinding::from(st_info >> 4),
        }
    }

    /// Whether this symbol belongs in a function listing.
    ///
    /// Only `FUNC` symbols qualify. Global and weak bindings are always
    /// listed; local bindings only when `include_static` is set.
    pub fn is_listed(&self, include_static: bool) -> bool {
        if self.kind != SymbolType::Func {
            return false;
        }
        match self.binding {
            SymbolBinding::Global | SymbolBinding::Weak => true,
            SymbolBinding::Local => include_static,
            _ => false,
        }
    }
}

/// Lazy iterator over the entries of one symbol table.
///
/// Stops after the first decoding error.
pub struct Symbols<'data> {
    class: ElfClass,
    endian: Endianness,
    table: &'data [u8],
    strings: StringTable<'data>,
    entsize: usize,
    index: usize,
    count: usize,
}

/// Prepares to decode `section` as a symbol table of `image`.
///
/// The section's entry size sets the stride between records and its link
/// names the string table holding the symbol names.
pub fn decode_symbols<'data>(
    image: &ElfImage<'data>,
    section: &Section<'data>,
) -> Result<Symbols<'data>, ElfError> {
    let native = match image.class() {
        ElfClass::Elf32 => mem::size_of::<Sym32<Endianness>>(),
        ElfClass::Elf64 => mem::size_of::<Sym64<Endianness>>(),
    };
    let entsize = usize::try_from(section.entsize)
        .ok()
        .filter(|&size| size >= native)
        .ok_or(ElfError::BadEntrySize {
            index: section.index,
            entsize: section.entsize,
        })?;

    let table = image.section_data(section)?;
    let strtab = image.section_by_index(section.link as usize)?;
    let strings = image.section_data(strtab)?;

    Ok(Symbols {
        class: image.class(),
        endian: image.endian(),
        table,
        strings: StringTable::new(strings, 0, strings.len() as u64),
        entsize,
        index: 0,
        count: table.len() / entsize,
    })
}

impl<'data> Symbols<'data> {
    fn decode(&self, index: usize) -> Result<SymbolRecord<'data>, ElfError> {
        let start = index * self.entsize;
        let entry = &self.table[start..start + self.entsize];
        let (st_name, st_info) = match self.class {
            ElfClass::Elf32 => read_entry::<Sym32<Endianness>>(entry, self.endian),
            ElfClass::Elf64 => read_entry::<Sym64<Endianness>>(entry, self.endian),
        }
        .ok_or(ElfError::BadSymbol { index })?;

        let name = if st_name == 0 {
            Cow::Borrowed("")
        } else {
            let bytes = self
                .strings
                .get(st_name)
                .map_err(|()| ElfError::BadSymbolName {
                    index,
                    offset: st_name,
                })?;
            String::from_utf8_lossy(bytes)
        };
        Ok(SymbolRecord::new(name, st_info))
    }
}

fn read_entry<S: Sym<Endian = Endianness>>(entry: &[u8], endian: Endianness) -> Option<(u32, u8)> {
    let (sym, _) = object::pod::from_bytes::<S>(entry).ok()?;
    Some((sym.st_name(endian), sym.st_info()))
}

impl<'data> Iterator for Symbols<'data> {
    type Item = Result<SymbolRecord<'data>, ElfError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let record = self.decode(self.index);
        self.index = if record.is_ok() { self.index + 1 } else { self.count };
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.count - self.index))
    }
}

/// Names of the listed function symbols, in symbol table order.
pub fn classify<'data, I>(records: I, include_static: bool) -> Vec<String>
where
    I: IntoIterator<Item = SymbolRecord<'data>>,
{
    records
        .into_iter()
        .filter(|record| record.is_listed(include_static))
        .map(|record| record.name.into_owned())
        .collect()
}
