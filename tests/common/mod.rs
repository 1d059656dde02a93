//! Shared helpers for integration tests: in-process ELF fixtures and
//! scratch directories.

#![allow(dead_code)]

use object::write::{Object, Symbol, SymbolSection};
use object::{Architecture, BinaryFormat, Endianness, SectionKind, SymbolFlags, SymbolKind, SymbolScope};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicUsize, Ordering};

/// How a fixture symbol is defined.
#[derive(Clone, Copy)]
pub enum Def {
    Global,
    Weak,
    Local,
}

/// Builder for small relocatable ELF files with a `.symtab`.
pub struct Fixture {
    obj: Object<'static>,
    text: object::write::SectionId,
    data: object::write::SectionId,
    count: u64,
}

impl Fixture {
    /// 64-bit little-endian (x86_64).
    pub fn new() -> Self {
        Self::with(Architecture::X86_64, Endianness::Little)
    }

    /// 32-bit big-endian (PowerPC).
    pub fn elf32_big_endian() -> Self {
        Self::with(Architecture::PowerPc, Endianness::Big)
    }

    /// 32-bit little-endian (i386).
    pub fn elf32_little_endian() -> Self {
        Self::with(Architecture::I386, Endianness::Little)
    }

    fn with(arch: Architecture, endian: Endianness) -> Self {
        let mut obj = Object::new(BinaryFormat::Elf, arch, endian);
        let text = obj.add_section(Vec::new(), b".text".to_vec(), SectionKind::Text);
        obj.append_section_data(text, &[0u8; 64], 16);
        let data = obj.add_section(Vec::new(), b".data".to_vec(), SectionKind::Data);
        obj.append_section_data(data, &[0u8; 64], 8);
        Self {
            obj,
            text,
            data,
            count: 0,
        }
    }

    fn symbol(mut self, name: &str, kind: SymbolKind, def: Def) -> Self {
        let section = if kind == SymbolKind::Text { self.text } else { self.data };
        let value = self.count % 64;
        self.count += 1;
        self.obj.add_symbol(Symbol {
            name: name.as_bytes().to_vec(),
            value,
            size: 1,
            kind,
            scope: match def {
                Def::Local => SymbolScope::Compilation,
                Def::Global | Def::Weak => SymbolScope::Dynamic,
            },
            weak: matches!(def, Def::Weak),
            section: SymbolSection::Section(section),
            flags: SymbolFlags::None,
        });
        self
    }

    pub fn function(self, name: &str, def: Def) -> Self {
        self.symbol(name, SymbolKind::Text, def)
    }

    pub fn variable(self, name: &str, def: Def) -> Self {
        self.symbol(name, SymbolKind::Data, def)
    }

    pub fn build(&self) -> Vec<u8> {
        self.obj.write().expect("fixture serializes")
    }
}

/// Renames the first section called `from` to `to` (same length).
pub fn rename_section(data: &mut [u8], from: &str, to: &str) {
    assert_eq!(from.len(), to.len());
    let needle = [from.as_bytes(), b"\0"].concat();
    let pos = data
        .windows(needle.len())
        .position(|w| w == needle.as_slice())
        .expect("section name present");
    data[pos..pos + to.len()].copy_from_slice(to.as_bytes());
}

/// `add` and `subtract` exported, `helper` local, plus a variable.
pub fn mixed_object() -> Vec<u8> {
    Fixture::new()
        .function("subtract", Def::Global)
        .function("helper", Def::Local)
        .function("add", Def::Global)
        .variable("counter", Def::Global)
        .build()
}

/// A 64-bit `ET_DYN` shared object carrying both symbol tables.
///
/// `.dynsym` exports `add` and `subtract`. `.symtab` holds those, the local
/// `helper` and the global `debug_hook`, which is absent from `.dynsym`.
pub fn shared_object_with_both_tables() -> Vec<u8> {
    use object::elf;
    use object::write::elf::{FileHeader, SectionHeader, Sym, Writer};

    let global_func = (elf::STB_GLOBAL << 4) | elf::STT_FUNC;
    let local_func = (elf::STB_LOCAL << 4) | elf::STT_FUNC;
    let code = [0xc3u8; 16];

    let mut out = Vec::new();
    let mut writer = Writer::new(Endianness::Little, true, &mut out);

    writer.reserve_file_header();
    let text_name = writer.add_section_name(b".text");
    let text_index = writer.reserve_section_index();
    let text_offset = writer.reserve(code.len(), 16);

    let dyn_add = writer.add_dynamic_string(b"add");
    let dyn_subtract = writer.add_dynamic_string(b"subtract");
    writer.reserve_null_dynamic_symbol_index();
    writer.reserve_dynamic_symbol_index();
    writer.reserve_dynamic_symbol_index();
    writer.reserve_dynsym_section_index();
    writer.reserve_dynstr_section_index();

    let helper = writer.add_string(b"helper");
    let add = writer.add_string(b"add");
    let subtract = writer.add_string(b"subtract");
    let debug_hook = writer.add_string(b"debug_hook");
    writer.reserve_null_symbol_index();
    for _ in 0..4 {
        writer.reserve_symbol_index(Some(text_index));
    }
    writer.reserve_symtab_section_index();
    writer.reserve_strtab_section_index();
    writer.reserve_shstrtab_section_index();

    writer.reserve_dynsym();
    writer.reserve_dynstr();
    writer.reserve_symtab();
    writer.reserve_strtab();
    writer.reserve_shstrtab();
    writer.reserve_section_headers();

    writer
        .write_file_header(&FileHeader {
            os_abi: elf::ELFOSABI_SYSV,
            abi_version: 0,
            e_type: elf::ET_DYN,
            e_machine: elf::EM_X86_64,
            e_entry: 0,
            e_flags: 0,
        })
        .expect("file header");
    writer.write_align(16);
    writer.write(&code);

    let sym = |name, st_info, st_value| Sym {
        name: Some(name),
        section: Some(text_index),
        st_info,
        st_other: elf::STV_DEFAULT,
        st_shndx: 0,
        st_value,
        st_size: 1,
    };

    writer.write_null_dynamic_symbol();
    writer.write_dynamic_symbol(&sym(dyn_add, global_func, 0));
    writer.write_dynamic_symbol(&sym(dyn_subtract, global_func, 4));
    writer.write_dynstr();

    writer.write_null_symbol();
    writer.write_symbol(&sym(helper, local_func, 12));
    writer.write_symbol(&sym(add, global_func, 0));
    writer.write_symbol(&sym(subtract, global_func, 4));
    writer.write_symbol(&sym(debug_hook, global_func, 8));
    writer.write_strtab();
    writer.write_shstrtab();

    writer.write_null_section_header();
    writer.write_section_header(&SectionHeader {
        name: Some(text_name),
        sh_type: elf::SHT_PROGBITS,
        sh_flags: u64::from(elf::SHF_ALLOC | elf::SHF_EXECINSTR),
        sh_addr: 0,
        sh_offset: text_offset as u64,
        sh_size: code.len() as u64,
        sh_link: 0,
        sh_info: 0,
        sh_addralign: 16,
        sh_entsize: 0,
    });
    writer.write_dynsym_section_header(0, 1);
    writer.write_dynstr_section_header(0);
    writer.write_symtab_section_header(2);
    writer.write_strtab_section_header();
    writer.write_shstrtab_section_header();
    debug_assert_eq!(writer.reserved_len(), writer.len());

    out
}

/// A scratch directory removed on drop.
pub struct ScratchDir(PathBuf);

impl ScratchDir {
    pub fn new(label: &str) -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        let path = std::env::temp_dir().join(format!(
            "lso-{}-{}-{}",
            label,
            process::id(),
            NEXT.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("create scratch dir");
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Writes `contents` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, contents: &[u8]) -> PathBuf {
        let path = self.0.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, contents).expect("write fixture");
        path
    }

    pub fn touch(&self, rel: &str) -> PathBuf {
        self.write(rel, b"")
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}
