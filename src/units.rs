//! Compilation-unit registry and the library-information (ALI) writer.

use crc32fast::Hasher;

use crate::diag::FileId;
use crate::intern::NameId;
use crate::symbols::{SymbolId, SymbolKind};
use crate::syntax::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitPart {
    Spec,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitId(pub u32);

/// One compilation unit as seen by the elaboration orderer and the ALI
/// writer.
#[derive(Debug, Clone)]
pub struct UnitInfo {
    pub name: NameId,
    pub part: UnitPart,
    pub file: FileId,
    pub node: Option<NodeId>,
    /// Units named in with clauses.
    pub withs: Vec<NameId>,
    /// Targets of elaboration pragmas in this unit's context clause.
    pub elaborate: Vec<NameId>,
    pub elaborate_all: Vec<NameId>,
    pub pure: bool,
    pub preelaborate: bool,
    /// The library-level entity.
    pub symbol: Option<SymbolId>,
    pub exports: Vec<SymbolId>,
    pub checksum: u32,
}

#[derive(Debug, Default)]
pub struct UnitRegistry {
    units: Vec<UnitInfo>,
}

impl UnitRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, unit: UnitInfo) -> UnitId {
        let id = UnitId(self.units.len() as u32);
        self.units.push(unit);
        id
    }

    #[must_use]
    pub fn get(&self, id: UnitId) -> &UnitInfo {
        &self.units[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: UnitId) -> &mut UnitInfo {
        &mut self.units[id.0 as usize]
    }

    #[must_use]
    pub fn find(&self, name: NameId, part: UnitPart) -> Option<UnitId> {
        self.units
            .iter()
            .position(|u| u.name == name && u.part == part)
            .map(|i| UnitId(i as u32))
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &UnitInfo)> {
        self.units
            .iter()
            .enumerate()
            .map(|(i, u)| (UnitId(i as u32), u))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Maps a unit name to its source file: dots become hyphens, lowercased,
/// `.ads` for specs and `.adb` for bodies.
#[must_use]
pub fn source_file_name(unit_name: &str, part: UnitPart) -> String {
    let stem = unit_name.replace('.', "-").to_lowercase();
    match part {
        UnitPart::Spec => format!("{stem}.ads"),
        UnitPart::Body => format!("{stem}.adb"),
    }
}

/// ALI path for a unit: the source basename with an `.ali` extension.
#[must_use]
pub fn ali_file_name(unit_name: &str) -> String {
    format!("{}.ali", unit_name.replace('.', "-").to_lowercase())
}

#[must_use]
pub fn source_checksum(source: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(source);
    hasher.finalize()
}

fn export_kind(kind: SymbolKind) -> &'static str {
    match kind {
        SymbolKind::Function => "function",
        SymbolKind::Procedure => "procedure",
        SymbolKind::Type | SymbolKind::Subtype => "type",
        SymbolKind::Exception => "exception",
        _ => "variable",
    }
}

/// Renders the library-information file for one unit.
///
/// Line kinds: `V` version, `U` unit (with attribute flags), `W` one per
/// with-dependency, `X` one per exported symbol, `C` source checksum.
#[must_use]
pub fn write_ali(comp: &crate::context::Compilation, id: UnitId) -> String {
    let unit = comp.units.get(id);
    let name = comp.names.get(unit.name);
    let mut out = String::new();
    out.push_str("V \"ada-llvm 0.1\"\n");
    out.push_str(&format!(
        "U {} {}",
        name,
        source_file_name(name, unit.part)
    ));
    if unit.pure {
        out.push_str(" PU");
    }
    if unit.preelaborate {
        out.push_str(" PR");
    }
    out.push('\n');
    for &dep in &unit.withs {
        let dep_name = comp.names.get(dep);
        out.push_str(&format!(
            "W {} {} {}\n",
            dep_name,
            source_file_name(dep_name, UnitPart::Spec),
            ali_file_name(dep_name)
        ));
    }
    for &dep in &unit.elaborate {
        out.push_str(&format!("E {}\n", comp.names.get(dep)));
    }
    for &dep in &unit.elaborate_all {
        out.push_str(&format!("EA {}\n", comp.names.get(dep)));
    }
    for &export in &unit.exports {
        let sym = comp.symbols.symbol(export);
        out.push_str(&format!(
            "X {} {} {}\n",
            crate::mangle::mangle(&comp.symbols, &comp.names, export),
            export_kind(sym.kind),
            sym.loc.line
        ));
    }
    out.push_str(&format!("C {:08x}\n", unit.checksum));
    out
}

#[test]
fn test_source_file_name() {
    assert_eq!("foo-bar.ads", source_file_name("Foo.Bar", UnitPart::Spec));
    assert_eq!("foo-bar.adb", source_file_name("Foo.Bar", UnitPart::Body));
    assert_eq!("hello.adb", source_file_name("Hello", UnitPart::Body));
}

#[test]
fn test_checksum_is_stable() {
    let a = source_checksum(b"procedure Hello is begin null; end;");
    let b = source_checksum(b"procedure Hello is begin null; end;");
    assert_eq!(a, b);
    assert_ne!(a, source_checksum(b"procedure Hello2 is begin null; end;"));
}
