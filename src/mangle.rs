//! Deterministic mapping from Ada names to linker-visible names.
//!
//! Dotted names become underscored, nested subprograms incorporate their
//! parent's mangled name, and overloads disambiguate with their unique id.
//! `pragma Import` names are used verbatim.

use crate::intern::Interner;
use crate::symbols::{SymFlags, SymbolId, SymbolTable};

/// Computes the linker name of a symbol.
#[must_use]
pub fn mangle(table: &SymbolTable, names: &Interner, id: SymbolId) -> String {
    let sym = table.symbol(id);
    if sym.flags.contains(SymFlags::IMPORTED) {
        if let Some(external) = sym.link_name.as_ref().or(sym.external_name.as_ref()) {
            return external.clone();
        }
    }

    let mut parts: Vec<String> = Vec::new();
    let mut cursor = Some(id);
    while let Some(here) = cursor {
        let s = table.symbol(here);
        // Standard itself never appears in external names.
        if s.flags.contains(SymFlags::IS_PREDEFINED) && s.parent.is_none() {
            break;
        }
        parts.push(names.get(s.name).to_lowercase());
        cursor = s.parent;
    }
    parts.reverse();
    let mut out = parts.join("__");

    // Later members of an overload chain carry their unique id; the first
    // declaration keeps the plain name.
    if sym.kind.is_overloadable() && sym.next_overload.is_some() {
        out.push_str(&format!("__{}", sym.uid));
    }
    out
}

/// Name of the per-unit elaboration routine.
#[must_use]
pub fn elaboration_entry(unit_name: &str) -> String {
    format!("{}___elabb", unit_name.replace('.', "__").to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::{Diagnostics, SourceLoc};
    use crate::intern::Interner;
    use crate::symbols::{seed_standard, SymbolKind, SymbolTable};
    use crate::types::TypeRegistry;

    #[test]
    fn test_mangle_dotted_and_nested() {
        let mut names = Interner::new();
        let mut types = TypeRegistry::new();
        let mut table = SymbolTable::new();
        let mut diags = Diagnostics::new();
        seed_standard(&mut names, &mut types, &mut table, &mut diags);

        let pkg = table.alloc(SymbolKind::Package, names.intern("Text_IO"), SourceLoc::BUILTIN);
        table.push_scope(Some(pkg));
        let proc = table.alloc(
            SymbolKind::Procedure,
            names.intern("Put_Line"),
            SourceLoc::BUILTIN,
        );
        table.install(proc, &names, &mut diags);
        assert_eq!("text_io__put_line", mangle(&table, &names, proc));

        table.push_scope(Some(proc));
        let inner = table.alloc(SymbolKind::Procedure, names.intern("Flush"), SourceLoc::BUILTIN);
        table.install(inner, &names, &mut diags);
        assert_eq!("text_io__put_line__flush", mangle(&table, &names, inner));
    }

    #[test]
    fn test_mangle_overloads_are_injective() {
        let mut names = Interner::new();
        let mut types = TypeRegistry::new();
        let mut table = SymbolTable::new();
        let mut diags = Diagnostics::new();
        let std = seed_standard(&mut names, &mut types, &mut table, &mut diags);

        let p = names.intern("P");
        let first = table.alloc(SymbolKind::Procedure, p, SourceLoc::BUILTIN);
        table.symbol_mut(first).params = vec![];
        table.install(first, &names, &mut diags);
        let second = table.alloc(SymbolKind::Procedure, p, SourceLoc::BUILTIN);
        table.symbol_mut(second).params = vec![crate::symbols::Param {
            name: names.intern("X"),
            ty: std.integer,
            mode: crate::syntax::Mode::In,
            default: None,
        }];
        table.install(second, &names, &mut diags);

        let a = mangle(&table, &names, first);
        let b = mangle(&table, &names, second);
        assert_ne!(a, b);
        assert_eq!("p", a);
    }

    #[test]
    fn test_import_is_verbatim() {
        let mut names = Interner::new();
        let mut table = SymbolTable::new();
        let sym = table.alloc(SymbolKind::Function, names.intern("C_Getenv"), SourceLoc::BUILTIN);
        table.symbol_mut(sym).flags |= SymFlags::IMPORTED;
        table.symbol_mut(sym).external_name = Some("getenv".to_string());
        assert_eq!("getenv", mangle(&table, &names, sym));
    }
}
