//! The compilation context: owner of every arena, registry, and sink used
//! by one compilation. Passed by reference through every entry point; the
//! compilation ends when it is dropped.

use rustc_hash::FxHashMap;

use crate::diag::Diagnostics;
use crate::intern::{Interner, NameId};
use crate::symbols::{seed_standard, Standard, SymbolId, SymbolTable, FIRST_USER_EXCEPTION};
use crate::syntax::{Node, NodeId, NodePayload, SyntaxTree};
use crate::types::{TypeId, TypeRegistry};
use crate::units::UnitRegistry;

#[derive(Debug)]
pub struct Compilation {
    pub tree: SyntaxTree,
    pub types: TypeRegistry,
    pub symbols: SymbolTable,
    pub names: Interner,
    pub diags: Diagnostics,
    pub units: UnitRegistry,
    /// Package Standard, seeded at construction.
    pub std: Standard,
    /// Innermost-last stack of generic instantiation environments mapping
    /// formal symbols to their actuals.
    pub generic_env: Vec<FxHashMap<SymbolId, TypeId>>,
    /// Next identifier for a user-declared exception.
    pub next_exception: u32,
}

impl Compilation {
    #[must_use]
    pub fn new() -> Self {
        let mut names = Interner::new();
        let mut types = TypeRegistry::new();
        let mut symbols = SymbolTable::new();
        let mut diags = Diagnostics::new();
        let std = seed_standard(&mut names, &mut types, &mut symbols, &mut diags);
        Self {
            tree: SyntaxTree::new(),
            types,
            symbols,
            names,
            diags,
            units: UnitRegistry::new(),
            std,
            generic_env: Vec::new(),
            next_exception: FIRST_USER_EXCEPTION,
        }
    }

    pub fn intern(&mut self, name: &str) -> NameId {
        self.names.intern(name)
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        self.tree.node(id)
    }

    #[must_use]
    pub fn payload(&self, id: NodeId) -> &NodePayload {
        &self.tree.node(id).payload
    }

    /// The resolved type of a node, or the error type when resolution
    /// failed at or below it.
    #[must_use]
    pub fn type_of(&self, id: NodeId) -> TypeId {
        self.tree.node(id).ty.unwrap_or(self.types.error)
    }

    pub fn set_type(&mut self, id: NodeId, ty: TypeId) {
        self.tree.node_mut(id).ty = Some(ty);
    }

    pub fn set_symbol(&mut self, id: NodeId, sym: SymbolId) {
        self.tree.node_mut(id).symbol = Some(sym);
    }

    /// Resolves a generic formal type to its actual through the current
    /// instantiation environment, innermost binding first.
    #[must_use]
    pub fn actual_type(&self, ty: TypeId) -> TypeId {
        if !self.types[ty].generic_formal {
            return ty;
        }
        if let Some(formal_sym) = self.types[ty].defining_symbol {
            for env in self.generic_env.iter().rev() {
                if let Some(&actual) = env.get(&formal_sym) {
                    return actual;
                }
            }
        }
        ty
    }

    pub fn fresh_exception_id(&mut self) -> u32 {
        let id = self.next_exception;
        self.next_exception += 1;
        id
    }
}

impl Default for Compilation {
    fn default() -> Self {
        Self::new()
    }
}

#[test]
fn test_new_compilation_has_standard() {
    let comp = Compilation::new();
    assert!(!comp.diags.has_errors());
    assert_eq!(4, comp.types[comp.std.integer].size);
    assert!(comp.types[comp.std.integer].frozen);
}
