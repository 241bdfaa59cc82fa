//! Scoped symbol table with multi-axis visibility and overload
//! disambiguation, plus the predefined package Standard.

use bitflags::bitflags;
use la_arena::{Arena, Idx};
use num_enum::TryFromPrimitive;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::diag::{Diagnostics, SourceLoc};
use crate::intern::{Interner, NameId};
use crate::syntax::{Mode, NodeId};
use crate::types::{Bound, CheckMask, TypeBody, TypeId, TypeKind, TypeRegistry};

pub type SymbolId = Idx<Symbol>;
pub type ScopeId = Idx<Scope>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Constant,
    Type,
    Subtype,
    Procedure,
    Function,
    Parameter,
    Package,
    Exception,
    Label,
    Loop,
    Entry,
    Component,
    Discriminant,
    Literal,
    Generic,
    GenericInstance,
}

impl SymbolKind {
    /// Subprograms and enumeration literals may share a name within one
    /// scope, distinguished by profile.
    #[must_use]
    pub fn is_overloadable(&self) -> bool {
        matches!(
            self,
            Self::Procedure | Self::Function | Self::Literal | Self::Entry
        )
    }

    #[must_use]
    pub fn is_subprogram(&self) -> bool {
        matches!(self, Self::Procedure | Self::Function | Self::Entry)
    }
}

/// Visibility axis; lookup returns the highest-ranked candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Visibility {
    /// Never returned by lookup.
    Hidden,
    /// Made visible by a use clause.
    UseVisible,
    /// Directly visible from an enclosing declarative region.
    DirectlyVisible,
    /// Declared in the scope itself.
    ImmediatelyVisible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Convention {
    #[default]
    Ada,
    C,
    Stdcall,
    Intrinsic,
    Assembler,
}

bitflags! {
    /// Pragma effects and code-generation state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SymFlags: u16 {
        const INLINE          = 1 << 0;
        const IMPORTED        = 1 << 1;
        const EXPORTED        = 1 << 2;
        const IS_PREDEFINED   = 1 << 3;
        const EXTERN_DECLARED = 1 << 4;
        const BODY_EMITTED    = 1 << 5;
        const BODY_CLAIMED    = 1 << 6;
        /// Variable referenced from a nested subprogram.
        const CAPTURED        = 1 << 7;
        /// Subprogram whose locals are captured; owns an environment record.
        const NEEDS_ENV       = 1 << 8;
        /// Nested subprogram referencing uplevel variables; takes an
        /// environment pointer as its first parameter.
        const USES_ENV        = 1 << 9;
    }
}

/// Exception identifiers shared with the runtime. User-declared exceptions
/// are numbered after the last predefined one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
pub enum PredefinedException {
    ConstraintError = 1,
    NumericError = 2,
    ProgramError = 3,
    StorageError = 4,
    TaskingError = 5,
}

pub const FIRST_USER_EXCEPTION: u32 = 6;

/// One formal parameter of a subprogram profile.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: NameId,
    pub ty: TypeId,
    pub mode: Mode,
    pub default: Option<NodeId>,
}

/// A named entity.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub name: NameId,
    pub loc: SourceLoc,
    pub ty: Option<TypeId>,
    pub scope: ScopeId,
    pub parent: Option<SymbolId>,
    /// Next symbol with the same name in the same scope, different profile.
    pub next_overload: Option<SymbolId>,
    pub visibility: Visibility,
    pub params: Vec<Param>,
    pub result: Option<TypeId>,
    /// Visible-part symbols, for packages.
    pub exports: Vec<SymbolId>,
    /// Scope introduced by this symbol (packages, subprograms).
    pub own_scope: Option<ScopeId>,
    pub uid: u32,
    pub nesting: u32,
    pub frame_offset: u32,
    /// Slot index in the enclosing environment record, for captured
    /// variables.
    pub env_index: u32,
    pub flags: SymFlags,
    pub convention: Convention,
    pub suppressed: CheckMask,
    pub external_name: Option<String>,
    pub link_name: Option<String>,
    /// Declaration and body nodes.
    pub decl: Option<NodeId>,
    pub body: Option<NodeId>,
    /// Enumeration literal representation value, exception identifier, or
    /// named-number value.
    pub static_value: Option<i128>,
    pub static_real: Option<f64>,
    /// Parent operation and the type it was derived for.
    pub derived_from: Option<(SymbolId, TypeId)>,
    /// Generic template and its expansions.
    pub template: Option<NodeId>,
    pub expanded_spec: Option<NodeId>,
    pub expanded_body: Option<NodeId>,
}

/// A declarative region: a name table plus bookkeeping for code generation.
#[derive(Debug)]
pub struct Scope {
    names: FxHashMap<NameId, SymbolId>,
    pub enclosing: Option<ScopeId>,
    pub owner: Option<SymbolId>,
    pub nesting: u32,
    /// Declaration order, for iteration.
    pub declarations: Vec<SymbolId>,
    /// Packages named in use clauses of this region.
    pub uses: Vec<SymbolId>,
    /// Running total of locals needing stack slots.
    pub frame_size: u32,
}

/// Result of a simple (non-overloaded) name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(SymbolId),
    /// Two library units make the name use-visible; a reference must be
    /// qualified.
    Ambiguous(Vec<SymbolId>),
    Undefined,
}

/// Result of overload disambiguation at a call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverloadResolution {
    Unique(SymbolId),
    NoMatch,
    Ambiguous(Vec<SymbolId>),
}

#[derive(Debug)]
pub struct SymbolTable {
    symbols: Arena<Symbol>,
    scopes: Arena<Scope>,
    pub global: ScopeId,
    stack: Vec<ScopeId>,
    next_uid: u32,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        let mut scopes = Arena::new();
        let global = scopes.alloc(Scope {
            names: FxHashMap::default(),
            enclosing: None,
            owner: None,
            nesting: 0,
            declarations: Vec::new(),
            uses: Vec::new(),
            frame_size: 0,
        });
        Self {
            symbols: Arena::new(),
            scopes,
            global,
            stack: vec![global],
            next_uid: 0,
        }
    }

    #[must_use]
    pub fn current(&self) -> ScopeId {
        *self.stack.last().unwrap_or(&self.global)
    }

    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id]
    }

    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id]
    }

    #[must_use]
    pub fn nesting(&self) -> u32 {
        self.scopes[self.current()].nesting
    }

    pub fn push_scope(&mut self, owner: Option<SymbolId>) -> ScopeId {
        let current = self.current();
        let nesting = self.scopes[current].nesting + 1;
        let scope = self.scopes.alloc(Scope {
            names: FxHashMap::default(),
            enclosing: Some(current),
            owner,
            nesting,
            declarations: Vec::new(),
            uses: Vec::new(),
            frame_size: 0,
        });
        self.stack.push(scope);
        if let Some(owner) = owner {
            self.symbols[owner].own_scope = Some(scope);
        }
        scope
    }

    /// Re-enters an existing scope (a package body opening its spec's
    /// region).
    pub fn push_existing(&mut self, scope: ScopeId) {
        self.stack.push(scope);
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(self.stack.len() > 1);
        self.stack.pop();
    }

    /// Allocates a symbol in the current scope with default fields; the
    /// caller fills in what its kind needs.
    pub fn alloc(&mut self, kind: SymbolKind, name: NameId, loc: SourceLoc) -> SymbolId {
        let scope = self.current();
        let uid = self.next_uid;
        self.next_uid += 1;
        let nesting = self.scopes[scope].nesting;
        let owner = self.scopes[scope].owner;
        self.symbols.alloc(Symbol {
            kind,
            name,
            loc,
            ty: None,
            scope,
            parent: owner,
            next_overload: None,
            visibility: Visibility::ImmediatelyVisible,
            params: Vec::new(),
            result: None,
            exports: Vec::new(),
            own_scope: None,
            uid,
            nesting,
            frame_offset: 0,
            env_index: 0,
            flags: SymFlags::empty(),
            convention: Convention::Ada,
            suppressed: CheckMask::empty(),
            external_name: None,
            link_name: None,
            decl: None,
            body: None,
            static_value: None,
            static_real: None,
            derived_from: None,
            template: None,
            expanded_spec: None,
            expanded_body: None,
        })
    }

    /// Installs a symbol in its scope's name table, chaining overloads and
    /// rejecting duplicates. Predefined names cannot be shadowed at the
    /// global scope, only in inner scopes.
    pub fn install(&mut self, id: SymbolId, names: &Interner, diags: &mut Diagnostics) {
        let scope = self.symbols[id].scope;
        let name = self.symbols[id].name;
        self.scopes[scope].declarations.push(id);
        match self.scopes[scope].names.get(&name).copied() {
            None => {
                self.scopes[scope].names.insert(name, id);
            }
            Some(head) => {
                let head_sym = &self.symbols[head];
                if head_sym.flags.contains(SymFlags::IS_PREDEFINED) && scope == self.global {
                    let loc = self.symbols[id].loc;
                    diags.error(
                        loc,
                        format!(
                            "`{}` is predefined and cannot be redeclared here",
                            names.get(name)
                        ),
                    );
                    return;
                }
                if head_sym.kind.is_overloadable() && self.symbols[id].kind.is_overloadable() {
                    self.symbols[id].next_overload = Some(head);
                    self.scopes[scope].names.insert(name, id);
                } else {
                    let loc = self.symbols[id].loc;
                    diags.error(loc, format!("`{}` is already declared", names.get(name)));
                }
            }
        }
    }

    /// Directly installs `id` under `name` in an arbitrary scope; used when
    /// seeding Standard and when expanding derived operations.
    pub fn install_in(&mut self, scope: ScopeId, id: SymbolId) {
        let name = self.symbols[id].name;
        self.scopes[scope].declarations.push(id);
        if let Some(head) = self.scopes[scope].names.get(&name).copied() {
            self.symbols[id].next_overload = Some(head);
        }
        self.scopes[scope].names.insert(name, id);
    }

    fn chain(&self, mut head: Option<SymbolId>) -> SmallVec<[SymbolId; 4]> {
        let mut out = SmallVec::new();
        while let Some(id) = head {
            out.push(id);
            head = self.symbols[id].next_overload;
        }
        out
    }

    /// Looks a name up from the innermost scope outward, returning the most
    /// visible binding. Colliding use-visible imports from different
    /// packages yield the ambiguity sentinel rather than an arbitrary pick.
    #[must_use]
    pub fn lookup(&self, name: NameId) -> LookupOutcome {
        let mut scope = Some(self.current());
        while let Some(id) = scope {
            if let Some(&head) = self.scopes[id].names.get(&name) {
                if self.symbols[head].visibility > Visibility::Hidden {
                    return LookupOutcome::Found(head);
                }
            }
            let imported = self.use_visible_in(id, name);
            match imported.len() {
                0 => {}
                1 => return LookupOutcome::Found(imported[0]),
                _ => {
                    // All from the same package means an overload chain,
                    // not a collision.
                    let first_parent = self.symbols[imported[0]].parent;
                    if imported.iter().all(|&s| self.symbols[s].parent == first_parent) {
                        return LookupOutcome::Found(imported[0]);
                    }
                    return LookupOutcome::Ambiguous(imported.into_vec());
                }
            }
            scope = self.scopes[id].enclosing;
        }
        LookupOutcome::Undefined
    }

    fn use_visible_in(&self, scope: ScopeId, name: NameId) -> SmallVec<[SymbolId; 4]> {
        let mut out = SmallVec::new();
        for &pkg in &self.scopes[scope].uses {
            for &export in &self.symbols[pkg].exports {
                if self.symbols[export].name == name
                    && self.symbols[export].visibility > Visibility::Hidden
                {
                    out.push(export);
                }
            }
        }
        out
    }

    /// Collects every visible interpretation of a name, innermost scopes
    /// first, including use-visible ones.
    #[must_use]
    pub fn collect_overloads(&self, name: NameId) -> SmallVec<[SymbolId; 4]> {
        let mut out: SmallVec<[SymbolId; 4]> = SmallVec::new();
        let mut scope = Some(self.current());
        while let Some(id) = scope {
            if let Some(&head) = self.scopes[id].names.get(&name) {
                for sym in self.chain(Some(head)) {
                    if self.symbols[sym].visibility > Visibility::Hidden {
                        out.push(sym);
                    }
                }
            }
            for sym in self.use_visible_in(id, name) {
                if !out.contains(&sym) {
                    out.push(sym);
                }
            }
            scope = self.scopes[id].enclosing;
        }
        out
    }

    /// Looks up a name inside one package's exports (`P.X`).
    #[must_use]
    pub fn lookup_in_package(&self, pkg: SymbolId, name: NameId) -> SmallVec<[SymbolId; 4]> {
        let mut out = SmallVec::new();
        for &export in &self.symbols[pkg].exports {
            if self.symbols[export].name == name {
                out.push(export);
            }
        }
        // Body-private declarations are visible to selected references from
        // within the package itself; exports cover external clients.
        if out.is_empty() {
            if let Some(scope) = self.symbols[pkg].own_scope {
                out.extend(self.chain(self.scopes[scope].names.get(&name).copied()));
            }
        }
        out
    }

    /// The five-step overload filter. `args` are the actual argument types
    /// in positional order; `context` is the type required by the call's
    /// surroundings, when known.
    #[must_use]
    pub fn resolve_overloads(
        &self,
        candidates: &[SymbolId],
        args: &[TypeId],
        context: Option<TypeId>,
        types: &TypeRegistry,
    ) -> OverloadResolution {
        let mut viable: SmallVec<[SymbolId; 4]> = SmallVec::new();
        for &cand in candidates {
            let sym = &self.symbols[cand];
            if !sym.kind.is_overloadable() {
                continue;
            }
            if !self.arity_accepts(sym, args.len()) {
                continue;
            }
            let formals = &sym.params;
            let mut ok = true;
            for (i, &actual) in args.iter().enumerate() {
                if !types.covers(formals[i].ty, actual) {
                    ok = false;
                    break;
                }
            }
            if !ok {
                continue;
            }
            if let Some(expected) = context {
                let result = match sym.kind {
                    SymbolKind::Function => sym.result,
                    SymbolKind::Literal => sym.ty,
                    _ => None,
                };
                match result {
                    Some(result) if types.covers(expected, result) => {}
                    // A procedure can never satisfy a typed context.
                    _ => continue,
                }
            }
            viable.push(cand);
        }

        match viable.len() {
            0 => OverloadResolution::NoMatch,
            1 => OverloadResolution::Unique(viable[0]),
            _ => {
                // Exact type match outscores universal conversion; an inner
                // scope outscores an outer one.
                let score = |cand: SymbolId| -> (u32, u32) {
                    let sym = &self.symbols[cand];
                    let mut s = 0u32;
                    for (i, &actual) in args.iter().enumerate() {
                        let formal = sym.params[i].ty;
                        if formal == actual || types.base_of(formal) == types.base_of(actual) {
                            s += 2;
                        } else {
                            s += 1;
                        }
                    }
                    (s, self.scopes[sym.scope].nesting)
                };
                let best = viable.iter().map(|&c| score(c)).max().unwrap_or((0, 0));
                let winners: SmallVec<[SymbolId; 4]> = viable
                    .iter()
                    .copied()
                    .filter(|&c| score(c) == best)
                    .collect();
                if winners.len() == 1 {
                    OverloadResolution::Unique(winners[0])
                } else {
                    OverloadResolution::Ambiguous(winners.into_vec())
                }
            }
        }
    }

    fn arity_accepts(&self, sym: &Symbol, arg_count: usize) -> bool {
        if arg_count > sym.params.len() {
            return false;
        }
        // Trailing formals beyond the supplied arguments need defaults.
        sym.params[arg_count..].iter().all(|p| p.default.is_some())
    }

    /// Marks the visible-part declarations of a package as its exports.
    pub fn seal_exports(&mut self, pkg: SymbolId, visible: &[SymbolId]) {
        self.symbols[pkg].exports = visible.to_vec();
    }

    /// Every name visible from the current scope; feeds "did you mean"
    /// suggestions.
    #[must_use]
    pub fn visible_names(&self) -> Vec<NameId> {
        let mut out = Vec::new();
        let mut scope = Some(self.current());
        while let Some(id) = scope {
            out.extend(self.scopes[id].names.keys().copied());
            for &pkg in &self.scopes[id].uses {
                out.extend(self.symbols[pkg].exports.iter().map(|&e| self.symbols[e].name));
            }
            scope = self.scopes[id].enclosing;
        }
        out
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols.iter()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// The entities of package Standard, seeded at compiler initialization.
#[derive(Debug, Clone)]
pub struct Standard {
    pub package: SymbolId,
    pub boolean: TypeId,
    pub character: TypeId,
    pub integer: TypeId,
    pub short_short_integer: TypeId,
    pub short_integer: TypeId,
    pub long_integer: TypeId,
    pub long_long_integer: TypeId,
    pub float: TypeId,
    pub long_float: TypeId,
    pub duration: TypeId,
    pub natural: TypeId,
    pub positive: TypeId,
    pub string: TypeId,
    pub constraint_error: SymbolId,
    pub numeric_error: SymbolId,
    pub program_error: SymbolId,
    pub storage_error: SymbolId,
    pub tasking_error: SymbolId,
}

/// Builds package Standard: the predefined types, their literals, and the
/// predefined exceptions, all marked unshadowable at the global scope.
pub fn seed_standard(
    names: &mut Interner,
    types: &mut TypeRegistry,
    table: &mut SymbolTable,
    diags: &mut Diagnostics,
) -> Standard {
    let loc = SourceLoc::BUILTIN;
    let std_name = names.intern("Standard");
    let package = table.alloc(SymbolKind::Package, std_name, loc);
    table.symbol_mut(package).flags |= SymFlags::IS_PREDEFINED;

    let mut exports: Vec<SymbolId> = Vec::new();

    let mk_type = |names: &mut Interner,
                       types: &mut TypeRegistry,
                       table: &mut SymbolTable,
                       exports: &mut Vec<SymbolId>,
                       name: &str,
                       kind: TypeKind,
                       low: i128,
                       high: i128|
     -> (TypeId, SymbolId) {
        let name = names.intern(name);
        let ty = types.alloc(kind, Some(name));
        types.desc_mut(ty).low = Bound::Int(low);
        types.desc_mut(ty).high = Bound::Int(high);
        let sym = table.alloc(SymbolKind::Type, name, loc);
        table.symbol_mut(sym).ty = Some(ty);
        table.symbol_mut(sym).parent = Some(package);
        table.symbol_mut(sym).flags |= SymFlags::IS_PREDEFINED;
        types.desc_mut(ty).defining_symbol = Some(sym);
        table.install_in(table.global, sym);
        exports.push(sym);
        (ty, sym)
    };

    let (boolean, _) = mk_type(
        names, types, table, &mut exports, "Boolean", TypeKind::Boolean, 0, 1,
    );
    let (character, _) = mk_type(
        names, types, table, &mut exports, "Character", TypeKind::Character, 0, 255,
    );
    let (short_short_integer, _) = mk_type(
        names, types, table, &mut exports,
        "Short_Short_Integer", TypeKind::Integer, i8::MIN as i128, i8::MAX as i128,
    );
    let (short_integer, _) = mk_type(
        names, types, table, &mut exports,
        "Short_Integer", TypeKind::Integer, i16::MIN as i128, i16::MAX as i128,
    );
    let (integer, _) = mk_type(
        names, types, table, &mut exports,
        "Integer", TypeKind::Integer, i32::MIN as i128, i32::MAX as i128,
    );
    let (long_integer, _) = mk_type(
        names, types, table, &mut exports,
        "Long_Integer", TypeKind::Integer, i64::MIN as i128, i64::MAX as i128,
    );
    let (long_long_integer, _) = mk_type(
        names, types, table, &mut exports,
        "Long_Long_Integer", TypeKind::Integer, i64::MIN as i128, i64::MAX as i128,
    );

    // Boolean literals.
    let mut lits = Vec::new();
    for (i, lit) in ["False", "True"].iter().enumerate() {
        let lit_name = names.intern(lit);
        let sym = table.alloc(SymbolKind::Literal, lit_name, loc);
        table.symbol_mut(sym).ty = Some(boolean);
        table.symbol_mut(sym).parent = Some(package);
        table.symbol_mut(sym).static_value = Some(i as i128);
        table.symbol_mut(sym).flags |= SymFlags::IS_PREDEFINED;
        table.install_in(table.global, sym);
        exports.push(sym);
        lits.push(sym);
    }
    types.desc_mut(boolean).body = TypeBody::Enum {
        literals: lits,
        rep: None,
    };

    // Floating point.
    let float_name = names.intern("Float");
    let float = types.alloc(TypeKind::Float, Some(float_name));
    types.desc_mut(float).body = TypeBody::Float { digits: 6 };
    types.desc_mut(float).low = Bound::Real(f32::MIN as f64);
    types.desc_mut(float).high = Bound::Real(f32::MAX as f64);
    let float_sym = table.alloc(SymbolKind::Type, float_name, loc);
    table.symbol_mut(float_sym).ty = Some(float);
    table.symbol_mut(float_sym).parent = Some(package);
    table.symbol_mut(float_sym).flags |= SymFlags::IS_PREDEFINED;
    types.desc_mut(float).defining_symbol = Some(float_sym);
    table.install_in(table.global, float_sym);
    exports.push(float_sym);

    let long_float_name = names.intern("Long_Float");
    let long_float = types.alloc(TypeKind::Float, Some(long_float_name));
    types.desc_mut(long_float).body = TypeBody::Float { digits: 15 };
    types.desc_mut(long_float).low = Bound::Real(f64::MIN);
    types.desc_mut(long_float).high = Bound::Real(f64::MAX);
    let long_float_sym = table.alloc(SymbolKind::Type, long_float_name, loc);
    table.symbol_mut(long_float_sym).ty = Some(long_float);
    table.symbol_mut(long_float_sym).parent = Some(package);
    table.symbol_mut(long_float_sym).flags |= SymFlags::IS_PREDEFINED;
    types.desc_mut(long_float).defining_symbol = Some(long_float_sym);
    table.install_in(table.global, long_float_sym);
    exports.push(long_float_sym);

    // Duration is a fixed-point type.
    let duration_name = names.intern("Duration");
    let duration = types.alloc(TypeKind::Fixed, Some(duration_name));
    types.desc_mut(duration).body = TypeBody::Fixed {
        delta: 0.001,
        small: 0.0009765625,
        scale: -10,
    };
    types.desc_mut(duration).low = Bound::Real(-86_400.0);
    types.desc_mut(duration).high = Bound::Real(86_400.0);
    let duration_sym = table.alloc(SymbolKind::Type, duration_name, loc);
    table.symbol_mut(duration_sym).ty = Some(duration);
    table.symbol_mut(duration_sym).parent = Some(package);
    table.symbol_mut(duration_sym).flags |= SymFlags::IS_PREDEFINED;
    types.desc_mut(duration).defining_symbol = Some(duration_sym);
    table.install_in(table.global, duration_sym);
    exports.push(duration_sym);

    // Natural and Positive are subtypes of Integer.
    let mk_subtype = |names: &mut Interner,
                          types: &mut TypeRegistry,
                          table: &mut SymbolTable,
                          exports: &mut Vec<SymbolId>,
                          name: &str,
                          low: i128|
     -> TypeId {
        let name = names.intern(name);
        let ty = types.alloc(TypeKind::Integer, Some(name));
        types.desc_mut(ty).base = Some(integer);
        types.desc_mut(ty).low = Bound::Int(low);
        types.desc_mut(ty).high = Bound::Int(i32::MAX as i128);
        let sym = table.alloc(SymbolKind::Subtype, name, loc);
        table.symbol_mut(sym).ty = Some(ty);
        table.symbol_mut(sym).parent = Some(package);
        table.symbol_mut(sym).flags |= SymFlags::IS_PREDEFINED;
        types.desc_mut(ty).defining_symbol = Some(sym);
        table.install_in(table.global, sym);
        exports.push(sym);
        ty
    };
    let natural = mk_subtype(names, types, table, &mut exports, "Natural", 0);
    let positive = mk_subtype(names, types, table, &mut exports, "Positive", 1);

    // type String is array (Positive range <>) of Character;
    let string_name = names.intern("String");
    let string = types.alloc(TypeKind::Array, Some(string_name));
    types.desc_mut(string).body = TypeBody::Array {
        indices: SmallVec::from_slice(&[positive]),
        component: character,
        constrained: false,
    };
    let string_sym = table.alloc(SymbolKind::Type, string_name, loc);
    table.symbol_mut(string_sym).ty = Some(string);
    table.symbol_mut(string_sym).parent = Some(package);
    table.symbol_mut(string_sym).flags |= SymFlags::IS_PREDEFINED;
    types.desc_mut(string).defining_symbol = Some(string_sym);
    table.install_in(table.global, string_sym);
    exports.push(string_sym);

    // Predefined exceptions carry fixed identifiers shared with the runtime.
    let mk_exception = |names: &mut Interner,
                            table: &mut SymbolTable,
                            exports: &mut Vec<SymbolId>,
                            name: &str,
                            id: PredefinedException|
     -> SymbolId {
        let name = names.intern(name);
        let sym = table.alloc(SymbolKind::Exception, name, loc);
        table.symbol_mut(sym).parent = Some(package);
        table.symbol_mut(sym).static_value = Some(id as u32 as i128);
        table.symbol_mut(sym).flags |= SymFlags::IS_PREDEFINED;
        table.install_in(table.global, sym);
        exports.push(sym);
        sym
    };
    let constraint_error = mk_exception(
        names, table, &mut exports, "Constraint_Error", PredefinedException::ConstraintError,
    );
    let numeric_error = mk_exception(
        names, table, &mut exports, "Numeric_Error", PredefinedException::NumericError,
    );
    let program_error = mk_exception(
        names, table, &mut exports, "Program_Error", PredefinedException::ProgramError,
    );
    let storage_error = mk_exception(
        names, table, &mut exports, "Storage_Error", PredefinedException::StorageError,
    );
    let tasking_error = mk_exception(
        names, table, &mut exports, "Tasking_Error", PredefinedException::TaskingError,
    );

    let std = Standard {
        package,
        boolean,
        character,
        integer,
        short_short_integer,
        short_integer,
        long_integer,
        long_long_integer,
        float,
        long_float,
        duration,
        natural,
        positive,
        string,
        constraint_error,
        numeric_error,
        program_error,
        storage_error,
        tasking_error,
    };

    // Standard's representations are known up front.
    for ty in [
        boolean, character, integer, short_short_integer, short_integer,
        long_integer, long_long_integer, float, long_float, duration,
        natural, positive, string,
    ] {
        types.freeze(ty, diags);
    }
    table.seal_exports(package, &exports);
    table.install_in(table.global, package);
    std
}

#[cfg(test)]
fn test_env() -> (Interner, TypeRegistry, SymbolTable, Diagnostics, Standard) {
    let mut names = Interner::new();
    let mut types = TypeRegistry::new();
    let mut table = SymbolTable::new();
    let mut diags = Diagnostics::new();
    let std = seed_standard(&mut names, &mut types, &mut table, &mut diags);
    (names, types, table, diags, std)
}

#[test]
fn test_standard_seeding() {
    let (names, types, table, diags, std) = test_env();
    assert!(!diags.has_errors());
    assert_eq!(4, types.desc(std.integer).size);
    assert_eq!(1, types.desc(std.boolean).size);
    assert_eq!(8, types.desc(std.long_float).size);
    assert!(types.is_unconstrained(std.string));
    let id = names.lookup("integer").unwrap();
    assert!(matches!(table.lookup(id), LookupOutcome::Found(_)));
}

#[test]
fn test_predefined_cannot_be_shadowed_globally() {
    let (mut names, _types, mut table, mut diags, _std) = test_env();
    let name = names.intern("Integer");
    let dup = table.alloc(SymbolKind::Variable, name, SourceLoc::BUILTIN);
    table.install(dup, &names, &mut diags);
    assert!(diags.has_errors());
}

#[test]
fn test_inner_scope_shadows() {
    let (mut names, _types, mut table, mut diags, _std) = test_env();
    let name = names.intern("Integer");
    table.push_scope(None);
    let local = table.alloc(SymbolKind::Variable, name, SourceLoc::BUILTIN);
    table.install(local, &names, &mut diags);
    assert!(!diags.has_errors());
    assert_eq!(LookupOutcome::Found(local), table.lookup(name));
    table.pop_scope();
    assert_ne!(LookupOutcome::Found(local), table.lookup(name));
}

#[test]
fn test_use_visible_collision_is_ambiguous() {
    let (mut names, _types, mut table, mut diags, _std) = test_env();
    let x = names.intern("X");
    let mk_pkg = |table: &mut SymbolTable, names: &mut Interner, pkg_name: &str| {
        let pkg = table.alloc(SymbolKind::Package, names.intern(pkg_name), SourceLoc::BUILTIN);
        let var = table.alloc(SymbolKind::Variable, x, SourceLoc::BUILTIN);
        table.symbol_mut(var).parent = Some(pkg);
        table.symbol_mut(pkg).exports = vec![var];
        pkg
    };
    let p1 = mk_pkg(&mut table, &mut names, "P1");
    let p2 = mk_pkg(&mut table, &mut names, "P2");
    table.push_scope(None);
    let scope = table.current();
    table.scope_mut(scope).uses.push(p1);
    assert!(matches!(table.lookup(x), LookupOutcome::Found(_)));
    table.scope_mut(scope).uses.push(p2);
    assert!(matches!(table.lookup(x), LookupOutcome::Ambiguous(_)));
    assert!(!diags.has_errors());
}

#[test]
fn test_overload_prefers_integer_for_universal() {
    // procedure P (X : Integer) and procedure P (X : Float); P(3) takes the
    // Integer one, P(3.0) the Float one.
    let (mut names, types, mut table, mut diags, std) = test_env();
    let p = names.intern("P");
    let x = names.intern("X");
    let mk = |table: &mut SymbolTable, ty: TypeId| -> SymbolId {
        let sym = table.alloc(SymbolKind::Procedure, p, SourceLoc::BUILTIN);
        table.symbol_mut(sym).params = vec![Param {
            name: x,
            ty,
            mode: Mode::In,
            default: None,
        }];
        sym
    };
    let p_int = mk(&mut table, std.integer);
    let p_float = mk(&mut table, std.float);
    table.install(p_int, &names, &mut diags);
    table.install(p_float, &names, &mut diags);

    let cands = table.collect_overloads(p);
    assert_eq!(2, cands.len());
    assert_eq!(
        OverloadResolution::Unique(p_int),
        table.resolve_overloads(&cands, &[types.universal_integer], None, &types)
    );
    assert_eq!(
        OverloadResolution::Unique(p_float),
        table.resolve_overloads(&cands, &[types.universal_real], None, &types)
    );
    assert_eq!(
        OverloadResolution::NoMatch,
        table.resolve_overloads(&cands, &[types.universal_integer, types.universal_integer], None, &types)
    );
}

#[test]
fn test_overload_arity_with_defaults() {
    let (mut names, types, mut table, mut diags, std) = test_env();
    let q = names.intern("Q");
    let sym = table.alloc(SymbolKind::Procedure, q, SourceLoc::BUILTIN);
    let tree = &mut crate::syntax::SyntaxTree::new();
    let default = tree.alloc(SourceLoc::BUILTIN, crate::syntax::NodePayload::IntLit(0));
    table.symbol_mut(sym).params = vec![
        Param { name: names.intern("A"), ty: std.integer, mode: Mode::In, default: None },
        Param { name: names.intern("B"), ty: std.integer, mode: Mode::In, default: Some(default) },
    ];
    table.install(sym, &names, &mut diags);
    let cands = table.collect_overloads(q);
    assert_eq!(
        OverloadResolution::Unique(sym),
        table.resolve_overloads(&cands, &[std.integer], None, &types)
    );
    assert_eq!(
        OverloadResolution::Unique(sym),
        table.resolve_overloads(&cands, &[std.integer, std.integer], None, &types)
    );
    assert_eq!(
        OverloadResolution::NoMatch,
        table.resolve_overloads(&cands, &[std.integer, std.integer, std.integer], None, &types)
    );
}
