//! Single-pass Ada 83 compiler core lowering to LLVM textual IR
//!
//! An external parser supplies a typed syntax tree; this crate resolves it
//! (names, overloads, types, freezing, static folding), emits LLVM text,
//! and orders compilation units for elaboration.

/// Compilation context owning every arena and registry
pub mod context;
/// Source locations and accumulated diagnostics
pub mod diag;
/// Cross-unit elaboration ordering
pub mod elaborate;
/// LLVM textual IR emission
pub mod emit;
/// Exact static-expression evaluation
pub mod fold;
/// Case-insensitive name interning
pub mod intern;
/// Linker-name mangling
pub mod mangle;
/// Name resolution and legality checking
pub mod resolve;
/// Scoped symbol table and overload disambiguation
pub mod symbols;
/// Syntax tree data model
pub mod syntax;
/// Type registry and freezing
pub mod types;
/// Compilation units and ALI output
pub mod units;

pub use self::context::Compilation;
pub use self::diag::{Diagnostics, Severity, SourceLoc};
pub use self::elaborate::ElaborationOrder;
pub use self::emit::Emitter;
pub use self::resolve::resolve_unit;
