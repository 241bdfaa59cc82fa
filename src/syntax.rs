//! Syntax tree produced by the external parser.
//!
//! Nodes live in an arena owned by the compilation; every cross-reference is
//! a typed index. The resolver fills in the `ty` and `symbol` annotations,
//! which start out absent.

use la_arena::{Arena, Idx};

use crate::diag::SourceLoc;
use crate::intern::NameId;
use crate::symbols::SymbolId;
use crate::types::TypeId;

pub type NodeId = Idx<Node>;

/// One syntax node: a location, a kind-discriminated payload, and the
/// annotations attached during resolution.
#[derive(Debug, Clone)]
pub struct Node {
    pub loc: SourceLoc,
    pub payload: NodePayload,
    pub ty: Option<TypeId>,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Default)]
pub struct SyntaxTree {
    pub nodes: Arena<Node>,
}

impl SyntaxTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, loc: SourceLoc, payload: NodePayload) -> NodeId {
        self.nodes.alloc(Node {
            loc,
            payload,
            ty: None,
            symbol: None,
        })
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }
}

impl std::ops::Index<NodeId> for SyntaxTree {
    type Output = Node;
    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}

/// Parameter passing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    In,
    Out,
    InOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Rem,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Xor,
    AndThen,
    OrElse,
    Concat,
}

impl BinaryOp {
    /// The operator's function name, for user-defined overload lookup.
    /// Short-circuit forms are control structures and cannot be overloaded.
    #[must_use]
    pub fn symbol_name(&self) -> Option<&'static str> {
        Some(match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "mod",
            Self::Rem => "rem",
            Self::Pow => "**",
            Self::Eq => "=",
            Self::Ne => "/=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Concat => "&",
            Self::AndThen | Self::OrElse => return None,
        })
    }

    #[must_use]
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge
        )
    }

    #[must_use]
    pub fn is_logical(&self) -> bool {
        matches!(
            self,
            Self::And | Self::Or | Self::Xor | Self::AndThen | Self::OrElse
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    Abs,
}

impl UnaryOp {
    #[must_use]
    pub fn symbol_name(&self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Not => "not",
            Self::Abs => "abs",
        }
    }
}

/// A choice in a case alternative, variant, aggregate, or exception handler.
#[derive(Debug, Clone)]
pub enum Choice {
    /// A single expression or name.
    Expr(NodeId),
    /// A discrete range.
    Range(NodeId),
    Others,
}

/// Iteration scheme of a loop statement.
#[derive(Debug, Clone)]
pub enum LoopScheme {
    Forever,
    While(NodeId),
    For {
        var: NameId,
        reverse: bool,
        range: NodeId,
    },
}

/// Kinds of generic formal types accepted by the macro-style expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericFormalKind {
    /// `type T is private;`
    Private,
    /// `type T is (<>);`
    Discrete,
}

/// The kind-discriminated payload of a syntax node.
///
/// The closed construct set of the language core. Each variant carries only
/// the fields meaningful for its kind; inspection sites match exhaustively.
#[derive(Debug, Clone)]
pub enum NodePayload {
    // Literals.
    IntLit(i128),
    RealLit(f64),
    StrLit(String),
    CharLit(char),
    NullLit,

    // Names.
    Ident(NameId),
    /// `prefix.selector`
    Selected { prefix: NodeId, selector: NameId },
    /// `prefix'name` or `prefix'name(arg)`
    Attribute {
        prefix: NodeId,
        name: NameId,
        arg: Option<NodeId>,
    },

    // Expressions.
    /// `prefix(args)` — call, indexing, slice, or conversion; classified by
    /// the resolver from the prefix's meaning.
    Apply { prefix: NodeId, args: Vec<NodeId> },
    /// One call argument, positionally or named.
    Arg {
        formal: Option<NameId>,
        value: NodeId,
    },
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    Unary { op: UnaryOp, operand: NodeId },
    Range { low: NodeId, high: NodeId },
    Aggregate { items: Vec<NodeId> },
    /// One aggregate association; empty choices means positional.
    CompAssoc {
        choices: Vec<Choice>,
        value: NodeId,
    },
    /// `new mark` or `new mark'(expr)`
    Allocator {
        mark: NodeId,
        init: Option<NodeId>,
    },
    /// `mark'(expr)`
    Qualified { mark: NodeId, expr: NodeId },

    // Subtype indications and constraints.
    SubtypeInd {
        mark: NodeId,
        constraint: Option<NodeId>,
    },
    RangeConstraint { range: NodeId },
    IndexConstraint { ranges: Vec<NodeId> },
    DiscriminantConstraint { args: Vec<NodeId> },

    // Type definitions.
    IntegerDef { range: NodeId },
    ModularDef { modulus: NodeId },
    EnumDef { literals: Vec<NameId> },
    FloatDef {
        digits: NodeId,
        range: Option<NodeId>,
    },
    FixedDef { delta: NodeId, range: NodeId },
    ArrayDef {
        /// Index subtype marks (unconstrained) or discrete ranges (constrained).
        indices: Vec<NodeId>,
        component: NodeId,
        constrained: bool,
    },
    RecordDef {
        components: Vec<NodeId>,
        variant: Option<NodeId>,
    },
    VariantPart { discr: NameId, variants: Vec<NodeId> },
    Variant {
        choices: Vec<Choice>,
        components: Vec<NodeId>,
    },
    AccessDef { designated: NodeId, constant: bool },
    DerivedDef {
        parent: NodeId,
        constraint: Option<NodeId>,
    },
    PrivateDef { limited: bool },

    // Declarations.
    TypeDecl {
        name: NameId,
        discriminants: Vec<NodeId>,
        def: NodeId,
    },
    IncompleteTypeDecl { name: NameId },
    SubtypeDecl { name: NameId, indication: NodeId },
    DiscriminantSpec {
        name: NameId,
        mark: NodeId,
        default: Option<NodeId>,
    },
    ObjectDecl {
        names: Vec<NameId>,
        indication: NodeId,
        init: Option<NodeId>,
        constant: bool,
    },
    NumberDecl { names: Vec<NameId>, value: NodeId },
    ComponentDecl {
        name: NameId,
        indication: NodeId,
        default: Option<NodeId>,
    },
    ParamSpec {
        name: NameId,
        mark: NodeId,
        mode: Mode,
        default: Option<NodeId>,
    },
    SubprogramSpec {
        name: NameId,
        is_function: bool,
        params: Vec<NodeId>,
        result: Option<NodeId>,
    },
    SubprogramDecl { spec: NodeId },
    SubprogramBody {
        spec: NodeId,
        decls: Vec<NodeId>,
        stmts: Vec<NodeId>,
        handlers: Vec<NodeId>,
    },
    PackageSpec {
        name: NameId,
        visible: Vec<NodeId>,
        private: Vec<NodeId>,
    },
    PackageBody {
        name: NameId,
        decls: Vec<NodeId>,
        stmts: Vec<NodeId>,
        handlers: Vec<NodeId>,
    },
    ExceptionDecl { names: Vec<NameId> },
    /// `for Target'Attr use value;` (Size only)
    RepClause {
        target: NameId,
        attr: NameId,
        value: NodeId,
    },
    Pragma { name: NameId, args: Vec<NodeId> },
    UseClause { names: Vec<NodeId> },
    WithClause { names: Vec<NodeId> },

    // Generics (macro-style expansion).
    GenericDecl { formals: Vec<NodeId>, decl: NodeId },
    GenericFormalType {
        name: NameId,
        kind: GenericFormalKind,
    },
    GenericFormalObject {
        name: NameId,
        mark: NodeId,
        mode: Mode,
    },
    /// `package P is new G(actuals);` (or a subprogram instantiation)
    Instantiation {
        name: NameId,
        template: NodeId,
        actuals: Vec<NodeId>,
    },

    // Statements.
    Assign { target: NodeId, value: NodeId },
    CallStmt { call: NodeId },
    IfStmt {
        arms: Vec<(NodeId, Vec<NodeId>)>,
        else_stmts: Vec<NodeId>,
    },
    CaseStmt { expr: NodeId, arms: Vec<NodeId> },
    CaseArm {
        choices: Vec<Choice>,
        stmts: Vec<NodeId>,
    },
    LoopStmt {
        label: Option<NameId>,
        scheme: LoopScheme,
        body: Vec<NodeId>,
    },
    ExitStmt {
        label: Option<NameId>,
        when: Option<NodeId>,
    },
    ReturnStmt { value: Option<NodeId> },
    BlockStmt {
        label: Option<NameId>,
        decls: Vec<NodeId>,
        stmts: Vec<NodeId>,
        handlers: Vec<NodeId>,
    },
    RaiseStmt { name: Option<NodeId> },
    NullStmt,
    Handler {
        choices: Vec<Choice>,
        stmts: Vec<NodeId>,
    },

    // Compilation structure.
    CompUnit { context: Vec<NodeId>, item: NodeId },
}

impl Choice {
    fn map(self, f: &mut impl FnMut(NodeId) -> NodeId) -> Self {
        match self {
            Self::Expr(n) => Self::Expr(f(n)),
            Self::Range(n) => Self::Range(f(n)),
            Self::Others => Self::Others,
        }
    }
}

fn map_vec(v: Vec<NodeId>, f: &mut impl FnMut(NodeId) -> NodeId) -> Vec<NodeId> {
    v.into_iter().map(|n| f(n)).collect()
}

fn map_opt(v: Option<NodeId>, f: &mut impl FnMut(NodeId) -> NodeId) -> Option<NodeId> {
    v.map(|n| f(n))
}

fn map_choices(v: Vec<Choice>, f: &mut impl FnMut(NodeId) -> NodeId) -> Vec<Choice> {
    v.into_iter().map(|c| c.map(f)).collect()
}

impl NodePayload {
    /// Rebuilds the payload with every child node id passed through `f`;
    /// the generic expander uses this to clone template subtrees.
    #[must_use]
    pub fn map_children(self, f: &mut impl FnMut(NodeId) -> NodeId) -> Self {
        use NodePayload::*;
        match self {
            IntLit(_) | RealLit(_) | StrLit(_) | CharLit(_) | NullLit | Ident(_) | NullStmt
            | IncompleteTypeDecl { .. } | ExceptionDecl { .. } | EnumDef { .. }
            | PrivateDef { .. } | GenericFormalType { .. } => self,
            Selected { prefix, selector } => Selected { prefix: f(prefix), selector },
            Attribute { prefix, name, arg } => Attribute {
                prefix: f(prefix),
                name,
                arg: map_opt(arg, f),
            },
            Apply { prefix, args } => Apply {
                prefix: f(prefix),
                args: map_vec(args, f),
            },
            Arg { formal, value } => Arg { formal, value: f(value) },
            Binary { op, lhs, rhs } => Binary { op, lhs: f(lhs), rhs: f(rhs) },
            Unary { op, operand } => Unary { op, operand: f(operand) },
            Range { low, high } => Range { low: f(low), high: f(high) },
            Aggregate { items } => Aggregate { items: map_vec(items, f) },
            CompAssoc { choices, value } => CompAssoc {
                choices: map_choices(choices, f),
                value: f(value),
            },
            Allocator { mark, init } => Allocator { mark: f(mark), init: map_opt(init, f) },
            Qualified { mark, expr } => Qualified { mark: f(mark), expr: f(expr) },
            SubtypeInd { mark, constraint } => SubtypeInd {
                mark: f(mark),
                constraint: map_opt(constraint, f),
            },
            RangeConstraint { range } => RangeConstraint { range: f(range) },
            IndexConstraint { ranges } => IndexConstraint { ranges: map_vec(ranges, f) },
            DiscriminantConstraint { args } => DiscriminantConstraint { args: map_vec(args, f) },
            IntegerDef { range } => IntegerDef { range: f(range) },
            ModularDef { modulus } => ModularDef { modulus: f(modulus) },
            FloatDef { digits, range } => FloatDef { digits: f(digits), range: map_opt(range, f) },
            FixedDef { delta, range } => FixedDef { delta: f(delta), range: f(range) },
            ArrayDef { indices, component, constrained } => ArrayDef {
                indices: map_vec(indices, f),
                component: f(component),
                constrained,
            },
            RecordDef { components, variant } => RecordDef {
                components: map_vec(components, f),
                variant: map_opt(variant, f),
            },
            VariantPart { discr, variants } => VariantPart {
                discr,
                variants: map_vec(variants, f),
            },
            Variant { choices, components } => Variant {
                choices: map_choices(choices, f),
                components: map_vec(components, f),
            },
            AccessDef { designated, constant } => AccessDef {
                designated: f(designated),
                constant,
            },
            DerivedDef { parent, constraint } => DerivedDef {
                parent: f(parent),
                constraint: map_opt(constraint, f),
            },
            TypeDecl { name, discriminants, def } => TypeDecl {
                name,
                discriminants: map_vec(discriminants, f),
                def: f(def),
            },
            SubtypeDecl { name, indication } => SubtypeDecl { name, indication: f(indication) },
            DiscriminantSpec { name, mark, default } => DiscriminantSpec {
                name,
                mark: f(mark),
                default: map_opt(default, f),
            },
            ObjectDecl { names, indication, init, constant } => ObjectDecl {
                names,
                indication: f(indication),
                init: map_opt(init, f),
                constant,
            },
            NumberDecl { names, value } => NumberDecl { names, value: f(value) },
            ComponentDecl { name, indication, default } => ComponentDecl {
                name,
                indication: f(indication),
                default: map_opt(default, f),
            },
            ParamSpec { name, mark, mode, default } => ParamSpec {
                name,
                mark: f(mark),
                mode,
                default: map_opt(default, f),
            },
            SubprogramSpec { name, is_function, params, result } => SubprogramSpec {
                name,
                is_function,
                params: map_vec(params, f),
                result: map_opt(result, f),
            },
            SubprogramDecl { spec } => SubprogramDecl { spec: f(spec) },
            SubprogramBody { spec, decls, stmts, handlers } => SubprogramBody {
                spec: f(spec),
                decls: map_vec(decls, f),
                stmts: map_vec(stmts, f),
                handlers: map_vec(handlers, f),
            },
            PackageSpec { name, visible, private } => PackageSpec {
                name,
                visible: map_vec(visible, f),
                private: map_vec(private, f),
            },
            PackageBody { name, decls, stmts, handlers } => PackageBody {
                name,
                decls: map_vec(decls, f),
                stmts: map_vec(stmts, f),
                handlers: map_vec(handlers, f),
            },
            RepClause { target, attr, value } => RepClause { target, attr, value: f(value) },
            Pragma { name, args } => Pragma { name, args: map_vec(args, f) },
            UseClause { names } => UseClause { names: map_vec(names, f) },
            WithClause { names } => WithClause { names: map_vec(names, f) },
            GenericDecl { formals, decl } => GenericDecl {
                formals: map_vec(formals, f),
                decl: f(decl),
            },
            GenericFormalObject { name, mark, mode } => GenericFormalObject {
                name,
                mark: f(mark),
                mode,
            },
            Instantiation { name, template, actuals } => Instantiation {
                name,
                template: f(template),
                actuals: map_vec(actuals, f),
            },
            Assign { target, value } => Assign { target: f(target), value: f(value) },
            CallStmt { call } => CallStmt { call: f(call) },
            IfStmt { arms, else_stmts } => IfStmt {
                arms: arms
                    .into_iter()
                    .map(|(c, s)| (f(c), map_vec(s, &mut *f)))
                    .collect(),
                else_stmts: map_vec(else_stmts, f),
            },
            CaseStmt { expr, arms } => CaseStmt { expr: f(expr), arms: map_vec(arms, f) },
            CaseArm { choices, stmts } => CaseArm {
                choices: map_choices(choices, f),
                stmts: map_vec(stmts, f),
            },
            LoopStmt { label, scheme, body } => LoopStmt {
                label,
                scheme: match scheme {
                    LoopScheme::Forever => LoopScheme::Forever,
                    LoopScheme::While(c) => LoopScheme::While(f(c)),
                    LoopScheme::For { var, reverse, range } => LoopScheme::For {
                        var,
                        reverse,
                        range: f(range),
                    },
                },
                body: map_vec(body, f),
            },
            ExitStmt { label, when } => ExitStmt { label, when: map_opt(when, f) },
            ReturnStmt { value } => ReturnStmt { value: map_opt(value, f) },
            BlockStmt { label, decls, stmts, handlers } => BlockStmt {
                label,
                decls: map_vec(decls, f),
                stmts: map_vec(stmts, f),
                handlers: map_vec(handlers, f),
            },
            RaiseStmt { name } => RaiseStmt { name: map_opt(name, f) },
            Handler { choices, stmts } => Handler {
                choices: map_choices(choices, f),
                stmts: map_vec(stmts, f),
            },
            CompUnit { context, item } => CompUnit {
                context: map_vec(context, f),
                item: f(item),
            },
        }
    }

    /// Short construct name for diagnostics.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        use NodePayload::*;
        match self {
            IntLit(_) | RealLit(_) | StrLit(_) | CharLit(_) | NullLit => "literal",
            Ident(_) | Selected { .. } => "name",
            Attribute { .. } => "attribute",
            Apply { .. } | Arg { .. } => "call",
            Binary { .. } | Unary { .. } => "operator",
            Range { .. } => "range",
            Aggregate { .. } | CompAssoc { .. } => "aggregate",
            Allocator { .. } => "allocator",
            Qualified { .. } => "qualified expression",
            SubtypeInd { .. }
            | RangeConstraint { .. }
            | IndexConstraint { .. }
            | DiscriminantConstraint { .. } => "subtype indication",
            IntegerDef { .. } | ModularDef { .. } | EnumDef { .. } | FloatDef { .. }
            | FixedDef { .. } | ArrayDef { .. } | RecordDef { .. } | VariantPart { .. }
            | Variant { .. } | AccessDef { .. } | DerivedDef { .. } | PrivateDef { .. } => {
                "type definition"
            }
            TypeDecl { .. } | IncompleteTypeDecl { .. } | SubtypeDecl { .. } => "type declaration",
            DiscriminantSpec { .. } => "discriminant",
            ObjectDecl { .. } | NumberDecl { .. } => "object declaration",
            ComponentDecl { .. } => "component",
            ParamSpec { .. } => "parameter",
            SubprogramSpec { .. } | SubprogramDecl { .. } | SubprogramBody { .. } => "subprogram",
            PackageSpec { .. } | PackageBody { .. } => "package",
            ExceptionDecl { .. } => "exception declaration",
            RepClause { .. } => "representation clause",
            Pragma { .. } => "pragma",
            UseClause { .. } => "use clause",
            WithClause { .. } => "with clause",
            GenericDecl { .. } | GenericFormalType { .. } | GenericFormalObject { .. } => "generic",
            Instantiation { .. } => "instantiation",
            Assign { .. } => "assignment",
            CallStmt { .. } => "procedure call",
            IfStmt { .. } => "if statement",
            CaseStmt { .. } | CaseArm { .. } => "case statement",
            LoopStmt { .. } => "loop statement",
            ExitStmt { .. } => "exit statement",
            ReturnStmt { .. } => "return statement",
            BlockStmt { .. } => "block statement",
            RaiseStmt { .. } => "raise statement",
            NullStmt => "null statement",
            Handler { .. } => "exception handler",
            CompUnit { .. } => "compilation unit",
        }
    }
}
