//! Type registry: descriptors for every type and subtype in the program,
//! the freezing protocol that finalizes their representation, and the
//! compatibility relation used by overload resolution.

use bitflags::bitflags;
use la_arena::{Arena, Idx};
use log::debug;
use smallvec::SmallVec;

use crate::diag::{Diagnostics, SourceLoc};
use crate::intern::NameId;
use crate::symbols::SymbolId;
use crate::syntax::NodeId;

pub type TypeId = Idx<TypeDesc>;

bitflags! {
    /// Checks suppressed by `pragma Suppress`, inherited through derivation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CheckMask: u16 {
        const RANGE        = 1 << 0;
        const OVERFLOW     = 1 << 1;
        const INDEX        = 1 << 2;
        const LENGTH       = 1 << 3;
        const DIVISION     = 1 << 4;
        const ACCESS       = 1 << 5;
        const DISCRIMINANT = 1 << 6;
        const ELABORATION  = 1 << 7;
        const STORAGE      = 1 << 8;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Unknown,
    Boolean,
    Character,
    Integer,
    Modular,
    Enumeration,
    Float,
    Fixed,
    Array,
    Record,
    /// The type of string literals before context coerces them.
    String,
    Access,
    UniversalInteger,
    UniversalReal,
    Task,
    Subprogram,
    Private,
    LimitedPrivate,
    Incomplete,
    Package,
}

/// A scalar bound. Deferred bounds are folded by the resolver before the
/// type is frozen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Unset,
    Int(i128),
    Real(f64),
    Deferred(NodeId),
}

impl Bound {
    #[must_use]
    pub fn as_int(&self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

/// Result of looking a component up by name.
#[derive(Debug, Clone, Copy)]
pub struct ComponentRef {
    pub ty: TypeId,
    pub offset: u32,
    pub discriminant: bool,
    /// Index of the variant holding the component, when it is not in the
    /// fixed portion.
    pub variant: Option<u32>,
}

/// A record component with its finalized offset.
#[derive(Debug, Clone)]
pub struct Component {
    pub name: NameId,
    pub ty: TypeId,
    pub offset: u32,
    pub default: Option<NodeId>,
}

/// A record discriminant. Discriminants occupy the leading slots of the
/// fixed portion.
#[derive(Debug, Clone)]
pub struct Discriminant {
    pub name: NameId,
    pub ty: TypeId,
    pub offset: u32,
    pub default: Option<NodeId>,
}

/// A span of discriminant values selecting one variant.
#[derive(Debug, Clone, Copy)]
pub enum VariantChoice {
    Span { low: i128, high: i128 },
    Others,
}

impl VariantChoice {
    #[must_use]
    pub fn matches(&self, value: i128) -> bool {
        match self {
            Self::Span { low, high } => *low <= value && value <= *high,
            Self::Others => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VariantInfo {
    pub choices: Vec<VariantChoice>,
    pub components: Vec<Component>,
    /// Size of this variant's component area.
    pub size: u32,
}

/// Kind-discriminated representation details.
#[derive(Debug, Clone, Default)]
pub enum TypeBody {
    #[default]
    None,
    Array {
        indices: SmallVec<[TypeId; 2]>,
        component: TypeId,
        constrained: bool,
    },
    Record {
        discriminants: Vec<Discriminant>,
        components: Vec<Component>,
        variants: Vec<VariantInfo>,
        /// Offset of the variant area; meaningful only when `variants` is
        /// non-empty.
        variant_offset: u32,
        /// True when a discriminant constraint has been applied.
        constrained: bool,
        /// The constraining discriminant values, one per discriminant.
        constraint: Vec<i128>,
    },
    Access {
        designated: TypeId,
        access_constant: bool,
    },
    Enum {
        literals: Vec<SymbolId>,
        /// Representation values from an enumeration representation clause;
        /// positions 0..n-1 otherwise.
        rep: Option<Vec<i128>>,
    },
    Fixed {
        delta: f64,
        small: f64,
        scale: i32,
    },
    Float {
        digits: u32,
    },
}

/// Descriptor of one type or subtype. Exactly one exists per type in the
/// program; all references are `TypeId`s.
#[derive(Debug, Clone)]
pub struct TypeDesc {
    pub kind: TypeKind,
    pub name: Option<NameId>,
    pub loc: SourceLoc,
    pub defining_symbol: Option<SymbolId>,
    /// Size in bytes, matching the LLVM data layout convention. Zero until
    /// frozen; stays zero for unconstrained composites (deferred to the fat
    /// pointer) and for types with no runtime representation.
    pub size: u32,
    pub align: u32,
    pub low: Bound,
    pub high: Bound,
    /// Modular types only.
    pub modulus: u128,
    /// Base type for subtypes.
    pub base: Option<TypeId>,
    /// Parent type for derived types.
    pub parent: Option<TypeId>,
    pub body: TypeBody,
    pub suppressed: CheckMask,
    /// Bits requested by a Size clause, validated at the freezing point.
    pub size_clause: Option<u32>,
    /// Pragma Pack: lay components out without padding.
    pub packed: bool,
    pub generic_formal: bool,
    pub frozen: bool,
}

impl TypeDesc {
    fn new(kind: TypeKind, name: Option<NameId>) -> Self {
        Self {
            kind,
            name,
            loc: SourceLoc::BUILTIN,
            defining_symbol: None,
            size: 0,
            align: 1,
            low: Bound::Unset,
            high: Bound::Unset,
            modulus: 0,
            base: None,
            parent: None,
            body: TypeBody::None,
            suppressed: CheckMask::empty(),
            size_clause: None,
            packed: false,
            generic_formal: false,
            frozen: false,
        }
    }
}

/// Smallest standard width (8, 16, 32, 64, or 128 bits) holding every value
/// of `low..=high`.
#[must_use]
pub fn bits_for_range(low: i128, high: i128) -> u32 {
    let needed = if low < 0 {
        // Signed: a sign bit on top of the widest magnitude.
        let neg = 128 - ((-(low + 1)) as u128).leading_zeros() + 1;
        let pos = if high <= 0 {
            1
        } else {
            128 - (high as u128).leading_zeros() + 1
        };
        neg.max(pos)
    } else {
        (128 - (high.max(1) as u128).leading_zeros()).max(1)
    };
    match needed {
        0..=8 => 8,
        9..=16 => 16,
        17..=32 => 32,
        33..=64 => 64,
        _ => 128,
    }
}

/// Width determined by `modulus - 1`.
#[must_use]
pub fn bits_for_modulus(modulus: u128) -> u32 {
    let max = modulus.saturating_sub(1);
    match 128 - max.leading_zeros() {
        0..=8 => 8,
        9..=16 => 16,
        17..=32 => 32,
        33..=64 => 64,
        _ => 128,
    }
}

fn align_to(offset: u32, align: u32) -> u32 {
    debug_assert!(align.is_power_of_two());
    (offset + align - 1) & !(align - 1)
}

/// Owns every type descriptor of a compilation.
#[derive(Debug)]
pub struct TypeRegistry {
    arena: Arena<TypeDesc>,
    /// Compile-time-only integer type of integer literals.
    pub universal_integer: TypeId,
    /// Compile-time-only real type of real literals.
    pub universal_real: TypeId,
    /// Type of string literals; covered by any one-dimensional character array.
    pub generic_string: TypeId,
    /// The error type: covers and is covered by everything, letting
    /// resolution continue past a reported error.
    pub error: TypeId,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let universal_integer = arena.alloc(TypeDesc::new(TypeKind::UniversalInteger, None));
        let universal_real = arena.alloc(TypeDesc::new(TypeKind::UniversalReal, None));
        let generic_string = arena.alloc(TypeDesc::new(TypeKind::String, None));
        let error = arena.alloc(TypeDesc::new(TypeKind::Unknown, None));
        let mut registry = Self {
            arena,
            universal_integer,
            universal_real,
            generic_string,
            error,
        };
        // Universal types have no runtime representation; freezing them is
        // a no-op, so they can start out frozen.
        for id in [universal_integer, universal_real, generic_string, error] {
            registry.arena[id].frozen = true;
        }
        registry
    }

    pub fn alloc(&mut self, kind: TypeKind, name: Option<NameId>) -> TypeId {
        self.arena.alloc(TypeDesc::new(kind, name))
    }

    #[must_use]
    pub fn desc(&self, id: TypeId) -> &TypeDesc {
        &self.arena[id]
    }

    pub fn desc_mut(&mut self, id: TypeId) -> &mut TypeDesc {
        &mut self.arena[id]
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeDesc)> {
        self.arena.iter()
    }

    /// Follows subtype links to the base type.
    #[must_use]
    pub fn base_of(&self, mut id: TypeId) -> TypeId {
        while let Some(base) = self.arena[id].base {
            id = base;
        }
        id
    }

    /// Follows both subtype and derivation links to the root type.
    #[must_use]
    pub fn root_of(&self, id: TypeId) -> TypeId {
        let mut id = self.base_of(id);
        while let Some(parent) = self.arena[id].parent {
            id = self.base_of(parent);
        }
        id
    }

    #[must_use]
    pub fn is_discrete(&self, id: TypeId) -> bool {
        matches!(
            self.arena[self.base_of(id)].kind,
            TypeKind::Boolean
                | TypeKind::Character
                | TypeKind::Integer
                | TypeKind::Modular
                | TypeKind::Enumeration
                | TypeKind::UniversalInteger
        )
    }

    #[must_use]
    pub fn is_real(&self, id: TypeId) -> bool {
        matches!(
            self.arena[self.base_of(id)].kind,
            TypeKind::Float | TypeKind::Fixed | TypeKind::UniversalReal
        )
    }

    #[must_use]
    pub fn is_scalar(&self, id: TypeId) -> bool {
        self.is_discrete(id) || self.is_real(id)
    }

    #[must_use]
    pub fn is_limited(&self, id: TypeId) -> bool {
        matches!(
            self.arena[self.root_of(id)].kind,
            TypeKind::LimitedPrivate | TypeKind::Task
        )
    }

    #[must_use]
    pub fn is_error(&self, id: TypeId) -> bool {
        self.arena[id].kind == TypeKind::Unknown
    }

    /// A one-dimensional array whose component is the Character type.
    #[must_use]
    pub fn is_string_like(&self, id: TypeId) -> bool {
        match &self.arena[self.base_of(id)].body {
            TypeBody::Array {
                indices, component, ..
            } => indices.len() == 1 && self.arena[self.base_of(*component)].kind == TypeKind::Character,
            _ => self.arena[id].kind == TypeKind::String,
        }
    }

    /// An unconstrained array, or a discriminated record without constraint:
    /// values cross subprogram boundaries through the fat-pointer ABI.
    #[must_use]
    pub fn is_unconstrained(&self, id: TypeId) -> bool {
        match &self.arena[id].body {
            TypeBody::Array { constrained, .. } => !constrained,
            TypeBody::Record {
                discriminants,
                constrained,
                ..
            } => !discriminants.is_empty() && !constrained,
            _ => self.arena[id].kind == TypeKind::String,
        }
    }

    /// The compatibility relation: does an expected type accept an actual?
    #[must_use]
    pub fn covers(&self, expected: TypeId, actual: TypeId) -> bool {
        if expected == actual {
            return true;
        }
        let e = &self.arena[expected];
        let a = &self.arena[actual];
        // The error type covers everything, in both directions.
        if e.kind == TypeKind::Unknown || a.kind == TypeKind::Unknown {
            return true;
        }
        if a.kind == TypeKind::UniversalInteger && self.is_discrete(expected) {
            return true;
        }
        if a.kind == TypeKind::UniversalReal && self.is_real(expected) {
            return true;
        }
        if a.kind == TypeKind::String && self.is_string_like(expected) {
            return true;
        }
        if self.root_of(expected) == self.root_of(actual) {
            return true;
        }
        if let (
            TypeBody::Access { designated: ed, .. },
            TypeBody::Access { designated: ad, .. },
        ) = (&e.body, &a.body)
        {
            return self.covers(*ed, *ad) && self.covers(*ad, *ed);
        }
        false
    }

    /// Looks up a record component or discriminant by name, searching the
    /// fixed portion first and then every variant.
    #[must_use]
    pub fn component_of(&self, ty: TypeId, name: NameId) -> Option<ComponentRef> {
        let base = self.base_of(ty);
        let TypeBody::Record {
            discriminants,
            components,
            variants,
            ..
        } = &self.arena[base].body
        else {
            return None;
        };
        for d in discriminants {
            if d.name == name {
                return Some(ComponentRef {
                    ty: d.ty,
                    offset: d.offset,
                    discriminant: true,
                    variant: None,
                });
            }
        }
        for c in components {
            if c.name == name {
                return Some(ComponentRef {
                    ty: c.ty,
                    offset: c.offset,
                    discriminant: false,
                    variant: None,
                });
            }
        }
        for (i, v) in variants.iter().enumerate() {
            for c in &v.components {
                if c.name == name {
                    return Some(ComponentRef {
                        ty: c.ty,
                        offset: c.offset,
                        discriminant: false,
                        variant: Some(i as u32),
                    });
                }
            }
        }
        None
    }

    /// Number of values of a constrained discrete range, zero for a null
    /// range.
    #[must_use]
    pub fn length_of(&self, index: TypeId) -> Option<u64> {
        let d = &self.arena[index];
        let (low, high) = (d.low.as_int()?, d.high.as_int()?);
        if high < low {
            Some(0)
        } else {
            u64::try_from(high - low + 1).ok()
        }
    }

    /// Finalizes the representation of a type. Idempotent: a second freeze
    /// is a no-op, and a frozen descriptor's layout never changes again.
    /// Returns true only for the freeze that did the work.
    pub fn freeze(&mut self, id: TypeId, diags: &mut Diagnostics) -> bool {
        if self.arena[id].frozen {
            return false;
        }
        // Mark first: self-referential structures (access types within
        // records) must not recurse forever.
        self.arena[id].frozen = true;

        // The parent of a derived type is frozen before the child, and a
        // subtype inherits representation from its frozen base.
        if let Some(parent) = self.arena[id].parent {
            self.freeze(parent, diags);
        }
        if let Some(base) = self.arena[id].base {
            self.freeze(base, diags);
            let (size, align, base_low, base_high) = {
                let b = &self.arena[base];
                (b.size, b.align, b.low, b.high)
            };
            let d = &mut self.arena[id];
            d.size = size;
            d.align = align;
            // The narrower bounds recorded on the subtype stay as declared,
            // for range-check emission.
            if matches!(d.low, Bound::Unset) {
                d.low = base_low;
            }
            if matches!(d.high, Bound::Unset) {
                d.high = base_high;
            }
            self.freeze_body_of_subtype(id, diags);
            return true;
        }

        match self.arena[id].kind {
            TypeKind::UniversalInteger
            | TypeKind::UniversalReal
            | TypeKind::Unknown
            | TypeKind::String
            | TypeKind::Package
            | TypeKind::Incomplete
            | TypeKind::Task => {}
            TypeKind::Subprogram | TypeKind::Access => {
                let d = &mut self.arena[id];
                d.size = 8;
                d.align = 8;
            }
            TypeKind::Boolean
            | TypeKind::Character
            | TypeKind::Integer
            | TypeKind::Enumeration => self.freeze_discrete(id),
            TypeKind::Modular => {
                let bits = bits_for_modulus(self.arena[id].modulus);
                let d = &mut self.arena[id];
                d.size = bits / 8;
                d.align = d.size.min(16);
            }
            TypeKind::Float => {
                let digits = match &self.arena[id].body {
                    TypeBody::Float { digits } => *digits,
                    _ => 15,
                };
                let d = &mut self.arena[id];
                d.size = if digits <= 6 { 4 } else { 8 };
                d.align = d.size;
            }
            TypeKind::Fixed => self.freeze_fixed(id),
            TypeKind::Array => self.freeze_array(id, diags),
            TypeKind::Record => self.freeze_record(id, diags),
            TypeKind::Private | TypeKind::LimitedPrivate => {
                if !self.arena[id].generic_formal {
                    let name = self.arena[id].name;
                    debug!("freezing private type without a full view: {name:?}");
                }
                // A formal private type gets pointer-sized slots until the
                // instantiation substitutes the actual.
                let d = &mut self.arena[id];
                d.size = 8;
                d.align = 8;
            }
        }

        // Representation errors surface at the freezing point.
        if let Some(bits) = self.arena[id].size_clause {
            let natural = self.arena[id].size * 8;
            if bits < natural {
                let loc = self.arena[id].loc;
                diags.error(
                    loc,
                    format!("size clause of {bits} bits does not fit the {natural} bits required"),
                );
            } else {
                let d = &mut self.arena[id];
                d.size = bits.div_ceil(8);
            }
        }

        let d = &self.arena[id];
        debug!(
            "froze type {:?} kind={:?} size={} align={}",
            d.name, d.kind, d.size, d.align
        );
        true
    }

    fn freeze_discrete(&mut self, id: TypeId) {
        // Enumerations without a representation clause number their
        // literals 0..n-1; a clause's values are used as declared.
        if let TypeBody::Enum { literals, rep } = &self.arena[id].body {
            let (low, high) = match rep {
                Some(values) => (
                    values.iter().copied().min().unwrap_or(0),
                    values.iter().copied().max().unwrap_or(0),
                ),
                None => (0, literals.len().saturating_sub(1) as i128),
            };
            let d = &mut self.arena[id];
            d.low = Bound::Int(low);
            d.high = Bound::Int(high);
        }
        let d = &self.arena[id];
        let low = d.low.as_int().unwrap_or(0);
        let high = d.high.as_int().unwrap_or(0);
        let bits = bits_for_range(low, high);
        let d = &mut self.arena[id];
        d.size = bits / 8;
        d.align = d.size.min(16);
    }

    fn freeze_fixed(&mut self, id: TypeId) {
        if let TypeBody::Fixed { delta, small, scale } = &mut self.arena[id].body {
            // Small is the largest power of two no greater than delta.
            *scale = delta.log2().floor() as i32;
            *small = (*scale as f64).exp2();
        }
        let (low, high, small) = match &self.arena[id].body {
            TypeBody::Fixed { small, .. } => (
                self.arena[id].low.as_real().unwrap_or(0.0),
                self.arena[id].high.as_real().unwrap_or(0.0),
                *small,
            ),
            _ => return,
        };
        let bits = bits_for_range((low / small) as i128, (high / small) as i128);
        let d = &mut self.arena[id];
        d.size = (bits / 8).max(4);
        d.align = d.size.min(16);
    }

    fn freeze_array(&mut self, id: TypeId, diags: &mut Diagnostics) {
        let (indices, component, constrained) = match &self.arena[id].body {
            TypeBody::Array {
                indices,
                component,
                constrained,
            } => (indices.clone(), *component, *constrained),
            _ => return,
        };
        self.freeze(component, diags);
        for &index in &indices {
            self.freeze(index, diags);
        }
        let elem = &self.arena[component];
        let (elem_size, elem_align) = (elem.size, elem.align);
        if !constrained {
            // Deferred: the carrier is the fat pointer.
            let d = &mut self.arena[id];
            d.size = 0;
            d.align = elem_align.max(1);
            return;
        }
        let mut count: u64 = 1;
        for &index in &indices {
            count = count.saturating_mul(self.length_of(index).unwrap_or(0));
        }
        let d = &mut self.arena[id];
        d.align = elem_align.max(1);
        d.size = align_to((elem_size as u64).saturating_mul(count) as u32, d.align);
    }

    fn freeze_record(&mut self, id: TypeId, diags: &mut Diagnostics) {
        let mut body = std::mem::take(&mut self.arena[id].body);
        let TypeBody::Record {
            discriminants,
            components,
            variants,
            variant_offset,
            ..
        } = &mut body
        else {
            self.arena[id].body = body;
            return;
        };

        // Every component type is frozen before the record's own layout.
        for d in discriminants.iter() {
            self.freeze(d.ty, diags);
        }
        for c in components.iter() {
            self.freeze(c.ty, diags);
        }
        for v in variants.iter() {
            for c in &v.components {
                self.freeze(c.ty, diags);
            }
        }

        // Declaration order, each field at the next aligned offset. A
        // packed record drops the padding.
        let packed = self.arena[id].packed;
        let field_align = |a: u32| if packed { 1 } else { a };
        let mut offset = 0u32;
        let mut max_align = 1u32;
        for d in discriminants.iter_mut() {
            let fd = &self.arena[d.ty];
            offset = align_to(offset, field_align(fd.align));
            d.offset = offset;
            offset += fd.size;
            max_align = max_align.max(field_align(fd.align));
        }
        for c in components.iter_mut() {
            let fd = &self.arena[c.ty];
            offset = align_to(offset, field_align(fd.align));
            c.offset = offset;
            offset += fd.size;
            max_align = max_align.max(field_align(fd.align));
        }

        // The variant area sits after the fixed portion and is sized by the
        // largest variant.
        let mut variant_area = 0u32;
        if !variants.is_empty() {
            let mut area_align = 1u32;
            for v in variants.iter() {
                for c in &v.components {
                    area_align = area_align.max(self.arena[c.ty].align);
                }
            }
            offset = align_to(offset, area_align);
            *variant_offset = offset;
            for v in variants.iter_mut() {
                let mut voff = 0u32;
                for c in v.components.iter_mut() {
                    let fd = &self.arena[c.ty];
                    voff = align_to(voff, fd.align);
                    c.offset = offset + voff;
                    voff += fd.size;
                }
                v.size = voff;
                variant_area = variant_area.max(voff);
            }
            max_align = max_align.max(area_align);
        }

        let d = &mut self.arena[id];
        d.body = body;
        d.align = max_align;
        d.size = align_to(offset + variant_area, max_align);
    }

    /// A record or array subtype shares the base's layout but carries its
    /// own constraint in the body.
    fn freeze_body_of_subtype(&mut self, id: TypeId, _diags: &mut Diagnostics) {
        let Some(base) = self.arena[id].base else {
            return;
        };
        if matches!(self.arena[id].body, TypeBody::None)
            && !matches!(self.arena[base].body, TypeBody::None)
        {
            let inherited = self.arena[base].body.clone();
            self.arena[id].body = inherited;
        }
        // A constrained array subtype has a concrete size of its own.
        if let TypeBody::Array { constrained: true, .. } = &self.arena[id].body {
            if self.arena[id].size == 0 {
                self.arena[id].frozen = false;
                self.freeze_array(id, _diags);
                self.arena[id].frozen = true;
            }
        }
    }

    /// LLVM textual type for values of this type.
    #[must_use]
    pub fn llvm_type(&self, id: TypeId) -> String {
        let base = self.base_of(id);
        let d = &self.arena[base];
        match d.kind {
            TypeKind::Float => {
                if d.size == 4 {
                    "float".to_string()
                } else {
                    "double".to_string()
                }
            }
            TypeKind::Access | TypeKind::Subprogram => "ptr".to_string(),
            TypeKind::Array | TypeKind::String => match &d.body {
                TypeBody::Array {
                    indices,
                    component,
                    constrained: true,
                } => {
                    let mut count: u64 = 1;
                    for &index in indices {
                        count = count.saturating_mul(self.length_of(index).unwrap_or(0));
                    }
                    format!("[{count} x {}]", self.llvm_type(*component))
                }
                // Unconstrained arrays travel as fat pointers.
                _ => "{ ptr, ptr }".to_string(),
            },
            TypeKind::Record => match &d.body {
                TypeBody::Record {
                    discriminants,
                    components,
                    variants,
                    ..
                } => {
                    let mut fields: Vec<String> = Vec::new();
                    for disc in discriminants {
                        fields.push(self.llvm_type(disc.ty));
                    }
                    for c in components {
                        fields.push(self.llvm_type(c.ty));
                    }
                    if !variants.is_empty() {
                        let area = variants.iter().map(|v| v.size).max().unwrap_or(0);
                        fields.push(format!("[{area} x i8]"));
                    }
                    format!("{{ {} }}", fields.join(", "))
                }
                _ => "{}".to_string(),
            },
            TypeKind::UniversalReal => "double".to_string(),
            TypeKind::UniversalInteger => "i128".to_string(),
            _ => format!("i{}", (d.size.max(1)) * 8),
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<TypeId> for TypeRegistry {
    type Output = TypeDesc;
    fn index(&self, id: TypeId) -> &TypeDesc {
        &self.arena[id]
    }
}

#[test]
fn test_bits_for_range() {
    assert_eq!(8, bits_for_range(0, 1));
    assert_eq!(8, bits_for_range(0, 255));
    assert_eq!(16, bits_for_range(0, 256));
    assert_eq!(8, bits_for_range(-128, 127));
    assert_eq!(16, bits_for_range(-129, 127));
    assert_eq!(32, bits_for_range(-2_147_483_648, 2_147_483_647));
    assert_eq!(64, bits_for_range(0, u32::MAX as i128 + 1));
    assert_eq!(128, bits_for_range(i128::MIN, i128::MAX));
}

#[test]
fn test_bits_for_modulus() {
    assert_eq!(8, bits_for_modulus(2));
    assert_eq!(8, bits_for_modulus(256));
    assert_eq!(16, bits_for_modulus(257));
    assert_eq!(32, bits_for_modulus(1 << 32));
    assert_eq!(64, bits_for_modulus((1 << 32) + 1));
}

#[test]
fn test_scalar_freeze_is_idempotent() {
    let mut reg = TypeRegistry::new();
    let mut diags = Diagnostics::new();
    let t = reg.alloc(TypeKind::Integer, None);
    reg.desc_mut(t).low = Bound::Int(-40);
    reg.desc_mut(t).high = Bound::Int(1000);
    reg.freeze(t, &mut diags);
    assert_eq!(2, reg[t].size);
    assert_eq!(2, reg[t].align);
    // A second freeze never changes the layout.
    reg.desc_mut(t).high = Bound::Int(i128::MAX);
    reg.freeze(t, &mut diags);
    assert_eq!(2, reg[t].size);
}

#[test]
fn test_record_layout_respects_alignment() {
    let mut reg = TypeRegistry::new();
    let mut diags = Diagnostics::new();
    let byte = reg.alloc(TypeKind::Integer, None);
    reg.desc_mut(byte).low = Bound::Int(0);
    reg.desc_mut(byte).high = Bound::Int(100);
    let word = reg.alloc(TypeKind::Integer, None);
    reg.desc_mut(word).low = Bound::Int(0);
    reg.desc_mut(word).high = Bound::Int(1 << 20);
    let rec = reg.alloc(TypeKind::Record, None);
    let mut interner = crate::intern::Interner::new();
    let name = interner.intern("c");
    reg.desc_mut(rec).body = TypeBody::Record {
        discriminants: Vec::new(),
        components: vec![
            Component { name, ty: byte, offset: 0, default: None },
            Component { name, ty: word, offset: 0, default: None },
            Component { name, ty: byte, offset: 0, default: None },
        ],
        variants: Vec::new(),
        variant_offset: 0,
        constrained: false,
        constraint: Vec::new(),
    };
    reg.freeze(rec, &mut diags);
    let TypeBody::Record { components, .. } = &reg[rec].body else {
        panic!("record body");
    };
    // Offsets are strictly non-decreasing and aligned.
    assert_eq!(0, components[0].offset);
    assert_eq!(4, components[1].offset);
    assert_eq!(8, components[2].offset);
    assert_eq!(12, reg[rec].size);
    assert_eq!(4, reg[rec].align);
}
