//! Type representation for the EFU type system.
//!
//! Defines the closed type universe: primitives, arrays, structs, functions,
//! enums, tagged unions, plus `any` and `void`. Equivalence and the numeric
//! classifications live here; they are the whole of EFU's subtyping story.

use std::fmt;

use efu_common::span::Span;

/// A primitive base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimTy {
    Si8,
    Ui8,
    Si32,
    Ui32,
    Si64,
    Ui64,
    Sisz,
    Uisz,
    Ptr,
    Flt32,
    Flt64,
    Str,
    Bool,
    Null,
}

impl PrimTy {
    /// Resolve a source-level type name to its primitive, if it is one.
    pub fn from_source_name(name: &str) -> Option<PrimTy> {
        match name {
            "i8" => Some(PrimTy::Si8),
            "u8" => Some(PrimTy::Ui8),
            "i32" => Some(PrimTy::Si32),
            "u32" => Some(PrimTy::Ui32),
            "i64" => Some(PrimTy::Si64),
            "u64" => Some(PrimTy::Ui64),
            "isz" => Some(PrimTy::Sisz),
            "usz" => Some(PrimTy::Uisz),
            "ptr" => Some(PrimTy::Ptr),
            "f32" => Some(PrimTy::Flt32),
            "f64" => Some(PrimTy::Flt64),
            "string" => Some(PrimTy::Str),
            "bool" => Some(PrimTy::Bool),
            "null" => Some(PrimTy::Null),
            _ => None,
        }
    }

    /// The source-level spelling, used in diagnostics and annotations.
    pub fn source_name(&self) -> &'static str {
        match self {
            PrimTy::Si8 => "i8",
            PrimTy::Ui8 => "u8",
            PrimTy::Si32 => "i32",
            PrimTy::Ui32 => "u32",
            PrimTy::Si64 => "i64",
            PrimTy::Ui64 => "u64",
            PrimTy::Sisz => "isz",
            PrimTy::Uisz => "usz",
            PrimTy::Ptr => "ptr",
            PrimTy::Flt32 => "f32",
            PrimTy::Flt64 => "f64",
            PrimTy::Str => "string",
            PrimTy::Bool => "bool",
            PrimTy::Null => "null",
        }
    }

    /// Whether this is one of the integer bases.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            PrimTy::Si8
                | PrimTy::Ui8
                | PrimTy::Si32
                | PrimTy::Ui32
                | PrimTy::Si64
                | PrimTy::Ui64
                | PrimTy::Sisz
                | PrimTy::Uisz
        )
    }

    /// Whether this is one of the float bases.
    pub fn is_float(&self) -> bool {
        matches!(self, PrimTy::Flt32 | PrimTy::Flt64)
    }
}

/// An EFU type: a kind plus the optional span it was inferred from.
///
/// `origin` is set when the type came from a literal; the checker uses it to
/// monomorphise numeric literals toward their use site and clears it once it
/// does.
#[derive(Debug, Clone, PartialEq)]
pub struct Ty {
    pub kind: TyKind,
    pub origin: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TyKind {
    /// Equivalent to every type during checking.
    Any,
    Void,
    Prim(PrimTy),
    Array {
        elem: Box<Ty>,
        size: Option<u64>,
    },
    Struct {
        name: String,
        fields: Vec<(String, Ty)>,
    },
    Func(FuncTy),
    Enum {
        name: String,
        values: Vec<(String, i64)>,
    },
    /// A tagged union: named cases with optional payload types.
    Union {
        name: String,
        cases: Vec<(String, Option<Ty>)>,
    },
}

/// A function type. `variadic` is the optional tail argument accepting zero
/// or more extra positionals of the given element type.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncTy {
    pub name: String,
    pub params: Vec<(String, Ty)>,
    pub ret: Box<Ty>,
    pub variadic: Option<(String, Box<Ty>)>,
}

impl Ty {
    pub fn new(kind: TyKind) -> Self {
        Self { kind, origin: None }
    }

    pub fn any() -> Self {
        Self::new(TyKind::Any)
    }

    pub fn void() -> Self {
        Self::new(TyKind::Void)
    }

    pub fn prim(base: PrimTy) -> Self {
        Self::new(TyKind::Prim(base))
    }

    /// The default integer type of an integer literal.
    pub fn int() -> Self {
        Self::prim(PrimTy::Sisz)
    }

    pub fn string() -> Self {
        Self::prim(PrimTy::Str)
    }

    pub fn bool() -> Self {
        Self::prim(PrimTy::Bool)
    }

    pub fn array(elem: Ty, size: Option<u64>) -> Self {
        Self::new(TyKind::Array {
            elem: Box::new(elem),
            size,
        })
    }

    pub fn func(fty: FuncTy) -> Self {
        Self::new(TyKind::Func(fty))
    }

    /// Attach the span this type was inferred from.
    pub fn with_origin(mut self, span: Span) -> Self {
        self.origin = Some(span);
        self
    }

    /// Whether this is an integer in the wide sense: an integer-base
    /// primitive or an enum.
    pub fn is_integer(&self) -> bool {
        match &self.kind {
            TyKind::Prim(base) => base.is_integer(),
            TyKind::Enum { .. } => true,
            _ => false,
        }
    }

    /// Whether this is a number: any integer or a float primitive.
    pub fn is_number(&self) -> bool {
        match &self.kind {
            TyKind::Prim(base) => base.is_integer() || base.is_float(),
            TyKind::Enum { .. } => true,
            _ => false,
        }
    }

    /// Type equivalence, the checking relation.
    ///
    /// Reflexive; `any` matches everything on either side; kinds never
    /// cross. Integer primitives all interchange with each other, floats
    /// with each other; `string`, `bool`, `null`, `ptr` only with
    /// themselves.
    pub fn equivalent(&self, other: &Ty) -> bool {
        match (&self.kind, &other.kind) {
            (TyKind::Any, _) | (_, TyKind::Any) => true,
            (TyKind::Void, TyKind::Void) => true,
            (TyKind::Prim(a), TyKind::Prim(b)) => {
                a == b || (a.is_integer() && b.is_integer()) || (a.is_float() && b.is_float())
            }
            (
                TyKind::Array { elem: a, size: sa },
                TyKind::Array { elem: b, size: sb },
            ) => sa == sb && a.equivalent(b),
            (
                TyKind::Struct {
                    fields: a_fields, ..
                },
                TyKind::Struct {
                    fields: b_fields, ..
                },
            ) => {
                a_fields.len() == b_fields.len()
                    && a_fields
                        .iter()
                        .zip(b_fields)
                        .all(|((an, at), (bn, bt))| an == bn && at.equivalent(bt))
            }
            (TyKind::Func(a), TyKind::Func(b)) => {
                a.params.len() == b.params.len()
                    && a.params
                        .iter()
                        .zip(&b.params)
                        .all(|((_, at), (_, bt))| at.equivalent(bt))
                    && a.ret.equivalent(&b.ret)
            }
            (
                TyKind::Enum {
                    name: an,
                    values: av,
                },
                TyKind::Enum {
                    name: bn,
                    values: bv,
                },
            ) => an == bn && av == bv,
            (
                TyKind::Union {
                    name: an,
                    cases: ac,
                },
                TyKind::Union {
                    name: bn,
                    cases: bc,
                },
            ) => {
                an == bn
                    && ac.len() == bc.len()
                    && ac.iter().zip(bc).all(|((acn, act), (bcn, bct))| {
                        acn == bcn
                            && match (act, bct) {
                                (None, None) => true,
                                (Some(a), Some(b)) => a.equivalent(b),
                                _ => false,
                            }
                    })
            }
            _ => false,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TyKind::Any => write!(f, "any"),
            TyKind::Void => write!(f, "void"),
            TyKind::Prim(base) => write!(f, "{}", base.source_name()),
            TyKind::Array { elem, size } => match size {
                Some(size) => write!(f, "{elem}[{size}]"),
                None => write!(f, "{elem}[]"),
            },
            TyKind::Struct { name, .. } => write!(f, "{name}"),
            TyKind::Func(fty) => {
                write!(f, "fn(")?;
                for (i, (_, ty)) in fty.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{ty}")?;
                }
                if let Some((_, elem)) = &fty.variadic {
                    if !fty.params.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "...{elem}")?;
                }
                write!(f, ") -> {}", fty.ret)
            }
            TyKind::Enum { name, .. } => write!(f, "{name}"),
            TyKind::Union { name, .. } => write!(f, "{name}"),
        }
    }
}
