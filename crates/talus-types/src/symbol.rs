//! `TypeSymbol` and the closed set of type kinds (§3).

use crate::type_id::TypeId;
use std::cell::RefCell;
use std::collections::HashSet;

/// Where a declaration originated — used to pick argument-widening rules
/// at call sites (§4.2.4) and structural-equality bridging at interface
/// conformance time (§4.1.5).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceLang {
    Native,
    C,
    Js,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Void,
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Rune,
    String,
    Char,
    VoidPtr,
}

impl PrimitiveKind {
    #[must_use]
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::Isize
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::Usize
                | Self::Rune
        )
    }

    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    #[must_use]
    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    #[must_use]
    pub fn is_signed(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::Isize)
    }

    #[must_use]
    pub fn is_unsigned(self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64 | Self::Usize)
    }

    /// Relative precision, used by `promote_num` (§4.2.2): the
    /// lower-precision operand promotes to the higher.
    #[must_use]
    pub fn width_rank(self) -> u8 {
        match self {
            Self::Bool | Self::Char => 0,
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::Rune | Self::I32 | Self::U32 => 3,
            Self::I64 | Self::U64 | Self::Isize | Self::Usize => 4,
            Self::F32 => 5,
            Self::F64 => 6,
            Self::Void | Self::String | Self::VoidPtr => 0,
        }
    }

    pub const fn canonical_name(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "int",
            Self::I64 => "i64",
            Self::Isize => "isize",
            Self::U8 => "byte",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Rune => "rune",
            Self::String => "string",
            Self::Char => "char",
            Self::VoidPtr => "voidptr",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    Integer,
    Float,
}

#[derive(Clone, Debug)]
pub struct ParamDescriptor {
    pub name: String,
    pub typ: TypeId,
    pub is_mut: bool,
    pub is_hidden: bool,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct FnAttrs: u16 {
        const PUB        = 1 << 0;
        const DEPRECATED = 1 << 1;
        const NORETURN   = 1 << 2;
        const UNSAFE     = 1 << 3;
        const MAIN       = 1 << 4;
        const TEST       = 1 << 5;
        const VARIADIC   = 1 << 6;
        const KEEP_ALIVE = 1 << 7;
        const METHOD     = 1 << 8;
        const NO_BODY    = 1 << 9;
    }
}

#[derive(Clone, Debug)]
pub struct FunctionDescriptor {
    pub name: String,
    pub module: String,
    /// `TypeId::NONE` for free functions.
    pub receiver: TypeId,
    pub params: Vec<ParamDescriptor>,
    pub return_type: TypeId,
    pub attrs: FnAttrs,
    pub source_lang: SourceLang,
    pub generic_names: Vec<String>,
    /// Concrete type tuples this generic function has been instantiated
    /// with, observed call-site by call-site (§4.1.7).
    pub concrete_instantiations: RefCell<HashSet<Vec<TypeId>>>,
    pub pos: u32,
    /// Name of the build tag gating `[if tag]` (§4.2.4 point 7); `None` for
    /// a function not annotated with the attribute.
    pub if_tag: Option<String>,
}

impl FunctionDescriptor {
    #[must_use]
    pub fn is_generic(&self) -> bool {
        !self.generic_names.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub name: String,
    pub typ: TypeId,
    pub is_mut: bool,
    pub is_pub: bool,
    pub is_global: bool,
}

#[derive(Clone, Debug)]
pub struct StructInfo {
    pub fields: Vec<FieldDescriptor>,
    pub embeds: Vec<TypeId>,
    pub generic_names: Vec<String>,
    pub concrete_params: Vec<TypeId>,
    pub is_generic: bool,
    pub is_union: bool,
    pub is_heap: bool,
}

#[derive(Clone, Debug)]
pub struct InterfaceInfo {
    pub fields: Vec<FieldDescriptor>,
    pub methods: Vec<FunctionDescriptor>,
    pub embeds: Vec<TypeId>,
    pub implementing: RefCell<HashSet<TypeId>>,
    pub generic_names: Vec<String>,
    pub concrete_params: Vec<TypeId>,
    pub single_impl: bool,
    /// Memoizes whether embed expansion has already run, per the "lazy,
    /// per-interface expanded flag" design note.
    pub embeds_expanded: RefCell<bool>,
}

#[derive(Clone, Debug)]
pub struct SumTypeInfo {
    pub variants: Vec<TypeId>,
    /// Lazily computed on first `find_field` query (§9: "Lazy sum-type
    /// field common-set").
    pub common_fields: RefCell<Option<Vec<FieldDescriptor>>>,
    pub generic_names: Vec<String>,
    pub concrete_params: Vec<TypeId>,
}

#[derive(Clone, Debug)]
pub struct EnumInfo {
    pub variants: Vec<(String, i64)>,
    pub is_flag: bool,
}

/// The closed set of kind-specific payloads (§3).
#[derive(Clone, Debug)]
pub enum TypeInfo {
    Placeholder,
    Primitive(PrimitiveKind),
    Literal(LiteralKind),
    Alias,
    Array { elem: TypeId, nr_dims: u32 },
    ArrayFixed { elem: TypeId, size: u64, size_expr: Option<String> },
    Map { key: TypeId, value: TypeId },
    Chan { elem: TypeId, is_mut: bool },
    Thread { ret: TypeId },
    Promise { ret: TypeId },
    MultiReturn(Vec<TypeId>),
    Function(FunctionDescriptor),
    Struct(StructInfo),
    Interface(InterfaceInfo),
    SumType(SumTypeInfo),
    Aggregate(Vec<TypeId>),
    Enum(EnumInfo),
    GenericInst { parent: TypeId, concrete: Vec<TypeId> },
}

impl TypeInfo {
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Placeholder => "placeholder",
            Self::Primitive(_) => "primitive",
            Self::Literal(_) => "literal",
            Self::Alias => "alias",
            Self::Array { .. } => "array",
            Self::ArrayFixed { .. } => "array_fixed",
            Self::Map { .. } => "map",
            Self::Chan { .. } => "chan",
            Self::Thread { .. } => "thread",
            Self::Promise { .. } => "promise",
            Self::MultiReturn(_) => "multi_return",
            Self::Function(_) => "function",
            Self::Struct(_) => "struct",
            Self::Interface(_) => "interface",
            Self::SumType(_) => "sum_type",
            Self::Aggregate(_) => "aggregate",
            Self::Enum(_) => "enum",
            Self::GenericInst { .. } => "generic_inst",
        }
    }
}

/// The resolved metadata for one type index.
#[derive(Clone, Debug)]
pub struct TypeSymbol {
    pub canonical_name: String,
    pub mangled_name: String,
    pub module: String,
    pub source_lang: SourceLang,
    /// For alias chains; `TypeId::NONE` when not an alias.
    pub parent: TypeId,
    pub methods: Vec<FunctionDescriptor>,
    pub info: TypeInfo,
}

impl TypeSymbol {
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.info.kind_name()
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self.info, TypeInfo::Placeholder)
    }

    #[must_use]
    pub fn invalid(name: &str) -> Self {
        TypeSymbol {
            canonical_name: name.to_string(),
            mangled_name: String::new(),
            module: String::new(),
            source_lang: SourceLang::Native,
            parent: TypeId::NONE,
            methods: Vec::new(),
            info: TypeInfo::Placeholder,
        }
    }
}
