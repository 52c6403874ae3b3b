//! Well-known built-in `TypeId`s and the reserved index window used by the
//! overwrite rule in `register_sym` (§4.1.1: "a builtin slot being
//! redefined by a user-mode declaration of the same name").
//!
//! `TypeTable::new` registers every entry here, in this exact order, so
//! the resulting indices are stable and can be handed out as associated
//! constants the rest of the crate (and the checker) can match on without
//! a table lookup, mirroring the teacher's `TypeId::ANY`/`TypeId::NUMBER`
//! fixed intrinsics.

use crate::symbol::{EnumInfo, InterfaceInfo, LiteralKind, PrimitiveKind, SourceLang, TypeInfo, TypeSymbol};
use crate::type_id::TypeId;
use std::cell::RefCell;

/// Canonical names the overwrite rule treats as redefinable builtin slots.
/// A user declaring `struct string { ... }` or `interface error { ... }`
/// (languages in this family let userspace augment a few core types) lands
/// on the same index rather than silently shadowing it.
pub const REDEFINABLE_BUILTIN_NAMES: &[&str] = &["string", "array", "map", "error"];

/// `TypeId`s for every primitive/intrinsic, fixed at construction time.
#[derive(Clone, Copy, Debug)]
pub struct Builtins {
    pub void: TypeId,
    pub bool_: TypeId,
    pub i8: TypeId,
    pub i16: TypeId,
    pub i32: TypeId,
    pub i64: TypeId,
    pub isize: TypeId,
    pub u8: TypeId,
    pub u16: TypeId,
    pub u32: TypeId,
    pub u64: TypeId,
    pub usize: TypeId,
    pub f32: TypeId,
    pub f64: TypeId,
    pub rune: TypeId,
    pub string: TypeId,
    pub char_: TypeId,
    pub voidptr: TypeId,
    pub int_literal: TypeId,
    pub float_literal: TypeId,
    /// The built-in `error` interface every optional/`or {}` block is
    /// implicitly checked against (§4.1.5: "`typ` is `none` and `iface`
    /// is the built-in error interface").
    pub error: TypeId,
}

fn primitive_symbol(kind: PrimitiveKind) -> TypeSymbol {
    TypeSymbol {
        canonical_name: kind.canonical_name().to_string(),
        mangled_name: kind.canonical_name().to_string(),
        module: "builtin".to_string(),
        source_lang: SourceLang::Native,
        parent: TypeId::NONE,
        methods: Vec::new(),
        info: TypeInfo::Primitive(kind),
    }
}

fn literal_symbol(name: &str, kind: LiteralKind) -> TypeSymbol {
    TypeSymbol {
        canonical_name: name.to_string(),
        mangled_name: name.to_string(),
        module: "builtin".to_string(),
        source_lang: SourceLang::Native,
        parent: TypeId::NONE,
        methods: Vec::new(),
        info: TypeInfo::Literal(kind),
    }
}

fn error_interface_symbol() -> TypeSymbol {
    TypeSymbol {
        canonical_name: "error".to_string(),
        mangled_name: "error".to_string(),
        module: "builtin".to_string(),
        source_lang: SourceLang::Native,
        parent: TypeId::NONE,
        methods: Vec::new(),
        info: TypeInfo::Interface(InterfaceInfo {
            fields: Vec::new(),
            methods: Vec::new(),
            embeds: Vec::new(),
            implementing: RefCell::new(std::collections::HashSet::new()),
            generic_names: Vec::new(),
            concrete_params: Vec::new(),
            single_impl: false,
            embeds_expanded: RefCell::new(false),
        }),
    }
}

/// Placeholder used when a builtin needs a non-primitive payload but isn't
/// implemented above (kept symmetric, currently unused but documents
/// intent for `enum`-backed builtins the checker never actually emits).
#[allow(dead_code)]
fn unused_enum_info() -> EnumInfo {
    EnumInfo { variants: Vec::new(), is_flag: false }
}

/// The ordered list of builtin registrations. `TypeTable::new` pushes
/// these directly (bypassing `register_sym`'s dedup, since the table is
/// empty) and returns the resulting `Builtins`.
pub(crate) fn builtin_symbols() -> Vec<TypeSymbol> {
    use PrimitiveKind::*;
    vec![
        primitive_symbol(Void),
        primitive_symbol(Bool),
        primitive_symbol(I8),
        primitive_symbol(I16),
        primitive_symbol(I32),
        primitive_symbol(I64),
        primitive_symbol(Isize),
        primitive_symbol(U8),
        primitive_symbol(U16),
        primitive_symbol(U32),
        primitive_symbol(U64),
        primitive_symbol(Usize),
        primitive_symbol(F32),
        primitive_symbol(F64),
        primitive_symbol(Rune),
        primitive_symbol(String),
        primitive_symbol(Char),
        primitive_symbol(VoidPtr),
        literal_symbol("int_literal", LiteralKind::Integer),
        literal_symbol("float_literal", LiteralKind::Float),
        error_interface_symbol(),
    ]
}

pub(crate) fn builtins_from_indices(base: u32) -> Builtins {
    Builtins {
        void: TypeId::new(base),
        bool_: TypeId::new(base + 1),
        i8: TypeId::new(base + 2),
        i16: TypeId::new(base + 3),
        i32: TypeId::new(base + 4),
        i64: TypeId::new(base + 5),
        isize: TypeId::new(base + 6),
        u8: TypeId::new(base + 7),
        u16: TypeId::new(base + 8),
        u32: TypeId::new(base + 9),
        u64: TypeId::new(base + 10),
        usize: TypeId::new(base + 11),
        f32: TypeId::new(base + 12),
        f64: TypeId::new(base + 13),
        rune: TypeId::new(base + 14),
        string: TypeId::new(base + 15),
        char_: TypeId::new(base + 16),
        voidptr: TypeId::new(base + 17),
        int_literal: TypeId::new(base + 18),
        float_literal: TypeId::new(base + 19),
        error: TypeId::new(base + 20),
    }
}

/// Number of slots `builtin_symbols` reserves. Anything registered at an
/// index below this is eligible for the builtin-overwrite rule.
pub const RESERVED_BUILTIN_COUNT: u32 = 21;

#[cfg(test)]
#[path = "tests/builtin.rs"]
mod tests;
