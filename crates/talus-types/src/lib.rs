//! The Type Table (§4.1): the registry of every type, function signature,
//! and generic instantiation the checker reasons about.
//!
//! Pure data and queries — this crate never emits a diagnostic and never
//! sees an AST node; `talus-check` drives it by `TypeId` and
//! `FunctionDescriptor` alone. Failures here are either silent dedup
//! (§4.1.1) or an invariant violation routed through `PanicHandler`
//! (§4.1.8), never a `Result` the caller is expected to recover from.

pub mod type_id;
pub use type_id::{TypeFlags, TypeId};

pub mod symbol;
pub use symbol::{
    EnumInfo, FieldDescriptor, FnAttrs, FunctionDescriptor, InterfaceInfo, LiteralKind,
    ParamDescriptor, PrimitiveKind, SourceLang, StructInfo, SumTypeInfo, TypeInfo, TypeSymbol,
};

pub mod errors;
pub use errors::{AbortPanicHandler, PanicHandler, TableError};

pub mod naming;

pub mod builtin;
pub use builtin::{Builtins, RESERVED_BUILTIN_COUNT};

pub mod table;
pub use table::{TypeTable, MAIN_MODULE};

pub mod lookup;

pub mod interfaces;

pub mod generics;
pub use generics::InferenceError;
