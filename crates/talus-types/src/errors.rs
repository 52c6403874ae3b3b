//! The type table's own failure model (§4.1.8).
//!
//! These are *internal* errors — invariant violations and structured
//! lookup failures inside the table itself — not user-program diagnostics.
//! User-program problems are always reported through the checker's
//! `Diagnostics` accumulator (§7); this module only covers the table's own
//! contract.

use crate::type_id::TypeId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableError {
    /// More than one embedded type contributed a method/field of the same
    /// name (§4.1.4).
    AmbiguousEmbedMember { type_name: String, member: String, candidates: Vec<String> },
    /// An aggregate (or plain struct/interface) has no such field/method.
    NoSuchMember { type_name: String, member: String },
    /// An invariant-violating `TypeId` was passed to `sym`/`final_sym`
    /// (e.g. `sym(0)`, or an index past the end of the arena).
    InvalidTypeId(TypeId),
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::AmbiguousEmbedMember { type_name, member, candidates } => write!(
                f,
                "ambiguous reference to {member} on {type_name}: present in {candidates:?}"
            ),
            TableError::NoSuchMember { type_name, member } => {
                write!(f, "type {type_name} has no field or method {member}")
            }
            TableError::InvalidTypeId(id) => write!(f, "invalid type id {id:?}"),
        }
    }
}

impl std::error::Error for TableError {}

/// Invoked when a type-table invariant is violated (§4.1.8, §7): aborts
/// with a diagnostic message on stderr. `try_sym` and friends use
/// `TableError` directly for the lookups that are expected to fail; this
/// handler is only for genuine invariant breaks (`sym(0)`, an out-of-range
/// index) that indicate a bug in the table's own bookkeeping.
pub trait PanicHandler {
    fn handle(&self, error: &TableError) -> !;
}

#[derive(Default)]
pub struct AbortPanicHandler;

impl PanicHandler for AbortPanicHandler {
    fn handle(&self, error: &TableError) -> ! {
        tracing::error!(%error, "type table invariant violated");
        panic!("type table invariant violated: {error}");
    }
}
