//! Centralized recursion and iteration cutoffs.
//!
//! Collecting these here (rather than scattering magic numbers through the
//! checker and type table) makes the safety cutoffs named in the checker's
//! design notes auditable in one place, and lets `CheckerOptions` override
//! them without touching call sites.

/// Maximum expression nesting depth the checker will walk before emitting
/// `too deeply nested expression` and returning an error type instead of
/// recursing further.
///
/// Example of what this guards against: `((((((1))))))` nested far enough
/// to blow the native call stack rather than report a diagnostic.
pub const MAX_EXPR_CHECK_DEPTH: u32 = 40;

/// Maximum statement nesting depth (blocks within blocks within branches).
pub const MAX_STMT_CHECK_DEPTH: u32 = 40;

/// Maximum depth when recursively substituting a generic type's type
/// parameters (e.g. `Box<Box<Box<...>>>`).
pub const MAX_GENERIC_INSTANTIATION_DEPTH: u32 = 50;

/// Maximum depth when expanding an interface's embedded interfaces looking
/// for methods/fields. Exceeding this is treated as an accidental embed
/// cycle rather than a legitimately deep hierarchy.
pub const MAX_INTERFACE_EMBED_DEPTH: u32 = 32;

/// Safety cap on the generic-function re-check fixed-point loop that runs
/// after all files reach `ScopesSwept`. The open question in the design
/// notes leaves the exact bound to the implementer; 10 passes comfortably
/// covers realistic nested-generic call graphs while still terminating on
/// pathological, non-converging inputs.
pub const MAX_GENERIC_RECHECK_PASSES: u32 = 10;

/// Default cap on the number of diagnostics reported for a single
/// `check_all` run before the checker sets `should_abort`.
pub const DEFAULT_MESSAGE_LIMIT: usize = 1000;
