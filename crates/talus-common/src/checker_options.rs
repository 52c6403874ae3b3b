//! Checker configuration.
//!
//! Lives in the common crate (rather than in `talus-check`) so that
//! `talus-types` can also read it (e.g. the interface-embed depth cutoff is
//! consulted by the type table, not just the checker) without creating a
//! dependency cycle between the two crates.

use std::collections::HashSet;

use crate::limits;

/// Tunables for a `check_all` run.
///
/// All fields default to the values named in the design notes; callers
/// typically start from `CheckerOptions::default()` and flip individual
/// flags.
#[derive(Clone, Debug)]
pub struct CheckerOptions {
    /// Promote warnings to errors (§7: "promoted to error under a strict
    /// mode flag").
    pub strict: bool,

    /// Cap on the number of diagnostics collected before `should_abort` is
    /// set and the remaining statement/expression loops short-circuit.
    pub message_limit: usize,

    /// Expression nesting recursion cutoff.
    pub max_expr_depth: u32,

    /// Statement nesting recursion cutoff.
    pub max_stmt_depth: u32,

    /// Generic type substitution recursion cutoff.
    pub max_generic_instantiation_depth: u32,

    /// Interface embedding expansion depth cutoff.
    pub max_interface_embed_depth: u32,

    /// Safety cap on generic-function re-check fixed-point passes.
    pub max_generic_recheck_passes: u32,

    /// Whether the final scope walk reports unused/never-mutated variables
    /// (§4.2.1 pass 5, §8 scenario 2). Left toggleable since some embedding
    /// tools (REPLs, single-statement evaluators) don't want the noise.
    pub report_unused_variables: bool,

    /// Build tags considered active for `[if tag]` static elision (§4.2.4
    /// point 7). A function annotated `[if tag]` whose tag is absent from
    /// this set is treated as unreachable at its call sites.
    pub enabled_tags: HashSet<String>,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            strict: false,
            message_limit: limits::DEFAULT_MESSAGE_LIMIT,
            max_expr_depth: limits::MAX_EXPR_CHECK_DEPTH,
            max_stmt_depth: limits::MAX_STMT_CHECK_DEPTH,
            max_generic_instantiation_depth: limits::MAX_GENERIC_INSTANTIATION_DEPTH,
            max_interface_embed_depth: limits::MAX_INTERFACE_EMBED_DEPTH,
            max_generic_recheck_passes: limits::MAX_GENERIC_RECHECK_PASSES,
            report_unused_variables: true,
            enabled_tags: HashSet::new(),
        }
    }
}

#[cfg(test)]
#[path = "tests/checker_options.rs"]
mod tests;
