//! Lexical scopes and smartcast refinement tracking (§3 "Scope",
//! §9 "Smartcast representation").

use rustc_hash::FxHashMap;
use talus_common::Span;
use talus_types::TypeId;

/// What a scope entry was declared as — drives the unused-variable sweep
/// (§4.2.1 pass 5) and `fail_if_immutable` (§4.2.3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    Variable,
    Const,
    Global,
    Param,
}

#[derive(Clone, Debug)]
pub struct Binding {
    pub typ: TypeId,
    pub kind: BindingKind,
    pub is_mut: bool,
    pub is_shared: bool,
    pub declared_at: Span,
    pub used: bool,
    pub mutated: bool,
}

/// A smartcast refinement key (§9): either a bare variable name, or a
/// selector chain rooted at an owner expression. Keyed by name rather than
/// `NodeIndex` so that two distinct occurrences of the same variable in one
/// scope observe each other's refinement, per the design note's "sibling
/// selector-expression in the same scope observes the refined type"
/// requirement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SmartcastKey {
    Var(String),
    Field { owner_expr: String, owner_typ: TypeId, field: String },
}

/// One lexical scope: its own bindings plus the smartcast refinements
/// introduced inside it. Pushed on block entry, popped on exit — popping
/// naturally discards refinements scoped to the branch that introduced
/// them.
#[derive(Default)]
pub struct Scope {
    bindings: FxHashMap<String, Binding>,
    smartcasts: FxHashMap<SmartcastKey, TypeId>,
}

/// The scope stack the checker walks a function body with. Scope 0 is the
/// file/module scope; each block/branch pushes one more.
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self { scopes: vec![Scope::default()] }
    }
}

impl ScopeStack {
    pub fn push(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Pops the innermost scope, returning variables that were never
    /// mutated despite being declared `mut` or never read at all — the
    /// unused-variable sweep consumes this (§4.2.1 pass 5).
    pub fn pop(&mut self) -> Vec<(String, Binding)> {
        let scope = self.scopes.pop().expect("scope stack must not underflow");
        scope.bindings.into_iter().collect()
    }

    pub fn declare(&mut self, name: String, binding: Binding) {
        self.scopes.last_mut().expect("at least one scope").bindings.insert(name, binding);
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|s| s.bindings.get(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.scopes.iter_mut().rev().find_map(|s| s.bindings.get_mut(name))
    }

    pub fn mark_used(&mut self, name: &str) {
        if let Some(b) = self.lookup_mut(name) {
            b.used = true;
        }
    }

    pub fn mark_mutated(&mut self, name: &str) {
        if let Some(b) = self.lookup_mut(name) {
            b.mutated = true;
        }
    }

    /// Pushes a smartcast refinement onto the innermost scope — entering a
    /// positive `is`/`as`/match-arm branch.
    pub fn push_smartcast(&mut self, key: SmartcastKey, refined: TypeId) {
        self.scopes.last_mut().expect("at least one scope").smartcasts.insert(key, refined);
    }

    /// Looks up the innermost active refinement for `key`, searching
    /// outward. A refinement in an enclosing scope applies until a nested
    /// scope shadows it with its own.
    pub fn smartcast(&self, key: &SmartcastKey) -> Option<TypeId> {
        self.scopes.iter().rev().find_map(|s| s.smartcasts.get(key).copied())
    }

    /// Clears a smartcast when the checker sees an assignment that
    /// invalidates it, or when a selector carries the once-shot
    /// `prevent_sum_type_unwrapping` flag (§4.2.2).
    pub fn clear_smartcast(&mut self, key: &SmartcastKey) {
        for scope in self.scopes.iter_mut().rev() {
            scope.smartcasts.remove(key);
        }
    }
}

#[cfg(test)]
#[path = "tests/scope.rs"]
mod tests;
