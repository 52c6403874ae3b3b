//! Mutability, lock/rlock, and `fail_if_immutable` enforcement (§4.2.3).
//!
//! Grounded on the teacher's `tsz-checker/src/assignment_checker.rs`, which
//! threads a similar "walk the lvalue chain, report on the root binding"
//! shape for `const`/`readonly` violations.

use std::collections::HashSet;

use talus_ast::{ExprKind, NodeArena, NodeIndex, UnOp};
use talus_common::diagnostics::diagnostic_codes;
use talus_common::Span;
use talus_types::TypeId;

use crate::context::CheckerContext;
use crate::expr::{check_body_value, check_expr};
use crate::scope::BindingKind;

/// One active `lock`/`rlock` block: the names it holds and whether it was
/// opened for read-only access.
#[derive(Default)]
pub struct LockFrame {
    pub names: HashSet<String>,
    pub is_read: bool,
}

/// The stack of lock blocks enclosing the expression currently being
/// checked. Nesting is forbidden (§4.2.3), so in practice this rarely holds
/// more than one frame, but the checker still walks it as a stack so the
/// nested case itself can be diagnosed precisely.
#[derive(Default)]
pub struct LockStack(Vec<LockFrame>);

impl LockStack {
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn top(&self) -> Option<&LockFrame> {
        self.0.last()
    }

    pub fn push(&mut self, frame: LockFrame) {
        self.0.push(frame);
    }

    pub fn pop(&mut self) {
        self.0.pop();
    }

    /// Whether `name` is covered by a write (`lock`, not `rlock`) frame
    /// anywhere on the stack.
    pub fn is_locked_for_write(&self, name: &str) -> bool {
        self.0.iter().any(|f| !f.is_read && f.names.contains(name))
    }
}

/// Enters a `lock`/`rlock` block, reporting nesting and duplicate-name
/// violations, type-checks its body, then pops the frame before returning.
pub fn check_lock_expr(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    names: &[String],
    is_read: bool,
    body: NodeIndex,
    span: Span,
) -> TypeId {
    if let Some(top) = ctx.locks.top() {
        let conflicting_name = names.iter().find(|n| top.names.contains(*n)).cloned();
        match conflicting_name {
            Some(name) if top.is_read != is_read => {
                ctx.report(span.start, span.len(), diagnostic_codes::LOCK_AND_RLOCK_SAME_NAME, &[&name]);
            }
            _ => {
                ctx.report(span.start, span.len(), diagnostic_codes::NESTED_LOCK, &[]);
            }
        }
    }

    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.clone()) {
            ctx.report(span.start, span.len(), diagnostic_codes::DUPLICATE_LOCK, &[name]);
        }
    }

    ctx.locks.push(LockFrame { names: seen, is_read });
    let result = check_body_value(ctx, arena, body);
    ctx.locks.pop();
    result
}

/// Walks an lvalue expression chain (`Ident`, `ParExpr`, `PrefixExpr
/// Deref`, `SelectorExpr`, `IndexExpr`), enforcing `const`/immutability/
/// shared-locking rules on the root binding and, for field writes, on the
/// field itself. Returns the shared variable name that must be (and was
/// checked to be) locked, if any — callers don't currently need this beyond
/// the mutation check itself, but it mirrors the return contract lock-block
/// resolution relies on.
pub fn fail_if_immutable(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    expr: NodeIndex,
    span: Span,
) -> Option<String> {
    match arena.get(expr).kind.clone() {
        ExprKind::Ident(name) => check_var_mutation(ctx, &name, span),
        ExprKind::ParExpr { inner } => fail_if_immutable(ctx, arena, inner, span),
        ExprKind::PrefixExpr { op: UnOp::Deref, expr: inner } => {
            // Writing through a pointer doesn't require the pointer binding
            // itself to be mutable, only that a pointer was obtained at all.
            let _ = check_expr(ctx, arena, inner);
            None
        }
        ExprKind::SelectorExpr { base, field } => {
            let lock_name = fail_if_immutable(ctx, arena, base, span);
            let base_type = ctx.types.get(base).unwrap_or(TypeId::NONE);
            if !base_type.is_none() {
                if let Ok(Some(fd)) = ctx.table.find_field_with_embeds(base_type.base(), &field) {
                    if !fd.is_mut && ctx.in_unsafe == 0 && !ctx.is_translated_file {
                        ctx.report(span.start, span.len(), diagnostic_codes::IMMUTABLE_MUTATION, &[&field]);
                    }
                }
            }
            lock_name
        }
        ExprKind::IndexExpr { base, index } => {
            let _ = check_expr(ctx, arena, index);
            let lock_name = fail_if_immutable(ctx, arena, base, span);
            let base_type = ctx.types.get(base).unwrap_or(TypeId::NONE);
            if !base_type.is_none()
                && base_type.base() == ctx.table.builtins.string
                && ctx.in_unsafe == 0
                && !ctx.is_translated_file
            {
                ctx.report(span.start, span.len(), diagnostic_codes::IMMUTABLE_MUTATION, &["string byte"]);
            }
            lock_name
        }
        _ => None,
    }
}

fn check_var_mutation(ctx: &mut CheckerContext<'_>, name: &str, span: Span) -> Option<String> {
    let Some(binding) = ctx.scopes.lookup(name).cloned() else {
        return None;
    };

    if binding.kind == BindingKind::Const {
        if ctx.in_unsafe == 0 && !ctx.is_translated_file {
            ctx.report(span.start, span.len(), diagnostic_codes::CONST_MUTATION, &[name]);
        }
        return None;
    }

    if binding.is_shared {
        ctx.scopes.mark_mutated(name);
        if !ctx.locks.is_locked_for_write(name) {
            ctx.report(span.start, span.len(), diagnostic_codes::SHARED_REQUIRES_LOCK, &[name]);
        }
        return Some(name.to_string());
    }

    if !binding.is_mut && ctx.in_unsafe == 0 && !ctx.is_translated_file {
        ctx.report(span.start, span.len(), diagnostic_codes::IMMUTABLE_MUTATION, &[name]);
    }
    ctx.scopes.mark_mutated(name);
    None
}

#[cfg(test)]
#[path = "tests/mutability.rs"]
mod tests;
