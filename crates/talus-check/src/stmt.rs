//! Statement dispatch (§4.2.2): the arena-resident statement kinds that
//! live inside function/block bodies, plus the unused-variable sweep every
//! scope pop feeds through (§4.2.1 pass 5).

use talus_ast::{ExprKind, NodeArena, NodeIndex};
use talus_common::diagnostics::diagnostic_codes;
use talus_common::Span;
use talus_types::TypeInfo;

use crate::assign::check_assign;
use crate::context::CheckerContext;
use crate::expr::check_expr;
use crate::scope::{Binding, BindingKind};

/// Type-checks one statement node, enforcing the statement-nesting cutoff
/// (§4.2.5) the way `expr::check_expr` enforces it for expressions.
pub fn check_stmt(ctx: &mut CheckerContext<'_>, arena: &NodeArena, idx: NodeIndex) {
    if idx.is_none() {
        return;
    }
    let span = arena.get(idx).span;

    ctx.stmt_depth += 1;
    if ctx.stmt_depth > ctx.options.max_stmt_depth {
        ctx.stmt_depth -= 1;
        ctx.report_cutoff(span.start, span.len(), diagnostic_codes::TOO_DEEPLY_NESTED_STATEMENT);
        return;
    }
    check_stmt_inner(ctx, arena, idx, span);
    ctx.stmt_depth -= 1;
}

fn check_stmt_inner(ctx: &mut CheckerContext<'_>, arena: &NodeArena, idx: NodeIndex, span: Span) {
    match arena.get(idx).kind.clone() {
        ExprKind::AssignStmt { lhs, rhs, op, is_decl, is_mut } => {
            check_assign(ctx, arena, &lhs, &rhs, op, is_decl, &is_mut, span);
        }
        ExprKind::ExprStmt { expr } => {
            check_expr(ctx, arena, expr);
        }
        ExprKind::Return { values } => {
            for v in &values {
                check_expr(ctx, arena, *v);
            }
        }
        ExprKind::Block { stmts } => {
            ctx.scopes.push();
            for s in &stmts {
                check_stmt(ctx, arena, *s);
            }
            let unused = ctx.scopes.pop();
            sweep_unused(ctx, unused);
        }
        ExprKind::ForStmt { cond, body } => {
            if let Some(cond) = cond {
                check_expr(ctx, arena, cond);
            }
            check_stmt(ctx, arena, body);
        }
        ExprKind::ForInStmt { key, value, iterable, body } => {
            check_for_in(ctx, arena, key.as_deref(), &value, iterable, body, span);
        }
        ExprKind::ForCStmt { init, cond, post, body } => {
            ctx.scopes.push();
            if let Some(init) = init {
                check_stmt(ctx, arena, init);
            }
            if let Some(cond) = cond {
                check_expr(ctx, arena, cond);
            }
            check_stmt(ctx, arena, body);
            if let Some(post) = post {
                check_stmt(ctx, arena, post);
            }
            let unused = ctx.scopes.pop();
            sweep_unused(ctx, unused);
        }
        ExprKind::BranchStmt { .. } => {}
        ExprKind::GotoStmt { .. } => {}
        ExprKind::GotoLabel { .. } => {}
        ExprKind::DeferStmt { call } => {
            check_expr(ctx, arena, call);
        }
        ExprKind::HashStmt { directive } => {
            tracing::trace!(directive, "hash directive not structurally type-checked");
        }
        ExprKind::AsmStmt { .. } => {
            tracing::trace!("inline asm block not structurally type-checked");
        }
        ExprKind::AssertStmt { cond, message } => {
            check_expr(ctx, arena, cond);
            if let Some(message) = message {
                check_expr(ctx, arena, message);
            }
        }
        ExprKind::ComptimeFor { binding, iterable, body } => {
            check_for_in(ctx, arena, None, &binding, iterable, body, span);
        }
        ExprKind::SqlStmt { .. } => {
            tracing::trace!("raw sql statement not structurally type-checked");
        }
        ExprKind::NodeError => {}
        _ => {
            tracing::warn!("expression node reached statement dispatch");
        }
    }
}

fn check_for_in(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    key: Option<&str>,
    value: &str,
    iterable: NodeIndex,
    body: NodeIndex,
    span: Span,
) {
    let iterable_type = check_expr(ctx, arena, iterable);
    let elem_type = ctx.table.value_type(iterable_type);
    let key_type = match &ctx.table.sym(iterable_type.base()).info {
        TypeInfo::Map { key, .. } => *key,
        _ => ctx.table.builtins.usize,
    };

    ctx.scopes.push();
    if let Some(key_name) = key {
        if key_name != "_" {
            ctx.scopes.declare(
                key_name.to_string(),
                Binding {
                    typ: key_type,
                    kind: BindingKind::Variable,
                    is_mut: false,
                    is_shared: false,
                    declared_at: span,
                    used: false,
                    mutated: false,
                },
            );
        }
    }
    if value != "_" {
        ctx.scopes.declare(
            value.to_string(),
            Binding {
                typ: elem_type,
                kind: BindingKind::Variable,
                is_mut: false,
                is_shared: false,
                declared_at: span,
                used: false,
                mutated: false,
            },
        );
    }
    check_stmt(ctx, arena, body);
    let unused = ctx.scopes.pop();
    sweep_unused(ctx, unused);
}

/// Reports variables a scope never read (`UNUSED_VARIABLE`) and variables
/// declared `mut` but never actually mutated (`UNUSED_MUTABLE_VARIABLE`),
/// per §4.2.1 pass 5 / §8 scenario 2.
pub fn sweep_unused(ctx: &mut CheckerContext<'_>, bindings: Vec<(String, Binding)>) {
    if !ctx.options.report_unused_variables {
        return;
    }
    for (name, binding) in bindings {
        if binding.kind != BindingKind::Variable {
            continue;
        }
        if !binding.used {
            ctx.report(
                binding.declared_at.start,
                binding.declared_at.len(),
                diagnostic_codes::UNUSED_VARIABLE,
                &[&name],
            );
        } else if binding.is_mut && !binding.mutated {
            ctx.report(
                binding.declared_at.start,
                binding.declared_at.len(),
                diagnostic_codes::UNUSED_MUTABLE_VARIABLE,
                &[&name],
            );
        }
    }
}

#[cfg(test)]
#[path = "tests/stmt.rs"]
mod tests;
