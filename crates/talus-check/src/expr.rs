//! The central expression dispatcher (§4.2.2): one `match` over every
//! `ExprKind`, delegating each construct-specific case to its own module and
//! caching the computed `TypeId` for every node it visits.

use talus_ast::{ExprKind, InterPart, NodeArena, NodeIndex, UnOp};
use talus_common::diagnostics::diagnostic_codes;
use talus_common::Span;
use talus_types::{TypeFlags, TypeId};

use crate::context::CheckerContext;
use crate::scope::{Binding, BindingKind, SmartcastKey};
use crate::{call, cast, index_expr, infix, match_expr, mutability, selector, stmt};

pub use crate::selector::root_smartcast_key;

/// Type-checks one arena node, caching the result in `ctx.types` and
/// enforcing the expression-nesting cutoff (§4.2.5).
pub fn check_expr(ctx: &mut CheckerContext<'_>, arena: &NodeArena, idx: NodeIndex) -> TypeId {
    if idx.is_none() {
        return TypeId::NONE;
    }
    let span = arena.get(idx).span;

    ctx.expr_depth += 1;
    if ctx.expr_depth > ctx.options.max_expr_depth {
        ctx.expr_depth -= 1;
        ctx.report_cutoff(span.start, span.len(), diagnostic_codes::TOO_DEEPLY_NESTED_EXPRESSION);
        return TypeId::NONE;
    }

    let result = check_expr_inner(ctx, arena, idx, span);
    ctx.expr_depth -= 1;
    ctx.types.set(idx, result);
    result
}

/// The value an arm/branch body produces: the last `ExprStmt`'s value for a
/// `Block`, or the node's own value if it isn't a block at all (a bare
/// expression used directly as a `match` arm or single-statement `if` body).
pub fn check_body_value(ctx: &mut CheckerContext<'_>, arena: &NodeArena, idx: NodeIndex) -> TypeId {
    if idx.is_none() {
        return ctx.table.builtins.void;
    }
    if let ExprKind::Block { stmts } = arena.get(idx).kind.clone() {
        ctx.scopes.push();
        let mut result = ctx.table.builtins.void;
        let last = stmts.len().saturating_sub(1);
        for (i, stmt_idx) in stmts.iter().enumerate() {
            if i == last {
                result = match &arena.get(*stmt_idx).kind {
                    ExprKind::ExprStmt { expr } => check_expr(ctx, arena, *expr),
                    _ => {
                        stmt::check_stmt(ctx, arena, *stmt_idx);
                        ctx.table.builtins.void
                    }
                };
            } else {
                stmt::check_stmt(ctx, arena, *stmt_idx);
            }
        }
        let unused = ctx.scopes.pop();
        stmt::sweep_unused(ctx, unused);
        result
    } else {
        check_expr(ctx, arena, idx)
    }
}

fn check_ident(ctx: &mut CheckerContext<'_>, name: &str, span: Span) -> TypeId {
    if let Some(refined) = ctx.scopes.smartcast(&SmartcastKey::Var(name.to_string())) {
        ctx.scopes.mark_used(name);
        return refined;
    }
    if let Some(binding) = ctx.scopes.lookup(name) {
        let typ = binding.typ;
        ctx.scopes.mark_used(name);
        return typ;
    }
    if let Some(fd) = ctx.table.get_fn(name) {
        let fd = fd.clone();
        let module = fd.module.clone();
        return ctx.table.find_or_register_fn_type(&module, fd, true, true);
    }
    ctx.report(span.start, span.len(), diagnostic_codes::UNKNOWN_IDENTIFIER, &[name]);
    TypeId::NONE
}

fn check_expr_inner(ctx: &mut CheckerContext<'_>, arena: &NodeArena, idx: NodeIndex, span: Span) -> TypeId {
    match arena.get(idx).kind.clone() {
        ExprKind::Ident(name) => check_ident(ctx, &name, span),
        ExprKind::IntegerLiteral(_) => ctx.table.builtins.int_literal,
        ExprKind::FloatLiteral(_) => ctx.table.builtins.float_literal,
        ExprKind::StringLiteral(_) => ctx.table.builtins.string,
        ExprKind::CharLiteral(_) => ctx.table.builtins.rune,
        ExprKind::BoolLiteral(_) => ctx.table.builtins.bool_,
        ExprKind::NoneLit => ctx.table.builtins.void.with_flag(TypeFlags::OPTIONAL),

        ExprKind::PrefixExpr { op, expr: inner } | ExprKind::PostfixExpr { op, expr: inner } => {
            check_unary(ctx, arena, op, inner, span)
        }

        ExprKind::InfixExpr { op, left, right } => infix::check_infix(ctx, arena, op, left, right, span),
        ExprKind::IndexExpr { base, index } => index_expr::check_index(ctx, arena, base, index, span),
        ExprKind::SelectorExpr { base, field } => selector::check_selector(ctx, arena, idx, base, &field, span),
        ExprKind::CallExpr { callee, args, generic_args, or_block } => {
            call::check_call(ctx, arena, idx, callee, &args, &generic_args, or_block, span)
        }
        ExprKind::CastExpr { expr, target_type } => cast::check_cast(ctx, arena, expr, &target_type, span),
        ExprKind::AsCast { expr, target_type, is_satisfies } => {
            cast::check_as_cast(ctx, arena, expr, &target_type, is_satisfies, span)
        }
        ExprKind::MatchExpr { subject, arms } => match_expr::check_match(ctx, arena, subject, &arms, span),

        ExprKind::IfExpr { cond, then_branch, else_branch } => {
            check_expr(ctx, arena, cond);
            let then_result = check_body_value(ctx, arena, then_branch);
            if else_branch.is_none() {
                ctx.table.builtins.void
            } else {
                check_body_value(ctx, arena, else_branch);
                then_result
            }
        }
        ExprKind::IfGuardExpr { binding, call, then_branch, else_branch } => {
            check_if_guard(ctx, arena, &binding, call, then_branch, else_branch, span)
        }

        ExprKind::StructInit { type_name, fields } => check_struct_init(ctx, arena, &type_name, &fields, span),
        ExprKind::ArrayInit { elems, elem_type_hint } => {
            let mut elem_type = elem_type_hint.as_deref().map(|h| ctx.resolve_type_name(h)).unwrap_or(TypeId::NONE);
            for e in &elems {
                let t = check_expr(ctx, arena, *e);
                if elem_type.is_none() {
                    elem_type = t;
                }
            }
            ctx.table.find_or_register_array(elem_type)
        }
        ExprKind::MapInit { pairs } => {
            let mut key_type = TypeId::NONE;
            let mut val_type = TypeId::NONE;
            for (k, v) in &pairs {
                let kt = check_expr(ctx, arena, *k);
                let vt = check_expr(ctx, arena, *v);
                if key_type.is_none() {
                    key_type = kt;
                }
                if val_type.is_none() {
                    val_type = vt;
                }
            }
            ctx.table.find_or_register_map(key_type, val_type)
        }
        ExprKind::ChanInit { elem_type, is_mut } => {
            let elem = ctx.resolve_type_name(&elem_type);
            ctx.table.find_or_register_chan(elem, is_mut)
        }
        ExprKind::RangeExpr { lo, hi } => {
            let lo_t = check_expr(ctx, arena, lo);
            let hi_t = check_expr(ctx, arena, hi);
            if !lo_t.is_none() {
                lo_t
            } else {
                hi_t
            }
        }

        ExprKind::LockExpr { names, is_read, body } => {
            mutability::check_lock_expr(ctx, arena, &names, is_read, body, span)
        }
        ExprKind::UnsafeExpr { body } => {
            ctx.in_unsafe += 1;
            let result = check_body_value(ctx, arena, body);
            ctx.in_unsafe -= 1;
            result
        }
        ExprKind::ParExpr { inner } => check_expr(ctx, arena, inner),
        ExprKind::GoExpr { call } => {
            let t = check_expr(ctx, arena, call);
            ctx.table.find_or_register_thread(t)
        }
        ExprKind::SelectExpr { arms } => {
            let mut result = ctx.table.builtins.void;
            for (chan_expr, body) in &arms {
                check_expr(ctx, arena, *chan_expr);
                result = check_body_value(ctx, arena, *body);
            }
            result
        }

        ExprKind::SizeOf { type_ref } => {
            ctx.resolve_type_name(&type_ref);
            ctx.table.builtins.usize
        }
        ExprKind::OffsetOf { type_ref, field } => {
            let typ = ctx.resolve_type_name(&type_ref);
            if !typ.is_none() {
                if let Ok(None) = ctx.table.find_field_with_embeds(typ.base(), &field) {
                    ctx.report(
                        span.start,
                        span.len(),
                        diagnostic_codes::NO_SUCH_FIELD_OR_METHOD,
                        &[&ctx.table.sym(typ.base()).canonical_name.clone(), &field],
                    );
                }
            }
            ctx.table.builtins.usize
        }
        ExprKind::TypeOf { expr } => {
            check_expr(ctx, arena, expr);
            ctx.table.builtins.string
        }
        ExprKind::AtExpr { .. } => ctx.table.builtins.string,
        ExprKind::ComptimeCall { args, .. } => {
            for a in &args {
                check_expr(ctx, arena, *a);
            }
            ctx.table.builtins.string
        }
        ExprKind::ComptimeSelector { base, field } => selector::check_comptime_selector(ctx, arena, base, &field),
        ExprKind::StringInterLiteral { parts } => {
            for part in &parts {
                if let InterPart::Expr { value, .. } = part {
                    check_expr(ctx, arena, *value);
                }
            }
            ctx.table.builtins.string
        }
        ExprKind::EnumVal { enum_name, variant } => check_enum_val(ctx, enum_name.as_deref(), &variant, span),
        ExprKind::Assoc { base, member } => selector::check_assoc(ctx, &base, &member, span),
        ExprKind::DumpExpr { expr } => check_expr(ctx, arena, expr),
        ExprKind::Likely { expr, .. } => {
            check_expr(ctx, arena, expr);
            ctx.table.builtins.bool_
        }
        ExprKind::SqlExpr { .. } => {
            tracing::trace!("raw sql expression not structurally type-checked");
            ctx.table.builtins.void
        }

        // Statement-shaped arena nodes never reach here through a well-formed
        // expression position; treat defensively as a no-op rather than
        // panicking on a malformed tree.
        ExprKind::NodeError => TypeId::NONE,
        _ => {
            tracing::warn!("statement node reached expression dispatch");
            TypeId::NONE
        }
    }
}

fn check_unary(ctx: &mut CheckerContext<'_>, arena: &NodeArena, op: UnOp, inner: NodeIndex, span: Span) -> TypeId {
    match op {
        UnOp::Ref => check_expr(ctx, arena, inner).make_ref(),
        UnOp::Deref => check_expr(ctx, arena, inner).deref(),
        UnOp::Not | UnOp::Neg | UnOp::BitNot => check_expr(ctx, arena, inner),
        UnOp::PlusPlus | UnOp::MinusMinus => {
            let t = check_expr(ctx, arena, inner);
            mutability::fail_if_immutable(ctx, arena, inner, span);
            t
        }
        UnOp::Propagate => {
            let t = check_expr(ctx, arena, inner);
            t.clear_flag(TypeFlags::OPTIONAL)
        }
    }
}

fn check_if_guard(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    binding: &str,
    call: NodeIndex,
    then_branch: NodeIndex,
    else_branch: NodeIndex,
    span: Span,
) -> TypeId {
    let call_type = check_expr(ctx, arena, call);
    let unwrapped = call_type.clear_flag(TypeFlags::OPTIONAL);

    ctx.scopes.push();
    ctx.scopes.declare(
        binding.to_string(),
        Binding {
            typ: unwrapped,
            kind: BindingKind::Variable,
            is_mut: false,
            is_shared: false,
            declared_at: span,
            used: false,
            mutated: false,
        },
    );
    let then_result = check_body_value(ctx, arena, then_branch);
    let unused = ctx.scopes.pop();
    stmt::sweep_unused(ctx, unused);

    if !else_branch.is_none() {
        check_body_value(ctx, arena, else_branch);
    }
    then_result
}

fn check_struct_init(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    type_name: &str,
    fields: &[(String, NodeIndex)],
    span: Span,
) -> TypeId {
    let typ = ctx.resolve_type_name(type_name);
    for (field_name, value) in fields {
        let value_type = check_expr(ctx, arena, *value);
        if typ.is_none() {
            continue;
        }
        match ctx.table.find_field_with_embeds(typ.base(), field_name) {
            Ok(Some(fd)) => {
                if !value_type.is_none() && fd.typ.base() != value_type.base() {
                    let got = ctx.table.sym(value_type.base()).canonical_name.clone();
                    let want = ctx.table.sym(fd.typ.base()).canonical_name.clone();
                    ctx.report(span.start, span.len(), diagnostic_codes::ARGUMENT_TYPE_MISMATCH, &[&got, &want]);
                }
            }
            Ok(None) => {
                let owner = ctx.table.sym(typ.base()).canonical_name.clone();
                ctx.report(span.start, span.len(), diagnostic_codes::NO_SUCH_FIELD_OR_METHOD, &[&owner, field_name]);
            }
            Err(_) => {}
        }
    }
    typ
}

fn check_enum_val(ctx: &mut CheckerContext<'_>, enum_name: Option<&str>, variant: &str, span: Span) -> TypeId {
    let Some(name) = enum_name else {
        // A leading-dot `.variant` with no explicit enum name needs a target
        // type to resolve against; the caller (assignment/call-argument
        // checking) is responsible for re-resolving it against that hint.
        return TypeId::NONE;
    };
    let typ = ctx.resolve_type_name(name);
    if typ.is_none() {
        return TypeId::NONE;
    }
    if let talus_types::TypeInfo::Enum(info) = &ctx.table.sym(typ.base()).info {
        if !info.variants.iter().any(|(v, _)| v == variant) {
            ctx.report(span.start, span.len(), diagnostic_codes::NO_SUCH_FIELD_OR_METHOD, &[name, variant]);
        }
    }
    typ
}

#[cfg(test)]
#[path = "tests/expr.rs"]
mod tests;
