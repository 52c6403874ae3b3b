//! Field/method selection (§4.1.4 lookup, §4.2.2 dispatch), smartcast key
//! construction, and the `Assoc`/`ComptimeSelector` static-access forms.

use talus_ast::{ExprKind, NodeArena, NodeIndex};
use talus_common::diagnostics::diagnostic_codes;
use talus_common::Span;
use talus_types::{TableError, TypeId};

use crate::context::CheckerContext;
use crate::expr::check_expr;
use crate::scope::SmartcastKey;

/// Builds the smartcast key an `is`/match-arm refinement on `expr` would be
/// stored under, if `expr` is shaped like an lvalue (`Ident`, a
/// `SelectorExpr` chain rooted at one, or either wrapped in parens).
pub fn root_smartcast_key(ctx: &CheckerContext<'_>, arena: &NodeArena, expr: NodeIndex) -> Option<SmartcastKey> {
    match &arena.get(expr).kind {
        ExprKind::Ident(name) => Some(SmartcastKey::Var(name.clone())),
        ExprKind::ParExpr { inner } => root_smartcast_key(ctx, arena, *inner),
        ExprKind::SelectorExpr { base, field } => {
            let owner_typ = ctx.types.get(*base)?;
            let owner_expr = render_lvalue(arena, *base)?;
            Some(SmartcastKey::Field { owner_expr, owner_typ, field: field.clone() })
        }
        _ => None,
    }
}

fn render_lvalue(arena: &NodeArena, idx: NodeIndex) -> Option<String> {
    match &arena.get(idx).kind {
        ExprKind::Ident(name) => Some(name.clone()),
        ExprKind::ParExpr { inner } => render_lvalue(arena, *inner),
        ExprKind::SelectorExpr { base, field } => render_lvalue(arena, *base).map(|b| format!("{b}.{field}")),
        _ => None,
    }
}

pub fn check_selector(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    expr_idx: NodeIndex,
    base: NodeIndex,
    field: &str,
    span: Span,
) -> TypeId {
    let base_type = check_expr(ctx, arena, base);

    if let Some(key) = root_smartcast_key(ctx, arena, expr_idx) {
        if let Some(refined) = ctx.scopes.smartcast(&key) {
            return refined;
        }
    }

    if base_type.is_none() {
        return TypeId::NONE;
    }

    match ctx.table.find_field_with_embeds(base_type.base(), field) {
        Ok(Some(fd)) => return fd.typ,
        Ok(None) => {}
        Err(e) => {
            report_table_error(ctx, &e, span);
            return TypeId::NONE;
        }
    }

    match ctx.table.find_method_with_embeds(base_type.base(), field) {
        Ok(Some(fd)) => {
            let module = fd.module.clone();
            let fd = fd.clone();
            ctx.table.find_or_register_fn_type(&module, fd, true, true)
        }
        Ok(None) => {
            ctx.report(
                span.start,
                span.len(),
                diagnostic_codes::NO_SUCH_FIELD_OR_METHOD,
                &[&ctx.table.sym(base_type.base()).canonical_name.clone(), field],
            );
            TypeId::NONE
        }
        Err(e) => {
            report_table_error(ctx, &e, span);
            TypeId::NONE
        }
    }
}

/// Static `Base.member` access: a type's associated method, or (rarely) a
/// module-qualified constant. Resolved more loosely than `check_selector`
/// since `base` here is a bare name rather than a typed expression.
pub fn check_assoc(ctx: &mut CheckerContext<'_>, base: &str, member: &str, span: Span) -> TypeId {
    let typ = ctx.resolve_type_name(base);
    if !typ.is_none() {
        if let Ok(Some(fd)) = ctx.table.find_method_with_embeds(typ.base(), member) {
            let module = fd.module.clone();
            let fd = fd.clone();
            return ctx.table.find_or_register_fn_type(&module, fd, true, true);
        }
        if let Ok(Some(field)) = ctx.table.find_field_with_embeds(typ.base(), member) {
            return field.typ;
        }
    }
    if let Some(fd) = ctx.table.get_fn(&format!("{base}.{member}")) {
        return fd.return_type;
    }
    ctx.report(span.start, span.len(), diagnostic_codes::NO_SUCH_FIELD_OR_METHOD, &[base, member]);
    TypeId::NONE
}

/// `$x.field`-style compile-time reflection selector. Reflection fields are
/// synthesized by the generator, not the declared struct shape, so an
/// unresolved member here is not a user-facing error — it falls back to
/// `void` and leaves a trace for diagnosing generator gaps.
pub fn check_comptime_selector(ctx: &mut CheckerContext<'_>, arena: &NodeArena, base: NodeIndex, field: &str) -> TypeId {
    let base_type = check_expr(ctx, arena, base);
    if base_type.is_none() {
        return ctx.table.builtins.void;
    }
    match ctx.table.find_field_with_embeds(base_type.base(), field) {
        Ok(Some(fd)) => fd.typ,
        _ => {
            tracing::trace!(field, "comptime selector field not found on declared shape, falling back to void");
            ctx.table.builtins.void
        }
    }
}

fn report_table_error(ctx: &mut CheckerContext<'_>, err: &TableError, span: Span) {
    match err {
        TableError::AmbiguousEmbedMember { member, .. } => {
            ctx.report(span.start, span.len(), diagnostic_codes::AMBIGUOUS_EMBED_MEMBER, &[member]);
        }
        TableError::NoSuchMember { type_name, member } => {
            ctx.report(span.start, span.len(), diagnostic_codes::NO_SUCH_FIELD_OR_METHOD, &[type_name, member]);
        }
        TableError::InvalidTypeId(_) => {
            tracing::warn!(%err, "invalid type id reached selector resolution");
        }
    }
}

#[cfg(test)]
#[path = "tests/selector.rs"]
mod tests;
