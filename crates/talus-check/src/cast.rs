//! Explicit casts (§4.2.2): `Type(expr)` conversions and `expr as Type` /
//! `expr as? Type` narrowing.

use talus_ast::{NodeArena, NodeIndex};
use talus_common::diagnostics::diagnostic_codes;
use talus_common::Span;
use talus_types::{PrimitiveKind, TypeFlags, TypeId, TypeInfo};

use crate::context::CheckerContext;
use crate::expr::check_expr;
use crate::selector::root_smartcast_key;

pub fn check_cast(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    expr: NodeIndex,
    target_type: &str,
    span: Span,
) -> TypeId {
    let src = check_expr(ctx, arena, expr);
    let target = ctx.resolve_type_name(target_type);
    if src.is_none() || target.is_none() {
        return target;
    }
    if cast_allowed(ctx, src, target) {
        target
    } else {
        let src_name = ctx.table.sym(src.base()).canonical_name.clone();
        let target_name = ctx.table.sym(target.base()).canonical_name.clone();
        ctx.report(span.start, span.len(), diagnostic_codes::CAST_NOT_ALLOWED, &[&src_name, &target_name]);
        target
    }
}

/// `expr as Type` narrows the enclosing scope's smartcast for `expr`'s
/// lvalue to `Type`; `expr as? Type` (`is_satisfies`) is the non-narrowing,
/// possibly-absent form and yields an optional `Type` instead.
pub fn check_as_cast(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    expr: NodeIndex,
    target_type: &str,
    is_satisfies: bool,
    span: Span,
) -> TypeId {
    let src = check_expr(ctx, arena, expr);
    let target = ctx.resolve_type_name(target_type);
    if is_satisfies {
        return target.with_flag(TypeFlags::OPTIONAL);
    }
    if !src.is_none() && !cast_allowed(ctx, src, target) {
        let src_name = ctx.table.sym(src.base()).canonical_name.clone();
        let target_name = ctx.table.sym(target.base()).canonical_name.clone();
        ctx.report(span.start, span.len(), diagnostic_codes::CAST_NOT_ALLOWED, &[&src_name, &target_name]);
    }
    if let Some(key) = root_smartcast_key(ctx, arena, expr) {
        ctx.scopes.push_smartcast(key, target);
    }
    target
}

fn cast_allowed(ctx: &mut CheckerContext<'_>, src: TypeId, target: TypeId) -> bool {
    if src.base() == target.base() {
        return true;
    }
    if target.base() == ctx.table.builtins.voidptr || src.base() == ctx.table.builtins.voidptr {
        return true;
    }

    let src_info = ctx.table.sym(src.base()).info.clone();
    let tgt_info = ctx.table.sym(target.base()).info.clone();

    match (&src_info, &tgt_info) {
        (TypeInfo::Primitive(_), TypeInfo::Primitive(_)) => true,
        (TypeInfo::Literal(_), TypeInfo::Primitive(p)) | (TypeInfo::Primitive(p), TypeInfo::Literal(_)) => {
            p.is_numeric()
        }
        (TypeInfo::Enum(_), TypeInfo::Primitive(p)) | (TypeInfo::Primitive(p), TypeInfo::Enum(_)) => p.is_integer(),
        (TypeInfo::Struct(_), TypeInfo::Interface(_)) => {
            ctx.table.does_type_implement_interface(src.base(), target.base()).unwrap_or(false)
        }
        (TypeInfo::Interface(_), TypeInfo::Struct(_)) => {
            ctx.table.does_type_implement_interface(target.base(), src.base()).unwrap_or(false)
        }
        (TypeInfo::SumType(info), _) => info.variants.iter().any(|v| v.base() == target.base()),
        (_, TypeInfo::SumType(info)) => info.variants.iter().any(|v| v.base() == src.base()),
        (TypeInfo::Primitive(PrimitiveKind::VoidPtr), _) | (_, TypeInfo::Primitive(PrimitiveKind::VoidPtr)) => true,
        _ => false,
    }
}

#[cfg(test)]
#[path = "tests/cast.rs"]
mod tests;
