//! Indexing (§4.1.3 `value_type`, §4.2.2): array/map/string subscripts and
//! range-based slicing.

use talus_ast::{ExprKind, NodeArena, NodeIndex};
use talus_common::diagnostics::diagnostic_codes;
use talus_common::Span;
use talus_types::{LiteralKind, PrimitiveKind, TypeId, TypeInfo};

use crate::context::CheckerContext;
use crate::expr::check_expr;

fn is_integer_ish(ctx: &CheckerContext<'_>, t: TypeId) -> bool {
    if t.is_none() {
        return false;
    }
    match &ctx.table.sym(t.base()).info {
        TypeInfo::Primitive(p) => p.is_integer(),
        TypeInfo::Literal(LiteralKind::Integer) => true,
        _ => false,
    }
}

pub fn check_index(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    base: NodeIndex,
    index: NodeIndex,
    span: Span,
) -> TypeId {
    let base_type = check_expr(ctx, arena, base);
    if base_type.is_none() {
        return TypeId::NONE;
    }

    if let ExprKind::RangeExpr { lo, hi } = &arena.get(index).kind {
        if !lo.is_none() {
            check_expr(ctx, arena, *lo);
        }
        if !hi.is_none() {
            check_expr(ctx, arena, *hi);
        }
        return base_type;
    }

    let index_type = check_expr(ctx, arena, index);

    if base_type.nr_muls() > 0 {
        if ctx.in_unsafe == 0 {
            let base_name = ctx.table.sym(base_type.base()).canonical_name.clone();
            ctx.report(span.start, span.len(), diagnostic_codes::POINTER_INDEX_OUTSIDE_UNSAFE, &[&base_name]);
        }
        return base_type.deref();
    }

    let info = ctx.table.sym(base_type.base()).info.clone();
    let ok = match &info {
        TypeInfo::Map { key, .. } => index_type.is_none() || index_type.base() == key.base(),
        TypeInfo::Array { .. } | TypeInfo::ArrayFixed { .. } => is_integer_ish(ctx, index_type),
        TypeInfo::Primitive(PrimitiveKind::String) => is_integer_ish(ctx, index_type),
        _ => base_type.has_flag(talus_types::TypeFlags::VARIADIC),
    };
    if !ok {
        let base_name = ctx.table.sym(base_type.base()).canonical_name.clone();
        let index_name = ctx.table.sym(index_type.base()).canonical_name.clone();
        ctx.report(span.start, span.len(), diagnostic_codes::INDEX_TYPE_MISMATCH, &[&base_name, &index_name]);
    }
    ctx.table.value_type(base_type)
}

#[cfg(test)]
#[path = "tests/index_expr.rs"]
mod tests;
