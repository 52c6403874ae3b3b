//! Assignment and declaration statements (§4.2.2): `:=` declarations,
//! compound `+=`-style operators, and mutability enforcement on plain `=`.

use talus_ast::{BinOp, ExprKind, NodeArena, NodeIndex, NodeList};
use talus_common::diagnostics::diagnostic_codes;
use talus_common::Span;
use talus_types::{TypeId, TypeInfo};

use crate::context::CheckerContext;
use crate::expr::check_expr;
use crate::mutability::fail_if_immutable;
use crate::scope::{Binding, BindingKind};

/// `lhs op= rhs` for every flavor: `:=` declarations (one binding per lhs),
/// parallel assignment (`a, b = b, a`, lhs/rhs same length), the
/// single-rhs-many-lhs multi-value-return shorthand (every lhs takes the
/// one rhs type), and compound operators which additionally require the
/// existing lhs type to match the rhs.
pub fn check_assign(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    lhs: &NodeList,
    rhs: &NodeList,
    op: BinOp,
    is_decl: bool,
    is_mut: &[bool],
    span: Span,
) {
    let rhs_types: Vec<TypeId> = rhs.iter().map(|r| check_expr(ctx, arena, *r)).collect();

    // `a, b := f()` unpacks a single multi-value-returning call; `a, b = b,
    // a` assigns each rhs to the lhs at the same position. Anything else
    // (single lhs, single rhs) falls through the "parallel" branch trivially.
    let unpacked: Option<Vec<TypeId>> = if rhs_types.len() == 1 && lhs.len() > 1 {
        match &ctx.table.sym(rhs_types[0].base()).info {
            TypeInfo::MultiReturn(types) if types.len() == lhs.len() => Some(types.clone()),
            _ => None,
        }
    } else {
        None
    };
    let parallel = rhs_types.len() == lhs.len();

    for (i, lhs_node) in lhs.iter().enumerate() {
        let value_type = if let Some(types) = &unpacked {
            types[i]
        } else if parallel {
            rhs_types.get(i).copied().unwrap_or(TypeId::NONE)
        } else {
            rhs_types.first().copied().unwrap_or(TypeId::NONE)
        };

        if is_decl {
            declare_lhs(ctx, arena, *lhs_node, value_type, is_mut.get(i).copied().unwrap_or(false), span);
            continue;
        }

        let lhs_type = check_expr(ctx, arena, *lhs_node);
        fail_if_immutable(ctx, arena, *lhs_node, span);

        if op != BinOp::Assign && !lhs_type.is_none() && !value_type.is_none() && lhs_type.base() != value_type.base() {
            let got = ctx.table.sym(value_type.base()).canonical_name.clone();
            let want = ctx.table.sym(lhs_type.base()).canonical_name.clone();
            ctx.report(span.start, span.len(), diagnostic_codes::ARGUMENT_TYPE_MISMATCH, &[&got, &want]);
        }
    }
}

fn declare_lhs(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    lhs_node: NodeIndex,
    value_type: TypeId,
    is_mut: bool,
    span: Span,
) {
    let ExprKind::Ident(name) = arena.get(lhs_node).kind.clone() else {
        return;
    };
    if name == "_" {
        return;
    }
    ctx.scopes.declare(
        name,
        Binding {
            typ: value_type,
            kind: BindingKind::Variable,
            is_mut,
            is_shared: false,
            declared_at: span,
            used: false,
            mutated: false,
        },
    );
}

#[cfg(test)]
#[path = "tests/assign.rs"]
mod tests;
