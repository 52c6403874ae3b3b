//! `match` expressions (§4.2.2): per-arm smartcast narrowing and
//! exhaustiveness over enum/sum-type subjects.

use talus_ast::{MatchArm, MatchPattern, NodeArena, NodeIndex};
use talus_common::diagnostics::diagnostic_codes;
use talus_common::Span;
use talus_types::{TypeId, TypeInfo};

use crate::context::CheckerContext;
use crate::expr::{check_body_value, check_expr, root_smartcast_key};
use crate::scope::{Binding, BindingKind};
use crate::stmt::sweep_unused;

pub fn check_match(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    subject: NodeIndex,
    arms: &[MatchArm],
    span: Span,
) -> TypeId {
    let subject_type = check_expr(ctx, arena, subject);
    let smartcast_key = root_smartcast_key(ctx, arena, subject);

    let mut has_else = false;
    let mut covered: Vec<TypeId> = Vec::new();
    let mut result = ctx.table.builtins.void;

    for arm in arms {
        ctx.scopes.push();
        match &arm.pattern {
            MatchPattern::Type(name) => {
                let narrowed = ctx.resolve_type_name(name);
                covered.push(narrowed);
                if let Some(key) = smartcast_key.clone() {
                    ctx.scopes.push_smartcast(key, narrowed);
                }
                if let Some(binding_name) = &arm.binding {
                    ctx.scopes.declare(
                        binding_name.clone(),
                        Binding {
                            typ: narrowed,
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
            MatchPattern::Value(value_node) => {
                check_expr(ctx, arena, *value_node);
            }
            MatchPattern::Else => has_else = true,
        }
        result = check_body_value(ctx, arena, arm.body);
        let unused = ctx.scopes.pop();
        sweep_unused(ctx, unused);
    }

    if !has_else {
        check_exhaustiveness(ctx, subject_type, &covered, span);
    }

    result
}

fn check_exhaustiveness(ctx: &mut CheckerContext<'_>, subject_type: TypeId, covered: &[TypeId], span: Span) {
    if subject_type.is_none() {
        return;
    }
    let variants: Vec<TypeId> = match &ctx.table.sym(subject_type.base()).info {
        TypeInfo::SumType(info) => info.variants.clone(),
        TypeInfo::Enum(_) => return, // enum-value patterns are `Value`, not `Type`; skip structural exhaustiveness
        _ => return,
    };
    let missing: Vec<String> = variants
        .iter()
        .filter(|v| !covered.iter().any(|c| c.base() == v.base()))
        .map(|v| ctx.table.sym(v.base()).canonical_name.clone())
        .collect();
    if !missing.is_empty() {
        ctx.report(span.start, span.len(), diagnostic_codes::BRANCH_NOT_EXHAUSTIVE, &[&missing.join(", ")]);
    }
}

#[cfg(test)]
#[path = "tests/match_expr.rs"]
mod tests;
