//! Call resolution and generic inference (§4.2.4): callee resolution,
//! argument count/type checking (including C-interop widening and the
//! variadic tail), attribute enforcement, and the `or {}`/postfix-`?`
//! optional-propagation forms.

use talus_ast::{ExprKind, NodeArena, NodeIndex, NodeList};
use talus_common::diagnostics::diagnostic_codes;
use talus_common::Span;
use talus_types::{FnAttrs, FunctionDescriptor, ParamDescriptor, SourceLang, TypeFlags, TypeId, TypeInfo};

use crate::context::CheckerContext;
use crate::expr::check_body_value;
use crate::expr::check_expr;

#[allow(clippy::too_many_arguments)]
pub fn check_call(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    call_idx: NodeIndex,
    callee: NodeIndex,
    args: &NodeList,
    generic_args: &[String],
    or_block: Option<NodeIndex>,
    span: Span,
) -> TypeId {
    let _ = call_idx;
    let Some(descriptor) = resolve_callee(ctx, arena, callee, span) else {
        for a in args {
            check_expr(ctx, arena, *a);
        }
        if let Some(or_block) = or_block {
            check_body_value(ctx, arena, or_block);
        }
        return TypeId::NONE;
    };

    if check_attrs(ctx, &descriptor, span) {
        // `[if tag]` with its tag disabled (§4.2.4 point 7): the call is
        // statically elided, so it's checked only for side effects.
        for a in args {
            check_expr(ctx, arena, *a);
        }
        if let Some(or_block) = or_block {
            check_body_value(ctx, arena, or_block);
        }
        return TypeId::NONE;
    }

    let mut return_type = if descriptor.is_generic() {
        check_generic_call(ctx, &descriptor, arena, args, generic_args, span)
    } else {
        check_args(ctx, arena, &descriptor.params, args, descriptor.source_lang, span);
        descriptor.return_type
    };

    if let Some(or_block) = or_block {
        if !return_type.has_flag(TypeFlags::OPTIONAL) {
            ctx.report(span.start, span.len(), diagnostic_codes::OR_BLOCK_TYPE_MISMATCH, &[&descriptor.name]);
            check_body_value(ctx, arena, or_block);
        } else {
            let unwrapped = return_type.clear_flag(TypeFlags::OPTIONAL);
            let or_value_type = check_body_value(ctx, arena, or_block);
            let terminates = or_block_terminates(ctx, arena, or_block);
            if !terminates && !or_value_type.is_none() && or_value_type.base() != unwrapped.base() {
                let want_name = ctx.table.sym(unwrapped.base()).canonical_name.clone();
                ctx.report(span.start, span.len(), diagnostic_codes::OR_BLOCK_TYPE_MISMATCH, &[&want_name]);
            }
        }
        return_type = return_type.clear_flag(TypeFlags::OPTIONAL);
    }

    return_type
}

/// Whether an `or { }` block's tail position ends the block rather than
/// producing a value (§4.2.4 point 8): a bare `return`/`break`/`continue`,
/// or a call to a `[noreturn]` function.
fn or_block_terminates(ctx: &CheckerContext<'_>, arena: &NodeArena, or_block: NodeIndex) -> bool {
    let last = match &arena.get(or_block).kind {
        ExprKind::Block { stmts } => stmts.last().copied(),
        _ => Some(or_block),
    };
    let Some(last) = last else { return false };
    match &arena.get(last).kind {
        ExprKind::Return { .. } | ExprKind::BranchStmt { .. } => true,
        ExprKind::ExprStmt { expr } => is_noreturn_call(ctx, arena, *expr),
        _ => false,
    }
}

fn is_noreturn_call(ctx: &CheckerContext<'_>, arena: &NodeArena, idx: NodeIndex) -> bool {
    let ExprKind::CallExpr { callee, .. } = &arena.get(idx).kind else {
        return false;
    };
    descriptor_for_callee(ctx, arena, *callee).is_some_and(|fd| fd.attrs.contains(FnAttrs::NORETURN))
}

/// Looks up the already-resolved descriptor for a call's callee without
/// re-reporting diagnostics, relying on the `TypeCache` entries `check_expr`
/// already populated when the or-block was first checked.
fn descriptor_for_callee(ctx: &CheckerContext<'_>, arena: &NodeArena, callee: NodeIndex) -> Option<FunctionDescriptor> {
    match &arena.get(callee).kind {
        ExprKind::Ident(name) => {
            if let Some(binding) = ctx.scopes.lookup(name) {
                match &ctx.table.sym(binding.typ.base()).info {
                    TypeInfo::Function(fd) => Some(fd.clone()),
                    _ => None,
                }
            } else {
                ctx.table.get_fn(name).cloned()
            }
        }
        ExprKind::SelectorExpr { base, field } => {
            let base_type = ctx.types.get(*base)?;
            ctx.table.find_method_with_embeds(base_type.base(), field).ok().flatten().cloned()
        }
        _ => None,
    }
}

fn resolve_callee(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    callee: NodeIndex,
    span: Span,
) -> Option<FunctionDescriptor> {
    match arena.get(callee).kind.clone() {
        ExprKind::SelectorExpr { base, field } => {
            let base_type = check_expr(ctx, arena, base);
            if base_type.is_none() {
                return None;
            }
            match ctx.table.find_method_with_embeds(base_type.base(), &field) {
                Ok(Some(fd)) => Some(fd.clone()),
                Ok(None) => {
                    let owner = ctx.table.sym(base_type.base()).canonical_name.clone();
                    ctx.report(span.start, span.len(), diagnostic_codes::NO_SUCH_FIELD_OR_METHOD, &[&owner, &field]);
                    None
                }
                Err(_) => None,
            }
        }
        ExprKind::Ident(name) => {
            if let Some(binding) = ctx.scopes.lookup(&name).cloned() {
                ctx.scopes.mark_used(&name);
                match &ctx.table.sym(binding.typ.base()).info {
                    TypeInfo::Function(fd) => Some(fd.clone()),
                    _ => {
                        ctx.report(span.start, span.len(), diagnostic_codes::NOT_CALLABLE, &[&name]);
                        None
                    }
                }
            } else if let Some(fd) = ctx.table.get_fn(&name) {
                Some(fd.clone())
            } else {
                ctx.report(span.start, span.len(), diagnostic_codes::UNKNOWN_IDENTIFIER, &[&name]);
                None
            }
        }
        _ => {
            let t = check_expr(ctx, arena, callee);
            if t.is_none() {
                return None;
            }
            match &ctx.table.sym(t.base()).info {
                TypeInfo::Function(fd) => Some(fd.clone()),
                _ => {
                    ctx.report(span.start, span.len(), diagnostic_codes::NOT_CALLABLE, &[]);
                    None
                }
            }
        }
    }
}

/// Enforces the attribute-driven call-site rules (§4.2.4 point 7) and
/// reports whether the call is statically elided (`[if tag]` with its tag
/// not in `CheckerOptions::enabled_tags`).
fn check_attrs(ctx: &mut CheckerContext<'_>, descriptor: &FunctionDescriptor, span: Span) -> bool {
    if descriptor.attrs.contains(FnAttrs::DEPRECATED) {
        ctx.report(span.start, span.len(), diagnostic_codes::DEPRECATED_USE, &[&descriptor.name]);
    }
    if descriptor.attrs.contains(FnAttrs::UNSAFE) && ctx.in_unsafe == 0 {
        ctx.report(span.start, span.len(), diagnostic_codes::UNSAFE_CALL_OUTSIDE_UNSAFE_BLOCK, &[&descriptor.name]);
    }
    if let Some(tag) = &descriptor.if_tag {
        if !ctx.options.enabled_tags.contains(tag) {
            return true;
        }
    }
    false
}

fn check_generic_call(
    ctx: &mut CheckerContext<'_>,
    descriptor: &FunctionDescriptor,
    arena: &NodeArena,
    args: &NodeList,
    generic_args: &[String],
    span: Span,
) -> TypeId {
    let arg_types: Vec<TypeId> = args.iter().map(|a| check_expr(ctx, arena, *a)).collect();

    let concrete_types = if !generic_args.is_empty() {
        generic_args.iter().map(|name| ctx.resolve_type_name(name)).collect::<Vec<_>>()
    } else {
        match ctx.table.infer_fn_generic_types(&descriptor.params, &descriptor.generic_names, &arg_types) {
            Ok(types) => types,
            Err(talus_types::InferenceError::Ambiguous(name)) => {
                ctx.report(span.start, span.len(), diagnostic_codes::AMBIGUOUS_GENERIC_INFERENCE, &[&name]);
                return TypeId::NONE;
            }
            Err(talus_types::InferenceError::Unbound(name)) => {
                ctx.report(span.start, span.len(), diagnostic_codes::UNBOUND_GENERIC_PARAMETER, &[&name]);
                return TypeId::NONE;
            }
        }
    };

    let key = call_key(ctx.table, descriptor);
    if ctx.table.register_fn_concrete_types(&key, concrete_types.clone()) {
        ctx.needs_generic_recheck = true;
    }

    let concrete_params: Vec<ParamDescriptor> = descriptor
        .params
        .iter()
        .map(|p| ParamDescriptor {
            name: p.name.clone(),
            typ: ctx.table.resolve_generic_to_concrete(p.typ, &descriptor.generic_names, &concrete_types),
            is_mut: p.is_mut,
            is_hidden: p.is_hidden,
        })
        .collect();
    check_arg_types(ctx, &arg_types, &concrete_params, descriptor.source_lang, span);

    ctx.table.resolve_generic_to_concrete(descriptor.return_type, &descriptor.generic_names, &concrete_types)
}

fn call_key(table: &talus_types::TypeTable, fd: &FunctionDescriptor) -> String {
    if !fd.receiver.is_none() {
        let recv_name = table.sym(fd.receiver).canonical_name.clone();
        return format!("{recv_name}.{}", fd.name);
    }
    if fd.module == talus_types::MAIN_MODULE {
        fd.name.clone()
    } else {
        format!("{}.{}", fd.module, fd.name)
    }
}

fn check_args(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    params: &[ParamDescriptor],
    args: &NodeList,
    source_lang: SourceLang,
    span: Span,
) {
    let arg_types: Vec<TypeId> = args.iter().map(|a| check_expr(ctx, arena, *a)).collect();
    check_arg_types(ctx, &arg_types, params, source_lang, span);
}

fn check_arg_types(
    ctx: &mut CheckerContext<'_>,
    arg_types: &[TypeId],
    params: &[ParamDescriptor],
    source_lang: SourceLang,
    span: Span,
) {
    let variadic = params.last().map(|p| p.typ.has_flag(TypeFlags::VARIADIC)).unwrap_or(false);
    let required = if variadic { params.len().saturating_sub(1) } else { params.len() };

    let count_ok = if variadic { arg_types.len() >= required } else { arg_types.len() == params.len() };
    if !count_ok {
        ctx.report(
            span.start,
            span.len(),
            diagnostic_codes::ARGUMENT_COUNT_MISMATCH,
            &[&required.to_string(), &arg_types.len().to_string()],
        );
    }

    for (i, param) in params.iter().enumerate() {
        if param.typ.has_flag(TypeFlags::VARIADIC) {
            let elem = param.typ.clear_flag(TypeFlags::VARIADIC);
            for &got in &arg_types[i.min(arg_types.len())..] {
                check_one_arg(ctx, got, elem, source_lang, span);
            }
            break;
        }
        let Some(&got) = arg_types.get(i) else { break };
        check_one_arg(ctx, got, param.typ, source_lang, span);
    }
}

fn check_one_arg(ctx: &mut CheckerContext<'_>, got: TypeId, want: TypeId, source_lang: SourceLang, span: Span) {
    if got.is_none() || want.is_none() || got.base() == want.base() {
        return;
    }
    if matches!(ctx.table.sym(got.base()).info, TypeInfo::Literal(_)) {
        return;
    }
    if source_lang == SourceLang::C && is_numeric(ctx, got) && is_numeric(ctx, want) {
        // Mechanically-translated C signatures widen freely between
        // integer/float/pointer-ish parameter slots (§4.2.4 point 5).
        return;
    }
    if ctx.table.does_type_implement_interface(got.base(), want.base()).unwrap_or(false) {
        return;
    }
    let got_name = ctx.table.sym(got.base()).canonical_name.clone();
    let want_name = ctx.table.sym(want.base()).canonical_name.clone();
    ctx.report(span.start, span.len(), diagnostic_codes::ARGUMENT_TYPE_MISMATCH, &[&got_name, &want_name]);
}

fn is_numeric(ctx: &CheckerContext<'_>, t: TypeId) -> bool {
    matches!(&ctx.table.sym(t.base()).info, TypeInfo::Primitive(p) if p.is_numeric())
        || matches!(&ctx.table.sym(t.base()).info, TypeInfo::Literal(_))
}

#[cfg(test)]
#[path = "tests/call.rs"]
mod tests;
