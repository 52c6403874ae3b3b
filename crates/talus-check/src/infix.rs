//! Binary operator type-checking (§4.2.2): arithmetic/bitwise promotion,
//! array append (`<<`), comparisons, membership (`in`/`!in`), and type
//! tests (`is`/`!is`, including the smartcast they introduce).

use talus_ast::{BinOp, ExprKind, NodeArena, NodeIndex, UnOp};
use talus_common::diagnostics::diagnostic_codes;
use talus_common::Span;
use talus_types::{PrimitiveKind, TypeId, TypeInfo};

use crate::context::CheckerContext;
use crate::expr::check_expr;
use crate::selector::root_smartcast_key;

pub fn check_infix(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    op: BinOp,
    left: NodeIndex,
    right: NodeIndex,
    span: Span,
) -> TypeId {
    match op {
        BinOp::LogAnd | BinOp::LogOr => {
            warn_on_ambiguous_precedence(ctx, arena, op, left, right, span);
            check_expr(ctx, arena, left);
            check_expr(ctx, arena, right);
            ctx.table.builtins.bool_
        }
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            check_expr(ctx, arena, left);
            check_expr(ctx, arena, right);
            ctx.table.builtins.bool_
        }
        BinOp::In | BinOp::NotIn => {
            check_expr(ctx, arena, left);
            check_expr(ctx, arena, right);
            ctx.table.builtins.bool_
        }
        BinOp::Is | BinOp::NotIs => check_is(ctx, arena, left, right, span),
        BinOp::Append => check_append(ctx, arena, left, right, span),
        BinOp::Shl | BinOp::Shr => check_shift(ctx, arena, left, right, span),
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
            let lt = check_expr(ctx, arena, left);
            let rt = check_expr(ctx, arena, right);
            check_pointer_arithmetic(ctx, lt, rt, span);
            promote_num(ctx, lt, rt, span)
        }
        _ => {
            let lt = check_expr(ctx, arena, left);
            let rt = check_expr(ctx, arena, right);
            promote_num(ctx, lt, rt, span)
        }
    }
}

/// Flags `a && b || c` written without disambiguating parentheses: the
/// immediate left/right child is itself an `InfixExpr` with the *other*
/// logical operator (a `ParExpr` wrapper would have changed the child's
/// kind, so this only fires on the genuinely unparenthesized form).
fn warn_on_ambiguous_precedence(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    op: BinOp,
    left: NodeIndex,
    right: NodeIndex,
    span: Span,
) {
    let other = if op == BinOp::LogAnd { BinOp::LogOr } else { BinOp::LogAnd };
    let mixes = |idx: NodeIndex| matches!(&arena.get(idx).kind, ExprKind::InfixExpr { op: o, .. } if *o == other);
    if mixes(left) || mixes(right) {
        ctx.report(span.start, span.len(), diagnostic_codes::AMBIGUOUS_BOOLEAN_PRECEDENCE, &[]);
    }
}

fn check_is(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    left: NodeIndex,
    right: NodeIndex,
    span: Span,
) -> TypeId {
    check_expr(ctx, arena, left);
    let target = match &arena.get(right).kind {
        ExprKind::Ident(name) => Some(ctx.resolve_type_name(name)),
        ExprKind::EnumVal { enum_name: Some(name), .. } => Some(ctx.resolve_type_name(name)),
        _ => {
            check_expr(ctx, arena, right);
            None
        }
    };
    if let (Some(target), Some(key)) = (target, root_smartcast_key(ctx, arena, left)) {
        ctx.scopes.push_smartcast(key, target);
    }
    ctx.table.builtins.bool_
}

fn check_append(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    left: NodeIndex,
    right: NodeIndex,
    span: Span,
) -> TypeId {
    let lt = check_expr(ctx, arena, left);
    let rt = check_expr(ctx, arena, right);
    let elem = ctx.table.value_type(lt);
    if !elem.is_none() && elem.base() != rt.base() && rt.base() != lt.base() {
        ctx.report(
            span.start,
            span.len(),
            diagnostic_codes::ARGUMENT_TYPE_MISMATCH,
            &[&ctx.table.sym(rt.base()).canonical_name.clone(), &ctx.table.sym(elem.base()).canonical_name.clone()],
        );
    }
    lt
}

/// `<< >>` (§4.2.2): both operands must be integral; a signed left-hand
/// operand warns; a compile-time-known shift count that reaches or exceeds
/// the left operand's bit width is an error.
fn check_shift(
    ctx: &mut CheckerContext<'_>,
    arena: &NodeArena,
    left: NodeIndex,
    right: NodeIndex,
    span: Span,
) -> TypeId {
    let lt = check_expr(ctx, arena, left);
    let rt = check_expr(ctx, arena, right);

    if !is_integral(ctx, lt) || !is_integral(ctx, rt) {
        let lt_name = ctx.table.sym(lt.base()).canonical_name.clone();
        let rt_name = ctx.table.sym(rt.base()).canonical_name.clone();
        ctx.report(span.start, span.len(), diagnostic_codes::SHIFT_REQUIRES_INTEGRAL, &[&lt_name, &rt_name]);
        return lt;
    }

    if is_signed_primitive(ctx, lt) {
        let lt_name = ctx.table.sym(lt.base()).canonical_name.clone();
        ctx.report(span.start, span.len(), diagnostic_codes::LEFT_SHIFT_OF_SIGNED, &[&lt_name]);
    }

    if let Some(count) = compile_time_int(arena, right) {
        let width = bit_width(ctx, lt);
        if width > 0 && count >= i64::from(width) {
            let width_str = width.to_string();
            ctx.report(span.start, span.len(), diagnostic_codes::SHIFT_COUNT_OVERFLOW, &[&count.to_string(), &width_str]);
        }
    }

    ctx.table.unalias_num_type(lt)
}

/// "pointer arithmetic requires `unsafe`" (§4.2.2, "Infix"): flags `+ - * /
/// %` when either operand is a pointer (`nr_muls() > 0`) outside an
/// `unsafe { }` block.
fn check_pointer_arithmetic(ctx: &mut CheckerContext<'_>, a: TypeId, b: TypeId, span: Span) {
    if ctx.in_unsafe > 0 {
        return;
    }
    let offender = if a.nr_muls() > 0 {
        Some(a)
    } else if b.nr_muls() > 0 {
        Some(b)
    } else {
        None
    };
    if let Some(t) = offender {
        let name = ctx.table.sym(t.base()).canonical_name.clone();
        ctx.report(span.start, span.len(), diagnostic_codes::POINTER_ARITHMETIC_REQUIRES_UNSAFE, &[&name]);
    }
}

fn is_integral(ctx: &CheckerContext<'_>, t: TypeId) -> bool {
    if t.is_none() {
        return false;
    }
    matches!(&ctx.table.sym(t.base()).info, TypeInfo::Primitive(p) if p.is_integer())
        || matches!(&ctx.table.sym(t.base()).info, TypeInfo::Literal(talus_types::LiteralKind::Integer))
}

fn is_signed_primitive(ctx: &CheckerContext<'_>, t: TypeId) -> bool {
    matches!(&ctx.table.sym(t.base()).info, TypeInfo::Primitive(p) if p.is_signed())
}

/// Bit width of a concrete integer primitive, `0` for anything else
/// (literals have no fixed width to overflow-check against).
fn bit_width(ctx: &CheckerContext<'_>, t: TypeId) -> u32 {
    match &ctx.table.sym(t.base()).info {
        TypeInfo::Primitive(PrimitiveKind::I8 | PrimitiveKind::U8) => 8,
        TypeInfo::Primitive(PrimitiveKind::I16 | PrimitiveKind::U16) => 16,
        TypeInfo::Primitive(PrimitiveKind::I32 | PrimitiveKind::U32 | PrimitiveKind::Rune) => 32,
        TypeInfo::Primitive(PrimitiveKind::I64 | PrimitiveKind::U64 | PrimitiveKind::Isize | PrimitiveKind::Usize) => 64,
        _ => 0,
    }
}

/// Evaluates a shift count known at check time: a bare integer literal, or
/// one wrapped in parens/negation, mirroring `decl.rs::eval_int_expr` for
/// enum-variant values.
fn compile_time_int(arena: &NodeArena, idx: NodeIndex) -> Option<i64> {
    match &arena.get(idx).kind {
        ExprKind::IntegerLiteral(text) => parse_int_literal(text),
        ExprKind::PrefixExpr { op: UnOp::Neg, expr } => compile_time_int(arena, *expr).map(|v| -v),
        ExprKind::ParExpr { inner } => compile_time_int(arena, *inner),
        _ => None,
    }
}

fn parse_int_literal(text: &str) -> Option<i64> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    if let Some(hex) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok();
    }
    if let Some(bin) = cleaned.strip_prefix("0b").or_else(|| cleaned.strip_prefix("0B")) {
        return i64::from_str_radix(bin, 2).ok();
    }
    if let Some(oct) = cleaned.strip_prefix("0o").or_else(|| cleaned.strip_prefix("0O")) {
        return i64::from_str_radix(oct, 8).ok();
    }
    cleaned.parse::<i64>().ok()
}

fn is_numeric_ish(ctx: &CheckerContext<'_>, t: TypeId) -> bool {
    if t.is_none() {
        return false;
    }
    matches!(&ctx.table.sym(t.base()).info, TypeInfo::Primitive(p) if p.is_numeric())
        || matches!(&ctx.table.sym(t.base()).info, TypeInfo::Literal(_))
}

fn width_rank(ctx: &CheckerContext<'_>, t: TypeId) -> u8 {
    match &ctx.table.sym(t.base()).info {
        TypeInfo::Primitive(p) => p.width_rank(),
        TypeInfo::Literal(talus_types::LiteralKind::Integer) => 1,
        TypeInfo::Literal(talus_types::LiteralKind::Float) => 5,
        _ => 0,
    }
}

/// `promote_num` (§4.2.2): the lower-precision operand promotes to the
/// higher, with one refinement the design notes call out explicitly — a
/// bare integer/float literal always yields to a concretely-typed operand
/// regardless of relative width, since `1 + some_i8` should produce `i8`,
/// not a width-promoted literal type (Open Question, decided in
/// `DESIGN.md`).
fn promote_num(ctx: &mut CheckerContext<'_>, a: TypeId, b: TypeId, span: Span) -> TypeId {
    let a_is_literal = matches!(ctx.table.sym(a.base()).info, TypeInfo::Literal(_));
    let b_is_literal = matches!(ctx.table.sym(b.base()).info, TypeInfo::Literal(_));
    if a_is_literal && !b_is_literal && is_numeric_ish(ctx, b) {
        return ctx.table.unalias_num_type(b);
    }
    if b_is_literal && !a_is_literal && is_numeric_ish(ctx, a) {
        return ctx.table.unalias_num_type(a);
    }
    if !is_numeric_ish(ctx, a) || !is_numeric_ish(ctx, b) {
        return if a.is_none() { b } else { a };
    }
    check_signed_unsigned_mismatch(ctx, a, b, span);
    if width_rank(ctx, a) >= width_rank(ctx, b) {
        a
    } else {
        b
    }
}

/// Same-width signed×unsigned mixing (e.g. `i32 + u32`) is rejected; mixing
/// of different widths is left to the ordinary width-rank promotion above,
/// which already widens (§4.2.2: "signed×unsigned of different widths is
/// rejected unless widening").
fn check_signed_unsigned_mismatch(ctx: &mut CheckerContext<'_>, a: TypeId, b: TypeId, span: Span) {
    let (TypeInfo::Primitive(pa), TypeInfo::Primitive(pb)) = (&ctx.table.sym(a.base()).info, &ctx.table.sym(b.base()).info) else {
        return;
    };
    let (pa, pb) = (*pa, *pb);
    let mismatched_sign = (pa.is_signed() && pb.is_unsigned()) || (pa.is_unsigned() && pb.is_signed());
    if mismatched_sign && pa.width_rank() == pb.width_rank() {
        let a_name = ctx.table.sym(a.base()).canonical_name.clone();
        let b_name = ctx.table.sym(b.base()).canonical_name.clone();
        ctx.report(span.start, span.len(), diagnostic_codes::SIGNED_UNSIGNED_MISMATCH, &[&a_name, &b_name]);
    }
}

#[cfg(test)]
#[path = "tests/infix.rs"]
mod tests;
