use super::*;
use talus_common::CheckerOptions;
use talus_types::TypeTable;

fn new_ctx(table: &mut TypeTable) -> CheckerContext<'_> {
    let mut ctx = CheckerContext::new(table, CheckerOptions::default());
    ctx.enter_file("main.tl", "");
    ctx
}

#[test]
fn comparison_operators_always_yield_bool() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    let mut arena = NodeArena::new();
    let a = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());
    let b = arena.push(ExprKind::IntegerLiteral("2".to_string()), Span::default());

    let t = check_infix(&mut ctx, &arena, BinOp::Lt, a, b, Span::default());
    assert_eq!(t.base(), ctx.table.builtins.bool_);
}

#[test]
fn arithmetic_between_a_literal_and_a_concrete_type_promotes_to_the_concrete_type() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    ctx.scopes.declare(
        "x".to_string(),
        crate::scope::Binding { typ: ctx.table.builtins.i64, kind: crate::scope::BindingKind::Variable, is_mut: false, is_shared: false, declared_at: Span::default(), used: false, mutated: false },
    );
    let mut arena = NodeArena::new();
    let x = arena.push(ExprKind::Ident("x".to_string()), Span::default());
    let lit = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());

    let t = check_infix(&mut ctx, &arena, BinOp::Add, x, lit, Span::default());
    assert_eq!(t.base(), ctx.table.builtins.i64);
}

#[test]
fn unparenthesized_mixed_logical_operators_warn_on_ambiguous_precedence() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    let mut arena = NodeArena::new();
    let a = arena.push(ExprKind::BoolLiteral(true), Span::default());
    let b = arena.push(ExprKind::BoolLiteral(false), Span::default());
    let and_expr = arena.push(ExprKind::InfixExpr { op: BinOp::LogAnd, left: a, right: b }, Span::default());
    let c = arena.push(ExprKind::BoolLiteral(true), Span::default());

    check_infix(&mut ctx, &arena, BinOp::LogOr, and_expr, c, Span::default());
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::AMBIGUOUS_BOOLEAN_PRECEDENCE));
}

#[test]
fn shifting_a_string_reports_shift_requires_integral() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    let mut arena = NodeArena::new();
    let a = arena.push(ExprKind::StringLiteral("s".to_string()), Span::default());
    let b = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());

    check_infix(&mut ctx, &arena, BinOp::Shl, a, b, Span::default());
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::SHIFT_REQUIRES_INTEGRAL));
}

#[test]
fn left_shifting_a_signed_operand_warns() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    ctx.scopes.declare(
        "x".to_string(),
        crate::scope::Binding { typ: ctx.table.builtins.i32, kind: crate::scope::BindingKind::Variable, is_mut: false, is_shared: false, declared_at: Span::default(), used: false, mutated: false },
    );
    let mut arena = NodeArena::new();
    let x = arena.push(ExprKind::Ident("x".to_string()), Span::default());
    let count = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());

    check_infix(&mut ctx, &arena, BinOp::Shl, x, count, Span::default());
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::LEFT_SHIFT_OF_SIGNED));
}

#[test]
fn shift_count_at_or_past_bit_width_overflows() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    ctx.scopes.declare(
        "x".to_string(),
        crate::scope::Binding { typ: ctx.table.builtins.u8, kind: crate::scope::BindingKind::Variable, is_mut: false, is_shared: false, declared_at: Span::default(), used: false, mutated: false },
    );
    let mut arena = NodeArena::new();
    let x = arena.push(ExprKind::Ident("x".to_string()), Span::default());
    let count = arena.push(ExprKind::IntegerLiteral("8".to_string()), Span::default());

    check_infix(&mut ctx, &arena, BinOp::Shl, x, count, Span::default());
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::SHIFT_COUNT_OVERFLOW));
}

#[test]
fn pointer_arithmetic_outside_unsafe_is_rejected() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    ctx.scopes.declare(
        "p".to_string(),
        crate::scope::Binding {
            typ: ctx.table.builtins.i32.make_ref(),
            kind: crate::scope::BindingKind::Variable,
            is_mut: false,
            is_shared: false,
            declared_at: Span::default(),
            used: false,
            mutated: false,
        },
    );
    let mut arena = NodeArena::new();
    let p = arena.push(ExprKind::Ident("p".to_string()), Span::default());
    let one = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());

    check_infix(&mut ctx, &arena, BinOp::Add, p, one, Span::default());
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::POINTER_ARITHMETIC_REQUIRES_UNSAFE));
}

#[test]
fn pointer_arithmetic_inside_unsafe_is_allowed() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    ctx.in_unsafe = 1;
    ctx.scopes.declare(
        "p".to_string(),
        crate::scope::Binding {
            typ: ctx.table.builtins.i32.make_ref(),
            kind: crate::scope::BindingKind::Variable,
            is_mut: false,
            is_shared: false,
            declared_at: Span::default(),
            used: false,
            mutated: false,
        },
    );
    let mut arena = NodeArena::new();
    let p = arena.push(ExprKind::Ident("p".to_string()), Span::default());
    let one = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());

    check_infix(&mut ctx, &arena, BinOp::Add, p, one, Span::default());
    assert!(!ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::POINTER_ARITHMETIC_REQUIRES_UNSAFE));
}

#[test]
fn same_width_signed_and_unsigned_addition_is_rejected() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    ctx.scopes.declare(
        "a".to_string(),
        crate::scope::Binding { typ: ctx.table.builtins.i32, kind: crate::scope::BindingKind::Variable, is_mut: false, is_shared: false, declared_at: Span::default(), used: false, mutated: false },
    );
    ctx.scopes.declare(
        "b".to_string(),
        crate::scope::Binding { typ: ctx.table.builtins.u32, kind: crate::scope::BindingKind::Variable, is_mut: false, is_shared: false, declared_at: Span::default(), used: false, mutated: false },
    );
    let mut arena = NodeArena::new();
    let a = arena.push(ExprKind::Ident("a".to_string()), Span::default());
    let b = arena.push(ExprKind::Ident("b".to_string()), Span::default());

    check_infix(&mut ctx, &arena, BinOp::Add, a, b, Span::default());
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::SIGNED_UNSIGNED_MISMATCH));
}

#[test]
fn appending_a_mismatched_element_type_reports_argument_type_mismatch() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    let mut arena = NodeArena::new();
    let elem = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());
    let base = arena.push(ExprKind::ArrayInit { elems: smallvec::smallvec![elem], elem_type_hint: None }, Span::default());
    let value = arena.push(ExprKind::StringLiteral("s".to_string()), Span::default());

    check_infix(&mut ctx, &arena, BinOp::Append, base, value, Span::default());
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::ARGUMENT_TYPE_MISMATCH));
}
