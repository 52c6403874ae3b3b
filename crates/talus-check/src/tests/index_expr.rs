use super::*;
use talus_common::CheckerOptions;
use talus_types::TypeTable;

fn new_ctx(table: &mut TypeTable) -> CheckerContext<'_> {
    let mut ctx = CheckerContext::new(table, CheckerOptions::default());
    ctx.enter_file("main.tl", "");
    ctx
}

#[test]
fn indexing_an_array_with_an_integer_is_allowed() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    let mut arena = NodeArena::new();
    let elem = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());
    let base = arena.push(ExprKind::ArrayInit { elems: smallvec::smallvec![elem], elem_type_hint: None }, Span::default());
    let index = arena.push(ExprKind::IntegerLiteral("0".to_string()), Span::default());

    check_index(&mut ctx, &arena, base, index, Span::default());
    assert!(ctx.diagnostics.items().is_empty());
}

#[test]
fn indexing_an_array_with_a_string_reports_index_type_mismatch() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    let mut arena = NodeArena::new();
    let elem = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());
    let base = arena.push(ExprKind::ArrayInit { elems: smallvec::smallvec![elem], elem_type_hint: None }, Span::default());
    let index = arena.push(ExprKind::StringLiteral("k".to_string()), Span::default());

    check_index(&mut ctx, &arena, base, index, Span::default());
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::INDEX_TYPE_MISMATCH));
}

#[test]
fn indexing_a_map_yields_its_value_type() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    let mut arena = NodeArena::new();
    let key = arena.push(ExprKind::StringLiteral("k".to_string()), Span::default());
    let value = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());
    let base = arena.push(ExprKind::MapInit { pairs: vec![(key, value)] }, Span::default());
    let index = arena.push(ExprKind::StringLiteral("k".to_string()), Span::default());

    let t = check_index(&mut ctx, &arena, base, index, Span::default());
    assert_eq!(t.base(), ctx.table.builtins.int_literal);
}

#[test]
fn indexing_a_pointer_outside_unsafe_warns() {
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
    let base = arena.push(ExprKind::Ident("p".to_string()), Span::default());
    let index = arena.push(ExprKind::IntegerLiteral("0".to_string()), Span::default());

    check_index(&mut ctx, &arena, base, index, Span::default());
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::POINTER_INDEX_OUTSIDE_UNSAFE));
}

#[test]
fn indexing_a_pointer_inside_unsafe_does_not_warn() {
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
    let base = arena.push(ExprKind::Ident("p".to_string()), Span::default());
    let index = arena.push(ExprKind::IntegerLiteral("0".to_string()), Span::default());

    check_index(&mut ctx, &arena, base, index, Span::default());
    assert!(!ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::POINTER_INDEX_OUTSIDE_UNSAFE));
}

#[test]
fn range_index_returns_the_base_type_unchanged() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    let mut arena = NodeArena::new();
    let elem = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());
    let base = arena.push(ExprKind::ArrayInit { elems: smallvec::smallvec![elem], elem_type_hint: None }, Span::default());
    let lo = arena.push(ExprKind::IntegerLiteral("0".to_string()), Span::default());
    let hi = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());
    let range = arena.push(ExprKind::RangeExpr { lo, hi }, Span::default());

    let base_type = check_expr(&mut ctx, &arena, base);
    let t = check_index(&mut ctx, &arena, base, range, Span::default());
    assert_eq!(t.base(), base_type.base());
}
