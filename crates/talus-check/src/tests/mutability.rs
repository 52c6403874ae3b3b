use super::*;
use talus_common::CheckerOptions;
use talus_types::TypeTable;

fn new_ctx(table: &mut TypeTable) -> CheckerContext<'_> {
    let mut ctx = CheckerContext::new(table, CheckerOptions::default());
    ctx.enter_file("main.tl", "");
    ctx
}

#[test]
fn nested_lock_blocks_report_nested_lock() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    ctx.locks.push(LockFrame { names: ["a".to_string()].into_iter().collect(), is_read: false });
    let mut arena = NodeArena::new();
    let block = arena.push(talus_ast::ExprKind::Block { stmts: Default::default() }, Span::default());

    check_lock_expr(&mut ctx, &arena, &["b".to_string()], false, block, Span::default());
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::NESTED_LOCK));
}

#[test]
fn duplicate_names_in_one_lock_block_report_duplicate_lock() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    let mut arena = NodeArena::new();
    let block = arena.push(talus_ast::ExprKind::Block { stmts: Default::default() }, Span::default());

    check_lock_expr(&mut ctx, &arena, &["a".to_string(), "a".to_string()], false, block, Span::default());
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::DUPLICATE_LOCK));
}

#[test]
fn lock_stack_pops_its_frame_after_the_block_is_checked() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    let mut arena = NodeArena::new();
    let block = arena.push(talus_ast::ExprKind::Block { stmts: Default::default() }, Span::default());

    check_lock_expr(&mut ctx, &arena, &["a".to_string()], false, block, Span::default());
    assert_eq!(ctx.locks.depth(), 0);
}

#[test]
fn mutating_an_immutable_binding_reports_const_mutation() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    ctx.scopes.declare(
        "x".to_string(),
        crate::scope::Binding { typ: ctx.table.builtins.i32, kind: BindingKind::Const, is_mut: false, is_shared: false, declared_at: Span::default(), used: false, mutated: false },
    );
    let mut arena = NodeArena::new();
    let ident = arena.push(talus_ast::ExprKind::Ident("x".to_string()), Span::default());

    fail_if_immutable(&mut ctx, &arena, ident, Span::default());
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::CONST_MUTATION));
}

#[test]
fn mutating_through_a_pointer_deref_does_not_require_the_pointer_itself_mutable() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    ctx.scopes.declare(
        "p".to_string(),
        crate::scope::Binding { typ: ctx.table.builtins.i32.make_ref(), kind: BindingKind::Variable, is_mut: false, is_shared: false, declared_at: Span::default(), used: false, mutated: false },
    );
    let mut arena = NodeArena::new();
    let p = arena.push(talus_ast::ExprKind::Ident("p".to_string()), Span::default());
    let deref = arena.push(talus_ast::ExprKind::PrefixExpr { op: talus_ast::UnOp::Deref, expr: p }, Span::default());

    let result = fail_if_immutable(&mut ctx, &arena, deref, Span::default());
    assert!(result.is_none());
    assert!(ctx.diagnostics.items().is_empty());
}
