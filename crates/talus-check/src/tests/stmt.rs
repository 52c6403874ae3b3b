use super::*;
use talus_common::CheckerOptions;
use talus_types::TypeTable;

fn new_ctx(table: &mut TypeTable) -> CheckerContext<'_> {
    let mut ctx = CheckerContext::new(table, CheckerOptions::default());
    ctx.enter_file("main.tl", "");
    ctx
}

#[test]
fn a_block_statement_pops_its_own_scope_leaving_the_outer_binding_untouched() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    ctx.scopes.declare(
        "x".to_string(),
        crate::scope::Binding { typ: ctx.table.builtins.i32, kind: crate::scope::BindingKind::Variable, is_mut: false, is_shared: false, declared_at: Span::default(), used: true, mutated: false },
    );
    let mut arena = NodeArena::new();
    let block = arena.push(ExprKind::Block { stmts: Default::default() }, Span::default());

    check_stmt(&mut ctx, &arena, block);
    assert!(ctx.scopes.lookup("x").is_some());
}

#[test]
fn an_unused_variable_declared_in_a_block_is_reported_on_scope_pop() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    let mut arena = NodeArena::new();
    let lit = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());
    let lhs = arena_ident(&mut arena, "x");
    let decl = arena.push(
        ExprKind::AssignStmt { lhs: smallvec::smallvec![lhs], rhs: smallvec::smallvec![lit], op: BinOp::Assign, is_decl: true, is_mut: vec![false] },
        Span::default(),
    );
    let block = arena.push(ExprKind::Block { stmts: smallvec::smallvec![decl] }, Span::default());

    check_stmt(&mut ctx, &arena, block);
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::UNUSED_VARIABLE));
}

fn arena_ident(arena: &mut NodeArena, name: &str) -> NodeIndex {
    arena.push(ExprKind::Ident(name.to_string()), Span::default())
}

#[test]
fn statement_depth_beyond_the_configured_cutoff_is_reported_and_does_not_descend() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    ctx.options.max_stmt_depth = 1;
    let mut arena = NodeArena::new();
    let inner = arena.push(ExprKind::Block { stmts: Default::default() }, Span::default());
    let outer = arena.push(ExprKind::Block { stmts: smallvec::smallvec![inner] }, Span::default());

    check_stmt(&mut ctx, &arena, outer);
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::TOO_DEEPLY_NESTED_STATEMENT));
}

#[test]
fn for_in_declares_key_and_value_bindings_scoped_to_the_loop_body() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    let mut arena = NodeArena::new();
    let elem = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());
    let iterable = arena.push(ExprKind::ArrayInit { elems: smallvec::smallvec![elem], elem_type_hint: None }, Span::default());
    let body = arena.push(ExprKind::Block { stmts: Default::default() }, Span::default());
    let for_in = arena.push(
        ExprKind::ForInStmt { key: Some("i".to_string()), value: "v".to_string(), iterable, body },
        Span::default(),
    );

    check_stmt(&mut ctx, &arena, for_in);
    assert!(ctx.scopes.lookup("i").is_none());
    assert!(ctx.scopes.lookup("v").is_none());
}

#[test]
fn for_in_with_an_underscore_value_does_not_declare_a_binding() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    let mut arena = NodeArena::new();
    let elem = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());
    let iterable = arena.push(ExprKind::ArrayInit { elems: smallvec::smallvec![elem], elem_type_hint: None }, Span::default());
    let lookup_check = arena.push(ExprKind::Ident("_".to_string()), Span::default());
    let lookup_stmt = arena.push(ExprKind::ExprStmt { expr: lookup_check }, Span::default());
    let body = arena.push(ExprKind::Block { stmts: smallvec::smallvec![lookup_stmt] }, Span::default());
    let for_in = arena.push(
        ExprKind::ForInStmt { key: None, value: "_".to_string(), iterable, body },
        Span::default(),
    );

    check_stmt(&mut ctx, &arena, for_in);
    assert!(!ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::UNUSED_VARIABLE));
}
