use super::*;
use talus_ast::{AttributeSet, ConstDecl, ExprKind, Field, FnDecl, GlobalDecl, NodeArena, StructDecl};
use talus_common::Span;

fn empty_file(path: &str, module: &str) -> File {
    File {
        path: path.to_string(),
        module: module.to_string(),
        source: String::new(),
        arena: NodeArena::new(),
        imports: Vec::new(),
        consts: Vec::new(),
        globals: Vec::new(),
        structs: Vec::new(),
        interfaces: Vec::new(),
        enums: Vec::new(),
        type_decls: Vec::new(),
        fns: Vec::new(),
        stmts: Vec::new(),
        is_generated: false,
        is_translated: false,
    }
}

fn main_fn(body: Option<talus_ast::NodeIndex>) -> FnDecl {
    FnDecl {
        name: "main".to_string(),
        module: MAIN_MODULE.to_string(),
        receiver: None,
        params: Vec::new(),
        return_type: "void".to_string(),
        body,
        attrs: talus_ast::AttributeSet::default(),
        generic_names: Vec::new(),
        is_method: false,
        span: Span::default(),
    }
}

#[test]
fn check_all_reports_missing_main_in_the_main_module() {
    let mut table = TypeTable::default();
    let file = empty_file("main.tl", MAIN_MODULE);
    let diags = check_all(&[file], &mut table, CheckerOptions::default());
    assert!(diags.items().iter().any(|d| d.code == diagnostic_codes::MAIN_FUNCTION_MISSING));
}

#[test]
fn check_all_does_not_require_main_for_a_library_module() {
    let mut table = TypeTable::default();
    let file = empty_file("lib.tl", "mylib");
    let diags = check_all(&[file], &mut table, CheckerOptions::default());
    assert!(!diags.items().iter().any(|d| d.code == diagnostic_codes::MAIN_FUNCTION_MISSING));
}

#[test]
fn check_all_is_satisfied_by_a_bare_main_function() {
    let mut table = TypeTable::default();
    let mut file = empty_file("main.tl", MAIN_MODULE);
    let mut arena = NodeArena::new();
    let body = arena.push(ExprKind::Block { stmts: Default::default() }, Span::default());
    file.arena = arena;
    file.fns.push(main_fn(Some(body)));

    let diags = check_all(&[file], &mut table, CheckerOptions::default());
    assert!(!diags.items().iter().any(|d| d.code == diagnostic_codes::MAIN_FUNCTION_MISSING));
}

#[test]
fn check_all_walks_a_trivial_function_body_without_panicking() {
    let mut table = TypeTable::default();
    let mut file = empty_file("main.tl", MAIN_MODULE);
    let mut arena = NodeArena::new();
    let lit = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());
    let ret = arena.push(ExprKind::Return { values: smallvec::smallvec![lit] }, Span::default());
    let body = arena.push(ExprKind::Block { stmts: smallvec::smallvec![ret] }, Span::default());
    file.arena = arena;
    file.fns.push(main_fn(Some(body)));

    let diags = check_all(&[file], &mut table, CheckerOptions::default());
    assert!(!diags.has_errors());
}

/// §8 scenario 1: `const a = 1\nconst a = 2` → one `duplicate const "a"`.
#[test]
fn scenario_duplicate_top_level_const_is_reported_once() {
    let mut table = TypeTable::default();
    let mut file = empty_file("main.tl", MAIN_MODULE);
    let mut arena = NodeArena::new();
    let one = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());
    let two = arena.push(ExprKind::IntegerLiteral("2".to_string()), Span::default());
    file.arena = arena;
    file.consts.push(ConstDecl {
        name: "a".to_string(),
        module: MAIN_MODULE.to_string(),
        value: one,
        type_hint: None,
        attrs: AttributeSet::default(),
        span: Span::default(),
    });
    file.consts.push(ConstDecl {
        name: "a".to_string(),
        module: MAIN_MODULE.to_string(),
        value: two,
        type_hint: None,
        attrs: AttributeSet::default(),
        span: Span::default(),
    });
    let body = Some(body_arena_block(&mut file));
    file.fns.push(main_fn(body));

    let diags = check_all(&[file], &mut table, CheckerOptions::default());
    assert_eq!(diags.items().iter().filter(|d| d.code == diagnostic_codes::DUPLICATE_CONST).count(), 1);
}

/// §8 scenario 2: `fn main() { mut x := 1\n _ := x }` → `x is declared as
/// mutable but never changed`.
#[test]
fn scenario_mutable_variable_never_mutated_is_reported() {
    let mut table = TypeTable::default();
    let mut file = empty_file("main.tl", MAIN_MODULE);
    let mut arena = NodeArena::new();
    let one = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());
    let x_lhs = arena.push(ExprKind::Ident("x".to_string()), Span::default());
    let decl_x = arena.push(
        ExprKind::AssignStmt {
            lhs: smallvec::smallvec![x_lhs],
            rhs: smallvec::smallvec![one],
            op: talus_ast::BinOp::Assign,
            is_decl: true,
            is_mut: vec![true],
        },
        Span::default(),
    );
    let x_read = arena.push(ExprKind::Ident("x".to_string()), Span::default());
    let underscore = arena.push(ExprKind::Ident("_".to_string()), Span::default());
    let read_x = arena.push(
        ExprKind::AssignStmt {
            lhs: smallvec::smallvec![underscore],
            rhs: smallvec::smallvec![x_read],
            op: talus_ast::BinOp::Assign,
            is_decl: true,
            is_mut: vec![false],
        },
        Span::default(),
    );
    let body = arena.push(ExprKind::Block { stmts: smallvec::smallvec![decl_x, read_x] }, Span::default());
    file.arena = arena;
    file.fns.push(main_fn(Some(body)));

    let diags = check_all(&[file], &mut table, CheckerOptions::default());
    assert!(diags.items().iter().any(|d| d.code == diagnostic_codes::UNUSED_MUTABLE_VARIABLE));
}

/// §8 scenario 6: `shared s := Foo{}\nfn main() { s.field = 1 }` → `s is
/// shared and must be lock-ed to be mutated`.
#[test]
fn scenario_mutating_a_shared_global_without_a_lock_is_reported() {
    let mut table = TypeTable::default();
    let mut file = empty_file("main.tl", MAIN_MODULE);
    file.structs.push(StructDecl {
        name: "Foo".to_string(),
        module: MAIN_MODULE.to_string(),
        fields: vec![Field {
            name: "field".to_string(),
            type_name: "i32".to_string(),
            is_mut: true,
            is_pub: true,
            is_global: false,
            attrs: AttributeSet::default(),
            default: None,
            span: Span::default(),
        }],
        embeds: Vec::new(),
        generic_names: Vec::new(),
        is_union: false,
        attrs: AttributeSet::default(),
        span: Span::default(),
    });
    file.globals.push(GlobalDecl {
        name: "s".to_string(),
        module: MAIN_MODULE.to_string(),
        type_name: "Foo".to_string(),
        initializer: None,
        is_shared: true,
        attrs: AttributeSet::default(),
        span: Span::default(),
    });

    let mut arena = NodeArena::new();
    let base = arena.push(ExprKind::Ident("s".to_string()), Span::default());
    let lhs = arena.push(ExprKind::SelectorExpr { base, field: "field".to_string() }, Span::default());
    let one = arena.push(ExprKind::IntegerLiteral("1".to_string()), Span::default());
    let assign = arena.push(
        ExprKind::AssignStmt {
            lhs: smallvec::smallvec![lhs],
            rhs: smallvec::smallvec![one],
            op: talus_ast::BinOp::Assign,
            is_decl: false,
            is_mut: vec![false],
        },
        Span::default(),
    );
    let body = arena.push(ExprKind::Block { stmts: smallvec::smallvec![assign] }, Span::default());
    file.arena = arena;
    file.fns.push(main_fn(Some(body)));

    let diags = check_all(&[file], &mut table, CheckerOptions::default());
    assert!(diags.items().iter().any(|d| d.code == diagnostic_codes::SHARED_REQUIRES_LOCK));
}

fn body_arena_block(file: &mut File) -> talus_ast::NodeIndex {
    file.arena.push(ExprKind::Block { stmts: Default::default() }, Span::default())
}
