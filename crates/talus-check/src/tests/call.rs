use super::*;
use talus_ast::ExprKind;
use talus_common::CheckerOptions;
use talus_types::{FunctionDescriptor, SourceLang, TypeId};
use std::cell::RefCell;
use std::collections::HashSet;

fn new_ctx(table: &mut TypeTable) -> CheckerContext<'_> {
    let mut ctx = CheckerContext::new(table, CheckerOptions::default());
    ctx.enter_file("main.tl", "");
    ctx
}

fn register_free_fn(table: &mut TypeTable, name: &str, params: Vec<ParamDescriptor>, return_type: TypeId) {
    table.register_fn(FunctionDescriptor {
        name: name.to_string(),
        module: talus_types::MAIN_MODULE.to_string(),
        receiver: TypeId::NONE,
        params,
        return_type,
        attrs: FnAttrs::empty(),
        source_lang: SourceLang::Native,
        generic_names: Vec::new(),
        concrete_instantiations: RefCell::new(HashSet::new()),
        pos: 0,
        if_tag: None,
    });
}

#[test]
fn calling_an_unknown_free_function_reports_unknown_identifier() {
    let mut table = TypeTable::default();
    let mut ctx = new_ctx(&mut table);
    let mut arena = NodeArena::new();
    let callee = arena.push(ExprKind::Ident("missing".to_string()), Span::default());

    let t = check_call(&mut ctx, &arena, NodeIndex::NONE, callee, &Default::default(), &[], None, Span::default());
    assert!(t.is_none());
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::UNKNOWN_IDENTIFIER));
}

#[test]
fn wrong_argument_count_reports_argument_count_mismatch() {
    let mut table = TypeTable::default();
    let i32_ = table.builtins.i32;
    register_free_fn(&mut table, "takes_one", vec![ParamDescriptor { name: "a".to_string(), typ: i32_, is_mut: false, is_hidden: false }], table.builtins.void);
    let mut ctx = new_ctx(&mut table);

    let mut arena = NodeArena::new();
    let callee = arena.push(ExprKind::Ident("takes_one".to_string()), Span::default());

    check_call(&mut ctx, &arena, NodeIndex::NONE, callee, &Default::default(), &[], None, Span::default());
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::ARGUMENT_COUNT_MISMATCH));
}

#[test]
fn mismatched_argument_type_reports_argument_type_mismatch() {
    let mut table = TypeTable::default();
    let string_ = table.builtins.string;
    register_free_fn(&mut table, "wants_string", vec![ParamDescriptor { name: "a".to_string(), typ: string_, is_mut: false, is_hidden: false }], table.builtins.void);
    let mut ctx = new_ctx(&mut table);

    let mut arena = NodeArena::new();
    let callee = arena.push(ExprKind::Ident("wants_string".to_string()), Span::default());
    let struct_init = arena.push(ExprKind::StructInit { type_name: "NotAString".to_string(), fields: Vec::new() }, Span::default());

    check_call(&mut ctx, &arena, NodeIndex::NONE, callee, &smallvec::smallvec![struct_init], &[], None, Span::default());
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::ARGUMENT_TYPE_MISMATCH));
}

#[test]
fn deprecated_function_call_reports_deprecated_use() {
    let mut table = TypeTable::default();
    let void = table.builtins.void;
    table.register_fn(FunctionDescriptor {
        name: "old".to_string(),
        module: talus_types::MAIN_MODULE.to_string(),
        receiver: TypeId::NONE,
        params: Vec::new(),
        return_type: void,
        attrs: FnAttrs::DEPRECATED,
        source_lang: SourceLang::Native,
        generic_names: Vec::new(),
        concrete_instantiations: RefCell::new(HashSet::new()),
        pos: 0,
        if_tag: None,
    });
    let mut ctx = new_ctx(&mut table);

    let mut arena = NodeArena::new();
    let callee = arena.push(ExprKind::Ident("old".to_string()), Span::default());
    check_call(&mut ctx, &arena, NodeIndex::NONE, callee, &Default::default(), &[], None, Span::default());
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::DEPRECATED_USE));
}

#[test]
fn or_block_on_a_non_optional_return_reports_type_mismatch() {
    let mut table = TypeTable::default();
    register_free_fn(&mut table, "plain", Vec::new(), table.builtins.void);
    let mut ctx = new_ctx(&mut table);

    let mut arena = NodeArena::new();
    let callee = arena.push(ExprKind::Ident("plain".to_string()), Span::default());
    let or_block = arena.push(ExprKind::Block { stmts: Default::default() }, Span::default());
    check_call(&mut ctx, &arena, NodeIndex::NONE, callee, &Default::default(), &[], Some(or_block), Span::default());
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::OR_BLOCK_TYPE_MISMATCH));
}

#[test]
fn or_block_with_a_mismatched_trailing_value_reports_type_mismatch() {
    let mut table = TypeTable::default();
    let i32_ = table.builtins.i32;
    register_free_fn(&mut table, "maybe", Vec::new(), i32_.with_flag(talus_types::TypeFlags::OPTIONAL));
    let mut ctx = new_ctx(&mut table);

    let mut arena = NodeArena::new();
    let callee = arena.push(ExprKind::Ident("maybe".to_string()), Span::default());
    let tail_value = arena.push(ExprKind::StringLiteral("fallback".to_string()), Span::default());
    let tail = arena.push(ExprKind::ExprStmt { expr: tail_value }, Span::default());
    let or_block = arena.push(ExprKind::Block { stmts: smallvec::smallvec![tail] }, Span::default());
    check_call(&mut ctx, &arena, NodeIndex::NONE, callee, &Default::default(), &[], Some(or_block), Span::default());
    assert!(ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::OR_BLOCK_TYPE_MISMATCH));
}

#[test]
fn or_block_ending_in_return_is_not_type_checked_against_the_unwrapped_type() {
    let mut table = TypeTable::default();
    let i32_ = table.builtins.i32;
    register_free_fn(&mut table, "maybe", Vec::new(), i32_.with_flag(talus_types::TypeFlags::OPTIONAL));
    let mut ctx = new_ctx(&mut table);

    let mut arena = NodeArena::new();
    let callee = arena.push(ExprKind::Ident("maybe".to_string()), Span::default());
    let ret = arena.push(ExprKind::Return { values: Default::default() }, Span::default());
    let or_block = arena.push(ExprKind::Block { stmts: smallvec::smallvec![ret] }, Span::default());
    check_call(&mut ctx, &arena, NodeIndex::NONE, callee, &Default::default(), &[], Some(or_block), Span::default());
    assert!(!ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::OR_BLOCK_TYPE_MISMATCH));
}

#[test]
fn or_block_ending_in_a_noreturn_call_is_not_type_checked_against_the_unwrapped_type() {
    let mut table = TypeTable::default();
    let i32_ = table.builtins.i32;
    register_free_fn(&mut table, "maybe", Vec::new(), i32_.with_flag(talus_types::TypeFlags::OPTIONAL));
    table.register_fn(FunctionDescriptor {
        name: "abort_now".to_string(),
        module: talus_types::MAIN_MODULE.to_string(),
        receiver: TypeId::NONE,
        params: Vec::new(),
        return_type: table.builtins.void,
        attrs: FnAttrs::NORETURN,
        source_lang: SourceLang::Native,
        generic_names: Vec::new(),
        concrete_instantiations: RefCell::new(HashSet::new()),
        pos: 0,
        if_tag: None,
    });
    let mut ctx = new_ctx(&mut table);

    let mut arena = NodeArena::new();
    let callee = arena.push(ExprKind::Ident("maybe".to_string()), Span::default());
    let abort_callee = arena.push(ExprKind::Ident("abort_now".to_string()), Span::default());
    let abort_call = arena.push(
        ExprKind::CallExpr { callee: abort_callee, args: Default::default(), generic_args: Vec::new(), or_block: None },
        Span::default(),
    );
    let abort_stmt = arena.push(ExprKind::ExprStmt { expr: abort_call }, Span::default());
    let or_block = arena.push(ExprKind::Block { stmts: smallvec::smallvec![abort_stmt] }, Span::default());
    check_call(&mut ctx, &arena, NodeIndex::NONE, callee, &Default::default(), &[], Some(or_block), Span::default());
    assert!(!ctx.diagnostics.items().iter().any(|d| d.code == diagnostic_codes::OR_BLOCK_TYPE_MISMATCH));
}

#[test]
fn call_to_a_function_with_a_disabled_if_tag_is_elided() {
    let mut table = TypeTable::default();
    let i32_ = table.builtins.i32;
    table.register_fn(FunctionDescriptor {
        name: "posix_only".to_string(),
        module: talus_types::MAIN_MODULE.to_string(),
        receiver: TypeId::NONE,
        params: Vec::new(),
        return_type: i32_,
        attrs: FnAttrs::empty(),
        source_lang: SourceLang::Native,
        generic_names: Vec::new(),
        concrete_instantiations: RefCell::new(HashSet::new()),
        pos: 0,
        if_tag: Some("posix".to_string()),
    });
    let mut ctx = new_ctx(&mut table);

    let mut arena = NodeArena::new();
    let callee = arena.push(ExprKind::Ident("posix_only".to_string()), Span::default());
    let t = check_call(&mut ctx, &arena, NodeIndex::NONE, callee, &Default::default(), &[], None, Span::default());
    assert!(t.is_none());
    assert!(ctx.diagnostics.items().is_empty());
}

#[test]
fn call_to_a_function_with_an_enabled_if_tag_is_checked_normally() {
    let mut table = TypeTable::default();
    let i32_ = table.builtins.i32;
    table.register_fn(FunctionDescriptor {
        name: "posix_only".to_string(),
        module: talus_types::MAIN_MODULE.to_string(),
        receiver: TypeId::NONE,
        params: Vec::new(),
        return_type: i32_,
        attrs: FnAttrs::empty(),
        source_lang: SourceLang::Native,
        generic_names: Vec::new(),
        concrete_instantiations: RefCell::new(HashSet::new()),
        pos: 0,
        if_tag: Some("posix".to_string()),
    });
    let mut ctx = new_ctx(&mut table);
    ctx.options.enabled_tags.insert("posix".to_string());

    let mut arena = NodeArena::new();
    let callee = arena.push(ExprKind::Ident("posix_only".to_string()), Span::default());
    let t = check_call(&mut ctx, &arena, NodeIndex::NONE, callee, &Default::default(), &[], None, Span::default());
    assert_eq!(t.base(), i32_);
}
