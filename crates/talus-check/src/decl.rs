//! Top-level declaration registration (§4.2.1 passes 1-2): turns a `File`'s
//! typed declaration records into `TypeTable` symbols/functions and,
//! per-file, into module-scope bindings for consts and globals.
//!
//! Runs in two phases across the whole program before any function body is
//! checked: `register_placeholders` seeds every named type so forward
//! references (a struct field naming a type declared later in the same
//! file, or in another file of the same module) resolve to a stable
//! `TypeId`, then `register_bodies` fills in the real shape. Free functions
//! and methods are registered in a third pass once every type exists, since
//! a method's receiver and a function's parameter/return types must already
//! resolve to non-placeholder symbols for attribute/signature diagnostics to
//! be meaningful.

use std::cell::RefCell;
use std::collections::HashSet;

use talus_ast::{Attribute, EnumDecl, EnumVariant, ExprKind, Field, FnDecl, GlobalDecl, InterfaceDecl, NodeArena, NodeIndex, StructDecl, TypeDecl, TypeDeclBody, UnOp};
use talus_common::diagnostics::diagnostic_codes;
use talus_types::{
    EnumInfo, FieldDescriptor, FnAttrs, FunctionDescriptor, InterfaceInfo, ParamDescriptor, StructInfo, SumTypeInfo,
    SourceLang, TypeId, TypeInfo, TypeSymbol,
};

use crate::context::CheckerContext;
use crate::expr::check_expr;
use crate::scope::{Binding, BindingKind};

fn qualify(module: &str, name: &str) -> String {
    if module == talus_types::MAIN_MODULE {
        name.to_string()
    } else {
        format!("{module}.{name}")
    }
}

/// Phase 1: seed a `Placeholder` `TypeSymbol` for every named type this file
/// declares, so sibling declarations that reference it before it's fully
/// registered still get a stable `TypeId`.
pub fn register_placeholders(ctx: &mut CheckerContext<'_>, module: &str, file: &talus_ast::File) {
    for s in &file.structs {
        ctx.table.add_placeholder_type(&qualify(module, &s.name), SourceLang::Native);
    }
    for i in &file.interfaces {
        ctx.table.add_placeholder_type(&qualify(module, &i.name), SourceLang::Native);
    }
    for e in &file.enums {
        ctx.table.add_placeholder_type(&qualify(module, &e.name), SourceLang::Native);
    }
    for t in &file.type_decls {
        ctx.table.add_placeholder_type(&qualify(module, &t.name), SourceLang::Native);
    }
}

/// Phase 2: fill in struct/interface/enum/type-alias bodies, now that every
/// named type in the program has at least a placeholder `TypeId`.
pub fn register_bodies(ctx: &mut CheckerContext<'_>, module: &str, file: &talus_ast::File) {
    for s in &file.structs {
        register_struct(ctx, module, s);
    }
    for i in &file.interfaces {
        register_interface(ctx, module, i);
    }
    for e in &file.enums {
        register_enum(ctx, module, &file.arena, e);
    }
    for t in &file.type_decls {
        register_type_decl(ctx, module, t);
    }
}

/// Phase 3: register free functions and attach methods to their receivers.
/// Interface methods are *not* handled here — `InterfaceDecl` carries its
/// method signatures inline, so `register_interface` (phase 2) attaches them
/// directly instead of waiting for a separate receiver-resolution pass.
pub fn register_functions(ctx: &mut CheckerContext<'_>, module: &str, file: &talus_ast::File) {
    let is_test_file = file.is_test_file();
    for f in &file.fns {
        if let Some(receiver_param) = &f.receiver {
            let receiver = ctx.resolve_type_name(&receiver_param.type_name);
            let descriptor = build_fn_descriptor(ctx, module, receiver, f, is_test_file);
            ctx.table.add_method(receiver.base(), descriptor);
        } else {
            let descriptor = build_fn_descriptor(ctx, module, TypeId::NONE, f, is_test_file);
            if !ctx.table.register_fn(descriptor) {
                ctx.report(f.span.start, f.span.len(), diagnostic_codes::DUPLICATE_FN, &[&f.name]);
            }
        }
    }
}

/// Declares every const/global this file defines into the current (file)
/// scope, so `check_ident`/`fail_if_immutable` resolve them like any other
/// binding. Run once per file, right after `CheckerContext::enter_file`
/// resets the scope stack for it.
pub fn declare_module_scope(ctx: &mut CheckerContext<'_>, file: &talus_ast::File) {
    let arena = &file.arena;
    let mut seen = HashSet::new();
    for c in &file.consts {
        if !seen.insert(c.name.clone()) {
            ctx.report(c.span.start, c.span.len(), diagnostic_codes::DUPLICATE_CONST, &[&c.name]);
            continue;
        }
        let value_type = check_expr(ctx, arena, c.value);
        let typ = match &c.type_hint {
            Some(hint) => ctx.resolve_type_name(hint),
            None => value_type,
        };
        ctx.scopes.declare(
            c.name.clone(),
            Binding {
                typ,
                kind: BindingKind::Const,
                is_mut: false,
                is_shared: false,
                declared_at: c.span,
                used: false,
                mutated: false,
            },
        );
    }
    for g in &file.globals {
        if !seen.insert(g.name.clone()) {
            ctx.report(g.span.start, g.span.len(), diagnostic_codes::DUPLICATE_CONST, &[&g.name]);
            continue;
        }
        declare_global(ctx, arena, g);
    }
}

fn declare_global(ctx: &mut CheckerContext<'_>, arena: &NodeArena, g: &GlobalDecl) {
    let typ = ctx.resolve_type_name(&g.type_name);
    if let Some(init) = g.initializer {
        check_expr(ctx, arena, init);
    }
    ctx.scopes.declare(
        g.name.clone(),
        Binding {
            typ,
            kind: BindingKind::Global,
            is_mut: true,
            is_shared: g.is_shared,
            declared_at: g.span,
            used: false,
            mutated: false,
        },
    );
}

fn register_struct(ctx: &mut CheckerContext<'_>, module: &str, s: &StructDecl) {
    let fields: Vec<FieldDescriptor> = s.fields.iter().map(|f| build_field(ctx, f)).collect();
    let embeds: Vec<TypeId> = s.embeds.iter().map(|e| ctx.resolve_type_name(e)).collect();
    let info = StructInfo {
        fields,
        embeds,
        generic_names: s.generic_names.clone(),
        concrete_params: Vec::new(),
        is_generic: !s.generic_names.is_empty(),
        is_union: s.is_union,
        is_heap: s.attrs.is_heap(),
    };
    let canonical_name = qualify(module, &s.name);
    ctx.table.register_sym(TypeSymbol {
        canonical_name: canonical_name.clone(),
        mangled_name: talus_types::naming::mangle_fragment(&canonical_name),
        module: module.to_string(),
        source_lang: if ctx.is_translated_file { SourceLang::C } else { SourceLang::Native },
        parent: TypeId::NONE,
        methods: Vec::new(),
        info: TypeInfo::Struct(info),
    });
}

fn register_interface(ctx: &mut CheckerContext<'_>, module: &str, i: &InterfaceDecl) {
    let fields: Vec<FieldDescriptor> = i.fields.iter().map(|f| build_field(ctx, f)).collect();
    let embeds: Vec<TypeId> = i.embeds.iter().map(|e| ctx.resolve_type_name(e)).collect();
    // The placeholder from `register_placeholders` already reserved this
    // interface's `TypeId`, so its methods can be built with the right
    // receiver before the symbol itself is filled in.
    let iface_id = ctx.resolve_type_name(&qualify(module, &i.name));
    let methods: Vec<FunctionDescriptor> = i
        .methods
        .iter()
        .map(|m| {
            let receiver = if m.receiver.as_ref().is_some_and(|p| p.is_mut) {
                iface_id.with_flag(talus_types::TypeFlags::MUT_SHARE)
            } else {
                iface_id
            };
            build_fn_descriptor(ctx, module, receiver, m, false)
        })
        .collect();
    let info = InterfaceInfo {
        fields,
        methods: methods.clone(),
        embeds,
        implementing: RefCell::new(HashSet::new()),
        generic_names: i.generic_names.clone(),
        concrete_params: Vec::new(),
        single_impl: i.attrs.is_single_impl(),
        embeds_expanded: RefCell::new(false),
    };
    let canonical_name = qualify(module, &i.name);
    ctx.table.register_sym(TypeSymbol {
        canonical_name: canonical_name.clone(),
        mangled_name: talus_types::naming::mangle_fragment(&canonical_name),
        module: module.to_string(),
        source_lang: if ctx.is_translated_file { SourceLang::C } else { SourceLang::Native },
        parent: TypeId::NONE,
        methods: Vec::new(),
        info: TypeInfo::Interface(info),
    });
    // `register_sym` discards whatever `methods` it's handed when replacing
    // a placeholder (it keeps the placeholder's, empty) — attach the
    // symbol-level method list (used by `find_method`/calls through an
    // interface-typed value) the same way struct methods are attached.
    for m in methods {
        ctx.table.add_method(iface_id.base(), m);
    }
}

fn register_enum(ctx: &mut CheckerContext<'_>, module: &str, arena: &NodeArena, e: &EnumDecl) {
    let mut next: i64 = 0;
    let variants: Vec<(String, i64)> = e
        .variants
        .iter()
        .map(|v| {
            let value = eval_variant_value(arena, v).unwrap_or(next);
            next = value + 1;
            (v.name.clone(), value)
        })
        .collect();
    let info = EnumInfo { variants, is_flag: e.attrs.is_flag() };
    let canonical_name = qualify(module, &e.name);
    ctx.table.register_sym(TypeSymbol {
        canonical_name: canonical_name.clone(),
        mangled_name: talus_types::naming::mangle_fragment(&canonical_name),
        module: module.to_string(),
        source_lang: SourceLang::Native,
        parent: TypeId::NONE,
        methods: Vec::new(),
        info: TypeInfo::Enum(info),
    });
}

fn eval_variant_value(arena: &NodeArena, variant: &EnumVariant) -> Option<i64> {
    let idx = variant.value?;
    eval_int_expr(arena, idx)
}

fn eval_int_expr(arena: &NodeArena, idx: NodeIndex) -> Option<i64> {
    match &arena.get(idx).kind {
        ExprKind::IntegerLiteral(text) => parse_int_literal(text),
        ExprKind::PrefixExpr { op: UnOp::Neg, expr } => eval_int_expr(arena, *expr).map(|v| -v),
        ExprKind::ParExpr { inner } => eval_int_expr(arena, *inner),
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

fn register_type_decl(ctx: &mut CheckerContext<'_>, module: &str, t: &TypeDecl) {
    let canonical_name = qualify(module, &t.name);
    match &t.body {
        TypeDeclBody::Alias(target) => {
            let parent = ctx.resolve_type_name(target);
            ctx.table.register_sym(TypeSymbol {
                canonical_name: canonical_name.clone(),
                mangled_name: talus_types::naming::mangle_fragment(&canonical_name),
                module: module.to_string(),
                source_lang: if ctx.is_translated_file { SourceLang::C } else { SourceLang::Native },
                parent,
                methods: Vec::new(),
                info: TypeInfo::Alias,
            });
        }
        TypeDeclBody::Fn { params, return_type } => {
            let param_descs: Vec<ParamDescriptor> = params
                .iter()
                .map(|p| ParamDescriptor {
                    name: p.name.clone(),
                    typ: ctx.resolve_type_name(&p.type_name),
                    is_mut: p.is_mut,
                    is_hidden: p.is_hidden,
                })
                .collect();
            let ret = ctx.resolve_type_name(return_type);
            let descriptor = FunctionDescriptor {
                name: t.name.clone(),
                module: module.to_string(),
                receiver: TypeId::NONE,
                params: param_descs,
                return_type: ret,
                attrs: FnAttrs::empty(),
                source_lang: SourceLang::Native,
                generic_names: t.generic_names.clone(),
                concrete_instantiations: RefCell::new(HashSet::new()),
                pos: t.span.start,
                if_tag: None,
            };
            let fn_type = ctx.table.find_or_register_fn_type(module, descriptor, false, true);
            ctx.table.register_sym(TypeSymbol {
                canonical_name: canonical_name.clone(),
                mangled_name: talus_types::naming::mangle_fragment(&canonical_name),
                module: module.to_string(),
                source_lang: SourceLang::Native,
                parent: fn_type,
                methods: Vec::new(),
                info: TypeInfo::Alias,
            });
        }
        TypeDeclBody::Sum(variant_names) => {
            let variants: Vec<TypeId> = variant_names.iter().map(|n| ctx.resolve_type_name(n)).collect();
            let info = SumTypeInfo {
                variants,
                common_fields: RefCell::new(None),
                generic_names: t.generic_names.clone(),
                concrete_params: Vec::new(),
            };
            ctx.table.register_sym(TypeSymbol {
                canonical_name: canonical_name.clone(),
                mangled_name: talus_types::naming::mangle_fragment(&canonical_name),
                module: module.to_string(),
                source_lang: SourceLang::Native,
                parent: TypeId::NONE,
                methods: Vec::new(),
                info: TypeInfo::SumType(info),
            });
        }
    }
}

fn build_field(ctx: &mut CheckerContext<'_>, f: &Field) -> FieldDescriptor {
    FieldDescriptor {
        name: f.name.clone(),
        typ: ctx.resolve_type_name(&f.type_name),
        is_mut: f.is_mut,
        is_pub: f.is_pub,
        is_global: f.is_global,
    }
}

fn build_fn_descriptor(ctx: &mut CheckerContext<'_>, module: &str, receiver: TypeId, fd: &FnDecl, is_test_file: bool) -> FunctionDescriptor {
    let params: Vec<ParamDescriptor> = fd
        .params
        .iter()
        .map(|p| ParamDescriptor {
            name: p.name.clone(),
            typ: ctx.resolve_type_name(&p.type_name),
            is_mut: p.is_mut,
            is_hidden: p.is_hidden,
        })
        .collect();
    let return_type = ctx.resolve_type_name(&fd.return_type);
    FunctionDescriptor {
        name: fd.name.clone(),
        module: module.to_string(),
        receiver,
        params,
        return_type,
        attrs: fn_attrs(fd, is_test_file),
        source_lang: if ctx.is_translated_file { SourceLang::C } else { SourceLang::Native },
        generic_names: fd.generic_names.clone(),
        concrete_instantiations: RefCell::new(HashSet::new()),
        pos: fd.span.start,
        if_tag: fd.attrs.if_tag().map(str::to_string),
    }
}

fn fn_attrs(fd: &FnDecl, is_test_file: bool) -> FnAttrs {
    let mut out = FnAttrs::empty();
    if fd.attrs.is_pub() {
        out |= FnAttrs::PUB;
    }
    if fd.attrs.deprecated_message().is_some() {
        out |= FnAttrs::DEPRECATED;
    }
    if fd.attrs.is_noreturn() {
        out |= FnAttrs::NORETURN;
    }
    if fd.attrs.is_unsafe() {
        out |= FnAttrs::UNSAFE;
    }
    if fd.is_method {
        out |= FnAttrs::METHOD;
    }
    if fd.is_variadic() {
        out |= FnAttrs::VARIADIC;
    }
    if fd.no_body() {
        out |= FnAttrs::NO_BODY;
    }
    if fd.attrs.0.iter().any(|a| matches!(a, Attribute::KeepAlive)) {
        out |= FnAttrs::KEEP_ALIVE;
    }
    if is_test_file {
        out |= FnAttrs::TEST;
    }
    if fd.name == "main" && fd.receiver.is_none() && fd.module == talus_types::MAIN_MODULE {
        out |= FnAttrs::MAIN;
    }
    out
}

#[cfg(test)]
#[path = "tests/decl.rs"]
mod tests;
