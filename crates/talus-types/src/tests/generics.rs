use super::*;
use crate::symbol::{FieldDescriptor, InterfaceInfo, ParamDescriptor, SourceLang, StructInfo, SumTypeInfo, TypeInfo};
use std::cell::RefCell;

fn new_table() -> TypeTable {
    TypeTable::default()
}

fn generic_param(table: &mut TypeTable, name: &str) -> TypeId {
    table.register_sym(TypeSymbol {
        canonical_name: name.to_string(),
        mangled_name: name.to_string(),
        module: MAIN_MODULE.to_string(),
        source_lang: SourceLang::Native,
        parent: TypeId::NONE,
        methods: Vec::new(),
        info: TypeInfo::Placeholder,
    })
}

#[test]
fn resolve_generic_to_concrete_substitutes_a_bare_parameter() {
    let mut table = new_table();
    let t = generic_param(&mut table, "T");
    let resolved = table.resolve_generic_to_concrete(t, &["T".to_string()], &[table.builtins.i32]);
    assert_eq!(resolved.base(), table.builtins.i32);
    assert!(!resolved.has_flag(crate::type_id::TypeFlags::GENERIC));
}

#[test]
fn resolve_generic_to_concrete_leaves_unrelated_names_untouched() {
    let mut table = new_table();
    let resolved = table.resolve_generic_to_concrete(table.builtins.string, &["T".to_string()], &[table.builtins.i32]);
    assert_eq!(resolved, table.builtins.string);
}

#[test]
fn resolve_generic_to_concrete_recurses_into_arrays() {
    let mut table = new_table();
    let t = generic_param(&mut table, "T");
    let array_of_t = table.find_or_register_array(t);
    let resolved = table.resolve_generic_to_concrete(array_of_t, &["T".to_string()], &[table.builtins.string]);
    match &table.sym(resolved).info {
        TypeInfo::Array { elem, .. } => assert_eq!(elem.base(), table.builtins.string),
        other => panic!("expected an array, got {other:?}"),
    }
}

fn register_generic_list(table: &mut TypeTable) -> (TypeId, TypeId) {
    let t = generic_param(table, "T");
    let list = table.register_sym(TypeSymbol {
        canonical_name: "mypkg.List".to_string(),
        mangled_name: "mypkg_List".to_string(),
        module: MAIN_MODULE.to_string(),
        source_lang: SourceLang::Native,
        parent: TypeId::NONE,
        methods: Vec::new(),
        info: TypeInfo::Struct(StructInfo {
            fields: vec![FieldDescriptor { name: "item".to_string(), typ: t, is_mut: true, is_pub: true, is_global: false }],
            embeds: Vec::new(),
            generic_names: vec!["T".to_string()],
            concrete_params: Vec::new(),
            is_generic: true,
            is_union: false,
            is_heap: false,
        }),
    });
    (list, t)
}

#[test]
fn unwrap_generic_type_materializes_a_struct_with_substituted_fields() {
    let mut table = new_table();
    let (list, _t) = register_generic_list(&mut table);

    let instantiated = table.unwrap_generic_type(list, &["T".to_string()], &[table.builtins.i32]);
    assert_ne!(instantiated, list);
    assert_eq!(table.sym(instantiated).canonical_name, "mypkg.List<int>");

    match &table.sym(instantiated).info {
        TypeInfo::Struct(info) => {
            assert!(!info.is_generic);
            assert_eq!(info.fields[0].typ.base(), table.builtins.i32);
        }
        other => panic!("expected a struct, got {other:?}"),
    }
}

#[test]
fn unwrap_generic_type_is_idempotent_for_the_same_concrete_types() {
    let mut table = new_table();
    let (list, _t) = register_generic_list(&mut table);
    let first = table.unwrap_generic_type(list, &["T".to_string()], &[table.builtins.i32]);
    let second = table.unwrap_generic_type(list, &["T".to_string()], &[table.builtins.i32]);
    assert_eq!(first, second);
}

#[test]
fn generic_insts_to_concrete_rewrites_pending_placeholders_into_aliases() {
    let mut table = new_table();
    let (list, _t) = register_generic_list(&mut table);

    let pending = table.register_sym(TypeSymbol {
        canonical_name: "mypkg.List<int>#pending".to_string(),
        mangled_name: "mypkg_List_int_pending".to_string(),
        module: MAIN_MODULE.to_string(),
        source_lang: SourceLang::Native,
        parent: TypeId::NONE,
        methods: Vec::new(),
        info: TypeInfo::GenericInst { parent: list, concrete: vec![table.builtins.i32] },
    });

    table.generic_insts_to_concrete();

    match &table.sym(pending).info {
        TypeInfo::Alias => {
            let target = table.sym(pending).parent;
            assert_eq!(table.sym(target).canonical_name, "mypkg.List<int>");
        }
        other => panic!("expected the placeholder to become an alias, got {other:?}"),
    }
}

fn param(name: &str, typ: TypeId) -> ParamDescriptor {
    ParamDescriptor { name: name.to_string(), typ, is_mut: false, is_hidden: false }
}

#[test]
fn infer_fn_generic_types_binds_from_positional_arguments() {
    let mut table = new_table();
    let t = generic_param(&mut table, "T");
    let params = vec![param("a", t), param("b", t)];
    let bound = table
        .infer_fn_generic_types(&params, &["T".to_string()], &[table.builtins.i32, table.builtins.i32])
        .expect("both arguments agree");
    assert_eq!(bound[0].base(), table.builtins.i32);
}

#[test]
fn infer_fn_generic_types_promotes_mismatched_numeric_widths() {
    let mut table = new_table();
    let t = generic_param(&mut table, "T");
    let params = vec![param("a", t), param("b", t)];
    let bound = table
        .infer_fn_generic_types(&params, &["T".to_string()], &[table.builtins.i8, table.builtins.i64])
        .expect("numeric widths are bridgeable");
    assert_eq!(bound[0].base(), table.builtins.i64);
}

#[test]
fn infer_fn_generic_types_rejects_incompatible_bindings() {
    let mut table = new_table();
    let t = generic_param(&mut table, "T");
    let params = vec![param("a", t), param("b", t)];
    let err = table
        .infer_fn_generic_types(&params, &["T".to_string()], &[table.builtins.string, table.builtins.i32])
        .unwrap_err();
    assert_eq!(err, InferenceError::Ambiguous("T".to_string()));
}

#[test]
fn infer_fn_generic_types_binds_through_a_generic_interface_parameter() {
    let mut table = new_table();
    let t = generic_param(&mut table, "T");
    let generic_iface = table.register_sym(TypeSymbol {
        canonical_name: "mypkg.Box".to_string(),
        mangled_name: "mypkg_Box".to_string(),
        module: MAIN_MODULE.to_string(),
        source_lang: SourceLang::Native,
        parent: TypeId::NONE,
        methods: Vec::new(),
        info: TypeInfo::Interface(InterfaceInfo {
            fields: Vec::new(),
            methods: Vec::new(),
            embeds: Vec::new(),
            implementing: RefCell::new(Default::default()),
            generic_names: vec!["T".to_string()],
            concrete_params: vec![t],
            single_impl: false,
            embeds_expanded: RefCell::new(false),
        }),
    });
    let concrete_iface = table.register_sym(TypeSymbol {
        canonical_name: "mypkg.Box<int>".to_string(),
        mangled_name: "mypkg_Box_int".to_string(),
        module: MAIN_MODULE.to_string(),
        source_lang: SourceLang::Native,
        parent: TypeId::NONE,
        methods: Vec::new(),
        info: TypeInfo::Interface(InterfaceInfo {
            fields: Vec::new(),
            methods: Vec::new(),
            embeds: Vec::new(),
            implementing: RefCell::new(Default::default()),
            generic_names: Vec::new(),
            concrete_params: vec![table.builtins.i32],
            single_impl: false,
            embeds_expanded: RefCell::new(false),
        }),
    });

    let params = vec![param("b", generic_iface)];
    let bound = table
        .infer_fn_generic_types(&params, &["T".to_string()], &[concrete_iface])
        .expect("the interface's concrete parameter binds T");
    assert_eq!(bound[0].base(), table.builtins.i32);
}

#[test]
fn infer_fn_generic_types_binds_through_a_generic_sum_type_parameter() {
    let mut table = new_table();
    let t = generic_param(&mut table, "T");
    let generic_sum = table.register_sym(TypeSymbol {
        canonical_name: "mypkg.Maybe".to_string(),
        mangled_name: "mypkg_Maybe".to_string(),
        module: MAIN_MODULE.to_string(),
        source_lang: SourceLang::Native,
        parent: TypeId::NONE,
        methods: Vec::new(),
        info: TypeInfo::SumType(SumTypeInfo {
            variants: Vec::new(),
            common_fields: RefCell::new(None),
            generic_names: vec!["T".to_string()],
            concrete_params: vec![t],
        }),
    });
    let concrete_sum = table.register_sym(TypeSymbol {
        canonical_name: "mypkg.Maybe<string>".to_string(),
        mangled_name: "mypkg_Maybe_string".to_string(),
        module: MAIN_MODULE.to_string(),
        source_lang: SourceLang::Native,
        parent: TypeId::NONE,
        methods: Vec::new(),
        info: TypeInfo::SumType(SumTypeInfo {
            variants: Vec::new(),
            common_fields: RefCell::new(None),
            generic_names: Vec::new(),
            concrete_params: vec![table.builtins.string],
        }),
    });

    let params = vec![param("m", generic_sum)];
    let bound = table
        .infer_fn_generic_types(&params, &["T".to_string()], &[concrete_sum])
        .expect("the sum type's concrete parameter binds T");
    assert_eq!(bound[0].base(), table.builtins.string);
}

#[test]
fn infer_fn_generic_types_reports_an_unbound_parameter() {
    let mut table = new_table();
    let t = generic_param(&mut table, "T");
    let u = generic_param(&mut table, "U");
    let params = vec![param("a", t)];
    let err = table
        .infer_fn_generic_types(&params, &["T".to_string(), "U".to_string()], &[table.builtins.i32])
        .unwrap_err();
    let _ = u;
    assert_eq!(err, InferenceError::Unbound("U".to_string()));
}
