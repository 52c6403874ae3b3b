use super::*;
use crate::symbol::{FnAttrs, ParamDescriptor, SourceLang, TypeInfo};

fn new_table() -> TypeTable {
    TypeTable::default()
}

fn placeholder(name: &str) -> TypeSymbol {
    TypeSymbol {
        canonical_name: name.to_string(),
        mangled_name: naming::mangle_fragment(name),
        module: MAIN_MODULE.to_string(),
        source_lang: SourceLang::Native,
        parent: TypeId::NONE,
        methods: Vec::new(),
        info: TypeInfo::Struct(crate::symbol::StructInfo {
            fields: Vec::new(),
            embeds: Vec::new(),
            generic_names: Vec::new(),
            concrete_params: Vec::new(),
            is_generic: false,
            is_union: false,
            is_heap: false,
        }),
    }
}

#[test]
fn new_table_reserves_builtin_window() {
    let table = new_table();
    assert_eq!(table.symbols_len() as u32, RESERVED_BUILTIN_COUNT + 1);
    assert_eq!(table.builtins.void.index(), 1);
}

#[test]
fn registering_the_same_canonical_name_twice_dedups() {
    let mut table = new_table();
    let a = table.register_sym(placeholder("mypkg.Foo"));
    let b = table.register_sym(placeholder("mypkg.Foo"));
    assert_eq!(a, b);
    assert_eq!(table.symbols_len() as u32, RESERVED_BUILTIN_COUNT + 2);
}

#[test]
fn placeholder_is_overwritten_by_the_real_declaration() {
    let mut table = new_table();
    let placeholder_id = table.add_placeholder_type("mypkg.Foo", SourceLang::Native);
    assert!(table.sym(placeholder_id).is_placeholder());

    let real_id = table.register_sym(placeholder("mypkg.Foo"));
    assert_eq!(placeholder_id, real_id);
    assert!(!table.sym(real_id).is_placeholder());
}

#[test]
fn add_placeholder_type_infers_module_from_dotted_prefix() {
    let mut table = new_table();
    let id = table.add_placeholder_type("mypkg.Foo", SourceLang::Native);
    assert_eq!(table.sym(id).module, "mypkg");

    let unqualified = table.add_placeholder_type("Bar", SourceLang::Native);
    assert_eq!(table.sym(unqualified).module, MAIN_MODULE);
}

#[test]
fn find_or_register_array_is_idempotent() {
    let mut table = new_table();
    let elem = table.builtins.i32;
    let a = table.find_or_register_array(elem);
    let b = table.find_or_register_array(elem);
    assert_eq!(a, b);
    assert_eq!(table.sym(a).canonical_name, "[]int");
}

#[test]
fn find_or_register_array_with_dims_one_matches_single_array() {
    let mut table = new_table();
    let elem = table.builtins.i32;
    let single = table.find_or_register_array(elem);
    let via_dims = table.find_or_register_array_with_dims(elem, 1);
    assert_eq!(single, via_dims);
}

#[test]
fn find_or_register_map_round_trips_key_and_value() {
    let mut table = new_table();
    let key = table.builtins.string;
    let value = table.builtins.i64;
    let map_id = table.find_or_register_map(key, value);
    match &table.sym(map_id).info {
        TypeInfo::Map { key: k, value: v } => {
            assert_eq!(*k, key);
            assert_eq!(*v, value);
        }
        other => panic!("expected a map, got {other:?}"),
    }
}

#[test]
fn unalias_num_type_only_unwraps_numeric_aliases() {
    let mut table = new_table();
    let numeric_alias = table.register_sym(TypeSymbol {
        canonical_name: "mypkg.Meters".to_string(),
        mangled_name: "mypkg_Meters".to_string(),
        module: "mypkg".to_string(),
        source_lang: SourceLang::Native,
        parent: table.builtins.i64,
        methods: Vec::new(),
        info: TypeInfo::Alias,
    });
    assert_eq!(table.unalias_num_type(numeric_alias), table.builtins.i64);

    let string_alias = table.register_sym(TypeSymbol {
        canonical_name: "mypkg.Name".to_string(),
        mangled_name: "mypkg_Name".to_string(),
        module: "mypkg".to_string(),
        source_lang: SourceLang::Native,
        parent: table.builtins.string,
        methods: Vec::new(),
        info: TypeInfo::Alias,
    });
    assert_eq!(table.unalias_num_type(string_alias), string_alias);
}

#[test]
fn register_fn_rejects_a_second_registration_for_the_same_key() {
    let mut table = new_table();
    let desc = FunctionDescriptor {
        name: "Len".to_string(),
        module: MAIN_MODULE.to_string(),
        receiver: TypeId::NONE,
        params: vec![ParamDescriptor { name: "s".to_string(), typ: table.builtins.string, is_mut: false, is_hidden: false }],
        return_type: table.builtins.i32,
        attrs: FnAttrs::empty(),
        source_lang: SourceLang::Native,
        generic_names: Vec::new(),
        concrete_instantiations: std::cell::RefCell::new(Default::default()),
        pos: 0,
        if_tag: None,
    };
    assert!(table.register_fn(desc.clone()));
    assert!(!table.register_fn(desc));
    assert!(table.get_fn("Len").is_some());
}

#[test]
fn register_fn_concrete_types_reports_novelty() {
    let mut table = new_table();
    let desc = FunctionDescriptor {
        name: "First".to_string(),
        module: MAIN_MODULE.to_string(),
        receiver: TypeId::NONE,
        params: Vec::new(),
        return_type: table.builtins.void,
        attrs: FnAttrs::empty(),
        source_lang: SourceLang::Native,
        generic_names: vec!["T".to_string()],
        concrete_instantiations: std::cell::RefCell::new(Default::default()),
        pos: 0,
        if_tag: None,
    };
    table.register_fn(desc);
    assert!(table.register_fn_concrete_types("First", vec![table.builtins.i32]));
    assert!(!table.register_fn_concrete_types("First", vec![table.builtins.i32]));
    assert!(table.register_fn_concrete_types("First", vec![table.builtins.string]));
    assert_eq!(table.fn_concrete_types("First").len(), 2);
}
