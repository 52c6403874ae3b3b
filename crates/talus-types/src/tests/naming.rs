use super::*;

#[test]
fn array_canonical_matches_spec_example() {
    assert_eq!(array_canonical("int"), "[]int");
}

#[test]
fn array_fixed_canonical_matches_spec_example() {
    assert_eq!(array_fixed_canonical("int", 4), "[4]int");
}

#[test]
fn map_canonical_matches_spec_example() {
    assert_eq!(map_canonical("string", "int"), "map[string]int");
}

#[test]
fn chan_canonical_distinguishes_mut() {
    assert_eq!(chan_canonical("int", true), "chan mut int");
    assert_eq!(chan_canonical("int", false), "chan int");
}

#[test]
fn fn_type_canonical_matches_spec_example() {
    assert_eq!(fn_type_canonical(&["A".into(), "B".into()], "R"), "fn (A, B) R");
}

#[test]
fn multi_return_canonical_matches_spec_example() {
    assert_eq!(multi_return_canonical(&["A".into(), "B".into()]), "(A, B)");
}

#[test]
fn generic_inst_canonical_matches_spec_example() {
    assert_eq!(generic_inst_canonical("Box", &["int".into()]), "Box<int>");
}
