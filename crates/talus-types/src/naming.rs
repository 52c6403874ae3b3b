//! Canonical and mangled name computation for composite types (§4.1.2).
//!
//! Canonical names are the deterministic, human-readable intern keys
//! (`[]T`, `[N]T`, `map[K]V`, ...); mangled names are their
//! C-identifier-safe counterparts, used wherever a name must be a valid
//! bare identifier (symbol emission is out of scope here, but code
//! generation downstream needs the mangled form, so the type table still
//! computes and stores it).

pub fn mangle_fragment(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

pub fn array_canonical(elem: &str) -> String {
    format!("[]{elem}")
}

pub fn array_mangled(elem: &str) -> String {
    format!("Array_{}", mangle_fragment(elem))
}

pub fn array_with_dims_canonical(elem: &str, dims: u32) -> String {
    format!("{}{elem}", "[]".repeat(dims as usize))
}

pub fn array_fixed_canonical(elem: &str, size: u64) -> String {
    format!("[{size}]{elem}")
}

pub fn array_fixed_mangled(elem: &str, size: u64) -> String {
    format!("Array_fixed_{size}_{}", mangle_fragment(elem))
}

pub fn map_canonical(key: &str, value: &str) -> String {
    format!("map[{key}]{value}")
}

pub fn map_mangled(key: &str, value: &str) -> String {
    format!("Map_{}_{}", mangle_fragment(key), mangle_fragment(value))
}

pub fn chan_canonical(elem: &str, is_mut: bool) -> String {
    if is_mut {
        format!("chan mut {elem}")
    } else {
        format!("chan {elem}")
    }
}

pub fn chan_mangled(elem: &str, is_mut: bool) -> String {
    format!("Chan_{}{}", if is_mut { "mut_" } else { "" }, mangle_fragment(elem))
}

pub fn thread_canonical(ret: &str) -> String {
    format!("thread {ret}")
}

pub fn promise_canonical(ret: &str) -> String {
    format!("Promise<{ret}>")
}

pub fn multi_return_canonical(types: &[String]) -> String {
    format!("({})", types.join(", "))
}

pub fn fn_type_canonical(params: &[String], ret: &str) -> String {
    format!("fn ({}) {ret}", params.join(", "))
}

pub fn generic_inst_canonical(parent: &str, concrete: &[String]) -> String {
    format!("{parent}<{}>", concrete.join(", "))
}

#[cfg(test)]
#[path = "tests/naming.rs"]
mod tests;
