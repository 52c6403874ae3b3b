//! The Type Table (§4.1): interning, composite constructors, alias/pointer
//! arithmetic, and function registration. Pure data and queries — the
//! table never emits a diagnostic; every failure path here is either a
//! silent dedup (§4.1.1) or an invariant-violation panic (§4.1.8).

use crate::builtin::{self, Builtins, RESERVED_BUILTIN_COUNT};
use crate::errors::{PanicHandler, TableError};
use crate::naming;
use crate::symbol::{FunctionDescriptor, PrimitiveKind, TypeInfo, TypeSymbol};
use crate::type_id::TypeId;
use rustc_hash::FxHashMap;

/// Module name the table additionally keys names under for lookup
/// convenience (§4.1.1: "Names in module `main` are additionally keyed by
/// their unqualified form").
pub const MAIN_MODULE: &str = "main";

/// The process-wide registry of types, functions, and module metadata.
///
/// Owned by the driver and passed explicitly to every consumer — there is
/// no process-global table pointer (§9: "Global table").
pub struct TypeTable {
    symbols: Vec<TypeSymbol>,
    by_canonical_name: FxHashMap<String, u32>,
    /// Unqualified-name index for symbols declared in `main` (§4.1.1).
    unqualified_main: FxHashMap<String, u32>,
    functions: FxHashMap<String, FunctionDescriptor>,
    pub builtins: Builtins,
    panic_handler: Box<dyn PanicHandler>,
}

impl std::fmt::Debug for TypeTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeTable")
            .field("symbols_len", &self.symbols.len())
            .field("functions_len", &self.functions.len())
            .finish()
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new(Box::new(crate::errors::AbortPanicHandler))
    }
}

impl TypeTable {
    #[must_use]
    pub fn new(panic_handler: Box<dyn PanicHandler>) -> Self {
        // Index 0 is the `TypeId::NONE` sentinel; seed it with an invalid
        // placeholder so the arena's index space matches `TypeId`'s.
        let mut symbols = vec![TypeSymbol::invalid("<none>")];
        let mut by_canonical_name = FxHashMap::default();

        let builtin_base = symbols.len() as u32;
        for sym in builtin::builtin_symbols() {
            by_canonical_name.insert(sym.canonical_name.clone(), symbols.len() as u32);
            symbols.push(sym);
        }
        let builtins = builtin::builtins_from_indices(builtin_base);
        debug_assert_eq!(symbols.len() as u32 - builtin_base, RESERVED_BUILTIN_COUNT);

        Self { symbols, by_canonical_name, unqualified_main: FxHashMap::default(), functions: FxHashMap::default(), builtins, panic_handler }
    }

    fn invariant_violation(&self, id: TypeId) -> ! {
        self.panic_handler.handle(&TableError::InvalidTypeId(id))
    }

    // ---- 4.1.1 Interning and registration --------------------------------

    /// Register `sym`, returning a stable `TypeId`. See §4.1.1 for the
    /// dedup/overwrite rules.
    pub fn register_sym(&mut self, sym: TypeSymbol) -> TypeId {
        if let Some(&idx) = self.by_canonical_name.get(&sym.canonical_name) {
            let existing = &mut self.symbols[idx as usize];
            if existing.is_placeholder() {
                let methods = std::mem::take(&mut existing.methods);
                let mut replacement = sym;
                replacement.methods = methods;
                self.symbols[idx as usize] = replacement;
                return self.key_and_return(idx);
            }
            if idx < RESERVED_BUILTIN_COUNT
                && builtin::REDEFINABLE_BUILTIN_NAMES.contains(&sym.canonical_name.as_str())
            {
                let kind = existing.info.kind_name();
                if sym.info.kind_name() == kind {
                    self.symbols[idx as usize] = sym;
                }
                return self.key_and_return(idx);
            }
            // Silent dedup: keep the earlier registration.
            return self.key_and_return(idx);
        }

        let idx = self.symbols.len() as u32;
        self.by_canonical_name.insert(sym.canonical_name.clone(), idx);
        if sym.module == MAIN_MODULE {
            self.unqualified_main.entry(unqualified(&sym.canonical_name).to_string()).or_insert(idx);
        }
        self.symbols.push(sym);
        tracing::trace!(idx, "registered type symbol");
        TypeId::new(idx)
    }

    fn key_and_return(&mut self, idx: u32) -> TypeId {
        TypeId::new(idx)
    }

    /// `find_sym_and_idx` (§4.1.1). Rust idiom: `None` stands in for the
    /// spec's `idx = -1` sentinel.
    #[must_use]
    pub fn find_sym_and_idx(&self, name: &str) -> Option<(TypeId, &TypeSymbol)> {
        let idx = self
            .by_canonical_name
            .get(name)
            .or_else(|| self.unqualified_main.get(name))
            .copied()?;
        Some((TypeId::new(idx), &self.symbols[idx as usize]))
    }

    /// Register a forward-declaration placeholder (§4.1.2). Module is
    /// inferred from the dotted prefix of `name` (e.g. `mypkg.Foo` lives
    /// in module `mypkg`), falling back to `main` for unqualified names.
    pub fn add_placeholder_type(
        &mut self,
        name: &str,
        source_lang: crate::symbol::SourceLang,
    ) -> TypeId {
        if let Some((id, _)) = self.find_sym_and_idx(name) {
            return id;
        }
        let module = name.rsplit_once('.').map(|(m, _)| m.to_string()).unwrap_or_else(|| MAIN_MODULE.to_string());
        self.register_sym(TypeSymbol {
            canonical_name: name.to_string(),
            mangled_name: naming::mangle_fragment(name),
            module,
            source_lang,
            parent: TypeId::NONE,
            methods: Vec::new(),
            info: TypeInfo::Placeholder,
        })
    }

    // ---- Direct accessors --------------------------------------------

    /// `sym(typ)` (§4.1.3). Invokes the panic handler on an invariant
    /// violation (e.g. `sym(TypeId::NONE)` or an out-of-range index).
    #[must_use]
    pub fn sym(&self, typ: TypeId) -> &TypeSymbol {
        let idx = typ.index() as usize;
        if idx == 0 || idx >= self.symbols.len() {
            self.invariant_violation(typ);
        }
        &self.symbols[idx]
    }

    /// Fallible counterpart of `sym`, for callers that want a `TableError`
    /// instead of invoking the panic handler.
    pub fn try_sym(&self, typ: TypeId) -> Result<&TypeSymbol, TableError> {
        let idx = typ.index() as usize;
        if idx == 0 || idx >= self.symbols.len() {
            return Err(TableError::InvalidTypeId(typ));
        }
        Ok(&self.symbols[idx])
    }

    /// `final_sym(typ)` (§4.1.3): follow one alias hop to reach a "real"
    /// kind symbol.
    #[must_use]
    pub fn final_sym(&self, typ: TypeId) -> &TypeSymbol {
        let s = self.sym(typ);
        if matches!(s.info, TypeInfo::Alias) && !s.parent.is_none() {
            return self.sym(s.parent);
        }
        s
    }

    /// `unalias_num_type(typ)` (§4.1.3): dereference an alias only when
    /// the parent is a primitive numeric type.
    #[must_use]
    pub fn unalias_num_type(&self, typ: TypeId) -> TypeId {
        let s = self.sym(typ);
        if matches!(s.info, TypeInfo::Alias) && !s.parent.is_none() {
            let parent_sym = self.sym(s.parent);
            if let TypeInfo::Primitive(p) = parent_sym.info {
                if p.is_numeric() {
                    return s.parent;
                }
            }
        }
        typ
    }

    /// `value_type(typ)` (§4.1.3): the logical element type for an
    /// indexed access.
    #[must_use]
    pub fn value_type(&self, typ: TypeId) -> TypeId {
        if typ.nr_muls() > 0 {
            return typ.deref();
        }
        let s = self.final_sym(typ);
        match &s.info {
            TypeInfo::Array { elem, .. } | TypeInfo::ArrayFixed { elem, .. } => *elem,
            TypeInfo::Map { value, .. } => *value,
            TypeInfo::Primitive(PrimitiveKind::String) => TypeId::new(self.builtins.u8.index()),
            _ if typ.has_flag(crate::type_id::TypeFlags::VARIADIC) => typ.clear_flag(crate::type_id::TypeFlags::VARIADIC),
            _ => self.builtins.void,
        }
    }

    // ---- 4.1.2 Composite constructors ---------------------------------

    /// `find_or_register_array(elem)`.
    pub fn find_or_register_array(&mut self, elem: TypeId) -> TypeId {
        let elem_name = self.sym(elem).canonical_name.clone();
        let canonical_name = naming::array_canonical(&elem_name);
        if let Some((id, _)) = self.find_sym_and_idx(&canonical_name) {
            return id;
        }
        self.register_sym(TypeSymbol {
            canonical_name: canonical_name.clone(),
            mangled_name: naming::array_mangled(&elem_name),
            module: MAIN_MODULE.to_string(),
            source_lang: crate::symbol::SourceLang::Native,
            parent: TypeId::NONE,
            methods: Vec::new(),
            info: TypeInfo::Array { elem, nr_dims: 1 },
        })
    }

    /// `find_or_register_array_with_dims(elem, n)`.
    pub fn find_or_register_array_with_dims(&mut self, elem: TypeId, dims: u32) -> TypeId {
        if dims <= 1 {
            return self.find_or_register_array(elem);
        }
        let elem_name = self.sym(elem).canonical_name.clone();
        let canonical_name = naming::array_with_dims_canonical(&elem_name, dims);
        if let Some((id, _)) = self.find_sym_and_idx(&canonical_name) {
            return id;
        }
        self.register_sym(TypeSymbol {
            canonical_name: canonical_name.clone(),
            mangled_name: format!("Array{dims}_{}", naming::mangle_fragment(&elem_name)),
            module: MAIN_MODULE.to_string(),
            source_lang: crate::symbol::SourceLang::Native,
            parent: TypeId::NONE,
            methods: Vec::new(),
            info: TypeInfo::Array { elem, nr_dims: dims },
        })
    }

    /// `find_or_register_array_fixed(elem, size, size_expr)`.
    pub fn find_or_register_array_fixed(
        &mut self,
        elem: TypeId,
        size: u64,
        size_expr: Option<String>,
    ) -> TypeId {
        let elem_name = self.sym(elem).canonical_name.clone();
        let canonical_name = naming::array_fixed_canonical(&elem_name, size);
        if let Some((id, _)) = self.find_sym_and_idx(&canonical_name) {
            return id;
        }
        self.register_sym(TypeSymbol {
            canonical_name: canonical_name.clone(),
            mangled_name: naming::array_fixed_mangled(&elem_name, size),
            module: MAIN_MODULE.to_string(),
            source_lang: crate::symbol::SourceLang::Native,
            parent: TypeId::NONE,
            methods: Vec::new(),
            info: TypeInfo::ArrayFixed { elem, size, size_expr },
        })
    }

    /// `_chan(elem, is_mut)`.
    pub fn find_or_register_chan(&mut self, elem: TypeId, is_mut: bool) -> TypeId {
        let elem_name = self.sym(elem).canonical_name.clone();
        let canonical_name = naming::chan_canonical(&elem_name, is_mut);
        if let Some((id, _)) = self.find_sym_and_idx(&canonical_name) {
            return id;
        }
        self.register_sym(TypeSymbol {
            canonical_name: canonical_name.clone(),
            mangled_name: naming::chan_mangled(&elem_name, is_mut),
            module: MAIN_MODULE.to_string(),
            source_lang: crate::symbol::SourceLang::Native,
            parent: TypeId::NONE,
            methods: Vec::new(),
            info: TypeInfo::Chan { elem, is_mut },
        })
    }

    /// `_map(key, value)`.
    pub fn find_or_register_map(&mut self, key: TypeId, value: TypeId) -> TypeId {
        let key_name = self.sym(key).canonical_name.clone();
        let value_name = self.sym(value).canonical_name.clone();
        let canonical_name = naming::map_canonical(&key_name, &value_name);
        if let Some((id, _)) = self.find_sym_and_idx(&canonical_name) {
            return id;
        }
        self.register_sym(TypeSymbol {
            canonical_name: canonical_name.clone(),
            mangled_name: naming::map_mangled(&key_name, &value_name),
            module: MAIN_MODULE.to_string(),
            source_lang: crate::symbol::SourceLang::Native,
            parent: TypeId::NONE,
            methods: Vec::new(),
            info: TypeInfo::Map { key, value },
        })
    }

    /// `_thread(ret)`.
    pub fn find_or_register_thread(&mut self, ret: TypeId) -> TypeId {
        let ret_name = self.sym(ret).canonical_name.clone();
        let canonical_name = naming::thread_canonical(&ret_name);
        if let Some((id, _)) = self.find_sym_and_idx(&canonical_name) {
            return id;
        }
        self.register_sym(TypeSymbol {
            canonical_name: canonical_name.clone(),
            mangled_name: format!("Thread_{}", naming::mangle_fragment(&ret_name)),
            module: MAIN_MODULE.to_string(),
            source_lang: crate::symbol::SourceLang::Native,
            parent: TypeId::NONE,
            methods: Vec::new(),
            info: TypeInfo::Thread { ret },
        })
    }

    /// `_promise(ret)`.
    pub fn find_or_register_promise(&mut self, ret: TypeId) -> TypeId {
        let ret_name = self.sym(ret).canonical_name.clone();
        let canonical_name = naming::promise_canonical(&ret_name);
        if let Some((id, _)) = self.find_sym_and_idx(&canonical_name) {
            return id;
        }
        self.register_sym(TypeSymbol {
            canonical_name: canonical_name.clone(),
            mangled_name: format!("Promise_{}", naming::mangle_fragment(&ret_name)),
            module: MAIN_MODULE.to_string(),
            source_lang: crate::symbol::SourceLang::Native,
            parent: TypeId::NONE,
            methods: Vec::new(),
            info: TypeInfo::Promise { ret },
        })
    }

    /// `_multi_return(ts)`.
    pub fn find_or_register_multi_return(&mut self, types: Vec<TypeId>) -> TypeId {
        let names: Vec<String> = types.iter().map(|t| self.sym(*t).canonical_name.clone()).collect();
        let canonical_name = naming::multi_return_canonical(&names);
        if let Some((id, _)) = self.find_sym_and_idx(&canonical_name) {
            return id;
        }
        self.register_sym(TypeSymbol {
            canonical_name: canonical_name.clone(),
            mangled_name: format!("MultiReturn_{}", names.iter().map(|n| naming::mangle_fragment(n)).collect::<Vec<_>>().join("_")),
            module: MAIN_MODULE.to_string(),
            source_lang: crate::symbol::SourceLang::Native,
            parent: TypeId::NONE,
            methods: Vec::new(),
            info: TypeInfo::MultiReturn(types),
        })
    }

    /// `_fn_type(mod, fn, is_anon, has_decl)`. `is_anon`/`has_decl` steer
    /// naming only (an anonymous function-typed value vs. a named
    /// declaration's signature type) — both register under the same
    /// canonical-name scheme since the Type Table only needs the shape.
    pub fn find_or_register_fn_type(
        &mut self,
        module: &str,
        descriptor: FunctionDescriptor,
        _is_anon: bool,
        _has_decl: bool,
    ) -> TypeId {
        let param_names: Vec<String> =
            descriptor.params.iter().map(|p| self.sym(p.typ).canonical_name.clone()).collect();
        let ret_name = self.sym(descriptor.return_type).canonical_name.clone();
        let canonical_name = naming::fn_type_canonical(&param_names, &ret_name);
        if let Some((id, _)) = self.find_sym_and_idx(&canonical_name) {
            return id;
        }
        self.register_sym(TypeSymbol {
            canonical_name: canonical_name.clone(),
            mangled_name: format!(
                "Fn_{}_{}",
                param_names.iter().map(|n| naming::mangle_fragment(n)).collect::<Vec<_>>().join("_"),
                naming::mangle_fragment(&ret_name)
            ),
            module: module.to_string(),
            source_lang: descriptor.source_lang,
            parent: TypeId::NONE,
            methods: Vec::new(),
            info: TypeInfo::Function(descriptor),
        })
    }

    // ---- 4.1.7 Function registration -----------------------------------

    /// `register_fn`: stores by fully-qualified name (`module.name`,
    /// unqualified for `main`). Returns `false` when a non-placeholder
    /// entry already existed for this name (§3: "collide unless the
    /// earlier symbol was a placeholder" — the function registry has no
    /// placeholder concept, so any existing entry wins).
    pub fn register_fn(&mut self, descriptor: FunctionDescriptor) -> bool {
        let key = fn_key(&descriptor.module, &descriptor.name, &descriptor.receiver, self);
        if self.functions.contains_key(&key) {
            return false;
        }
        self.functions.insert(key, descriptor);
        true
    }

    /// Appends `method` to the methods list of the type at `typ`, used by
    /// the checker once a method `FnDecl`'s receiver has been resolved to a
    /// struct/interface `TypeId` (declarations and their method bodies are
    /// parsed as separate top-level items, so methods are attached here
    /// rather than at `register_sym` time).
    pub fn add_method(&mut self, typ: TypeId, method: FunctionDescriptor) {
        let idx = typ.index() as usize;
        if idx == 0 || idx >= self.symbols.len() {
            self.invariant_violation(typ);
        }
        self.symbols[idx].methods.push(method);
    }

    #[must_use]
    pub fn get_fn(&self, key: &str) -> Option<&FunctionDescriptor> {
        self.functions.get(key)
    }

    pub fn get_fn_mut(&mut self, key: &str) -> Option<&mut FunctionDescriptor> {
        self.functions.get_mut(key)
    }

    pub fn fn_keys(&self) -> impl Iterator<Item = &String> {
        self.functions.keys()
    }

    /// `register_fn_generic_types(name)`: initializes the per-fn
    /// concrete-types ledger (a no-op beyond asserting the fn exists,
    /// since `FunctionDescriptor::concrete_instantiations` starts empty).
    pub fn register_fn_generic_types(&mut self, key: &str) {
        if let Some(f) = self.functions.get_mut(key) {
            f.concrete_instantiations.borrow_mut().clear();
        }
    }

    /// `register_fn_concrete_types(name, types)`: returns `true` when the
    /// tuple was newly observed, driving the checker's re-check fixed
    /// point (§4.2.6).
    pub fn register_fn_concrete_types(&mut self, key: &str, types: Vec<TypeId>) -> bool {
        match self.functions.get(key) {
            Some(f) => f.concrete_instantiations.borrow_mut().insert(types),
            None => false,
        }
    }

    #[must_use]
    pub fn fn_concrete_types(&self, key: &str) -> Vec<Vec<TypeId>> {
        self.functions
            .get(key)
            .map(|f| f.concrete_instantiations.borrow().iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn symbols_len(&self) -> usize {
        self.symbols.len()
    }

    /// Overwrites a symbol's payload in place, keeping its `TypeId` and
    /// canonical-name mapping stable. Used by `generic_insts_to_concrete`
    /// to turn a parsed `generic_inst` placeholder into an alias pointing
    /// at its materialized instantiation without invalidating `TypeId`s
    /// other nodes already captured for it.
    pub(crate) fn overwrite_symbol_in_place(&mut self, id: TypeId, new_sym: TypeSymbol) {
        let idx = id.index() as usize;
        if idx == 0 || idx >= self.symbols.len() {
            self.invariant_violation(id);
        }
        self.symbols[idx] = new_sym;
    }

    /// Iterate every registered struct/interface/sum-type TypeId — used by
    /// `complete_interface_check`'s exhaustive sweep.
    pub fn all_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        (1..self.symbols.len() as u32).map(TypeId::new)
    }
}

fn unqualified(name: &str) -> &str {
    name.rsplit_once('.').map(|(_, n)| n).unwrap_or(name)
}

/// Builds the key `register_fn`/`get_fn` key on: methods are keyed by
/// `Receiver.name`, free functions by `module.name` (unqualified for
/// `main`, matching the "Names in module `main`" lookup convenience).
fn fn_key(module: &str, name: &str, receiver: &TypeId, table: &TypeTable) -> String {
    if !receiver.is_none() {
        let recv_name = table.sym(*receiver).canonical_name.clone();
        return format!("{recv_name}.{name}");
    }
    if module == MAIN_MODULE {
        name.to_string()
    } else {
        format!("{module}.{name}")
    }
}

#[cfg(test)]
#[path = "tests/table.rs"]
mod tests;
