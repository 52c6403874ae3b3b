//! Generic resolution, materialization, and call-site inference (§4.1.6).

use crate::naming;
use crate::symbol::{
    FieldDescriptor, FunctionDescriptor, InterfaceInfo, LiteralKind, ParamDescriptor, StructInfo,
    SumTypeInfo, TypeInfo, TypeSymbol,
};
use crate::table::TypeTable;
use crate::type_id::{TypeFlags, TypeId};
use talus_common::limits::MAX_GENERIC_INSTANTIATION_DEPTH;

/// Inference failures from `infer_fn_generic_types` (§4.1.6, §8). Carries
/// the offending generic parameter's name so the checker can format
/// `AMBIGUOUS_GENERIC_INFERENCE`/`UNBOUND_GENERIC_PARAMETER` directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InferenceError {
    Ambiguous(String),
    Unbound(String),
}

impl TypeTable {
    /// `resolve_generic_to_concrete(generic_type, generic_names,
    /// concrete_types)` (§4.1.6): pure substitution, no new TypeSymbols are
    /// created for anything except composite wrapper kinds (array/map/...)
    /// via the existing `find_or_register_*` constructors; generic
    /// struct/interface/sum-type heads delegate to `unwrap_generic_type`.
    pub fn resolve_generic_to_concrete(
        &mut self,
        generic_type: TypeId,
        generic_names: &[String],
        concrete_types: &[TypeId],
    ) -> TypeId {
        let result = self.resolve_generic_to_concrete_depth(generic_type, generic_names, concrete_types, 0);
        if result.is_none() {
            return result;
        }
        if self.type_references_any(result, generic_names, 0) {
            result.with_flag(TypeFlags::GENERIC)
        } else {
            result.clear_flag(TypeFlags::GENERIC)
        }
    }

    fn resolve_generic_to_concrete_depth(
        &mut self,
        generic_type: TypeId,
        generic_names: &[String],
        concrete_types: &[TypeId],
        depth: u32,
    ) -> TypeId {
        if depth > MAX_GENERIC_INSTANTIATION_DEPTH {
            return generic_type;
        }
        let base = generic_type.base();
        let name = self.sym(base).canonical_name.clone();
        if let Some(pos) = generic_names.iter().position(|n| n == &name) {
            return match concrete_types.get(pos) {
                Some(&c) => c.set_nr_muls(generic_type.nr_muls().saturating_add(c.nr_muls())),
                None => TypeId::NONE,
            };
        }

        let info = self.sym(base).info.clone();
        match info {
            TypeInfo::Array { elem, nr_dims } => {
                let new_elem = self.resolve_generic_to_concrete_depth(elem, generic_names, concrete_types, depth + 1);
                self.find_or_register_array_with_dims(new_elem, nr_dims)
            }
            TypeInfo::ArrayFixed { elem, size, size_expr } => {
                let new_elem = self.resolve_generic_to_concrete_depth(elem, generic_names, concrete_types, depth + 1);
                self.find_or_register_array_fixed(new_elem, size, size_expr)
            }
            TypeInfo::Map { key, value } => {
                let nk = self.resolve_generic_to_concrete_depth(key, generic_names, concrete_types, depth + 1);
                let nv = self.resolve_generic_to_concrete_depth(value, generic_names, concrete_types, depth + 1);
                self.find_or_register_map(nk, nv)
            }
            TypeInfo::Chan { elem, is_mut } => {
                let ne = self.resolve_generic_to_concrete_depth(elem, generic_names, concrete_types, depth + 1);
                self.find_or_register_chan(ne, is_mut)
            }
            TypeInfo::Thread { ret } => {
                let nr = self.resolve_generic_to_concrete_depth(ret, generic_names, concrete_types, depth + 1);
                self.find_or_register_thread(nr)
            }
            TypeInfo::Promise { ret } => {
                let nr = self.resolve_generic_to_concrete_depth(ret, generic_names, concrete_types, depth + 1);
                self.find_or_register_promise(nr)
            }
            TypeInfo::MultiReturn(types) => {
                let new_types: Vec<TypeId> = types
                    .iter()
                    .map(|t| self.resolve_generic_to_concrete_depth(*t, generic_names, concrete_types, depth + 1))
                    .collect();
                self.find_or_register_multi_return(new_types)
            }
            TypeInfo::Function(desc) => {
                let mut new_desc = desc.clone();
                new_desc.return_type =
                    self.resolve_generic_to_concrete_depth(desc.return_type, generic_names, concrete_types, depth + 1);
                for p in &mut new_desc.params {
                    p.typ = self.resolve_generic_to_concrete_depth(p.typ, generic_names, concrete_types, depth + 1);
                }
                let module = new_desc.module.clone();
                self.find_or_register_fn_type(&module, new_desc, true, false)
            }
            TypeInfo::Struct(s) if s.is_generic => self.unwrap_generic_type(base, generic_names, concrete_types),
            TypeInfo::Interface(i) if !i.generic_names.is_empty() => {
                self.unwrap_generic_type(base, generic_names, concrete_types)
            }
            TypeInfo::SumType(s) if !s.generic_names.is_empty() => {
                self.unwrap_generic_type(base, generic_names, concrete_types)
            }
            TypeInfo::GenericInst { parent, concrete } => {
                let new_concrete: Vec<TypeId> = concrete
                    .iter()
                    .map(|t| self.resolve_generic_to_concrete_depth(*t, generic_names, concrete_types, depth + 1))
                    .collect();
                let own_names = self.generic_names_of(parent);
                self.unwrap_generic_type(parent, &own_names, &new_concrete)
            }
            _ => generic_type,
        }
    }

    fn type_references_any(&self, typ: TypeId, generic_names: &[String], depth: u32) -> bool {
        if depth > MAX_GENERIC_INSTANTIATION_DEPTH || typ.is_none() {
            return false;
        }
        let base = typ.base();
        let s = self.sym(base);
        if generic_names.contains(&s.canonical_name) {
            return true;
        }
        match &s.info {
            TypeInfo::Array { elem, .. } | TypeInfo::ArrayFixed { elem, .. } => {
                self.type_references_any(*elem, generic_names, depth + 1)
            }
            TypeInfo::Map { key, value } => {
                self.type_references_any(*key, generic_names, depth + 1)
                    || self.type_references_any(*value, generic_names, depth + 1)
            }
            TypeInfo::Chan { elem, .. } => self.type_references_any(*elem, generic_names, depth + 1),
            TypeInfo::Thread { ret } | TypeInfo::Promise { ret } => {
                self.type_references_any(*ret, generic_names, depth + 1)
            }
            TypeInfo::MultiReturn(types) => {
                types.iter().any(|t| self.type_references_any(*t, generic_names, depth + 1))
            }
            TypeInfo::Struct(info) => info.is_generic,
            TypeInfo::Interface(info) => !info.generic_names.is_empty(),
            TypeInfo::SumType(info) => !info.generic_names.is_empty(),
            TypeInfo::GenericInst { concrete, .. } => {
                concrete.iter().any(|t| self.type_references_any(*t, generic_names, depth + 1))
            }
            _ => false,
        }
    }

    fn generic_names_of(&self, typ: TypeId) -> Vec<String> {
        match &self.sym(typ.base()).info {
            TypeInfo::Struct(i) => i.generic_names.clone(),
            TypeInfo::Interface(i) => i.generic_names.clone(),
            TypeInfo::SumType(i) => i.generic_names.clone(),
            _ => Vec::new(),
        }
    }

    fn substitute_fn(&mut self, f: &FunctionDescriptor, names: &[String], concrete: &[TypeId]) -> FunctionDescriptor {
        let mut new_f = f.clone();
        new_f.return_type = self.resolve_generic_to_concrete(f.return_type, names, concrete);
        new_f.params = f
            .params
            .iter()
            .map(|p| ParamDescriptor {
                name: p.name.clone(),
                typ: self.resolve_generic_to_concrete(p.typ, names, concrete),
                is_mut: p.is_mut,
                is_hidden: p.is_hidden,
            })
            .collect();
        new_f.generic_names = Vec::new();
        new_f
    }

    /// `unwrap_generic_type(type, generic_names, concrete_types)`
    /// (§4.1.6): full materialization of a generic struct/interface/sum
    /// type under the given bindings, registered under `Name<T1, T2, …>`.
    pub fn unwrap_generic_type(
        &mut self,
        typ: TypeId,
        generic_names: &[String],
        concrete_types: &[TypeId],
    ) -> TypeId {
        let base = typ.base();
        let s = self.sym(base).clone();
        match &s.info {
            TypeInfo::Struct(info) if info.is_generic => {
                let own_names = &info.generic_names;
                let own_concrete = self.positional_bindings(own_names, generic_names, concrete_types);
                let concrete_names: Vec<String> =
                    own_concrete.iter().map(|t| self.sym(*t).canonical_name.clone()).collect();
                let canonical_name = naming::generic_inst_canonical(&s.canonical_name, &concrete_names);
                if let Some((id, _)) = self.find_sym_and_idx(&canonical_name) {
                    return id;
                }
                let new_fields: Vec<FieldDescriptor> = info
                    .fields
                    .iter()
                    .map(|f| FieldDescriptor {
                        name: f.name.clone(),
                        typ: self.resolve_generic_to_concrete(f.typ, own_names, &own_concrete),
                        is_mut: f.is_mut,
                        is_pub: f.is_pub,
                        is_global: f.is_global,
                    })
                    .collect();
                let new_embeds: Vec<TypeId> =
                    info.embeds.iter().map(|e| self.resolve_generic_to_concrete(*e, own_names, &own_concrete)).collect();
                let new_struct = StructInfo {
                    fields: new_fields,
                    embeds: new_embeds,
                    generic_names: Vec::new(),
                    concrete_params: own_concrete.clone(),
                    is_generic: false,
                    is_union: info.is_union,
                    is_heap: info.is_heap,
                };
                let new_methods: Vec<FunctionDescriptor> =
                    s.methods.iter().map(|m| self.substitute_fn(m, own_names, &own_concrete)).collect();
                self.register_sym(TypeSymbol {
                    canonical_name: canonical_name.clone(),
                    mangled_name: naming::mangle_fragment(&canonical_name),
                    module: s.module.clone(),
                    source_lang: s.source_lang,
                    parent: TypeId::NONE,
                    methods: new_methods,
                    info: TypeInfo::Struct(new_struct),
                })
            }
            TypeInfo::Interface(info) if !info.generic_names.is_empty() => {
                let own_names = &info.generic_names;
                let own_concrete = self.positional_bindings(own_names, generic_names, concrete_types);
                let concrete_names: Vec<String> =
                    own_concrete.iter().map(|t| self.sym(*t).canonical_name.clone()).collect();
                let canonical_name = naming::generic_inst_canonical(&s.canonical_name, &concrete_names);
                if let Some((id, _)) = self.find_sym_and_idx(&canonical_name) {
                    return id;
                }
                let new_fields: Vec<FieldDescriptor> = info
                    .fields
                    .iter()
                    .map(|f| FieldDescriptor {
                        name: f.name.clone(),
                        typ: self.resolve_generic_to_concrete(f.typ, own_names, &own_concrete),
                        is_mut: f.is_mut,
                        is_pub: f.is_pub,
                        is_global: f.is_global,
                    })
                    .collect();
                let new_methods: Vec<FunctionDescriptor> =
                    info.methods.iter().map(|m| self.substitute_fn(m, own_names, &own_concrete)).collect();
                let new_embeds: Vec<TypeId> =
                    info.embeds.iter().map(|e| self.resolve_generic_to_concrete(*e, own_names, &own_concrete)).collect();
                let new_iface = InterfaceInfo {
                    fields: new_fields,
                    methods: new_methods,
                    embeds: new_embeds,
                    implementing: std::cell::RefCell::new(std::collections::HashSet::new()),
                    generic_names: Vec::new(),
                    concrete_params: own_concrete.clone(),
                    single_impl: info.single_impl,
                    embeds_expanded: std::cell::RefCell::new(false),
                };
                self.register_sym(TypeSymbol {
                    canonical_name: canonical_name.clone(),
                    mangled_name: naming::mangle_fragment(&canonical_name),
                    module: s.module.clone(),
                    source_lang: s.source_lang,
                    parent: TypeId::NONE,
                    methods: Vec::new(),
                    info: TypeInfo::Interface(new_iface),
                })
            }
            TypeInfo::SumType(info) if !info.generic_names.is_empty() => {
                let own_names = &info.generic_names;
                let own_concrete = self.positional_bindings(own_names, generic_names, concrete_types);
                let concrete_names: Vec<String> =
                    own_concrete.iter().map(|t| self.sym(*t).canonical_name.clone()).collect();
                let canonical_name = naming::generic_inst_canonical(&s.canonical_name, &concrete_names);
                if let Some((id, _)) = self.find_sym_and_idx(&canonical_name) {
                    return id;
                }
                let new_variants: Vec<TypeId> = info
                    .variants
                    .iter()
                    .map(|v| self.resolve_generic_to_concrete(*v, own_names, &own_concrete))
                    .collect();
                let new_sum = SumTypeInfo {
                    variants: new_variants,
                    common_fields: std::cell::RefCell::new(None),
                    generic_names: Vec::new(),
                    concrete_params: own_concrete.clone(),
                };
                self.register_sym(TypeSymbol {
                    canonical_name: canonical_name.clone(),
                    mangled_name: naming::mangle_fragment(&canonical_name),
                    module: s.module.clone(),
                    source_lang: s.source_lang,
                    parent: TypeId::NONE,
                    methods: Vec::new(),
                    info: TypeInfo::SumType(new_sum),
                })
            }
            _ => typ,
        }
    }

    /// Maps a generic head's own parameter names onto the caller's
    /// `(generic_names, concrete_types)` binding, defaulting to
    /// `TypeId::NONE` for any name the caller doesn't bind (the head is
    /// itself being resolved one level up, e.g. a nested `List<V>` inside
    /// `Map<K, V>`).
    fn positional_bindings(&self, own_names: &[String], generic_names: &[String], concrete_types: &[TypeId]) -> Vec<TypeId> {
        own_names
            .iter()
            .map(|n| {
                generic_names
                    .iter()
                    .position(|gn| gn == n)
                    .and_then(|i| concrete_types.get(i).copied())
                    .unwrap_or(TypeId::NONE)
            })
            .collect()
    }

    /// `generic_insts_to_concrete()` (§4.1.6): rewrites every parsed-but-
    /// not-yet-instantiated `generic_inst` placeholder into a real
    /// materialized symbol, in place, as an alias so existing `TypeId`s
    /// referencing the placeholder keep working.
    pub fn generic_insts_to_concrete(&mut self) {
        let pending: Vec<(TypeId, TypeId, Vec<TypeId>)> = self
            .all_ids()
            .filter_map(|id| {
                if let TypeInfo::GenericInst { parent, concrete } = &self.sym(id).info {
                    Some((id, *parent, concrete.clone()))
                } else {
                    None
                }
            })
            .collect();

        for (id, parent, concrete) in pending {
            let own_names = self.generic_names_of(parent);
            let materialized = self.unwrap_generic_type(parent, &own_names, &concrete);
            let canonical_name = self.sym(id).canonical_name.clone();
            let mangled_name = self.sym(id).mangled_name.clone();
            let module = self.sym(id).module.clone();
            let source_lang = self.sym(id).source_lang;
            self.overwrite_symbol_in_place(
                id,
                TypeSymbol {
                    canonical_name,
                    mangled_name,
                    module,
                    source_lang,
                    parent: materialized,
                    methods: Vec::new(),
                    info: TypeInfo::Alias,
                },
            );
        }
    }

    fn width_rank(&self, t: TypeId) -> u8 {
        match &self.sym(t.base()).info {
            TypeInfo::Primitive(p) => p.width_rank(),
            TypeInfo::Literal(LiteralKind::Integer) => 1,
            TypeInfo::Literal(LiteralKind::Float) => 5,
            _ => 0,
        }
    }

    fn is_numeric_ish(&self, t: TypeId) -> bool {
        matches!(
            &self.sym(t.base()).info,
            TypeInfo::Primitive(p) if p.is_numeric()
        ) || matches!(&self.sym(t.base()).info, TypeInfo::Literal(_))
    }

    fn promote_numeric(&self, a: TypeId, b: TypeId) -> TypeId {
        if self.width_rank(a) >= self.width_rank(b) { a } else { b }
    }

    /// `infer_fn_generic_types(fn, call)` (§4.1.6, checker-driven,
    /// table-assisted): bind each of `generic_names` from the declared
    /// `params` against the call's `arg_types`, in positional order.
    pub fn infer_fn_generic_types(
        &self,
        params: &[ParamDescriptor],
        generic_names: &[String],
        arg_types: &[TypeId],
    ) -> Result<Vec<TypeId>, InferenceError> {
        let mut bindings: Vec<Option<TypeId>> = vec![None; generic_names.len()];
        for (param, &arg) in params.iter().zip(arg_types.iter()) {
            self.infer_one(param.typ, arg, generic_names, &mut bindings, 0)?;
        }
        bindings
            .into_iter()
            .enumerate()
            .map(|(i, b)| b.ok_or_else(|| InferenceError::Unbound(generic_names[i].clone())))
            .collect()
    }

    fn infer_one(
        &self,
        param_ty: TypeId,
        arg_ty: TypeId,
        generic_names: &[String],
        bindings: &mut [Option<TypeId>],
        depth: u32,
    ) -> Result<(), InferenceError> {
        if depth > MAX_GENERIC_INSTANTIATION_DEPTH || arg_ty.is_none() {
            return Ok(());
        }
        let param_base = param_ty.base();
        let name = self.sym(param_base).canonical_name.clone();
        if let Some(pos) = generic_names.iter().position(|n| n == &name) {
            return self.bind(pos, arg_ty, generic_names, bindings);
        }
        match (&self.sym(param_base).info, &self.sym(arg_ty.base()).info) {
            (TypeInfo::Array { elem: pe, .. }, TypeInfo::Array { elem: ae, .. }) => {
                self.infer_one(*pe, *ae, generic_names, bindings, depth + 1)
            }
            (TypeInfo::ArrayFixed { elem: pe, .. }, TypeInfo::ArrayFixed { elem: ae, .. }) => {
                self.infer_one(*pe, *ae, generic_names, bindings, depth + 1)
            }
            (TypeInfo::Map { key: pk, value: pv }, TypeInfo::Map { key: ak, value: av }) => {
                self.infer_one(*pk, *ak, generic_names, bindings, depth + 1)?;
                self.infer_one(*pv, *av, generic_names, bindings, depth + 1)
            }
            (TypeInfo::Struct(pinfo), TypeInfo::Struct(ainfo))
                if !pinfo.generic_names.is_empty() && pinfo.concrete_params.len() == ainfo.concrete_params.len() =>
            {
                for (pp, ap) in pinfo.concrete_params.iter().zip(ainfo.concrete_params.iter()) {
                    self.infer_one(*pp, *ap, generic_names, bindings, depth + 1)?;
                }
                Ok(())
            }
            (TypeInfo::Interface(pinfo), TypeInfo::Interface(ainfo))
                if !pinfo.generic_names.is_empty() && pinfo.concrete_params.len() == ainfo.concrete_params.len() =>
            {
                for (pp, ap) in pinfo.concrete_params.iter().zip(ainfo.concrete_params.iter()) {
                    self.infer_one(*pp, *ap, generic_names, bindings, depth + 1)?;
                }
                Ok(())
            }
            (TypeInfo::SumType(pinfo), TypeInfo::SumType(ainfo))
                if !pinfo.generic_names.is_empty() && pinfo.concrete_params.len() == ainfo.concrete_params.len() =>
            {
                for (pp, ap) in pinfo.concrete_params.iter().zip(ainfo.concrete_params.iter()) {
                    self.infer_one(*pp, *ap, generic_names, bindings, depth + 1)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn bind(
        &self,
        pos: usize,
        arg_ty: TypeId,
        generic_names: &[String],
        bindings: &mut [Option<TypeId>],
    ) -> Result<(), InferenceError> {
        match bindings[pos] {
            None => {
                bindings[pos] = Some(arg_ty);
                Ok(())
            }
            Some(existing) if existing.base() == arg_ty.base() => Ok(()),
            Some(existing) => {
                if self.is_numeric_ish(existing) && self.is_numeric_ish(arg_ty) {
                    bindings[pos] = Some(self.promote_numeric(existing, arg_ty));
                    Ok(())
                } else {
                    Err(InferenceError::Ambiguous(generic_names[pos].clone()))
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/generics.rs"]
mod tests;
