//! Method and field lookup through inheritance/embedding chains (§4.1.4).

use crate::errors::TableError;
use crate::symbol::{FieldDescriptor, FunctionDescriptor, SumTypeInfo, TypeInfo};
use crate::table::TypeTable;
use crate::type_id::TypeId;

/// Defensive cutoff on alias-chain walks inside `find_method`/`find_field`,
/// distinct from `final_sym`'s single-hop contract: a *method* lookup may
/// legitimately walk several alias hops (`type A = B`, `type B = C`, ...)
/// before reaching a kind that owns methods directly.
const MAX_ALIAS_WALK: u32 = 64;

impl TypeTable {
    /// `find_method(sym, name)` (§4.1.4): walks parent aliases upward,
    /// returning the first direct method match. For an `aggregate`,
    /// computes the intersection method across members.
    #[must_use]
    pub fn find_method(&self, typ: TypeId, name: &str) -> Option<&FunctionDescriptor> {
        let mut current = typ.base();
        for _ in 0..MAX_ALIAS_WALK {
            let s = self.sym(current);
            if let Some(m) = s.methods.iter().find(|m| m.name == name) {
                return Some(m);
            }
            if let TypeInfo::Aggregate(members) = &s.info {
                return self.find_aggregate_method(members, name);
            }
            if matches!(s.info, TypeInfo::Alias) && !s.parent.is_none() {
                current = s.parent;
                continue;
            }
            return None;
        }
        None
    }

    /// The aggregate's method is the one shared, identically resolvable,
    /// method across every matched variant — any variant missing it means
    /// the aggregate doesn't expose it (§4.1.4, GLOSSARY "Aggregate").
    fn find_aggregate_method(&self, members: &[TypeId], name: &str) -> Option<&FunctionDescriptor> {
        let mut result: Option<&FunctionDescriptor> = None;
        for &m in members {
            match self.find_method_with_embeds(m, name).ok().flatten() {
                Some(f) => {
                    if result.is_none() {
                        result = Some(f);
                    }
                }
                None => return None,
            }
        }
        result
    }

    fn embeds_of(&self, typ: TypeId) -> &[TypeId] {
        match &self.sym(typ).info {
            TypeInfo::Struct(info) => &info.embeds,
            TypeInfo::Interface(info) => &info.embeds,
            TypeInfo::Aggregate(members) => members,
            _ => &[],
        }
    }

    /// `find_method_from_embeds(sym, name)` (§4.1.4): breadth search over
    /// embedded types; ambiguous when more than one embed contributes.
    pub fn find_method_from_embeds(
        &self,
        typ: TypeId,
        name: &str,
    ) -> Result<Option<&FunctionDescriptor>, TableError> {
        let embeds = self.embeds_of(typ);
        let mut found: Vec<(TypeId, &FunctionDescriptor)> = Vec::new();
        for &e in embeds {
            if let Some(m) = self.find_method_with_embeds(e, name)? {
                found.push((e, m));
            }
        }
        match found.len() {
            0 => Ok(None),
            1 => Ok(Some(found[0].1)),
            _ => Err(TableError::AmbiguousEmbedMember {
                type_name: self.sym(typ).canonical_name.clone(),
                member: name.to_string(),
                candidates: found.iter().map(|(e, _)| self.sym(*e).canonical_name.clone()).collect(),
            }),
        }
    }

    /// `find_method_with_embeds`: direct lookup then embed lookup.
    pub fn find_method_with_embeds(
        &self,
        typ: TypeId,
        name: &str,
    ) -> Result<Option<&FunctionDescriptor>, TableError> {
        if let Some(m) = self.find_method(typ, name) {
            return Ok(Some(m));
        }
        self.find_method_from_embeds(typ, name)
    }

    /// `find_field(sym, name)` (§4.1.4).
    pub fn find_field(&self, typ: TypeId, name: &str) -> Result<Option<FieldDescriptor>, TableError> {
        let s = self.sym(typ);
        match &s.info {
            TypeInfo::Struct(info) => Ok(info.fields.iter().find(|f| f.name == name).cloned()),
            TypeInfo::Interface(info) => Ok(info.fields.iter().find(|f| f.name == name).cloned()),
            TypeInfo::Aggregate(members) => self.find_aggregate_field(members, name),
            TypeInfo::SumType(info) => {
                self.ensure_sum_common_fields(info)?;
                let cache = info.common_fields.borrow();
                Ok(cache.as_ref().and_then(|fields| fields.iter().find(|f| f.name == name).cloned()))
            }
            _ => Ok(None),
        }
    }

    fn find_aggregate_field(
        &self,
        members: &[TypeId],
        name: &str,
    ) -> Result<Option<FieldDescriptor>, TableError> {
        let mut result: Option<FieldDescriptor> = None;
        for &m in members {
            match self.find_field_with_embeds(m, name)? {
                Some(f) => match &result {
                    None => result = Some(f),
                    Some(existing) if existing.typ == f.typ => {}
                    Some(_) => return Ok(None),
                },
                None => return Ok(None),
            }
        }
        Ok(result)
    }

    /// Lazily computes and caches a sum type's common fields (§9: "Lazy
    /// sum-type field common-set"): a field is common when it appears with
    /// the same type in every variant.
    fn ensure_sum_common_fields(&self, info: &SumTypeInfo) -> Result<(), TableError> {
        if info.common_fields.borrow().is_some() {
            return Ok(());
        }
        let mut common: Option<Vec<FieldDescriptor>> = None;
        for &variant in &info.variants {
            let fields = self.direct_fields(variant);
            common = Some(match common {
                None => fields,
                Some(prev) => prev
                    .into_iter()
                    .filter(|f| fields.iter().any(|g| g.name == f.name && g.typ == f.typ))
                    .collect(),
            });
        }
        *info.common_fields.borrow_mut() = Some(common.unwrap_or_default());
        Ok(())
    }

    fn direct_fields(&self, typ: TypeId) -> Vec<FieldDescriptor> {
        match &self.sym(typ).info {
            TypeInfo::Struct(info) => info.fields.clone(),
            TypeInfo::Interface(info) => info.fields.clone(),
            _ => Vec::new(),
        }
    }

    /// `find_field_from_embeds` (§4.1.4): mirrors the method case.
    pub fn find_field_from_embeds(
        &self,
        typ: TypeId,
        name: &str,
    ) -> Result<Option<FieldDescriptor>, TableError> {
        let embeds = self.embeds_of(typ);
        let mut found: Vec<(TypeId, FieldDescriptor)> = Vec::new();
        for &e in embeds {
            if let Some(f) = self.find_field_with_embeds(e, name)? {
                found.push((e, f));
            }
        }
        match found.len() {
            0 => Ok(None),
            1 => Ok(Some(found.pop().expect("len == 1").1)),
            _ => Err(TableError::AmbiguousEmbedMember {
                type_name: self.sym(typ).canonical_name.clone(),
                member: name.to_string(),
                candidates: found.iter().map(|(e, _)| self.sym(*e).canonical_name.clone()).collect(),
            }),
        }
    }

    pub fn find_field_with_embeds(
        &self,
        typ: TypeId,
        name: &str,
    ) -> Result<Option<FieldDescriptor>, TableError> {
        if let Some(f) = self.find_field(typ, name)? {
            return Ok(Some(f));
        }
        self.find_field_from_embeds(typ, name)
    }
}

#[cfg(test)]
#[path = "tests/lookup.rs"]
mod tests;
