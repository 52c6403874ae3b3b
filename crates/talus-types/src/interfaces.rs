//! Interface conformance (§4.1.5).

use crate::errors::TableError;
use crate::symbol::{FieldDescriptor, FunctionDescriptor, SourceLang, TypeInfo};
use crate::table::TypeTable;
use crate::type_id::TypeId;

fn numeric_widenable(a: TypeId, b: TypeId, lang: SourceLang) -> bool {
    // A C-declared or JS-declared callee widens numeric/bool/placeholder-
    // pointer interchangeably (§4.2.4 point 5, "matching parameter types
    // modulo JS-language bridge"); the same bridge applies when checking
    // whether a C/JS-sourced method satisfies an interface's signature.
    matches!(lang, SourceLang::C | SourceLang::Js) && a != b
}

impl TypeTable {
    fn params_compatible(&self, candidate: &FunctionDescriptor, required: &FunctionDescriptor) -> bool {
        if candidate.params.len() != required.params.len() {
            return false;
        }
        candidate.params.iter().zip(required.params.iter()).all(|(c, r)| {
            c.typ.base() == r.typ.base()
                || numeric_widenable(c.typ, r.typ, candidate.source_lang)
                || numeric_widenable(c.typ, r.typ, required.source_lang)
        })
    }

    fn receiver_mutability_compatible(&self, candidate: &FunctionDescriptor, required: &FunctionDescriptor) -> bool {
        use crate::type_id::TypeFlags;
        if required.receiver.has_flag(TypeFlags::MUT_SHARE) {
            candidate.receiver.has_flag(TypeFlags::MUT_SHARE)
        } else {
            true
        }
    }

    fn methods_compatible(&self, candidate: &FunctionDescriptor, required: &FunctionDescriptor) -> bool {
        candidate.return_type.base() == required.return_type.base()
            && self.params_compatible(candidate, required)
            && self.receiver_mutability_compatible(candidate, required)
    }

    fn fields_compatible(&self, candidate: &FieldDescriptor, required: &FieldDescriptor) -> bool {
        let type_ok = candidate.typ.base() == required.typ.base() || required.typ.base() == self.builtins.voidptr;
        let mut_ok = !required.is_mut || candidate.is_mut;
        type_ok && mut_ok
    }

    /// `does_type_implement_interface(typ, iface)` (§4.1.5).
    ///
    /// On success, extends the interface's implementing-types set with
    /// `typ` (plus `voidptr` as an escape hatch), unless `single_impl` is
    /// set and an implementation is already recorded.
    pub fn does_type_implement_interface(&mut self, typ: TypeId, iface: TypeId) -> Result<bool, TableError> {
        if typ == iface {
            return Ok(true);
        }
        if typ.is_none() && iface.base() == self.builtins.error {
            return Ok(true);
        }

        // Interface-to-interface "implementation" is forbidden.
        if matches!(self.try_sym(typ)?.info, TypeInfo::Interface(_)) {
            return Ok(false);
        }

        let (methods, fields, single_impl) = {
            let TypeInfo::Interface(info) = &self.try_sym(iface)?.info else {
                return Ok(false);
            };
            (info.methods.clone(), info.fields.clone(), info.single_impl)
        };

        for m in &methods {
            match self.find_method_with_embeds(typ, &m.name)? {
                Some(candidate) if self.methods_compatible(candidate, m) => {}
                _ => return Ok(false),
            }
        }
        for f in &fields {
            match self.find_field_with_embeds(typ, &f.name)? {
                Some(candidate) if self.fields_compatible(&candidate, f) => {}
                _ => return Ok(false),
            }
        }

        if let TypeInfo::Interface(info) = &self.try_sym(iface)?.info {
            let mut implementing = info.implementing.borrow_mut();
            if !single_impl || implementing.is_empty() {
                implementing.insert(typ.base());
                implementing.insert(self.builtins.voidptr);
            }
        }
        Ok(true)
    }

    /// `complete_interface_check()` (§4.1.5): the exhaustive M×N sweep run
    /// once all declarations are known. A trivially empty interface (no
    /// methods, no fields — satisfied by everything) is short-circuited to
    /// same-module struct pairs only, since checking it against every
    /// struct in the program is pure overhead with no diagnostic value.
    pub fn complete_interface_check(&mut self) {
        let interface_ids: Vec<TypeId> = self
            .all_ids()
            .filter(|id| matches!(self.sym(*id).info, TypeInfo::Interface(_)))
            .collect();
        let struct_ids: Vec<TypeId> =
            self.all_ids().filter(|id| matches!(self.sym(*id).info, TypeInfo::Struct(_))).collect();

        for iface in interface_ids {
            let (iface_module, trivially_empty) = {
                let s = self.sym(iface);
                let TypeInfo::Interface(info) = &s.info else { unreachable!("filtered above") };
                (s.module.clone(), info.methods.is_empty() && info.fields.is_empty())
            };
            for &st in &struct_ids {
                if trivially_empty && self.sym(st).module != iface_module {
                    continue;
                }
                let _ = self.does_type_implement_interface(st, iface);
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/interfaces.rs"]
mod tests;
