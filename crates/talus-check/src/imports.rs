//! Import resolution (§4.2.1 pass 1, run before declarations are checked):
//! a structural, type-table-independent index of what every module
//! declares, used to validate `import` statements and to bring imported
//! consts/globals into scope under their local (possibly aliased) name.

use rustc_hash::FxHashMap;
use std::collections::HashSet;

use talus_ast::File;
use talus_common::diagnostics::diagnostic_codes;

use crate::context::CheckerContext;
use crate::scope::{Binding, BindingKind};

/// What module declares which names, gathered structurally (no `TypeId`
/// resolution) so it can be built once, before any file is type-checked.
#[derive(Default)]
pub struct ModuleIndex {
    /// module -> const name -> declared type hint, if any.
    consts: FxHashMap<String, FxHashMap<String, Option<String>>>,
    /// module -> global name -> declared type name.
    globals: FxHashMap<String, FxHashMap<String, String>>,
    /// module -> every struct/interface/enum/type-alias name it declares.
    types: FxHashMap<String, HashSet<String>>,
    /// module -> every free (non-method) function name it declares.
    fns: FxHashMap<String, HashSet<String>>,
}

impl ModuleIndex {
    pub fn build(files: &[File]) -> Self {
        let mut index = ModuleIndex::default();
        for file in files {
            let consts = index.consts.entry(file.module.clone()).or_default();
            for c in &file.consts {
                consts.insert(c.name.clone(), c.type_hint.clone());
            }
            let globals = index.globals.entry(file.module.clone()).or_default();
            for g in &file.globals {
                globals.insert(g.name.clone(), g.type_name.clone());
            }
            let types = index.types.entry(file.module.clone()).or_default();
            types.extend(file.structs.iter().map(|s| s.name.clone()));
            types.extend(file.interfaces.iter().map(|i| i.name.clone()));
            types.extend(file.enums.iter().map(|e| e.name.clone()));
            types.extend(file.type_decls.iter().map(|t| t.name.clone()));
            let fns = index.fns.entry(file.module.clone()).or_default();
            fns.extend(file.fns.iter().filter(|f| f.receiver.is_none()).map(|f| f.name.clone()));
        }
        index
    }

    fn module_known(&self, module: &str) -> bool {
        self.consts.contains_key(module) || self.globals.contains_key(module) || self.types.contains_key(module) || self.fns.contains_key(module)
    }

    fn symbol_kind(&self, module: &str, name: &str) -> Option<SymbolKind> {
        if self.consts.get(module).is_some_and(|m| m.contains_key(name)) {
            return Some(SymbolKind::Const);
        }
        if self.globals.get(module).is_some_and(|m| m.contains_key(name)) {
            return Some(SymbolKind::Global);
        }
        if self.types.get(module).is_some_and(|m| m.contains(name)) {
            return Some(SymbolKind::Type);
        }
        if self.fns.get(module).is_some_and(|m| m.contains(name)) {
            return Some(SymbolKind::Fn);
        }
        None
    }
}

enum SymbolKind {
    Const,
    Global,
    Type,
    Fn,
}

/// Validates and applies every `import` in `file`: reports `DUPLICATE_IMPORT`
/// for a module imported twice, `IMPORT_SYMBOL_NOT_FOUND` for a named symbol
/// (or whole module) that doesn't exist, `IMPORT_SHADOWS_CONSTANT` when an
/// imported name collides with a const this file already declares, and
/// brings imported consts/globals into the current (module) scope under
/// their local name.
pub fn check_imports(ctx: &mut CheckerContext<'_>, index: &ModuleIndex, file: &File) {
    let mut seen_modules: HashSet<String> = HashSet::new();
    let local_const_names: HashSet<&str> = file.consts.iter().map(|c| c.name.as_str()).collect();

    for import in &file.imports {
        let key = import.alias.clone().unwrap_or_else(|| import.module.clone());
        if !seen_modules.insert(key) {
            ctx.report(import.span.start, import.span.len(), diagnostic_codes::DUPLICATE_IMPORT, &[&import.module]);
            continue;
        }

        if !index.module_known(&import.module) {
            ctx.report(import.span.start, import.span.len(), diagnostic_codes::IMPORT_SYMBOL_NOT_FOUND, &[&import.module]);
            continue;
        }

        if import.names.is_empty() {
            continue;
        }

        for imported in &import.names {
            let Some(kind) = index.symbol_kind(&import.module, &imported.name) else {
                ctx.report(
                    imported.span.start,
                    imported.span.len(),
                    diagnostic_codes::IMPORT_SYMBOL_NOT_FOUND,
                    &[&format!("{}.{}", import.module, imported.name)],
                );
                continue;
            };

            let local_name = imported.alias.clone().unwrap_or_else(|| imported.name.clone());
            if local_const_names.contains(local_name.as_str()) {
                ctx.report(imported.span.start, imported.span.len(), diagnostic_codes::IMPORT_SHADOWS_CONSTANT, &[&local_name]);
                continue;
            }

            declare_imported_symbol(ctx, index, &import.module, &imported.name, &local_name, kind, imported.span);
        }
    }
}

fn declare_imported_symbol(
    ctx: &mut CheckerContext<'_>,
    index: &ModuleIndex,
    module: &str,
    name: &str,
    local_name: &str,
    kind: SymbolKind,
    span: talus_common::Span,
) {
    match kind {
        SymbolKind::Const => {
            let typ = match index.consts.get(module).and_then(|m| m.get(name)).cloned().flatten() {
                Some(hint) => ctx.resolve_type_name(&hint),
                None => talus_types::TypeId::NONE,
            };
            ctx.scopes.declare(
                local_name.to_string(),
                Binding { typ, kind: BindingKind::Const, is_mut: false, is_shared: false, declared_at: span, used: false, mutated: false },
            );
        }
        SymbolKind::Global => {
            let type_name = index.globals.get(module).and_then(|m| m.get(name)).cloned().unwrap_or_default();
            let typ = ctx.resolve_type_name(&type_name);
            ctx.scopes.declare(
                local_name.to_string(),
                Binding { typ, kind: BindingKind::Global, is_mut: true, is_shared: false, declared_at: span, used: false, mutated: false },
            );
        }
        // Imported types are resolved on demand through `resolve_type_name`
        // (which already searches the table by qualified name), and
        // imported free functions through `table.get_fn` with the qualified
        // key `call.rs` already falls back to — neither needs a scope
        // binding of its own.
        SymbolKind::Type | SymbolKind::Fn => {}
    }
}

#[cfg(test)]
#[path = "tests/imports.rs"]
mod tests;
