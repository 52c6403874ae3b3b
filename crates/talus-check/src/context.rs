//! `CheckerContext`: the state every checker pass threads through (§4.2).
//!
//! Bundles the pieces a single `check_all` run shares across files —
//! the type table, the diagnostics sink, per-node computed types, and the
//! scope stack for whichever function body is currently being walked — so
//! `dispatch.rs`/`expr.rs`/`call_checker.rs` don't each carry their own
//! parameter list.

use rustc_hash::FxHashMap;
use talus_ast::NodeIndex;
use talus_common::diagnostics::{diagnostic_codes, diagnostic_from_code, DiagnosticCategory, Diagnostics};
use talus_common::CheckerOptions;
use talus_types::{SourceLang, TypeFlags, TypeId, TypeInfo, TypeSymbol, TypeTable};

use crate::mutability::LockStack;
use crate::scope::ScopeStack;

/// Per-node computed types (§3, §9 "`TypeCache`"). `talus-ast` deliberately
/// never stores a `TypeId` on `Node` itself — this keeps it independent of
/// `talus-types` — so every dispatch result is cached here instead, keyed
/// by the arena index that produced it.
#[derive(Default)]
pub struct TypeCache {
    by_node: FxHashMap<NodeIndex, TypeId>,
}

impl TypeCache {
    pub fn get(&self, node: NodeIndex) -> Option<TypeId> {
        self.by_node.get(&node).copied()
    }

    pub fn set(&mut self, node: NodeIndex, typ: TypeId) {
        self.by_node.insert(node, typ);
    }
}

/// The state a single `check_all` invocation carries across every file and
/// pass (§4.2.1-§4.2.7).
pub struct CheckerContext<'a> {
    pub table: &'a mut TypeTable,
    pub diagnostics: Diagnostics,
    pub options: CheckerOptions,
    pub types: TypeCache,
    pub scopes: ScopeStack,
    /// Path of the file currently being checked, used to stamp
    /// `Diagnostic::file`.
    pub current_file: String,
    /// Source text of the file currently being checked, for per-line
    /// diagnostic dedup (`Diagnostics::push`).
    pub current_source: String,
    /// Set once any generic function call observes a concrete-type tuple it
    /// had not seen before, driving the re-check fixed point (§4.2.6).
    pub needs_generic_recheck: bool,
    /// Active `lock`/`rlock` blocks enclosing the expression currently
    /// being checked (§4.2.3).
    pub locks: LockStack,
    /// Depth of `unsafe { }` blocks currently entered; mutability and
    /// unsafe-call checks relax while this is non-zero.
    pub in_unsafe: u32,
    /// Whether the file currently being checked is `[translated]` from C
    /// (§4.2.3: translated files are exempt from some mutability rules that
    /// would otherwise reject mechanically-ported code).
    pub is_translated_file: bool,
    /// Current expression recursion depth, guarded against
    /// `CheckerOptions::max_expr_depth` (§4.2.5).
    pub expr_depth: u32,
    /// Current statement recursion depth, guarded against
    /// `CheckerOptions::max_stmt_depth` (§4.2.5).
    pub stmt_depth: u32,
}

impl<'a> CheckerContext<'a> {
    pub fn new(table: &'a mut TypeTable, options: CheckerOptions) -> Self {
        let message_limit = options.message_limit;
        Self {
            table,
            diagnostics: Diagnostics::new(message_limit),
            options,
            types: TypeCache::default(),
            scopes: ScopeStack::default(),
            current_file: String::new(),
            current_source: String::new(),
            needs_generic_recheck: false,
            locks: LockStack::default(),
            in_unsafe: 0,
            is_translated_file: false,
            expr_depth: 0,
            stmt_depth: 0,
        }
    }

    pub fn enter_file(&mut self, path: &str, source: &str) {
        self.current_file = path.to_string();
        self.current_source = source.to_string();
        self.scopes = ScopeStack::default();
        self.locks = LockStack::default();
        self.in_unsafe = 0;
        self.is_translated_file = false;
        self.expr_depth = 0;
        self.stmt_depth = 0;
    }

    /// Report a diagnostic from the catalog, honoring the per-line dedup
    /// and message-limit cutoff (§4.2.5, §7). Under `strict`, a `Warning`
    /// is promoted to `Error` before it's pushed (§7: "promoted to error
    /// under a strict mode flag").
    pub fn report(&mut self, start: u32, length: u32, code: u32, args: &[&str]) {
        let mut diag = diagnostic_from_code(&self.current_file, start, length, code, args);
        if self.options.strict && diag.category == DiagnosticCategory::Warning {
            diag.category = DiagnosticCategory::Error;
        }
        self.diagnostics.push(diag, &self.current_source);
    }

    /// Report a resource-cutoff error (§4.2.5): these are not deduped by
    /// source line since the same expression can legitimately recur.
    pub fn report_cutoff(&mut self, start: u32, length: u32, code: u32) {
        let diag = diagnostic_from_code(&self.current_file, start, length, code, &[]);
        self.diagnostics.push_always(diag);
        self.diagnostics.set_should_abort();
    }

    /// Resolves a textual type expression (as carried unparsed on
    /// `FnDecl::return_type`, `Field::type_name`, etc., per §6) to a
    /// `TypeId`, registering composite shapes in the table as needed.
    ///
    /// Grammar handled: bare identifiers, `*T` pointers, `[]T`/`[N]T`
    /// arrays, `map[K]V`, `chan`/`chan mut T`, a trailing `...T` variadic
    /// marker, a trailing `?` optional marker, and `shared`/`shared mut`
    /// qualifiers. Unknown names resolve to `TypeId::NONE` and the caller
    /// is expected to report `UNKNOWN_TYPE`.
    pub fn resolve_type_name(&mut self, raw: &str) -> TypeId {
        let trimmed = raw.trim();

        if let Some(rest) = trimmed.strip_prefix("...") {
            return self.resolve_type_name(rest).with_flag(TypeFlags::VARIADIC);
        }
        if let Some(rest) = trimmed.strip_suffix('?') {
            return self.resolve_type_name(rest).with_flag(TypeFlags::OPTIONAL);
        }
        if let Some(rest) = trimmed.strip_prefix("shared mut ") {
            return self.resolve_type_name(rest).with_flag(TypeFlags::SHARED).with_flag(TypeFlags::MUT_SHARE);
        }
        if let Some(rest) = trimmed.strip_prefix("shared ") {
            return self.resolve_type_name(rest).with_flag(TypeFlags::SHARED);
        }
        if let Some(rest) = trimmed.strip_prefix('*') {
            return self.resolve_type_name(rest).make_ref();
        }
        if let Some(rest) = trimmed.strip_prefix("chan mut ") {
            let elem = self.resolve_type_name(rest);
            return self.table.find_or_register_chan(elem, true);
        }
        if let Some(rest) = trimmed.strip_prefix("chan ") {
            let elem = self.resolve_type_name(rest);
            return self.table.find_or_register_chan(elem, false);
        }
        if let Some(rest) = trimmed.strip_prefix("thread ") {
            let ret = self.resolve_type_name(rest);
            return self.table.find_or_register_thread(ret);
        }
        if let Some(inner) = trimmed.strip_prefix("map[") {
            if let Some((key_part, value_part)) = split_bracket(inner) {
                let key = self.resolve_type_name(key_part);
                let value = self.resolve_type_name(value_part);
                return self.table.find_or_register_map(key, value);
            }
        }
        if let Some(rest) = trimmed.strip_prefix("[]") {
            let elem = self.resolve_type_name(rest);
            return self.table.find_or_register_array(elem);
        }
        if let Some(rest) = trimmed.strip_prefix('[') {
            if let Some((size_part, elem_part)) = rest.split_once(']') {
                let elem = self.resolve_type_name(elem_part);
                if let Ok(size) = size_part.parse::<u64>() {
                    return self.table.find_or_register_array_fixed(elem, size, None);
                }
                return self.table.find_or_register_array_fixed(elem, 0, Some(size_part.to_string()));
            }
        }

        if let Some(id) = builtin_spelling(&self.table.builtins, trimmed) {
            return id;
        }

        if let Some(stripped) = trimmed.strip_suffix('>') {
            if let Some(lt) = stripped.find('<') {
                let head = &stripped[..lt];
                let inner = &stripped[lt + 1..];
                let args = split_top_level_commas(inner);
                if !head.is_empty() && !args.is_empty() {
                    return self.resolve_generic_inst(head, &args);
                }
            }
        }

        match self.table.find_sym_and_idx(trimmed) {
            Some((id, _)) => id,
            None => self.table.add_placeholder_type(trimmed, SourceLang::Native),
        }
    }

    /// Resolves `Head<A, B, ...>` type-annotation syntax into a
    /// `TypeInfo::GenericInst` placeholder (§4.1.6), deferred until
    /// `TypeTable::generic_insts_to_concrete` materializes it — the struct
    /// `Head` names may not have a full body registered yet when this text
    /// is first resolved (forward references across declarations).
    fn resolve_generic_inst(&mut self, head: &str, args: &[&str]) -> TypeId {
        let head_id = match self.table.find_sym_and_idx(head) {
            Some((id, _)) => id,
            None => self.table.add_placeholder_type(head, SourceLang::Native),
        };
        let concrete: Vec<TypeId> = args.iter().map(|a| self.resolve_type_name(a)).collect();
        let concrete_names: Vec<String> = concrete.iter().map(|t| self.table.sym(*t).canonical_name.clone()).collect();
        let head_sym = self.table.sym(head_id.base());
        let canonical_name = talus_types::naming::generic_inst_canonical(&head_sym.canonical_name, &concrete_names);
        let module = head_sym.module.clone();
        let source_lang = head_sym.source_lang;
        if let Some((id, _)) = self.table.find_sym_and_idx(&canonical_name) {
            return id;
        }
        self.table.register_sym(TypeSymbol {
            canonical_name: canonical_name.clone(),
            mangled_name: talus_types::naming::mangle_fragment(&canonical_name),
            module,
            source_lang,
            parent: TypeId::NONE,
            methods: Vec::new(),
            info: TypeInfo::GenericInst { parent: head_id, concrete },
        })
    }
}

/// A handful of primitive names whose canonical spelling (`int`, `byte`)
/// differs from the sized-width spelling (`i32`, `u8`) programs are also
/// free to write; both must resolve to the same builtin `TypeId`.
fn builtin_spelling(builtins: &talus_types::Builtins, name: &str) -> Option<TypeId> {
    Some(match name {
        "i32" => builtins.i32,
        "u8" => builtins.u8,
        _ => return None,
    })
}

/// Splits `K]V` (the remainder after stripping a leading `map[`) into its
/// key and value halves at the matching `]`, accounting for nested
/// `map[...]`/`[]`/`[N]` inside the key.
fn split_bracket(s: &str) -> Option<(&str, &str)> {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' if depth == 0 => return Some((&s[..i], &s[i + 1..])),
            ']' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Splits `A, B<C>, D` into `["A", "B<C>", "D"]`, respecting nested
/// `<...>`/`[...]` so a comma inside a nested generic argument doesn't
/// split early.
fn split_top_level_commas(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '<' | '[' => depth += 1,
            '>' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = s[start..].trim();
    if !last.is_empty() {
        parts.push(last);
    }
    parts
}

#[cfg(test)]
#[path = "tests/context.rs"]
mod tests;
