//! Diagnostic types and the accumulator the checker reports into.
//!
//! The checker never raises exceptions for a user-program problem (see the
//! "exception-like control flow" design note): every failing path produces
//! a `Diagnostic`, pushes it here, substitutes a fallback type, and keeps
//! going.

mod codes;
pub use codes::{DiagnosticMessage, lookup as lookup_message, DIAGNOSTIC_MESSAGES};
pub mod diagnostic_codes {
    pub use super::codes::*;
}

use serde::Serialize;

/// Diagnostic severity. Three variants, matching the checker's error
/// taxonomy (not the four-category model some other compilers use).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Error,
    Warning,
    Notice,
}

/// Related information for a diagnostic (e.g. "previously declared here").
#[derive(Clone, Debug, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
}

/// A single type-checking diagnostic.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(
        file: String,
        start: u32,
        length: u32,
        category: DiagnosticCategory,
        code: u32,
        message: String,
    ) -> Self {
        Self {
            file,
            start,
            length,
            message_text: message,
            category,
            code,
            related_information: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_related(mut self, file: String, start: u32, length: u32, message: String) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            file,
            start,
            length,
            message_text: message,
        });
        self
    }

    /// Line number (1-based) this diagnostic's `start` offset falls on,
    /// computed against `source`. Used for per-line deduplication.
    #[must_use]
    pub fn line_in(&self, source: &str) -> u32 {
        let start = (self.start as usize).min(source.len());
        1 + source.as_bytes()[..start].iter().filter(|&&b| b == b'\n').count() as u32
    }
}

/// Format a `{0}`, `{1}`, ... templated message.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// Build a diagnostic from a catalog code, substituting `args` into its
/// template.
///
/// # Panics
/// Panics in any build if `code` has no registered template — this is a
/// programmer error (an unregistered code used at a call site), not a
/// user-reportable condition.
#[must_use]
pub fn diagnostic_from_code(
    file: &str,
    start: u32,
    length: u32,
    code: u32,
    args: &[&str],
) -> Diagnostic {
    let entry = lookup_message(code)
        .unwrap_or_else(|| panic!("no diagnostic message registered for code {code}"));
    let message = format_message(entry.message, args);
    Diagnostic::new(file.to_string(), start, length, entry.category, code, message)
}

/// The diagnostic accumulator a `check_all` run reports into.
///
/// Implements the per-source-line deduplication and `message_limit`
/// cutoff described in §4.2.5: once `should_abort` is set, callers are
/// expected to stop descending into further statements/expressions.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    message_limit: usize,
    should_abort: bool,
    /// `(file, line, code)` pairs already reported, to dedupe cascades.
    seen_lines: std::collections::HashSet<(String, u32, u32)>,
}

impl Diagnostics {
    #[must_use]
    pub fn new(message_limit: usize) -> Self {
        Self {
            items: Vec::new(),
            message_limit,
            should_abort: false,
            seen_lines: std::collections::HashSet::new(),
        }
    }

    /// Report a diagnostic, honoring per-line dedup and the message limit.
    /// Returns `true` if the diagnostic was kept (not deduped/dropped).
    pub fn push(&mut self, diag: Diagnostic, source: &str) -> bool {
        if self.should_abort {
            return false;
        }
        let line = diag.line_in(source);
        let key = (diag.file.clone(), line, diag.code);
        if !self.seen_lines.insert(key) {
            return false;
        }
        self.items.push(diag);
        if self.items.len() >= self.message_limit {
            self.should_abort = true;
            let last = self.items.last().expect("just pushed");
            let abort_diag = diagnostic_from_code(
                &last.file,
                last.start,
                last.length,
                diagnostic_codes::MESSAGE_LIMIT_EXCEEDED,
                &[],
            );
            self.items.push(abort_diag);
        }
        true
    }

    /// Push a diagnostic without per-line dedup or file-relative line
    /// computation — used for resource-cutoff errors (§4.2.5) which always
    /// fire exactly once per occurrence regardless of source line.
    pub fn push_always(&mut self, diag: Diagnostic) {
        if self.should_abort {
            return;
        }
        self.items.push(diag);
    }

    pub fn should_abort(&self) -> bool {
        self.should_abort
    }

    pub fn set_should_abort(&mut self) {
        self.should_abort = true;
    }

    pub fn items(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.category == DiagnosticCategory::Error)
    }

    pub fn into_items(self) -> Vec<Diagnostic> {
        self.items
    }
}

#[cfg(test)]
#[path = "tests/diagnostics.rs"]
mod tests;
