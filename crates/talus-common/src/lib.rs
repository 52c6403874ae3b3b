//! Common types and utilities shared by the type table and the checker.
//!
//! This crate provides the foundational pieces that both `talus-types` and
//! `talus-check` need, kept separate so neither crate has to depend on the
//! other for them:
//! - Source spans (`Span`, `Spanned`, `SpanBuilder`)
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, the message catalog)
//! - Centralized recursion/iteration limits
//! - Checker configuration (`CheckerOptions`)

pub mod span;
pub use span::{Span, SpanBuilder, Spanned};

pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticRelatedInformation, Diagnostics};

pub mod limits;

pub mod checker_options;
pub use checker_options::CheckerOptions;
