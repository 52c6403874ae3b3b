//! Declaration-level AST nodes (§6): the things a `File` is made of.
//!
//! Unlike expressions/statements, each of these is processed as a whole
//! unit by the checker's per-file passes (§4.2.1), so they are plain typed
//! structs rather than arena nodes. A declaration's *body* (a function's
//! block, a const's initializer) is an arena-resident `NodeIndex`.

use crate::attrs::AttributeSet;
use crate::node::{NodeArena, NodeIndex};
use talus_common::Span;

#[derive(Clone, Debug)]
pub struct Param {
    pub name: String,
    pub type_name: String,
    pub is_mut: bool,
    pub is_hidden: bool,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct FnDecl {
    pub name: String,
    pub module: String,
    /// Receiver type name, empty for free functions.
    pub receiver: Option<Param>,
    pub params: Vec<Param>,
    pub return_type: String,
    /// `None` for declarations without a body (`no_body`, e.g. `extern`
    /// bindings).
    pub body: Option<NodeIndex>,
    pub attrs: AttributeSet,
    pub generic_names: Vec<String>,
    pub is_method: bool,
    pub span: Span,
}

impl FnDecl {
    pub fn no_body(&self) -> bool {
        self.body.is_none()
    }

    pub fn is_variadic(&self) -> bool {
        self.params.last().is_some_and(|p| p.type_name.starts_with("..."))
    }
}

#[derive(Clone, Debug)]
pub struct Field {
    pub name: String,
    pub type_name: String,
    pub is_mut: bool,
    pub is_pub: bool,
    pub is_global: bool,
    pub attrs: AttributeSet,
    pub default: Option<NodeIndex>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct StructDecl {
    pub name: String,
    pub module: String,
    pub fields: Vec<Field>,
    pub embeds: Vec<String>,
    pub generic_names: Vec<String>,
    pub is_union: bool,
    pub attrs: AttributeSet,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct InterfaceDecl {
    pub name: String,
    pub module: String,
    pub fields: Vec<Field>,
    pub methods: Vec<FnDecl>,
    pub embeds: Vec<String>,
    pub generic_names: Vec<String>,
    pub attrs: AttributeSet,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct EnumVariant {
    pub name: String,
    pub value: Option<NodeIndex>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct EnumDecl {
    pub name: String,
    pub module: String,
    pub variants: Vec<EnumVariant>,
    pub attrs: AttributeSet,
    pub span: Span,
}

/// What a `type` declaration defines: a plain alias, a function-type
/// alias, or a sum type listing its variants.
#[derive(Clone, Debug)]
pub enum TypeDeclBody {
    Alias(String),
    Fn { params: Vec<Param>, return_type: String },
    Sum(Vec<String>),
}

#[derive(Clone, Debug)]
pub struct TypeDecl {
    pub name: String,
    pub module: String,
    pub body: TypeDeclBody,
    pub generic_names: Vec<String>,
    pub attrs: AttributeSet,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ConstDecl {
    pub name: String,
    pub module: String,
    pub value: NodeIndex,
    pub type_hint: Option<String>,
    pub attrs: AttributeSet,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct GlobalDecl {
    pub name: String,
    pub module: String,
    pub type_name: String,
    pub initializer: Option<NodeIndex>,
    pub is_shared: bool,
    pub attrs: AttributeSet,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Import {
    pub module: String,
    pub names: Vec<ImportedName>,
    pub alias: Option<String>,
    pub span: Span,
}

/// One parsed translation unit.
#[derive(Clone, Debug)]
pub struct File {
    pub path: String,
    pub module: String,
    /// Raw source text, kept alongside the parsed declarations so the
    /// checker can turn a `Span` into a line number for diagnostic
    /// deduplication without re-reading the file from disk.
    pub source: String,
    /// The dense arena backing every expression/statement `NodeIndex` this
    /// file's declarations and `stmts` refer to. One arena per file keeps a
    /// parser's recursive-descent output self-contained — a `NodeIndex` is
    /// only ever meaningful against the arena it was pushed into.
    pub arena: NodeArena,
    pub imports: Vec<Import>,
    pub consts: Vec<ConstDecl>,
    pub globals: Vec<GlobalDecl>,
    pub structs: Vec<StructDecl>,
    pub interfaces: Vec<InterfaceDecl>,
    pub enums: Vec<EnumDecl>,
    pub type_decls: Vec<TypeDecl>,
    pub fns: Vec<FnDecl>,
    /// Top-level executable statements outside any function (rare, but the
    /// grammar in §6 allows `HashStmt`/`ComptimeFor` etc. at file scope).
    pub stmts: Vec<NodeIndex>,
    pub is_generated: bool,
    pub is_translated: bool,
}

impl File {
    pub fn is_test_file(&self) -> bool {
        self.path.ends_with("_test.tl") || self.path.ends_with("_test.v")
    }
}
