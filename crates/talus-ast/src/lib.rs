//! The AST contract the checker consumes.
//!
//! This crate does not parse source text — parsing is explicitly out of
//! scope (§1). It defines the node shapes a parser would populate, using a
//! dense arena of `NodeIndex`-addressed nodes rather than an owned,
//! `Box`-recursive tree, so the checker can hold a single mutable borrow of
//! the whole tree for the duration of `check_all` and still jump straight
//! to any node by index (e.g. when re-entering a generic function body
//! during the re-check fixed point).

pub mod attrs;
pub mod node;
pub mod file;

pub use attrs::{Attribute, AttributeSet};
pub use node::{BinOp, ExprKind, InterPart, MatchArm, MatchPattern, Node, NodeArena, NodeIndex, NodeKind, NodeList, UnOp};
pub use file::{
    ConstDecl, EnumDecl, EnumVariant, Field, File, FnDecl, GlobalDecl, Import, ImportedName,
    InterfaceDecl, Param, StructDecl, TypeDecl, TypeDeclBody,
};
