//! The arena-resident part of the AST: expressions and the executable
//! statements inside function/block bodies.
//!
//! Top-level declarations (`FnDecl`, `StructDecl`, ...) are plain typed
//! structs owned by `File` rather than arena nodes — the checker processes
//! each declaration as one unit, and only their *bodies* need index-based,
//! shared-mutable-borrow access during expression/statement dispatch. This
//! mirrors the teacher's split between its `NodeArena` (parsed syntax) and
//! higher-level declaration records consumed a whole-unit-at-a-time.

use smallvec::SmallVec;
use talus_common::Span;

/// A stable handle into a `NodeArena`. `NodeIndex(0)` is never issued by
/// `NodeArena::push` and is reserved as an "absent" sentinel, matching the
/// type table's convention that `0` means unresolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// A list of child node indices small enough to usually avoid a heap
/// allocation (most expressions have 0-3 children).
pub type NodeList = SmallVec<[NodeIndex; 4]>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    /// Plain `=`: `AssignStmt::op` uses this when the statement is not a
    /// compound assignment (`+=`, `<<=`, ...).
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    LogAnd,
    LogOr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Is,
    NotIs,
    Append, // `<<` on arrays
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
    BitNot,
    Ref,
    Deref,
    PlusPlus,
    MinusMinus,
    /// Postfix `?`: propagate an optional/error result to the enclosing
    /// function (§4.2.4 point 8).
    Propagate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprKind {
    Ident(String),
    IntegerLiteral(String),
    FloatLiteral(String),
    StringLiteral(String),
    CharLiteral(String),
    BoolLiteral(bool),
    NoneLit,
    PrefixExpr { op: UnOp, expr: NodeIndex },
    PostfixExpr { op: UnOp, expr: NodeIndex },
    InfixExpr { op: BinOp, left: NodeIndex, right: NodeIndex },
    IndexExpr { base: NodeIndex, index: NodeIndex },
    SelectorExpr { base: NodeIndex, field: String },
    CallExpr {
        callee: NodeIndex,
        args: NodeList,
        generic_args: Vec<String>,
        /// `f() or { ... }`: a block that runs when `f`'s optional/error
        /// result is absent, in scope for the unwrapped value otherwise.
        or_block: Option<NodeIndex>,
    },
    CastExpr { expr: NodeIndex, target_type: String },
    AsCast { expr: NodeIndex, target_type: String, is_satisfies: bool },
    MatchExpr { subject: NodeIndex, arms: Vec<MatchArm> },
    IfExpr { cond: NodeIndex, then_branch: NodeIndex, else_branch: NodeIndex },
    IfGuardExpr { binding: String, call: NodeIndex, then_branch: NodeIndex, else_branch: NodeIndex },
    StructInit { type_name: String, fields: Vec<(String, NodeIndex)> },
    ArrayInit { elems: NodeList, elem_type_hint: Option<String> },
    MapInit { pairs: Vec<(NodeIndex, NodeIndex)> },
    ChanInit { elem_type: String, is_mut: bool },
    RangeExpr { lo: NodeIndex, hi: NodeIndex },
    LockExpr { names: Vec<String>, is_read: bool, body: NodeIndex },
    UnsafeExpr { body: NodeIndex },
    ParExpr { inner: NodeIndex },
    GoExpr { call: NodeIndex },
    SelectExpr { arms: Vec<(NodeIndex, NodeIndex)> },
    SizeOf { type_ref: String },
    OffsetOf { type_ref: String, field: String },
    TypeOf { expr: NodeIndex },
    AtExpr { name: String },
    ComptimeCall { name: String, args: NodeList },
    ComptimeSelector { base: NodeIndex, field: String },
    StringInterLiteral { parts: Vec<InterPart> },
    EnumVal { enum_name: Option<String>, variant: String },
    Assoc { base: String, member: String },
    DumpExpr { expr: NodeIndex },
    Likely { expr: NodeIndex, expected: bool },
    SqlExpr { raw: String },

    // Statements that live in the arena because they appear inside bodies.
    AssignStmt { lhs: NodeList, rhs: NodeList, op: BinOp, is_decl: bool, is_mut: Vec<bool> },
    ExprStmt { expr: NodeIndex },
    Return { values: NodeList },
    Block { stmts: NodeList },
    ForStmt { cond: Option<NodeIndex>, body: NodeIndex },
    ForInStmt { key: Option<String>, value: String, iterable: NodeIndex, body: NodeIndex },
    ForCStmt { init: Option<NodeIndex>, cond: Option<NodeIndex>, post: Option<NodeIndex>, body: NodeIndex },
    BranchStmt { is_break: bool, label: Option<String> },
    GotoStmt { label: String },
    GotoLabel { name: String },
    DeferStmt { call: NodeIndex },
    HashStmt { directive: String },
    AsmStmt { body: String },
    AssertStmt { cond: NodeIndex, message: Option<NodeIndex> },
    ComptimeFor { binding: String, iterable: NodeIndex, body: NodeIndex },
    SqlStmt { raw: String },

    /// A node the parser could not build (it already reported a syntax
    /// error); §7 says these are silently skipped by the checker.
    NodeError,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchArm {
    pub pattern: MatchPattern,
    pub binding: Option<String>,
    pub body: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchPattern {
    Type(String),
    Value(NodeIndex),
    Else,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InterPart {
    Text(String),
    Expr { value: NodeIndex, format_spec: Option<String> },
}

/// One arena node: its kind plus source span. Computed types are *not*
/// stored here (see the checker's `TypeCache`, grounded in the teacher's
/// `CheckerContext::TypeCache` keyed side-table) — keeping the AST crate
/// independent of the type table crate.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: ExprKind,
    pub span: Span,
}

/// A dense, append-only arena of nodes, indexed by `NodeIndex`.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        // Index 0 is reserved as NodeIndex::NONE; seed it with a dummy node.
        Self {
            nodes: vec![Node { kind: ExprKind::NodeError, span: Span::dummy() }],
        }
    }

    pub fn push(&mut self, kind: ExprKind, span: Span) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node { kind, span });
        idx
    }

    pub fn get(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}

// Re-export NodeKind as an alias for ExprKind for readers coming from the
// §6 grammar, which names the arena payload type `Stmt`/`Expr` generically.
pub use ExprKind as NodeKind;

#[cfg(test)]
#[path = "tests/node.rs"]
mod tests;
