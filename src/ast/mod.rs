//! AST module for the astrewrite Python subset
//!
//! This module provides the core Abstract Syntax Tree types for representing
//! function source with source location tracking. Trees are plain owned values:
//! every pass consumes the tree it is given and hands back a new one, so no two
//! passes ever observe the same node.

// ============================================================================
// IMPORTS
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Represents a span in the source code as byte offsets.
///
/// Nodes synthesized by a rewrite carry `Span::default()` or the span of the
/// node they were derived from.
///
/// # Examples
///
/// ```rust
/// use astrewrite::ast::Span;
/// let span = Span { start: 0, end: 5 };
/// assert_eq!(span.len(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.len()).into()
    }
}

/// Wrapper for carrying source span information with any value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithSpan<T> {
    pub value: T,
    pub span: Span,
}

impl<T> WithSpan<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    /// Wraps a synthesized value with an empty span.
    pub fn synthetic(value: T) -> Self {
        Self {
            value,
            span: Span::default(),
        }
    }
}

pub type ExprNode = WithSpan<Expr>;
pub type StmtNode = WithSpan<Stmt>;

/// Whether a name, attribute or display is read from or written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExprContext {
    Load,
    Store,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mult,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    USub,
    UAdd,
    Invert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    In,
    NotIn,
    Is,
    IsNot,
}

/// Keyword argument of a call: `name=value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub arg: String,
    pub value: ExprNode,
}

/// Expression nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Name {
        id: String,
        ctx: ExprContext,
    },
    Constant(Constant),
    BinOp {
        left: Box<ExprNode>,
        op: BinOp,
        right: Box<ExprNode>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<ExprNode>,
    },
    BoolOp {
        op: BoolOp,
        values: Vec<ExprNode>,
    },
    Compare {
        left: Box<ExprNode>,
        ops: Vec<CmpOp>,
        comparators: Vec<ExprNode>,
    },
    Call {
        func: Box<ExprNode>,
        args: Vec<ExprNode>,
        keywords: Vec<Keyword>,
    },
    Attribute {
        value: Box<ExprNode>,
        attr: String,
        ctx: ExprContext,
    },
    Subscript {
        value: Box<ExprNode>,
        index: Box<ExprNode>,
        ctx: ExprContext,
    },
    List {
        elts: Vec<ExprNode>,
        ctx: ExprContext,
    },
    Tuple {
        elts: Vec<ExprNode>,
        ctx: ExprContext,
    },
}

/// Statement nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    FunctionDef {
        name: String,
        params: Vec<String>,
        body: Vec<StmtNode>,
    },
    For {
        target: ExprNode,
        iter: ExprNode,
        body: Vec<StmtNode>,
        orelse: Vec<StmtNode>,
    },
    While {
        test: ExprNode,
        body: Vec<StmtNode>,
        orelse: Vec<StmtNode>,
    },
    If {
        test: ExprNode,
        body: Vec<StmtNode>,
        orelse: Vec<StmtNode>,
    },
    Assign {
        targets: Vec<ExprNode>,
        value: ExprNode,
    },
    AugAssign {
        target: ExprNode,
        op: BinOp,
        value: ExprNode,
    },
    Return(Option<ExprNode>),
    Expr(ExprNode),
    Pass,
    Break,
    Continue,
}

/// A parsed source file, or the single function extracted from one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Module {
    pub body: Vec<StmtNode>,
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Expr {
    /// A load-context variable reference.
    pub fn name(id: impl Into<String>) -> Self {
        Expr::Name {
            id: id.into(),
            ctx: ExprContext::Load,
        }
    }

    pub fn int(value: i64) -> Self {
        Expr::Constant(Constant::Int(value))
    }

    /// `left op right` with synthesized spans.
    pub fn binop(left: Expr, op: BinOp, right: Expr) -> Self {
        Expr::BinOp {
            left: Box::new(WithSpan::synthetic(left)),
            op,
            right: Box::new(WithSpan::synthetic(right)),
        }
    }

    /// `func(args...)` with positional arguments only.
    pub fn call(func: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            func: Box::new(WithSpan::synthetic(func)),
            args: args.into_iter().map(WithSpan::synthetic).collect(),
            keywords: Vec::new(),
        }
    }

    /// Short node-kind label used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Name { .. } => "Name",
            Expr::Constant(_) => "Constant",
            Expr::BinOp { .. } => "BinOp",
            Expr::UnaryOp { .. } => "UnaryOp",
            Expr::BoolOp { .. } => "BoolOp",
            Expr::Compare { .. } => "Compare",
            Expr::Call { .. } => "Call",
            Expr::Attribute { .. } => "Attribute",
            Expr::Subscript { .. } => "Subscript",
            Expr::List { .. } => "List",
            Expr::Tuple { .. } => "Tuple",
        }
    }

    /// Returns the identifier if this is a plain name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Expr::Name { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Rewrites the expression context of an assignment target in place.
    pub fn set_context(&mut self, new_ctx: ExprContext) {
        match self {
            Expr::Name { ctx, .. }
            | Expr::Attribute { ctx, .. }
            | Expr::Subscript { ctx, .. } => *ctx = new_ctx,
            Expr::List { elts, ctx } | Expr::Tuple { elts, ctx } => {
                *ctx = new_ctx;
                for elt in elts {
                    elt.value.set_context(new_ctx);
                }
            }
            _ => {}
        }
    }
}

impl Stmt {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Stmt::FunctionDef { .. } => "FunctionDef",
            Stmt::For { .. } => "For",
            Stmt::While { .. } => "While",
            Stmt::If { .. } => "If",
            Stmt::Assign { .. } => "Assign",
            Stmt::AugAssign { .. } => "AugAssign",
            Stmt::Return(_) => "Return",
            Stmt::Expr(_) => "Expr",
            Stmt::Pass => "Pass",
            Stmt::Break => "Break",
            Stmt::Continue => "Continue",
        }
    }
}

impl Module {
    pub fn new(body: Vec<StmtNode>) -> Self {
        Self { body }
    }

    /// Finds a top-level function definition by name.
    pub fn function(&self, name: &str) -> Option<&StmtNode> {
        self.body.iter().find(|stmt| {
            matches!(&stmt.value, Stmt::FunctionDef { name: fn_name, .. } if fn_name == name)
        })
    }

    /// Renders the module back to source text.
    pub fn pretty(&self) -> String {
        unparse::unparse(self)
    }
}

// ============================================================================
// MODULE EXPORTS
// ============================================================================

pub mod unparse;
pub mod visit;

pub use unparse::{unparse, unparse_expr};
pub use visit::{walk_body, walk_expr, walk_module, walk_stmt, Transformer};
