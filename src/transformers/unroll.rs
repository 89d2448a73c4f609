//! Full loop unrolling.
//!
//! `for i in unroll(<iterable>): body` becomes one copy of `body` per element
//! with `i` replaced by the element's integer literal. Only loops whose iterator
//! constant-evaluates to an unroll-marked sequence are touched.

use tracing::{debug, trace};

use super::symbol_replacer::{replace_symbols, SubstitutionTable};
use crate::ast::{walk_stmt, Expr, ExprNode, Module, Stmt, StmtNode, Transformer, WithSpan};
use crate::diagnostics::RewriteError;
use crate::runtime::{Environment, Value};

pub struct Unroller<'env> {
    env: &'env Environment,
}

impl<'env> Unroller<'env> {
    pub fn new(env: &'env Environment) -> Self {
        Self { env }
    }
}

impl Transformer for Unroller<'_> {
    type Error = RewriteError;

    fn fold_stmt(&mut self, stmt: StmtNode) -> Result<Vec<StmtNode>, RewriteError> {
        // Children first, so an enclosing loop sees its inner loops expanded.
        let stmt = walk_stmt(self, stmt)?;
        let Stmt::For { iter, .. } = &stmt.value else {
            return Ok(vec![stmt]);
        };
        let items = match self.env.evaluate(iter) {
            Ok(Value::Unroll(items)) => items,
            Ok(other) => {
                trace!(iterator = %other, "loop is not unroll-marked; leaving it alone");
                return Ok(vec![stmt]);
            }
            Err(err) => {
                trace!(error = %err, "loop iterator is not constant; leaving it alone");
                return Ok(vec![stmt]);
            }
        };
        match stmt.value {
            Stmt::For {
                target,
                iter,
                body,
                orelse,
            } => expand(target, iter, body, orelse, items),
            value => Ok(vec![WithSpan::new(value, stmt.span)]),
        }
    }
}

/// Emits one copy of `body` per element, then `orelse`.
///
/// Elements must be `int`. `bool` is refused even though Python counts it as
/// an `int` subclass.
fn expand(
    target: ExprNode,
    iter: ExprNode,
    body: Vec<StmtNode>,
    orelse: Vec<StmtNode>,
    items: Vec<Value>,
) -> Result<Vec<StmtNode>, RewriteError> {
    let Some(var) = target.value.as_name() else {
        return Err(RewriteError::UnsupportedLoopTarget {
            kind: target.value.kind_name(),
            span: target.span.into(),
        });
    };

    let mut unrolled = Vec::with_capacity(items.len() * body.len() + orelse.len());
    for item in &items {
        let Value::Int(n) = item else {
            return Err(RewriteError::UnsupportedUnrollElement {
                element: item.to_string(),
                span: iter.span.into(),
                type_name: item.type_name(),
            });
        };
        let mut symbol_table = SubstitutionTable::new();
        symbol_table.insert(var.to_string(), WithSpan::new(Expr::int(*n), target.span));
        for child in &body {
            unrolled.push(replace_symbols(child.clone(), &symbol_table));
        }
    }
    // `else` is kept and runs once after the copies.
    unrolled.extend(orelse);

    debug!(
        var,
        iterations = items.len(),
        statements = unrolled.len(),
        "fully unrolled loop"
    );
    Ok(unrolled)
}

/// Fully unrolls every unroll-marked `for` loop in `tree`.
pub fn unroll_for_loops(tree: Module, env: &Environment) -> Result<Module, RewriteError> {
    Unroller::new(env).fold_module(tree)
}
