//! Owned-tree transformer for AST rewriting.
//!
//! A [`Transformer`] consumes a tree and returns a rewritten one. Every hook
//! has a default that simply recurses through the matching `walk_*` function,
//! so an implementation overrides only the node kinds it rewrites. A statement
//! hook returns a `Vec` so one statement can be replaced by zero, one or many.

use super::{Expr, ExprNode, Keyword, Module, Stmt, StmtNode, WithSpan};

pub trait Transformer {
    type Error;

    fn fold_module(&mut self, module: Module) -> Result<Module, Self::Error> {
        walk_module(self, module)
    }

    fn fold_stmt(&mut self, stmt: StmtNode) -> Result<Vec<StmtNode>, Self::Error> {
        Ok(vec![walk_stmt(self, stmt)?])
    }

    fn fold_expr(&mut self, expr: ExprNode) -> Result<ExprNode, Self::Error> {
        walk_expr(self, expr)
    }
}

pub fn walk_module<T: Transformer + ?Sized>(t: &mut T, module: Module) -> Result<Module, T::Error> {
    Ok(Module {
        body: walk_body(t, module.body)?,
    })
}

/// Folds every statement of a block and splices the results in order.
pub fn walk_body<T: Transformer + ?Sized>(
    t: &mut T,
    body: Vec<StmtNode>,
) -> Result<Vec<StmtNode>, T::Error> {
    let mut out = Vec::with_capacity(body.len());
    for stmt in body {
        out.extend(t.fold_stmt(stmt)?);
    }
    Ok(out)
}

/// Rebuilds a statement with all of its children folded.
pub fn walk_stmt<T: Transformer + ?Sized>(t: &mut T, stmt: StmtNode) -> Result<StmtNode, T::Error> {
    let WithSpan { value, span } = stmt;
    let value = match value {
        Stmt::FunctionDef { name, params, body } => Stmt::FunctionDef {
            name,
            params,
            body: walk_body(t, body)?,
        },
        Stmt::For {
            target,
            iter,
            body,
            orelse,
        } => Stmt::For {
            target: t.fold_expr(target)?,
            iter: t.fold_expr(iter)?,
            body: walk_body(t, body)?,
            orelse: walk_body(t, orelse)?,
        },
        Stmt::While { test, body, orelse } => Stmt::While {
            test: t.fold_expr(test)?,
            body: walk_body(t, body)?,
            orelse: walk_body(t, orelse)?,
        },
        Stmt::If { test, body, orelse } => Stmt::If {
            test: t.fold_expr(test)?,
            body: walk_body(t, body)?,
            orelse: walk_body(t, orelse)?,
        },
        Stmt::Assign { targets, value } => Stmt::Assign {
            targets: fold_exprs(t, targets)?,
            value: t.fold_expr(value)?,
        },
        Stmt::AugAssign { target, op, value } => Stmt::AugAssign {
            target: t.fold_expr(target)?,
            op,
            value: t.fold_expr(value)?,
        },
        Stmt::Return(value) => Stmt::Return(value.map(|v| t.fold_expr(v)).transpose()?),
        Stmt::Expr(expr) => Stmt::Expr(t.fold_expr(expr)?),
        leaf @ (Stmt::Pass | Stmt::Break | Stmt::Continue) => leaf,
    };
    Ok(WithSpan { value, span })
}

/// Rebuilds an expression with all of its children folded.
pub fn walk_expr<T: Transformer + ?Sized>(t: &mut T, expr: ExprNode) -> Result<ExprNode, T::Error> {
    let WithSpan { value, span } = expr;
    let value = match value {
        leaf @ (Expr::Name { .. } | Expr::Constant(_)) => leaf,
        Expr::BinOp { left, op, right } => Expr::BinOp {
            left: fold_boxed(t, left)?,
            op,
            right: fold_boxed(t, right)?,
        },
        Expr::UnaryOp { op, operand } => Expr::UnaryOp {
            op,
            operand: fold_boxed(t, operand)?,
        },
        Expr::BoolOp { op, values } => Expr::BoolOp {
            op,
            values: fold_exprs(t, values)?,
        },
        Expr::Compare {
            left,
            ops,
            comparators,
        } => Expr::Compare {
            left: fold_boxed(t, left)?,
            ops,
            comparators: fold_exprs(t, comparators)?,
        },
        Expr::Call {
            func,
            args,
            keywords,
        } => Expr::Call {
            func: fold_boxed(t, func)?,
            args: fold_exprs(t, args)?,
            keywords: fold_keywords(t, keywords)?,
        },
        Expr::Attribute { value, attr, ctx } => Expr::Attribute {
            value: fold_boxed(t, value)?,
            attr,
            ctx,
        },
        Expr::Subscript { value, index, ctx } => Expr::Subscript {
            value: fold_boxed(t, value)?,
            index: fold_boxed(t, index)?,
            ctx,
        },
        Expr::List { elts, ctx } => Expr::List {
            elts: fold_exprs(t, elts)?,
            ctx,
        },
        Expr::Tuple { elts, ctx } => Expr::Tuple {
            elts: fold_exprs(t, elts)?,
            ctx,
        },
    };
    Ok(WithSpan { value, span })
}

fn fold_boxed<T: Transformer + ?Sized>(t: &mut T, expr: Box<ExprNode>) -> Result<Box<ExprNode>, T::Error> {
    Ok(Box::new(t.fold_expr(*expr)?))
}

fn fold_keywords<T: Transformer + ?Sized>(
    t: &mut T,
    keywords: Vec<Keyword>,
) -> Result<Vec<Keyword>, T::Error> {
    let mut out = Vec::with_capacity(keywords.len());
    for kw in keywords {
        out.push(Keyword {
            arg: kw.arg,
            value: t.fold_expr(kw.value)?,
        });
    }
    Ok(out)
}

fn fold_exprs<T: Transformer + ?Sized>(
    t: &mut T,
    exprs: Vec<ExprNode>,
) -> Result<Vec<ExprNode>, T::Error> {
    exprs.into_iter().map(|e| t.fold_expr(e)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Constant, ExprContext};
    use std::convert::Infallible;

    /// Doubles every integer literal and drops `pass` statements.
    struct Doubler;

    impl Transformer for Doubler {
        type Error = Infallible;

        fn fold_stmt(&mut self, stmt: StmtNode) -> Result<Vec<StmtNode>, Infallible> {
            if stmt.value == Stmt::Pass {
                return Ok(vec![]);
            }
            Ok(vec![walk_stmt(self, stmt)?])
        }

        fn fold_expr(&mut self, expr: ExprNode) -> Result<ExprNode, Infallible> {
            match expr.value {
                Expr::Constant(Constant::Int(n)) => Ok(WithSpan::new(Expr::int(n * 2), expr.span)),
                other => walk_expr(self, WithSpan::new(other, expr.span)),
            }
        }
    }

    #[test]
    fn transformer_rewrites_nested_expressions_and_splices_statements() {
        let module = Module::new(vec![
            WithSpan::synthetic(Stmt::Pass),
            WithSpan::synthetic(Stmt::Expr(WithSpan::synthetic(Expr::call(
                Expr::name("f"),
                vec![Expr::binop(Expr::int(1), crate::ast::BinOp::Add, Expr::int(2))],
            )))),
        ]);

        let out = Doubler.fold_module(module).unwrap();
        assert_eq!(out.body.len(), 1);
        assert_eq!(crate::ast::unparse(&out), "f(2 + 4)\n");
    }

    #[test]
    fn names_are_left_alone_by_default() {
        let expr = WithSpan::synthetic(Expr::Name {
            id: "x".into(),
            ctx: ExprContext::Store,
        });
        let out = Doubler.fold_expr(expr.clone()).unwrap();
        assert_eq!(out, expr);
    }
}
