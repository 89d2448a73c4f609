//! Partial loop unrolling by a fixed factor.
//!
//! `for i in range(a, b): body` becomes `for i in range(a, b, factor)` whose
//! body holds `factor` copies of `body`, copy `k` reading `i + k` (or `i - k`
//! for a descending loop). Only unit-step ranges are accepted, and the
//! iteration range must be an exact multiple of the factor.

use tracing::{debug, trace};

use super::symbol_replacer::{replace_symbols, SubstitutionTable};
use crate::ast::{
    walk_stmt, BinOp, Expr, ExprNode, Module, Span, Stmt, StmtNode, Transformer, WithSpan,
};
use crate::diagnostics::RewriteError;
use crate::runtime::{Environment, RangeValue, Value, MAX_SEQUENCE_LEN};

pub struct FactorUnroller<'env> {
    env: &'env Environment,
    factor: u64,
}

impl<'env> FactorUnroller<'env> {
    /// A negative factor is taken by magnitude; zero is rejected.
    pub fn new(env: &'env Environment, factor: i64) -> Result<Self, RewriteError> {
        if factor == 0 {
            return Err(RewriteError::InvalidFactor);
        }
        Ok(Self {
            env,
            factor: factor.unsigned_abs(),
        })
    }

    pub fn factor(&self) -> u64 {
        self.factor
    }
}

impl Transformer for FactorUnroller<'_> {
    type Error = RewriteError;

    fn fold_stmt(&mut self, stmt: StmtNode) -> Result<Vec<StmtNode>, RewriteError> {
        let stmt = walk_stmt(self, stmt)?;
        let Stmt::For { iter, .. } = &stmt.value else {
            return Ok(vec![stmt]);
        };
        let range = match self.env.evaluate(iter) {
            Ok(Value::Range(range)) => range,
            Ok(Value::Unroll(_)) => {
                return Err(RewriteError::NotImplemented {
                    feature: "non-range unroll by factor",
                    span: iter.span.into(),
                })
            }
            Ok(other) => {
                trace!(iterator = %other, "loop iterator is not a range; leaving it alone");
                return Ok(vec![stmt]);
            }
            Err(err) => {
                trace!(error = %err, "loop iterator is not constant; leaving it alone");
                return Ok(vec![stmt]);
            }
        };
        let span = stmt.span;
        match stmt.value {
            Stmt::For {
                target,
                iter,
                body,
                orelse,
            } => self.expand(span, target, iter, body, orelse, range),
            value => Ok(vec![WithSpan::new(value, span)]),
        }
    }
}

impl FactorUnroller<'_> {
    fn expand(
        &self,
        span: Span,
        target: ExprNode,
        iter: ExprNode,
        body: Vec<StmtNode>,
        orelse: Vec<StmtNode>,
        range: RangeValue,
    ) -> Result<Vec<StmtNode>, RewriteError> {
        let RangeValue { start, stop, step } = range;
        if step != 1 && step != -1 {
            return Err(RewriteError::UnsupportedStep {
                start,
                stop,
                step,
                span: iter.span.into(),
            });
        }

        // Measured on magnitudes, so range(-2, 2) counts as empty.
        let extent = start.unsigned_abs().abs_diff(stop.unsigned_abs());
        if extent == 0 {
            debug!(start, stop, "removed loop with an empty iteration range");
            return Ok(Vec::new());
        }
        let factor = self.factor;
        if factor > extent {
            return Err(RewriteError::FactorTooLarge {
                factor,
                extent,
                span: iter.span.into(),
            });
        }
        if extent % factor != 0 {
            return Err(RewriteError::FactorNotDivisible {
                factor,
                extent,
                span: iter.span.into(),
            });
        }

        let copies = u64::try_from(body.len())
            .ok()
            .and_then(|len| len.checked_mul(factor))
            .unwrap_or(u64::MAX);
        if factor > MAX_SEQUENCE_LEN as u64 || copies > MAX_SEQUENCE_LEN as u64 {
            return Err(RewriteError::TooManyCopies {
                factor,
                copies,
                limit: MAX_SEQUENCE_LEN,
                span: iter.span.into(),
            });
        }

        let Some(var) = target.value.as_name() else {
            return Err(RewriteError::UnsupportedLoopTarget {
                kind: target.value.kind_name(),
                span: target.span.into(),
            });
        };

        // factor <= extent <= 2 * i64::MAX, but the stepped range needs it as i64.
        let signed_factor = i64::try_from(factor).map_err(|_| RewriteError::FactorTooLarge {
            factor,
            extent,
            span: iter.span.into(),
        })?;
        let (op, new_step) = if stop > start {
            (BinOp::Add, signed_factor)
        } else {
            (BinOp::Sub, -signed_factor)
        };

        // Bounded by MAX_SEQUENCE_LEN above.
        let mut new_body = Vec::with_capacity(copies as usize);
        for k in 0..signed_factor {
            let mut symbol_table = SubstitutionTable::new();
            let offset = Expr::binop(Expr::name(var), op, Expr::int(k));
            symbol_table.insert(var.to_string(), WithSpan::new(offset, target.span));
            for child in &body {
                new_body.push(replace_symbols(child.clone(), &symbol_table));
            }
        }

        let new_iter = WithSpan::new(
            Expr::call(
                Expr::name("range"),
                vec![Expr::int(start), Expr::int(stop), Expr::int(new_step)],
            ),
            iter.span,
        );
        debug!(var, start, stop, step = new_step, factor, "unrolled loop by factor");

        Ok(vec![WithSpan::new(
            Stmt::For {
                target,
                iter: new_iter,
                body: new_body,
                orelse,
            },
            span,
        )])
    }
}

/// Unrolls every `for` loop over a constant range in `tree` by `factor`.
pub fn unroll_for_loops_by_factor(
    tree: Module,
    env: &Environment,
    factor: i64,
) -> Result<Module, RewriteError> {
    FactorUnroller::new(env, factor)?.fold_module(tree)
}
