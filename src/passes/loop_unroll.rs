use super::{Metadata, Pass, PassState};
use crate::ast::Module;
use crate::diagnostics::RewriteError;
use crate::runtime::Environment;
use crate::transformers::{unroll_for_loops, unroll_for_loops_by_factor};

/// Fully unrolls loops over `unroll(...)`-marked iterables.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopUnroll;

impl Pass for LoopUnroll {
    fn name(&self) -> &'static str {
        "unroll"
    }

    fn description(&self) -> &'static str {
        "fully unroll loops over unroll-marked iterables"
    }

    fn rewrite(
        &self,
        tree: Module,
        env: Environment,
        metadata: Metadata,
    ) -> Result<PassState, RewriteError> {
        loop_unroll(tree, env, metadata)
    }
}

/// Unrolls loops over unit-step ranges by a fixed factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopUnrollByFactor {
    pub factor: i64,
}

impl LoopUnrollByFactor {
    pub fn new(factor: i64) -> Self {
        Self { factor }
    }
}

impl Pass for LoopUnrollByFactor {
    fn name(&self) -> &'static str {
        "unroll_by_factor"
    }

    fn description(&self) -> &'static str {
        "unroll loops over unit-step ranges by a fixed factor"
    }

    fn rewrite(
        &self,
        tree: Module,
        env: Environment,
        metadata: Metadata,
    ) -> Result<PassState, RewriteError> {
        loop_unroll_by_factor(tree, env, metadata, self.factor)
    }
}

pub fn loop_unroll(
    tree: Module,
    env: Environment,
    metadata: Metadata,
) -> Result<PassState, RewriteError> {
    let tree = unroll_for_loops(tree, &env)?;
    Ok((tree, env, metadata))
}

pub fn loop_unroll_by_factor(
    tree: Module,
    env: Environment,
    metadata: Metadata,
    factor: i64,
) -> Result<PassState, RewriteError> {
    let tree = unroll_for_loops_by_factor(tree, &env, factor)?;
    Ok((tree, env, metadata))
}
