//! Pass adapter layer.
//!
//! A [`Pass`] is a pure function over the pipeline state
//! `(tree, environment, metadata)`. A [`Pipeline`] threads that state through
//! an ordered list of passes and stops at the first failure.

use serde_json::{Map, Value as JsonValue};
use tracing::{debug, info_span};

use crate::ast::Module;
use crate::diagnostics::{PipelineError, RewriteError};
use crate::runtime::Environment;

pub mod loop_unroll;

pub use loop_unroll::{loop_unroll, loop_unroll_by_factor, LoopUnroll, LoopUnrollByFactor};

/// Free-form per-pipeline bookkeeping. The unrolling passes never touch it.
pub type Metadata = Map<String, JsonValue>;

/// The state threaded from one pass to the next.
pub type PassState = (Module, Environment, Metadata);

pub trait Pass {
    /// Stable identifier, as written in configs and `--pass` specs.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        ""
    }

    fn rewrite(
        &self,
        tree: Module,
        env: Environment,
        metadata: Metadata,
    ) -> Result<PassState, RewriteError>;
}

/// The tree as it stood after one pass ran.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceStep {
    pub pass: String,
    pub tree: Module,
}

#[derive(Default)]
pub struct Pipeline {
    passes: Vec<Box<dyn Pass>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pass(mut self, pass: impl Pass + 'static) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn push(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn pass_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.passes.iter().map(|pass| pass.name())
    }

    pub fn run(
        &self,
        tree: Module,
        env: Environment,
        metadata: Metadata,
    ) -> Result<PassState, PipelineError> {
        self.run_with(tree, env, metadata, |_, _| {})
    }

    /// Like [`Pipeline::run`], also returning a snapshot after every pass.
    pub fn run_traced(
        &self,
        tree: Module,
        env: Environment,
        metadata: Metadata,
    ) -> Result<(PassState, Vec<TraceStep>), PipelineError> {
        let mut steps = Vec::with_capacity(self.passes.len());
        let state = self.run_with(tree, env, metadata, |pass, tree| {
            steps.push(TraceStep {
                pass: pass.to_string(),
                tree: tree.clone(),
            })
        })?;
        Ok((state, steps))
    }

    fn run_with(
        &self,
        tree: Module,
        env: Environment,
        metadata: Metadata,
        mut on_step: impl FnMut(&str, &Module),
    ) -> Result<PassState, PipelineError> {
        let mut state = (tree, env, metadata);
        for pass in &self.passes {
            let span = info_span!("pass", name = pass.name());
            let _entered = span.enter();
            let (tree, env, metadata) = state;
            state = pass
                .rewrite(tree, env, metadata)
                .map_err(|error| PipelineError {
                    pass: pass.name().to_string(),
                    error,
                })?;
            debug!(statements = state.0.body.len(), "pass finished");
            on_step(pass.name(), &state.0);
        }
        Ok(state)
    }
}
