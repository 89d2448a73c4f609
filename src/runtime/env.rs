//! Lexical environment visible to the code being rewritten.

use im::OrdMap;

use crate::ast::{Module, Stmt};
use crate::runtime::eval::{evaluate, EvalError};
use crate::runtime::value::{Builtin, Value};

/// Names visible to the rewritten function: its locals, then the globals of
/// its defining module. Lookups fall back to the evaluator's builtins.
///
/// Both scopes are persistent maps, so cloning an environment to thread it
/// through a pipeline is cheap. The unrolling passes only ever read it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    locals: OrdMap<String, Value>,
    globals: OrdMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// An environment with the `unroll` marker bound as a global, the way a
    /// module that imports it would see it.
    pub fn with_prelude() -> Self {
        let mut env = Self::new();
        env.insert_global("unroll", Value::Builtin(Builtin::Unroll));
        env
    }

    pub fn from_parts(locals: OrdMap<String, Value>, globals: OrdMap<String, Value>) -> Self {
        Self { locals, globals }
    }

    pub fn insert_local(&mut self, name: impl Into<String>, value: Value) {
        self.locals.insert(name.into(), value);
    }

    pub fn insert_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    /// Locals shadow globals.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.locals.get(name).or_else(|| self.globals.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Every visible name in sorted order, locals first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.locals
            .keys()
            .chain(self.globals.keys().filter(|k| !self.locals.contains_key(*k)))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names().count()
    }

    pub fn is_empty(&self) -> bool {
        self.locals.is_empty() && self.globals.is_empty()
    }

    /// Constant-evaluates `expr` against this environment.
    pub fn evaluate(&self, expr: &crate::ast::ExprNode) -> Result<Value, EvalError> {
        evaluate(expr, self)
    }

    /// Binds every top-level `name = <constant expression>` of `module` as a
    /// global, in source order. Assignments that do not constant-evaluate are
    /// skipped. Returns how many names were bound.
    pub fn collect_module_constants(&mut self, module: &Module) -> usize {
        let mut bound = 0;
        for stmt in &module.body {
            let Stmt::Assign { targets, value } = &stmt.value else {
                continue;
            };
            let Ok(evaluated) = self.evaluate(value) else {
                continue;
            };
            for target in targets {
                if let Some(name) = target.value.as_name() {
                    self.insert_global(name, evaluated.clone());
                    bound += 1;
                }
            }
        }
        bound
    }
}
