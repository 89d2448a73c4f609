//! astrewrite: source-to-source loop unrolling.
//!
//! A function's source is parsed into a syntax tree, run through a pipeline of
//! rewrite passes that thread a `(tree, environment, metadata)` state, and
//! rendered back to source. The passes unroll `for` loops whose iterators
//! constant-evaluate against the environment:
//!
//! ```rust
//! use astrewrite::passes::{LoopUnrollByFactor, Metadata, Pipeline};
//! use astrewrite::runtime::Environment;
//! use astrewrite::syntax::parse_function;
//!
//! let tree = parse_function("def f():\n    for i in range(0, 4):\n        body(i)\n", "f").unwrap();
//! let pipeline = Pipeline::new().with_pass(LoopUnrollByFactor::new(2));
//! let (tree, _, _) = pipeline
//!     .run(tree, Environment::with_prelude(), Metadata::new())
//!     .unwrap();
//! assert_eq!(
//!     tree.pretty(),
//!     "def f():\n    for i in range(0, 4, 2):\n        body(i + 0)\n        body(i + 1)\n"
//! );
//! ```

pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod passes;
pub mod runtime;
pub mod syntax;
pub mod transformers;

pub use crate::diagnostics::{PipelineError, RewriteError};
pub use crate::syntax::SyntaxError;
