//! Compile-time evaluation support: values, the lexical environment, and the
//! constant evaluator used to decide loop eligibility.

pub mod env;
pub mod eval;
pub mod value;

pub use env::Environment;
pub use eval::{evaluate, EvalError};
pub use value::{Builtin, ConfigValue, RangeValue, Value, MAX_SEQUENCE_LEN};
