//! Source text to syntax tree.

pub mod error;
pub mod lines;
pub mod parser;

pub use error::SyntaxError;
pub use parser::{extract_function, parse, parse_expr, parse_function};
