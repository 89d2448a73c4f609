//! Tree rewrites: symbol substitution and the two loop-unrolling strategies.

pub mod node_replacer;
pub mod symbol_replacer;
pub mod unroll;
pub mod unroll_by_factor;

pub use node_replacer::{KeyDerivation, NodeReplacer};
pub use symbol_replacer::{
    replace_symbols, replace_symbols_in_expr, SubstitutionTable, SymbolKey, SymbolReplacer,
};
pub use unroll::{unroll_for_loops, Unroller};
pub use unroll_by_factor::{unroll_for_loops_by_factor, FactorUnroller};
