use std::collections::HashMap;

use super::node_replacer::{KeyDerivation, NodeReplacer};
use crate::ast::{Expr, ExprContext, ExprNode, StmtNode};

/// Per-substitution mapping from variable name to replacement fragment.
pub type SubstitutionTable = HashMap<String, ExprNode>;

/// Keys variable reads by name. Assignment targets derive no key, so a
/// substitution never turns a store into a literal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolKey;

impl KeyDerivation for SymbolKey {
    type Key = String;

    fn derive_key(&self, node: &ExprNode) -> Option<String> {
        match &node.value {
            Expr::Name {
                id,
                ctx: ExprContext::Load,
            } => Some(id.clone()),
            _ => None,
        }
    }
}

pub type SymbolReplacer = NodeReplacer<SymbolKey>;

/// Replaces every read of a variable named in `symbol_table` with a copy of
/// its entry; all other variables are unchanged. Neither argument is mutated.
pub fn replace_symbols(tree: StmtNode, symbol_table: &SubstitutionTable) -> StmtNode {
    SymbolReplacer::new(SymbolKey, symbol_table.clone()).replace_in_stmt(tree)
}

/// Expression form of [`replace_symbols`].
pub fn replace_symbols_in_expr(tree: ExprNode, symbol_table: &SubstitutionTable) -> ExprNode {
    SymbolReplacer::new(SymbolKey, symbol_table.clone()).replace_in_expr(tree)
}
