//! Generic "replace a node by key" rewrite.
//!
//! A [`NodeReplacer`] walks a tree pre-order. Each expression is first asked for
//! a key through its [`KeyDerivation`]; when the key is in the replacement
//! table the whole node is swapped for a clone of the table entry and its
//! children are never visited. Everything else is rebuilt unchanged.

use std::collections::HashMap;
use std::convert::Infallible;
use std::hash::Hash;

use crate::ast::{walk_expr, ExprNode, StmtNode, Transformer};
use crate::diagnostics::RewriteError;

/// Capability: derive a stable identity key for the nodes a replacer may target.
pub trait KeyDerivation {
    type Key: Eq + Hash + Clone;

    /// `None` means the node can never be replaced.
    fn derive_key(&self, node: &ExprNode) -> Option<Self::Key>;
}

pub struct NodeReplacer<D: KeyDerivation> {
    deriver: D,
    table: HashMap<D::Key, ExprNode>,
}

impl<D: KeyDerivation> NodeReplacer<D> {
    pub fn new(deriver: D, table: HashMap<D::Key, ExprNode>) -> Self {
        Self { deriver, table }
    }

    /// Registers `replacement` for every node sharing `node`'s key.
    pub fn add_replacement(&mut self, node: &ExprNode, replacement: ExprNode) -> Result<(), RewriteError> {
        let key = self
            .deriver
            .derive_key(node)
            .ok_or_else(|| RewriteError::UnsupportedNodeKind {
                kind: node.value.kind_name(),
                span: node.span.into(),
            })?;
        self.table.insert(key, replacement);
        Ok(())
    }

    pub fn table(&self) -> &HashMap<D::Key, ExprNode> {
        &self.table
    }

    /// Rewrites one statement; the result is always exactly one statement.
    pub fn replace_in_stmt(&mut self, stmt: StmtNode) -> StmtNode {
        match crate::ast::walk_stmt(self, stmt) {
            Ok(stmt) => stmt,
            Err(never) => match never {},
        }
    }

    pub fn replace_in_expr(&mut self, expr: ExprNode) -> ExprNode {
        match self.fold_expr(expr) {
            Ok(expr) => expr,
            Err(never) => match never {},
        }
    }
}

impl<D: KeyDerivation> Transformer for NodeReplacer<D> {
    type Error = Infallible;

    fn fold_expr(&mut self, expr: ExprNode) -> Result<ExprNode, Infallible> {
        let replacement = self
            .deriver
            .derive_key(&expr)
            .and_then(|key| self.table.get(&key))
            .cloned();
        match replacement {
            Some(replacement) => Ok(replacement),
            None => walk_expr(self, expr),
        }
    }
}
