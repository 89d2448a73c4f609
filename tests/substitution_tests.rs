// tests/substitution_tests.rs

use astrewrite::ast::{Expr, ExprNode, Stmt, StmtNode, WithSpan};
use astrewrite::diagnostics::RewriteError;
use astrewrite::syntax::{parse, parse_expr};
use astrewrite::transformers::{
    replace_symbols, replace_symbols_in_expr, NodeReplacer, SubstitutionTable, SymbolKey,
};

fn stmt(source: &str) -> StmtNode {
    parse(source).unwrap().body.remove(0)
}

fn render(stmt: StmtNode) -> String {
    astrewrite::ast::Module::new(vec![stmt]).pretty()
}

fn table(entries: &[(&str, &str)]) -> SubstitutionTable {
    entries
        .iter()
        .map(|(name, fragment)| (name.to_string(), parse_expr(fragment).unwrap()))
        .collect()
}

#[test]
fn test_every_read_is_replaced() {
    let out = replace_symbols(stmt("y = i * i + j\n"), &table(&[("i", "3")]));
    assert_eq!(render(out), "y = 3 * 3 + j\n");
}

#[test]
fn test_fragments_keep_their_grouping() {
    let out = replace_symbols(stmt("y = i * 2\n"), &table(&[("i", "k + 1")]));
    assert_eq!(render(out), "y = (k + 1) * 2\n");
}

#[test]
fn test_replacement_is_not_rescanned() {
    // `i` maps to a fragment that itself mentions `i`; it must be inserted once.
    let out = replace_symbols(stmt("f(i)\n"), &table(&[("i", "i + 1")]));
    assert_eq!(render(out), "f(i + 1)\n");
}

#[test]
fn test_store_targets_are_left_alone() {
    let out = replace_symbols(stmt("i = i + 1\n"), &table(&[("i", "0")]));
    assert_eq!(render(out), "i = 0 + 1\n");
}

#[test]
fn test_nested_statements_are_rewritten() {
    let source = "if i > 0:\n    for j in range(i):\n        g(i, j)\n";
    let out = replace_symbols(stmt(source), &table(&[("i", "2")]));
    assert_eq!(
        render(out),
        "if 2 > 0:\n    for j in range(2):\n        g(2, j)\n"
    );
}

#[test]
fn test_empty_table_is_identity() {
    let original = stmt("x = a + f(b)[c]\n");
    assert_eq!(replace_symbols(original.clone(), &SubstitutionTable::new()), original);
}

#[test]
fn test_substitution_is_idempotent_under_empty_table() {
    let symbols = table(&[("a", "1"), ("b", "[2, 3]")]);
    let once = replace_symbols(stmt("x = a + len(b)\n"), &symbols);
    let twice = replace_symbols(once.clone(), &SubstitutionTable::new());
    assert_eq!(once, twice);
}

#[test]
fn test_inputs_are_not_mutated() {
    let symbols = table(&[("i", "7")]);
    let before = symbols.clone();
    let original = stmt("g(i)\n");
    let _ = replace_symbols(original.clone(), &symbols);
    assert_eq!(symbols, before);
    assert_eq!(render(original), "g(i)\n");
}

#[test]
fn test_expression_entry_point() {
    let out = replace_symbols_in_expr(parse_expr("[i, i * n]").unwrap(), &table(&[("n", "4")]));
    assert_eq!(astrewrite::ast::unparse_expr(&out), "[i, i * 4]");
}

#[test]
fn test_add_replacement_requires_a_keyable_node() {
    let mut replacer = NodeReplacer::new(SymbolKey, SubstitutionTable::new());
    let name: ExprNode = parse_expr("n").unwrap();
    replacer
        .add_replacement(&name, WithSpan::synthetic(Expr::int(8)))
        .unwrap();
    assert_eq!(replacer.table().len(), 1);

    let call = parse_expr("f(n)").unwrap();
    let err = replacer
        .add_replacement(&call, WithSpan::synthetic(Expr::int(8)))
        .unwrap_err();
    assert!(matches!(err, RewriteError::UnsupportedNodeKind { kind: "Call", .. }));

    let out = replacer.replace_in_stmt(stmt("return n\n"));
    assert!(matches!(
        out.value,
        Stmt::Return(Some(ref value)) if value.value == Expr::int(8)
    ));
}
