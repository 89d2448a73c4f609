// tests/unroll_tests.rs

use astrewrite::diagnostics::RewriteError;
use astrewrite::runtime::{Environment, Value};
use astrewrite::syntax::parse;
use astrewrite::transformers::unroll_for_loops;

fn unroll_with(source: &str, env: &Environment) -> Result<String, RewriteError> {
    unroll_for_loops(parse(source).unwrap(), env).map(|tree| tree.pretty())
}

fn unroll(source: &str) -> Result<String, RewriteError> {
    unroll_with(source, &Environment::with_prelude())
}

#[test]
fn test_unroll_over_range() {
    let source = "def f():\n    for i in unroll(range(3)):\n        body(i)\n";
    assert_eq!(
        unroll(source).unwrap(),
        "def f():\n    body(0)\n    body(1)\n    body(2)\n"
    );
}

#[test]
fn test_unroll_over_list_keeps_order_and_statements() {
    let source = "\
for x in unroll([3, -1, 4]):
    a = x * 2
    emit(a, x)
";
    assert_eq!(
        unroll(source).unwrap(),
        "a = 3 * 2\nemit(a, 3)\na = -1 * 2\nemit(a, -1)\na = 4 * 2\nemit(a, 4)\n"
    );
}

#[test]
fn test_inner_loops_unroll_first() {
    let source = "\
for j in unroll([0, 1]):
    for i in unroll(range(2)):
        g(i, j)
";
    assert_eq!(
        unroll(source).unwrap(),
        "g(0, 0)\ng(1, 0)\ng(0, 1)\ng(1, 1)\n"
    );
}

#[test]
fn test_else_block_follows_the_copies() {
    let source = "for i in unroll([1, 2]):\n    g(i)\nelse:\n    done()\n";
    assert_eq!(unroll(source).unwrap(), "g(1)\ng(2)\ndone()\n");
}

#[test]
fn test_empty_unroll_deletes_the_loop() {
    let source = "def f():\n    for i in unroll([]):\n        g(i)\n";
    assert_eq!(unroll(source).unwrap(), "def f():\n    pass\n");
}

#[test]
fn test_environment_bindings_are_used() {
    let mut env = Environment::with_prelude();
    env.insert_global("N", Value::Int(2));
    env.insert_local("lanes", Value::List(vec![Value::Int(5), Value::Int(6)]));
    let source = "\
for i in unroll(range(N)):
    a(i)
for lane in unroll(lanes):
    b(lane)
";
    assert_eq!(
        unroll_with(source, &env).unwrap(),
        "a(0)\na(1)\nb(5)\nb(6)\n"
    );
}

#[test]
fn test_module_constants_feed_the_environment() {
    let module = parse("N = 1 + 1\nfor i in unroll(range(N)):\n    g(i)\n").unwrap();
    let mut env = Environment::with_prelude();
    env.collect_module_constants(&module);
    let out = unroll_for_loops(module, &env).unwrap();
    assert_eq!(out.pretty(), "N = 1 + 1\ng(0)\ng(1)\n");
}

#[test]
fn test_unmarked_loops_are_unchanged() {
    let source = "\
for i in range(3):
    g(i)
for x in [1, 2]:
    g(x)
for k in items:
    g(k)
";
    assert_eq!(unroll(source).unwrap(), source);
}

#[test]
fn test_unknown_names_leave_the_loop_alone() {
    let source = "for i in unroll(range(n)):\n    g(i)\n";
    assert_eq!(unroll(source).unwrap(), source);
}

#[test]
fn test_unroll_must_be_bound() {
    let source = "for i in unroll(range(2)):\n    g(i)\n";
    assert_eq!(unroll_with(source, &Environment::new()).unwrap(), source);
}

#[test]
fn test_non_integer_elements_are_rejected() {
    let err = unroll("for s in unroll(['a', 'b']):\n    g(s)\n").unwrap_err();
    assert!(matches!(
        err,
        RewriteError::UnsupportedUnrollElement { type_name: "str", ref element, .. } if element == "'a'"
    ));

    let err = unroll("for x in unroll([1, 2.5]):\n    g(x)\n").unwrap_err();
    assert!(matches!(
        err,
        RewriteError::UnsupportedUnrollElement { type_name: "float", .. }
    ));

    let err = unroll("for b in unroll([True]):\n    g(b)\n").unwrap_err();
    assert!(matches!(
        err,
        RewriteError::UnsupportedUnrollElement { type_name: "bool", .. }
    ));
}

#[test]
fn test_substituted_receivers_render_as_valid_source() {
    let source = "for i in unroll([0, -1]):\n    g(i.bit_length())\n";
    let rendered = unroll(source).unwrap();
    assert_eq!(rendered, "g((0).bit_length())\ng((-1).bit_length())\n");
    assert_eq!(parse(&rendered).unwrap().pretty(), rendered);
}

#[test]
fn test_tuple_targets_are_rejected() {
    let err = unroll("for a, b in unroll([1, 2]):\n    g(a, b)\n").unwrap_err();
    assert!(matches!(
        err,
        RewriteError::UnsupportedLoopTarget { kind: "Tuple", .. }
    ));
}

#[test]
fn test_error_aborts_the_whole_rewrite() {
    let source = "\
for i in unroll([1]):
    g(i)
for s in unroll(['x']):
    g(s)
";
    assert!(unroll(source).is_err());
}
