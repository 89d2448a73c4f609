// tests/unroll_by_factor_tests.rs

use astrewrite::diagnostics::RewriteError;
use astrewrite::runtime::{Environment, Value, MAX_SEQUENCE_LEN};
use astrewrite::syntax::parse;
use astrewrite::transformers::unroll_for_loops_by_factor;

fn unroll_with(source: &str, env: &Environment, factor: i64) -> Result<String, RewriteError> {
    unroll_for_loops_by_factor(parse(source).unwrap(), env, factor).map(|tree| tree.pretty())
}

fn unroll(source: &str, factor: i64) -> Result<String, RewriteError> {
    unroll_with(source, &Environment::with_prelude(), factor)
}

#[test]
fn test_ascending_range() {
    let source = "for i in range(0, 4):\n    body(i)\n";
    assert_eq!(
        unroll(source, 2).unwrap(),
        "for i in range(0, 4, 2):\n    body(i + 0)\n    body(i + 1)\n"
    );
}

#[test]
fn test_descending_range() {
    let source = "for i in range(4, 0, -1):\n    body(i)\n";
    assert_eq!(
        unroll(source, 2).unwrap(),
        "for i in range(4, 0, -2):\n    body(i - 0)\n    body(i - 1)\n"
    );
}

#[test]
fn test_single_argument_range_and_loop_variable_name() {
    let source = "def f(a):\n    for idx in range(6):\n        a[idx] = idx * 2\n";
    assert_eq!(
        unroll(source, 3).unwrap(),
        "\
def f(a):
    for idx in range(0, 6, 3):
        a[idx + 0] = (idx + 0) * 2
        a[idx + 1] = (idx + 1) * 2
        a[idx + 2] = (idx + 2) * 2
"
    );
}

#[test]
fn test_factor_equal_to_extent_is_one_pass() {
    let source = "for i in range(0, 3):\n    g(i)\n";
    assert_eq!(
        unroll(source, 3).unwrap(),
        "for i in range(0, 3, 3):\n    g(i + 0)\n    g(i + 1)\n    g(i + 2)\n"
    );
}

#[test]
fn test_factor_one_keeps_the_loop_shape() {
    let source = "for i in range(2, 5):\n    g(i)\n";
    assert_eq!(
        unroll(source, 1).unwrap(),
        "for i in range(2, 5, 1):\n    g(i + 0)\n"
    );
}

#[test]
fn test_empty_range_deletes_the_loop() {
    let source = "def f():\n    for i in range(5, 5):\n        g(i)\n    return 0\n";
    assert_eq!(unroll(source, 2).unwrap(), "def f():\n    return 0\n");
}

#[test]
fn test_extent_is_measured_on_magnitudes() {
    // |-2| and |2| are equal, so the loop counts as empty.
    let source = "for i in range(-2, 2):\n    g(i)\n";
    assert_eq!(unroll(source, 2).unwrap(), "");
}

#[test]
fn test_reversed_bounds_take_the_descending_branch() {
    let source = "for i in range(5, 0):\n    g(i)\n";
    assert_eq!(
        unroll(source, 5).unwrap(),
        "for i in range(5, 0, -5):\n    g(i - 0)\n    g(i - 1)\n    g(i - 2)\n    g(i - 3)\n    g(i - 4)\n"
    );
}

#[test]
fn test_negative_factor_uses_its_magnitude() {
    let source = "for i in range(0, 4):\n    g(i)\n";
    assert_eq!(unroll(source, -2).unwrap(), unroll(source, 2).unwrap());
}

#[test]
fn test_zero_factor_is_rejected() {
    let source = "for i in range(0, 4):\n    g(i)\n";
    assert_eq!(unroll(source, 0), Err(RewriteError::InvalidFactor));
}

#[test]
fn test_factor_larger_than_range() {
    let err = unroll("for i in range(0, 4):\n    g(i)\n", 8).unwrap_err();
    assert!(matches!(
        err,
        RewriteError::FactorTooLarge { factor: 8, extent: 4, .. }
    ));
}

#[test]
fn test_factor_must_divide_the_range() {
    let err = unroll("for i in range(0, 6):\n    g(i)\n", 4).unwrap_err();
    assert!(matches!(
        err,
        RewriteError::FactorNotDivisible { factor: 4, extent: 6, .. }
    ));
}

#[test]
fn test_copy_count_is_capped() {
    let err = unroll("for i in range(0, 2 ** 62):\n    g(i)\n", 1 << 62).unwrap_err();
    assert!(matches!(
        err,
        RewriteError::TooManyCopies { factor, limit: MAX_SEQUENCE_LEN, .. } if factor == 1 << 62
    ));

    // The cap counts statements, not just iterations.
    let err = unroll("for i in range(0, 65536):\n    g(i)\n    h(i)\n", 65536).unwrap_err();
    assert!(matches!(
        err,
        RewriteError::TooManyCopies { factor: 65536, copies: 131072, .. }
    ));
}

#[test]
fn test_only_unit_steps_are_supported() {
    let err = unroll("for i in range(0, 8, 2):\n    g(i)\n", 2).unwrap_err();
    assert!(matches!(
        err,
        RewriteError::UnsupportedStep { start: 0, stop: 8, step: 2, .. }
    ));
}

#[test]
fn test_unroll_marked_iterables_are_not_implemented() {
    let err = unroll("for i in unroll(range(4)):\n    g(i)\n", 2).unwrap_err();
    assert!(matches!(err, RewriteError::NotImplemented { .. }));
}

#[test]
fn test_non_name_targets_are_rejected() {
    let err = unroll("for p.x in range(4):\n    g(p)\n", 2).unwrap_err();
    assert!(matches!(
        err,
        RewriteError::UnsupportedLoopTarget { kind: "Attribute", .. }
    ));
}

#[test]
fn test_non_constant_and_non_range_loops_are_unchanged() {
    let source = "\
for i in range(n):
    g(i)
for x in [1, 2]:
    g(x)
";
    assert_eq!(unroll(source, 2).unwrap(), source);
}

#[test]
fn test_bounds_from_the_environment() {
    let mut env = Environment::with_prelude();
    env.insert_global("N", Value::Int(8));
    let source = "for i in range(N):\n    g(i)\n";
    assert_eq!(
        unroll_with(source, &env, 4).unwrap(),
        "for i in range(0, 8, 4):\n    g(i + 0)\n    g(i + 1)\n    g(i + 2)\n    g(i + 3)\n"
    );
}

#[test]
fn test_else_block_is_preserved() {
    let source = "for i in range(0, 2):\n    g(i)\nelse:\n    done()\n";
    assert_eq!(
        unroll(source, 2).unwrap(),
        "for i in range(0, 2, 2):\n    g(i + 0)\n    g(i + 1)\nelse:\n    done()\n"
    );
}

#[test]
fn test_nested_loops() {
    let source = "for i in range(2):\n    for j in range(2):\n        g(i, j)\n";
    assert_eq!(
        unroll(source, 2).unwrap(),
        "\
for i in range(0, 2, 2):
    for j in range(0, 2, 2):
        g(i + 0, j + 0)
        g(i + 0, j + 1)
    for j in range(0, 2, 2):
        g(i + 1, j + 0)
        g(i + 1, j + 1)
"
    );
}
