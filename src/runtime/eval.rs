//! Constant evaluation of loop iterator expressions.
//!
//! This is a small structural interpreter, not a general evaluator: it knows
//! literals, names, integer arithmetic, list and tuple displays, and calls to
//! a fixed set of side-effect free builtins. Anything else is an [`EvalError`],
//! which the unrollers read as "not constant" and leave the loop alone.

use thiserror::Error;

use crate::ast::{BinOp, Constant, Expr, ExprNode, UnaryOp};
use crate::runtime::env::Environment;
use crate::runtime::value::{Builtin, RangeValue, Value, MAX_SEQUENCE_LEN};

/// Why an expression is not constant-evaluable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("name '{0}' is not defined")]
    UndefinedName(String),
    #[error("{0} expressions are not constant-evaluable")]
    Unsupported(&'static str),
    #[error("unsupported operand type(s) for {op}: '{left}' and '{right}'")]
    OperandTypes {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
    #[error("bad operand type for {op}: '{operand}'")]
    UnaryOperandType {
        op: &'static str,
        operand: &'static str,
    },
    #[error("integer overflow")]
    Overflow,
    #[error("integer division or modulo by zero")]
    ZeroDivision,
    #[error("'{0}' object is not callable")]
    NotCallable(&'static str),
    #[error("{func}() {message}")]
    BadArguments {
        func: &'static str,
        message: String,
    },
    #[error("'{0}' object is not iterable")]
    NotIterable(&'static str),
    #[error("sequence longer than {} elements", MAX_SEQUENCE_LEN)]
    TooLong,
}

/// Evaluates `expr` using only the names bound in `env` and the builtins.
pub fn evaluate(expr: &ExprNode, env: &Environment) -> Result<Value, EvalError> {
    eval_expr(&expr.value, env)
}

fn eval_expr(expr: &Expr, env: &Environment) -> Result<Value, EvalError> {
    match expr {
        Expr::Constant(constant) => Ok(eval_constant(constant)),
        Expr::Name { id, .. } => lookup(id, env),
        Expr::BinOp { left, op, right } => {
            let left = eval_expr(&left.value, env)?;
            let right = eval_expr(&right.value, env)?;
            eval_binop(*op, left, right)
        }
        Expr::UnaryOp { op, operand } => eval_unary(*op, eval_expr(&operand.value, env)?),
        Expr::List { elts, .. } => Ok(Value::List(eval_all(elts, env)?)),
        Expr::Tuple { elts, .. } => Ok(Value::Tuple(eval_all(elts, env)?)),
        Expr::Call {
            func,
            args,
            keywords,
        } => {
            if !keywords.is_empty() {
                return Err(EvalError::Unsupported("keyword argument"));
            }
            match eval_expr(&func.value, env)? {
                Value::Builtin(builtin) => call_builtin(builtin, eval_all(args, env)?),
                other => Err(EvalError::NotCallable(other.type_name())),
            }
        }
        other => Err(EvalError::Unsupported(other.kind_name())),
    }
}

fn eval_all(exprs: &[ExprNode], env: &Environment) -> Result<Vec<Value>, EvalError> {
    exprs.iter().map(|e| eval_expr(&e.value, env)).collect()
}

fn eval_constant(constant: &Constant) -> Value {
    match constant {
        Constant::Int(n) => Value::Int(*n),
        Constant::Float(x) => Value::Float(*x),
        Constant::Str(s) => Value::Str(s.clone()),
        Constant::Bool(b) => Value::Bool(*b),
        Constant::None => Value::None,
    }
}

fn lookup(name: &str, env: &Environment) -> Result<Value, EvalError> {
    if let Some(value) = env.get(name) {
        return Ok(value.clone());
    }
    Builtin::lookup(name)
        .map(Value::Builtin)
        .ok_or_else(|| EvalError::UndefinedName(name.to_string()))
}

// ============================================================================
// ARITHMETIC
// ============================================================================

fn eval_binop(op: BinOp, left: Value, right: Value) -> Result<Value, EvalError> {
    let (Value::Int(a), Value::Int(b)) = (&left, &right) else {
        return Err(EvalError::OperandTypes {
            op: crate::ast::unparse::binop_symbol(op),
            left: left.type_name(),
            right: right.type_name(),
        });
    };
    let (a, b) = (*a, *b);
    let result = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Sub => a.checked_sub(b),
        BinOp::Mult => a.checked_mul(b),
        BinOp::FloorDiv => Some(floor_div(a, b)?),
        BinOp::Mod => Some(floor_mod(a, b)?),
        BinOp::Pow => {
            let exp = u32::try_from(b).map_err(|_| EvalError::Unsupported("negative or huge exponent"))?;
            a.checked_pow(exp)
        }
        BinOp::Div => return Err(EvalError::Unsupported("true division")),
    };
    result.map(Value::Int).ok_or(EvalError::Overflow)
}

fn floor_div(a: i64, b: i64) -> Result<i64, EvalError> {
    if b == 0 {
        return Err(EvalError::ZeroDivision);
    }
    let q = a.checked_div(b).ok_or(EvalError::Overflow)?;
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn floor_mod(a: i64, b: i64) -> Result<i64, EvalError> {
    if b == 0 {
        return Err(EvalError::ZeroDivision);
    }
    let r = a.checked_rem(b).ok_or(EvalError::Overflow)?;
    if r != 0 && ((r < 0) != (b < 0)) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

fn eval_unary(op: UnaryOp, operand: Value) -> Result<Value, EvalError> {
    match (op, &operand) {
        (UnaryOp::USub, Value::Int(n)) => n.checked_neg().map(Value::Int).ok_or(EvalError::Overflow),
        (UnaryOp::USub, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnaryOp::UAdd, Value::Int(_) | Value::Float(_)) => Ok(operand),
        (UnaryOp::Invert, Value::Int(n)) => Ok(Value::Int(!n)),
        (UnaryOp::Not, _) => Err(EvalError::Unsupported("boolean negation")),
        (op, _) => Err(EvalError::UnaryOperandType {
            op: match op {
                UnaryOp::USub => "unary -",
                UnaryOp::UAdd => "unary +",
                UnaryOp::Invert => "unary ~",
                UnaryOp::Not => "not",
            },
            operand: operand.type_name(),
        }),
    }
}

// ============================================================================
// BUILTINS
// ============================================================================

fn call_builtin(builtin: Builtin, args: Vec<Value>) -> Result<Value, EvalError> {
    let func = builtin.name();
    match builtin {
        Builtin::Range => {
            let ints = int_args(func, &args)?;
            let (start, stop, step) = match ints.as_slice() {
                [stop] => (0, *stop, 1),
                [start, stop] => (*start, *stop, 1),
                [start, stop, step] => (*start, *stop, *step),
                _ => return Err(arity(func, "expected 1 to 3 arguments", args.len())),
            };
            if step == 0 {
                return Err(EvalError::BadArguments {
                    func,
                    message: "arg 3 must not be zero".into(),
                });
            }
            Ok(Value::Range(RangeValue { start, stop, step }))
        }
        Builtin::Unroll => {
            let [iterable] = one_arg(func, args)?;
            Ok(Value::Unroll(iterate(iterable)?))
        }
        Builtin::List => {
            let [iterable] = one_arg(func, args)?;
            Ok(Value::List(iterate(iterable)?))
        }
        Builtin::Len => {
            let [value] = one_arg(func, args)?;
            let len = match &value {
                Value::List(items) | Value::Tuple(items) | Value::Unroll(items) => items.len(),
                Value::Range(r) => r.len(),
                Value::Str(s) => s.chars().count(),
                other => {
                    return Err(EvalError::BadArguments {
                        func,
                        message: format!("object of type '{}' has no len()", other.type_name()),
                    })
                }
            };
            i64::try_from(len).map(Value::Int).map_err(|_| EvalError::Overflow)
        }
        Builtin::Abs => {
            let [value] = one_arg(func, args)?;
            match value {
                Value::Int(n) => n.checked_abs().map(Value::Int).ok_or(EvalError::Overflow),
                Value::Float(x) => Ok(Value::Float(x.abs())),
                other => Err(EvalError::BadArguments {
                    func,
                    message: format!("bad operand type '{}'", other.type_name()),
                }),
            }
        }
        Builtin::Min | Builtin::Max => {
            let ints = if let [single] = args.as_slice() {
                let items = iterate(single.clone())?;
                int_args(func, &items)?
            } else {
                int_args(func, &args)?
            };
            let picked = if builtin == Builtin::Min {
                ints.iter().min()
            } else {
                ints.iter().max()
            };
            picked.copied().map(Value::Int).ok_or_else(|| EvalError::BadArguments {
                func,
                message: "arg is an empty sequence".into(),
            })
        }
    }
}

/// Materializes an iterable value as a list of elements.
fn iterate(value: Value) -> Result<Vec<Value>, EvalError> {
    let items = match value {
        Value::List(items) | Value::Tuple(items) | Value::Unroll(items) => items,
        Value::Range(r) => {
            if r.len() > MAX_SEQUENCE_LEN {
                return Err(EvalError::TooLong);
            }
            r.iter().map(Value::Int).collect()
        }
        Value::Str(s) => s.chars().map(|c| Value::Str(c.to_string())).collect(),
        other => return Err(EvalError::NotIterable(other.type_name())),
    };
    if items.len() > MAX_SEQUENCE_LEN {
        return Err(EvalError::TooLong);
    }
    Ok(items)
}

fn one_arg(func: &'static str, args: Vec<Value>) -> Result<[Value; 1], EvalError> {
    let len = args.len();
    <[Value; 1]>::try_from(args).map_err(|_| arity(func, "takes exactly one argument", len))
}

fn int_args(func: &'static str, args: &[Value]) -> Result<Vec<i64>, EvalError> {
    args.iter()
        .map(|arg| {
            arg.as_int().ok_or_else(|| EvalError::BadArguments {
                func,
                message: format!("'{}' object cannot be interpreted as an integer", arg.type_name()),
            })
        })
        .collect()
}

fn arity(func: &'static str, expected: &str, given: usize) -> EvalError {
    EvalError::BadArguments {
        func,
        message: format!("{expected} ({given} given)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_expr;

    fn eval(src: &str, env: &Environment) -> Result<Value, EvalError> {
        evaluate(&parse_expr(src).unwrap(), env)
    }

    #[test]
    fn ranges_follow_python_argument_rules() {
        let env = Environment::new();
        assert_eq!(
            eval("range(4)", &env),
            Ok(Value::Range(RangeValue { start: 0, stop: 4, step: 1 }))
        );
        assert_eq!(
            eval("range(4, 0, -1)", &env),
            Ok(Value::Range(RangeValue { start: 4, stop: 0, step: -1 }))
        );
        assert!(matches!(eval("range(0, 4, 0)", &env), Err(EvalError::BadArguments { .. })));
        assert!(matches!(eval("range('a')", &env), Err(EvalError::BadArguments { .. })));
    }

    #[test]
    fn arithmetic_uses_floor_semantics() {
        let mut env = Environment::new();
        env.insert_local("n", Value::Int(7));
        assert_eq!(eval("-n // 2", &env), Ok(Value::Int(-4)));
        assert_eq!(eval("-n % 3", &env), Ok(Value::Int(2)));
        assert_eq!(eval("2 ** 10 - n", &env), Ok(Value::Int(1017)));
        assert_eq!(eval("n // 0", &env), Err(EvalError::ZeroDivision));
    }

    #[test]
    fn unroll_requires_a_binding() {
        assert_eq!(
            eval("unroll(range(3))", &Environment::new()),
            Err(EvalError::UndefinedName("unroll".into()))
        );
        assert_eq!(
            eval("unroll(range(3))", &Environment::with_prelude()),
            Ok(Value::Unroll(vec![Value::Int(0), Value::Int(1), Value::Int(2)]))
        );
    }

    #[test]
    fn non_constant_forms_are_rejected() {
        let env = Environment::with_prelude();
        assert_eq!(eval("xs", &env), Err(EvalError::UndefinedName("xs".into())));
        assert_eq!(eval("a.b", &env), Err(EvalError::Unsupported("Attribute")));
        assert_eq!(eval("1 < 2", &env), Err(EvalError::Unsupported("Compare")));
        assert_eq!(eval("range(stop=3)", &env), Err(EvalError::Unsupported("keyword argument")));
        assert_eq!(eval("3(1)", &env), Err(EvalError::NotCallable("int")));
    }

    #[test]
    fn builtins_over_sequences() {
        let env = Environment::new();
        assert_eq!(eval("len([1, 2, 3])", &env), Ok(Value::Int(3)));
        assert_eq!(eval("max(range(5))", &env), Ok(Value::Int(4)));
        assert_eq!(eval("min(3, -1, 2)", &env), Ok(Value::Int(-1)));
        assert_eq!(eval("abs(-5)", &env), Ok(Value::Int(5)));
        assert_eq!(eval("range(10 ** 9)", &env).map(|v| v.type_name()), Ok("range"));
        assert_eq!(eval("list(range(10 ** 9))", &env), Err(EvalError::TooLong));
    }
}
