use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest sequence the constant evaluator will materialize.
pub const MAX_SEQUENCE_LEN: usize = 1 << 16;

/// Builtin callables the constant evaluator knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Range,
    Unroll,
    Len,
    Abs,
    Min,
    Max,
    List,
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Range => "range",
            Builtin::Unroll => "unroll",
            Builtin::Len => "len",
            Builtin::Abs => "abs",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::List => "list",
        }
    }

    /// Names resolvable without an environment binding. `unroll` is not one of
    /// them: it has to be bound, see [`crate::runtime::Environment::with_prelude`].
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "range" => Some(Builtin::Range),
            "len" => Some(Builtin::Len),
            "abs" => Some(Builtin::Abs),
            "min" => Some(Builtin::Min),
            "max" => Some(Builtin::Max),
            "list" => Some(Builtin::List),
            _ => None,
        }
    }
}

/// An integer range with Python semantics: `stop` is exclusive and `step` is
/// never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeValue {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
}

impl RangeValue {
    pub fn len(&self) -> usize {
        let (lo, hi, step) = if self.step > 0 {
            (self.start as i128, self.stop as i128, self.step as i128)
        } else {
            (self.stop as i128, self.start as i128, -(self.step as i128))
        };
        if hi <= lo {
            0
        } else {
            usize::try_from((hi - lo + step - 1) / step).unwrap_or(usize::MAX)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> {
        let range = *self;
        (0..range.len()).map(move |i| range.start + range.step * i as i64)
    }
}

/// A compile-time value produced by constant evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    None,
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Range(RangeValue),
    /// An iterable explicitly marked for full unrolling.
    Unroll(Vec<Value>),
    Builtin(Builtin),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::None => "NoneType",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Range(_) => "range",
            Value::Unroll(_) => "unroll",
            Value::Builtin(_) => "builtin_function",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Str(s) => write!(f, "'{s}'"),
            Value::None => write!(f, "None"),
            Value::List(items) => write!(f, "[{}]", join(items)),
            Value::Tuple(items) if items.len() == 1 => write!(f, "({},)", items[0]),
            Value::Tuple(items) => write!(f, "({})", join(items)),
            Value::Range(r) if r.step == 1 => write!(f, "range({}, {})", r.start, r.stop),
            Value::Range(r) => write!(f, "range({}, {}, {})", r.start, r.stop, r.step),
            Value::Unroll(items) => write!(f, "unroll([{}])", join(items)),
            Value::Builtin(b) => write!(f, "<built-in function {}>", b.name()),
        }
    }
}

fn join(items: &[Value]) -> String {
    items.iter().map(Value::to_string).collect::<Vec<_>>().join(", ")
}

/// Environment bindings as they appear in a pipeline config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ConfigValue>),
}

impl From<ConfigValue> for Value {
    fn from(value: ConfigValue) -> Self {
        match value {
            ConfigValue::Bool(b) => Value::Bool(b),
            ConfigValue::Int(n) => Value::Int(n),
            ConfigValue::Float(x) => Value::Float(x),
            ConfigValue::Str(s) => Value::Str(s),
            ConfigValue::List(items) => Value::List(items.into_iter().map(Value::from).collect()),
        }
    }
}
