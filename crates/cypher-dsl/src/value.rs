//! Leaf values: literals, parameters, comparison operands and SKIP/LIMIT bounds.

use crate::error::{DslError, DslResult};
use crate::expr::{Aliased, Selector};
use serde_json::Value;
use std::fmt;

/// A literal value rendered in Cypher syntax (`'Foo'`, `1`, `[1, 2]`).
#[derive(Debug, Clone, PartialEq)]
pub struct Literal(pub Value);

impl Literal {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    /// Alias this literal inside a projection (`1 AS x`)
    pub fn as_(self, alias: impl Into<String>) -> Aliased {
        Aliased::new(self, alias)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, &self.0)
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{}", b),
        Value::Number(n) => write!(f, "{}", n),
        Value::String(s) => write!(f, "'{}'", escape(s)),
        Value::Array(items) => {
            f.write_str("[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_value(f, item)?;
            }
            f.write_str("]")
        }
        Value::Object(map) => {
            f.write_str("{")?;
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}: ", key)?;
                write_value(f, item)?;
            }
            f.write_str("}")
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Short human-readable description of a JSON value, used in error messages
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string '{}'", s),
        Value::Array(items) => format!("array of {} items", items.len()),
        Value::Object(_) => "object".to_string(),
    }
}

/// A query parameter (`$name`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param(String);

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.strip_prefix('$') {
            Some(stripped) => Self(stripped.to_string()),
            None => Self(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Alias this parameter inside a projection
    pub fn as_(self, alias: impl Into<String>) -> Aliased {
        Aliased::new(self, alias)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Right-hand side of a comparison.
///
/// Plain strings become string literals; use [`Selector`] for property
/// references and raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Literal),
    Param(Param),
    Expr(String),
    List(Vec<Operand>),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(lit) => fmt::Display::fmt(lit, f),
            Operand::Param(param) => fmt::Display::fmt(param, f),
            Operand::Expr(expr) => f.write_str(expr),
            Operand::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    fmt::Display::fmt(item, f)?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! operand_from_literal {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Operand {
                fn from(value: $ty) -> Self {
                    Operand::Literal(Literal::new(value))
                }
            }
        )*
    };
}

operand_from_literal!(&str, String, i32, i64, u32, u64, f64, bool);

impl From<Literal> for Operand {
    fn from(lit: Literal) -> Self {
        Operand::Literal(lit)
    }
}

impl From<Param> for Operand {
    fn from(param: Param) -> Self {
        Operand::Param(param)
    }
}

impl From<Selector> for Operand {
    fn from(selector: Selector) -> Self {
        Operand::Expr(selector.to_string())
    }
}

impl<T: Into<Operand>> From<Vec<T>> for Operand {
    fn from(items: Vec<T>) -> Self {
        Operand::List(items.into_iter().map(Into::into).collect())
    }
}

/// Value of a SKIP or LIMIT modifier
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Count(i64),
    Literal(Literal),
    Param(Param),
    Raw(String),
}

impl Bound {
    /// Convert a dynamically typed value; numbers and raw strings are accepted
    pub fn from_value(operation: &'static str, value: &Value) -> DslResult<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(Bound::Count)
                .ok_or_else(|| DslError::unsupported(operation, describe(value))),
            Value::String(s) => Ok(Bound::Raw(s.clone())),
            other => Err(DslError::unsupported(operation, describe(other))),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Count(n) => write!(f, "{}", n),
            Bound::Literal(lit) => fmt::Display::fmt(lit, f),
            Bound::Param(param) => fmt::Display::fmt(param, f),
            Bound::Raw(raw) => f.write_str(raw),
        }
    }
}

impl From<i32> for Bound {
    fn from(n: i32) -> Self {
        Bound::Count(i64::from(n))
    }
}

impl From<i64> for Bound {
    fn from(n: i64) -> Self {
        Bound::Count(n)
    }
}

impl From<u32> for Bound {
    fn from(n: u32) -> Self {
        Bound::Count(i64::from(n))
    }
}

impl From<usize> for Bound {
    fn from(n: usize) -> Self {
        Bound::Count(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<Literal> for Bound {
    fn from(lit: Literal) -> Self {
        Bound::Literal(lit)
    }
}

impl From<Param> for Bound {
    fn from(param: Param) -> Self {
        Bound::Param(param)
    }
}

impl From<&str> for Bound {
    fn from(raw: &str) -> Self {
        Bound::Raw(raw.to_string())
    }
}
