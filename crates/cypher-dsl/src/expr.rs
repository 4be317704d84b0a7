//! Renderable atoms: selectors, comparisons and aliased selections.
//!
//! An [`Atom`] never contains a boolean operator of its own, so it is never
//! parenthesized when it appears inside a logical combination.

use crate::path::PathExpr;
use crate::value::{Literal, Operand, Param};
use std::fmt;

/// Property-access selector (`n`, `n.name`, or any raw expression text)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector(String);

impl Selector {
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    /// Access a property (`n` -> `n.name`)
    pub fn prop(self, name: &str) -> Self {
        Self(format!("{}.{}", self.0, name))
    }

    pub fn as_(self, alias: impl Into<String>) -> Aliased {
        Aliased::new(self, alias)
    }

    pub fn eq(self, value: impl Into<Operand>) -> Comparison {
        Comparison::binary(self, CompareOp::Eq, value)
    }

    pub fn ne(self, value: impl Into<Operand>) -> Comparison {
        Comparison::binary(self, CompareOp::Ne, value)
    }

    pub fn lt(self, value: impl Into<Operand>) -> Comparison {
        Comparison::binary(self, CompareOp::Lt, value)
    }

    pub fn gt(self, value: impl Into<Operand>) -> Comparison {
        Comparison::binary(self, CompareOp::Gt, value)
    }

    pub fn lte(self, value: impl Into<Operand>) -> Comparison {
        Comparison::binary(self, CompareOp::Lte, value)
    }

    pub fn gte(self, value: impl Into<Operand>) -> Comparison {
        Comparison::binary(self, CompareOp::Gte, value)
    }

    /// List membership (`s.age IN [10, 20]`)
    pub fn is_in<I>(self, values: I) -> Comparison
    where
        I: IntoIterator,
        I::Item: Into<Operand>,
    {
        let list = Operand::List(values.into_iter().map(Into::into).collect());
        Comparison::binary(self, CompareOp::In, list)
    }

    pub fn contains(self, value: impl Into<Operand>) -> Comparison {
        Comparison::binary(self, CompareOp::Contains, value)
    }

    pub fn starts_with(self, value: impl Into<Operand>) -> Comparison {
        Comparison::binary(self, CompareOp::StartsWith, value)
    }

    pub fn ends_with(self, value: impl Into<Operand>) -> Comparison {
        Comparison::binary(self, CompareOp::EndsWith, value)
    }

    pub fn is_null(self) -> Comparison {
        Comparison::unary(self, CompareOp::IsNull)
    }

    pub fn is_not_null(self) -> Comparison {
        Comparison::unary(self, CompareOp::IsNotNull)
    }

    /// Property assignment for ON CREATE / ON MATCH (`n.date = $date`)
    pub fn set(self, value: impl Into<Operand>) -> Comparison {
        Comparison::binary(self, CompareOp::Assign, value)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    In,
    Contains,
    StartsWith,
    EndsWith,
    IsNull,
    IsNotNull,
    /// `=` used as an assignment in SET items
    Assign,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq | CompareOp::Assign => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Lte => "<=",
            CompareOp::Gte => ">=",
            CompareOp::In => "IN",
            CompareOp::Contains => "CONTAINS",
            CompareOp::StartsWith => "STARTS WITH",
            CompareOp::EndsWith => "ENDS WITH",
            CompareOp::IsNull => "IS NULL",
            CompareOp::IsNotNull => "IS NOT NULL",
        }
    }
}

/// `left op right`, or `left IS [NOT] NULL`
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    left: Selector,
    op: CompareOp,
    right: Option<Operand>,
}

impl Comparison {
    fn binary(left: Selector, op: CompareOp, right: impl Into<Operand>) -> Self {
        Self {
            left,
            op,
            right: Some(right.into()),
        }
    }

    fn unary(left: Selector, op: CompareOp) -> Self {
        Self {
            left,
            op,
            right: None,
        }
    }

    pub fn op(&self) -> CompareOp {
        self.op
    }

    pub fn as_(self, alias: impl Into<String>) -> Aliased {
        Aliased::new(self, alias)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.right {
            Some(right) => write!(f, "{} {} {}", self.left, self.op.symbol(), right),
            None => write!(f, "{} {}", self.left, self.op.symbol()),
        }
    }
}

/// Any leaf that renders to text without an internal boolean operator
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    /// Passthrough text, rendered verbatim
    Raw(String),
    Literal(Literal),
    Param(Param),
    Selector(Selector),
    Comparison(Comparison),
    Path(PathExpr),
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Raw(raw) => f.write_str(raw),
            Atom::Literal(lit) => fmt::Display::fmt(lit, f),
            Atom::Param(param) => fmt::Display::fmt(param, f),
            Atom::Selector(selector) => fmt::Display::fmt(selector, f),
            Atom::Comparison(cmp) => fmt::Display::fmt(cmp, f),
            Atom::Path(path) => fmt::Display::fmt(path, f),
        }
    }
}

impl From<&str> for Atom {
    fn from(raw: &str) -> Self {
        Atom::Raw(raw.to_string())
    }
}

impl From<String> for Atom {
    fn from(raw: String) -> Self {
        Atom::Raw(raw)
    }
}

impl From<Literal> for Atom {
    fn from(lit: Literal) -> Self {
        Atom::Literal(lit)
    }
}

impl From<Param> for Atom {
    fn from(param: Param) -> Self {
        Atom::Param(param)
    }
}

impl From<Selector> for Atom {
    fn from(selector: Selector) -> Self {
        Atom::Selector(selector)
    }
}

impl From<Comparison> for Atom {
    fn from(cmp: Comparison) -> Self {
        Atom::Comparison(cmp)
    }
}

impl From<PathExpr> for Atom {
    fn from(path: PathExpr) -> Self {
        Atom::Path(path)
    }
}

/// A selection with an alias (`n.name AS name`)
#[derive(Debug, Clone, PartialEq)]
pub struct Aliased {
    pub atom: Atom,
    pub alias: String,
}

impl Aliased {
    pub fn new(atom: impl Into<Atom>, alias: impl Into<String>) -> Self {
        Self {
            atom: atom.into(),
            alias: alias.into(),
        }
    }
}

impl fmt::Display for Aliased {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} AS {}", self.atom, self.alias)
    }
}
