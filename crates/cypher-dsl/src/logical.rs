//! Logical expression engine.
//!
//! Boolean conditions are immutable trees of [`Atom`]s combined with
//! AND / OR / XOR and negated with NOT. Combining never touches an existing
//! node: `combine` builds a new root whose children are the previous trees,
//! shared through `Arc`.
//!
//! Parenthesization depends only on where a node sits. A tree rendered as a
//! clause root is never wrapped; the same tree embedded as an operand of a
//! combination is wrapped when it is composite. Folding a whole condition
//! into a new combination therefore turns it into a parenthesized group:
//!
//! ```
//! use cypher_dsl::{select, Condition};
//!
//! let expr = select("a").eq(1).and("b").or("c");
//! assert_eq!(expr.to_string(), "(a = 1 AND b) OR c");
//! ```
//!
//! Negation always parenthesizes its operand (`NOT (a)`) and is
//! self-delimiting, so it is not wrapped again when embedded.

use crate::expr::{Atom, Comparison, Selector};
use crate::path::PathExpr;
use crate::value::{Literal, Param};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Binary boolean operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    And,
    Or,
    Xor,
}

impl LogicalOperator {
    pub fn keyword(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
            LogicalOperator::Xor => "XOR",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Node of a logical expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalExpr {
    Atom(Atom),
    Combination {
        left: Arc<LogicalExpr>,
        op: LogicalOperator,
        right: Arc<LogicalExpr>,
    },
    Not(Arc<LogicalExpr>),
}

impl LogicalExpr {
    pub fn atom(atom: impl Into<Atom>) -> Self {
        LogicalExpr::Atom(atom.into())
    }

    /// New root `(self op operand)`. Operators are never validated or reordered.
    pub fn combine(self, op: LogicalOperator, operand: impl Into<LogicalExpr>) -> Self {
        LogicalExpr::Combination {
            left: Arc::new(self),
            op,
            right: Arc::new(operand.into()),
        }
    }

    pub fn negate(operand: impl Into<LogicalExpr>) -> Self {
        LogicalExpr::Not(Arc::new(operand.into()))
    }

    /// Whether this node needs parentheses when embedded in a combination
    pub fn is_composite(&self) -> bool {
        matches!(self, LogicalExpr::Combination { .. })
    }

    /// Render as a root: never wrapped in outer parentheses
    pub fn render(&self) -> String {
        match self {
            LogicalExpr::Atom(atom) => atom.to_string(),
            LogicalExpr::Combination { left, op, right } => {
                format!("{} {} {}", left.wrap(), op.keyword(), right.wrap())
            }
            LogicalExpr::Not(operand) => format!("NOT ({})", operand.render()),
        }
    }

    /// Render as an operand: composite nodes get parentheses
    pub fn wrap(&self) -> String {
        if self.is_composite() {
            format!("({})", self.render())
        } else {
            self.render()
        }
    }

    /// Number of atoms in the tree
    pub fn atom_count(&self) -> usize {
        match self {
            LogicalExpr::Atom(_) => 1,
            LogicalExpr::Combination { left, right, .. } => left.atom_count() + right.atom_count(),
            LogicalExpr::Not(operand) => operand.atom_count(),
        }
    }
}

impl fmt::Display for LogicalExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<Atom> for LogicalExpr {
    fn from(atom: Atom) -> Self {
        LogicalExpr::Atom(atom)
    }
}

macro_rules! logical_from_atom {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for LogicalExpr {
                fn from(value: $ty) -> Self {
                    LogicalExpr::Atom(Atom::from(value))
                }
            }
        )*
    };
}

logical_from_atom!(&str, String, Literal, Param, Selector, Comparison, PathExpr);

/// Fluent AND / OR / XOR on anything that can become a condition.
///
/// Each call returns a new root with `self` as its left operand.
pub trait Condition: Into<LogicalExpr> + Sized {
    fn and(self, other: impl Into<LogicalExpr>) -> LogicalExpr {
        self.into().combine(LogicalOperator::And, other)
    }

    fn or(self, other: impl Into<LogicalExpr>) -> LogicalExpr {
        self.into().combine(LogicalOperator::Or, other)
    }

    fn xor(self, other: impl Into<LogicalExpr>) -> LogicalExpr {
        self.into().combine(LogicalOperator::Xor, other)
    }
}

impl Condition for LogicalExpr {}
impl Condition for Selector {}
impl Condition for Comparison {}
impl Condition for PathExpr {}
