//! Entry points and value constructors.
//!
//! These are the functions a query starts from; everything else is reached
//! through method chains on what they return.

use crate::expr::Selector;
use crate::logical::LogicalExpr;
use crate::path::{PathExpr, PathFragment};
use crate::query::{AfterWith, Creating, Matching, Merging, Query};
use crate::value::{Literal, Param};
use serde_json::Value;

/// Start with `MATCH`
pub fn match_() -> Query<Matching> {
    Query::new_match()
}

/// Start with `OPTIONAL MATCH`
pub fn opt_match() -> Query<Matching> {
    Query::new_opt_match()
}

/// Start with `WITH`
pub fn with() -> Query<AfterWith> {
    Query::new_with()
}

/// Start with `CREATE path`
pub fn create(path: impl Into<PathFragment>) -> Query<Creating> {
    Query::new_create(path)
}

/// Start with `MERGE path`
pub fn merge(path: impl Into<PathFragment>) -> Query<Merging> {
    Query::new_merge(path)
}

/// Selector over a variable, property or raw expression
pub fn select(expr: impl Into<String>) -> Selector {
    Selector::new(expr)
}

pub fn literal(value: impl Into<Value>) -> Literal {
    Literal::new(value)
}

/// Query parameter, rendered as `$name`
pub fn param(name: impl Into<String>) -> Param {
    Param::new(name)
}

/// Alias of [`param`]
pub fn var(name: impl Into<String>) -> Param {
    Param::new(name)
}

/// Path starting at a node pattern; `node("")` is the anonymous node `()`
pub fn node(spec: impl Into<String>) -> PathExpr {
    PathExpr::node(spec)
}

/// `NOT (expr)`
pub fn not(expr: impl Into<LogicalExpr>) -> LogicalExpr {
    LogicalExpr::negate(expr)
}
