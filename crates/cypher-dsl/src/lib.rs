//! # cypher-dsl
//!
//! Builds Cypher query text from fluent method chains.
//!
//! - [`logical`] combines conditions with AND / OR / XOR / NOT and renders
//!   them with minimal, structurally correct parentheses.
//! - [`query`] is a typestate builder: every call returns a view that only
//!   exposes the clauses allowed next, so illegal sequences do not compile.
//! - [`sequence`] is the rendered form (clauses joined in call order) and a
//!   runtime-checked step interface for dynamically driven construction.
//!
//! ```
//! use cypher_dsl::prelude::*;
//!
//! let query = match_()
//!     .path(node("s"))
//!     .where_(select("s.name").eq(literal("Foo")))
//!     .and(select("s.age").is_in([10, 20]).and("s.code in ['Foo', 'Bar']"))
//!     .or(select("s.address = 'Lisbon'").or(node("s").props("name", "'Foo'")))
//!     .render();
//!
//! assert_eq!(
//!     query,
//!     "MATCH (s) WHERE (s.name = 'Foo' AND (s.age IN [10, 20] AND s.code in ['Foo', 'Bar'])) \
//!      OR (s.address = 'Lisbon' OR (s {name: 'Foo'}))"
//! );
//! ```
//!
//! The library only composes text. It does not parse, validate or execute
//! Cypher, and it logs through `tracing` without installing a subscriber.

pub mod clause;
pub mod config;
pub mod error;
pub mod expr;
pub mod facade;
pub mod logical;
pub mod path;
pub mod prelude;
pub mod query;
pub mod sequence;
pub mod value;

pub use clause::{
    Clause, ClauseKind, ConditionClause, PatternClause, ProjectionClause, Selection, SortItem,
};
pub use config::{MergeActionOrder, RenderConfig};
pub use error::{DslError, DslResult};
pub use expr::{Aliased, Atom, CompareOp, Comparison, Selector};
pub use facade::{create, literal, match_, merge, node, not, opt_match, param, select, var, with};
pub use logical::{Condition, LogicalExpr, LogicalOperator};
pub use path::{Direction, PathExpr, PathFragment, PathStep};
pub use query::{
    AfterReturn, AfterWhere, AfterWith, Creating, MergeActing, Merging, Matching, Query, State,
    WithAlias,
};
pub use sequence::{ClauseSequence, Step};
pub use value::{Bound, Literal, Operand, Param};
