//! Typestate query builder.
//!
//! [`Query<S>`] holds the clauses sealed so far plus the clause under
//! construction, whose type `S` records the grammar position. Each position
//! only exposes the calls that may legally follow it, so an out-of-order
//! chain is a compile error rather than malformed text:
//!
//! ```
//! use cypher_dsl::{match_, node, select, literal};
//!
//! let query = match_()
//!     .path(node("s"))
//!     .where_(select("s.name").eq(literal("Foo")))
//!     .and("s.code in ['Foo', 'Bar']")
//!     .returns("s")
//!     .render();
//!
//! assert_eq!(query, "MATCH (s) WHERE s.name = 'Foo' AND s.code in ['Foo', 'Bar'] RETURN s");
//! ```
//!
//! WHERE cannot follow RETURN:
//!
//! ```compile_fail
//! use cypher_dsl::{match_, node};
//!
//! let query = match_().path(node("n")).returns("n").where_("n.age > 30");
//! ```
//!
//! A projection does not accept arbitrary values:
//!
//! ```compile_fail
//! use cypher_dsl::{with, literal};
//!
//! let query = with().select(literal(1).as_("x")).returns(1);
//! ```
//!
//! Dynamically typed values go through the fallible `try_*` calls instead:
//!
//! ```
//! use cypher_dsl::{with, literal, DslError};
//! use serde_json::json;
//!
//! let result = with().select(literal(1).as_("x")).try_returns(json!(1));
//! assert!(matches!(result, Err(DslError::Unsupported { .. })));
//! ```

use crate::clause::{
    Clause, ClauseKind, ConditionClause, PatternClause, ProjectionClause, Selection, SortItem,
};
use crate::config::RenderConfig;
use crate::error::DslResult;
use crate::expr::Atom;
use crate::logical::{LogicalExpr, LogicalOperator};
use crate::path::PathFragment;
use crate::sequence::{render_clauses, ClauseSequence};
use crate::value::Bound;
use serde_json::Value;
use std::fmt;
use tracing::debug;

mod sealed {
    pub trait Sealed {}
}

/// A grammar position holding the clause under construction
pub trait State: sealed::Sealed + Sized {
    fn kind(&self) -> ClauseKind;
    /// Text of the clause under construction
    fn render(&self) -> String;
    fn into_clause(self) -> Clause;
}

macro_rules! states {
    ($($(#[$meta:meta])* $name:ident($inner:ty);)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq)]
            pub struct $name($inner);

            impl sealed::Sealed for $name {}

            impl State for $name {
                fn kind(&self) -> ClauseKind {
                    self.0.kind()
                }

                fn render(&self) -> String {
                    self.0.to_string()
                }

                fn into_clause(self) -> Clause {
                    self.0.into()
                }
            }
        )*
    };
}

states! {
    /// After MATCH or OPTIONAL MATCH
    Matching(PatternClause);
    /// After CREATE
    Creating(PatternClause);
    /// After MERGE
    Merging(PatternClause);
    /// After ON CREATE or ON MATCH
    MergeActing(ConditionClause);
    /// After WITH, or a WITH modifier
    AfterWith(ProjectionClause);
    /// After a WITH selection; the selection may be aliased
    WithAlias(ProjectionClause);
    /// After WHERE or one of its refinements
    AfterWhere(ConditionClause);
    /// After RETURN
    AfterReturn(ProjectionClause);
}

/// Positions that may be followed by MATCH / OPTIONAL MATCH
pub trait CanRead: State {}
/// Positions that may be followed by WHERE
pub trait CanFilter: State {}
/// Positions that may be followed by WITH, RETURN, CREATE or MERGE
pub trait CanProceed: State {}
/// Positions that may be followed by ON CREATE / ON MATCH
pub trait CanMergeAction: State {}

impl CanRead for Matching {}
impl CanRead for AfterWith {}
impl CanRead for WithAlias {}
impl CanRead for AfterWhere {}

impl CanFilter for Matching {}
impl CanFilter for AfterWith {}
impl CanFilter for WithAlias {}

impl CanProceed for Matching {}
impl CanProceed for Creating {}
impl CanProceed for Merging {}
impl CanProceed for MergeActing {}
impl CanProceed for AfterWith {}
impl CanProceed for WithAlias {}
impl CanProceed for AfterWhere {}

impl CanMergeAction for Merging {}
impl CanMergeAction for MergeActing {}

/// Positions whose clause accepts more path fragments
pub trait HasPatterns: State {
    fn patterns_mut(&mut self) -> &mut PatternClause;
}

impl HasPatterns for Matching {
    fn patterns_mut(&mut self) -> &mut PatternClause {
        &mut self.0
    }
}

impl HasPatterns for Creating {
    fn patterns_mut(&mut self) -> &mut PatternClause {
        &mut self.0
    }
}

impl HasPatterns for Merging {
    fn patterns_mut(&mut self) -> &mut PatternClause {
        &mut self.0
    }
}

/// WITH positions that accept another selection
pub trait Selecting: State {
    fn into_projection(self) -> ProjectionClause;
}

impl Selecting for AfterWith {
    fn into_projection(self) -> ProjectionClause {
        self.0
    }
}

impl Selecting for WithAlias {
    fn into_projection(self) -> ProjectionClause {
        self.0
    }
}

/// Positions whose clause takes ORDER BY / SKIP / LIMIT
pub trait Projecting: State {
    /// Position after a modifier has been attached
    type Refined: State;

    fn projection_mut(&mut self) -> &mut ProjectionClause;
    fn refined(self) -> Self::Refined;
}

impl Projecting for AfterWith {
    type Refined = AfterWith;

    fn projection_mut(&mut self) -> &mut ProjectionClause {
        &mut self.0
    }

    fn refined(self) -> AfterWith {
        self
    }
}

impl Projecting for WithAlias {
    type Refined = AfterWith;

    fn projection_mut(&mut self) -> &mut ProjectionClause {
        &mut self.0
    }

    fn refined(self) -> AfterWith {
        AfterWith(self.0)
    }
}

impl Projecting for AfterReturn {
    type Refined = AfterReturn;

    fn projection_mut(&mut self) -> &mut ProjectionClause {
        &mut self.0
    }

    fn refined(self) -> AfterReturn {
        self
    }
}

/// Fluent query builder at grammar position `S`.
///
/// Not thread-safe while building; the rendered string can be shared freely.
#[derive(Debug, Clone, PartialEq)]
pub struct Query<S: State> {
    sealed: Vec<Clause>,
    head: S,
}

impl<S: State> Query<S> {
    pub(crate) fn start(head: S) -> Self {
        debug!(kind = %head.kind(), "starting query");
        Self {
            sealed: Vec::new(),
            head,
        }
    }

    /// Seal the current clause and continue at `next`
    fn advance<T: State>(self, next: T) -> Query<T> {
        let mut sealed = self.sealed;
        sealed.push(self.head.into_clause());
        debug!(position = sealed.len(), "appending clause");
        Query { sealed, head: next }
    }

    fn refine(mut self, f: impl FnOnce(&mut S)) -> Self {
        f(&mut self.head);
        debug!(kind = %self.head.kind(), position = self.sealed.len(), "refining clause");
        self
    }

    fn map_head<T: State>(self, f: impl FnOnce(S) -> T) -> Query<T> {
        Query {
            sealed: self.sealed,
            head: f(self.head),
        }
    }

    /// Number of clauses, including the one under construction
    pub fn clause_count(&self) -> usize {
        self.sealed.len() + 1
    }

    /// Render with the default configuration. Does not consume the builder.
    pub fn render(&self) -> String {
        self.render_with(&RenderConfig::default())
    }

    pub fn render_with(&self, config: &RenderConfig) -> String {
        let sealed = self.sealed.iter().map(|c| (c.kind(), c.to_string()));
        let head = std::iter::once((self.head.kind(), self.head.render()));
        render_clauses(sealed.chain(head), config)
    }

    /// Continue through the runtime-checked step interface
    pub fn into_sequence(self) -> ClauseSequence {
        let mut clauses = self.sealed;
        clauses.push(self.head.into_clause());
        ClauseSequence::from_clauses(clauses)
    }
}

impl<S: State> fmt::Display for Query<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// ============================================================================
// Keyword calls: append a clause
// ============================================================================

impl<S: CanRead> Query<S> {
    pub fn match_(self) -> Query<Matching> {
        self.advance(Matching(PatternClause::match_()))
    }

    pub fn opt_match(self) -> Query<Matching> {
        self.advance(Matching(PatternClause::optional_match()))
    }
}

impl<S: CanFilter> Query<S> {
    pub fn where_(self, expr: impl Into<LogicalExpr>) -> Query<AfterWhere> {
        self.advance(AfterWhere(ConditionClause::where_(expr)))
    }
}

impl<S: CanProceed> Query<S> {
    pub fn with(self) -> Query<AfterWith> {
        self.advance(AfterWith(ProjectionClause::with()))
    }

    pub fn returns(self, selection: impl Into<Selection>) -> Query<AfterReturn> {
        let mut clause = ProjectionClause::returns();
        clause.add_selection(selection);
        self.advance(AfterReturn(clause))
    }

    /// RETURN several selections of different kinds
    pub fn returns_all(self, selections: impl IntoIterator<Item = Selection>) -> Query<AfterReturn> {
        let mut clause = ProjectionClause::returns();
        for selection in selections {
            clause.add_selection(selection);
        }
        self.advance(AfterReturn(clause))
    }

    /// RETURN a dynamically typed value; only strings are accepted
    pub fn try_returns(self, value: Value) -> DslResult<Query<AfterReturn>> {
        let selection = Selection::from_value("returns", &value)?;
        Ok(self.returns(selection))
    }

    pub fn create(self, path: impl Into<PathFragment>) -> Query<Creating> {
        self.advance(Creating(PatternClause::create().with_path(path)))
    }

    pub fn merge(self, path: impl Into<PathFragment>) -> Query<Merging> {
        self.advance(Merging(PatternClause::merge().with_path(path)))
    }
}

impl<S: CanMergeAction> Query<S> {
    pub fn on_create(self, expr: impl Into<LogicalExpr>) -> Query<MergeActing> {
        self.advance(MergeActing(ConditionClause::on_create(expr)))
    }

    pub fn on_match(self, expr: impl Into<LogicalExpr>) -> Query<MergeActing> {
        self.advance(MergeActing(ConditionClause::on_match(expr)))
    }
}

// ============================================================================
// Refinement calls: mutate the clause under construction
// ============================================================================

impl<S: HasPatterns> Query<S> {
    pub fn path(self, path: impl Into<PathFragment>) -> Self {
        self.refine(|head| head.patterns_mut().add_path(path))
    }
}

impl<S: Selecting> Query<S> {
    pub fn select(self, selection: impl Into<Selection>) -> Query<WithAlias> {
        self.map_head(|head| {
            let mut clause = head.into_projection();
            clause.add_selection(selection);
            WithAlias(clause)
        })
    }

    /// Select a dynamically typed value; only strings are accepted
    pub fn try_select(self, value: Value) -> DslResult<Query<WithAlias>> {
        let selection = Selection::from_value("select", &value)?;
        Ok(self.select(selection))
    }
}

impl Query<WithAlias> {
    /// Alias the most recent selection
    pub fn as_(self, alias: impl Into<String>) -> Query<AfterWith> {
        self.map_head(|mut head| {
            head.0.alias_last(alias);
            AfterWith(head.0)
        })
    }
}

impl<S: Projecting> Query<S> {
    pub fn order_by(self, expr: impl Into<Atom>) -> Query<S::Refined> {
        self.refine(|head| head.projection_mut().add_sort(SortItem::ascending(expr)))
            .map_head(|head| head.refined())
    }

    pub fn order_by_desc(self, expr: impl Into<Atom>) -> Query<S::Refined> {
        self.refine(|head| head.projection_mut().add_sort(SortItem::descending(expr)))
            .map_head(|head| head.refined())
    }

    pub fn skip(self, value: impl Into<Bound>) -> Query<S::Refined> {
        self.refine(|head| head.projection_mut().set_skip(value))
            .map_head(|head| head.refined())
    }

    pub fn limit(self, value: impl Into<Bound>) -> Query<S::Refined> {
        self.refine(|head| head.projection_mut().set_limit(value))
            .map_head(|head| head.refined())
    }
}

impl Query<AfterWhere> {
    pub fn and(self, expr: impl Into<LogicalExpr>) -> Self {
        self.refine(|head| head.0.combine(LogicalOperator::And, expr))
    }

    pub fn or(self, expr: impl Into<LogicalExpr>) -> Self {
        self.refine(|head| head.0.combine(LogicalOperator::Or, expr))
    }

    pub fn xor(self, expr: impl Into<LogicalExpr>) -> Self {
        self.refine(|head| head.0.combine(LogicalOperator::Xor, expr))
    }
}

// ============================================================================
// Entry points
// ============================================================================

impl Query<Matching> {
    pub fn new_match() -> Self {
        Self::start(Matching(PatternClause::match_()))
    }

    pub fn new_opt_match() -> Self {
        Self::start(Matching(PatternClause::optional_match()))
    }
}

impl Query<AfterWith> {
    pub fn new_with() -> Self {
        Self::start(AfterWith(ProjectionClause::with()))
    }
}

impl Query<Creating> {
    pub fn new_create(path: impl Into<PathFragment>) -> Self {
        Self::start(Creating(PatternClause::create().with_path(path)))
    }
}

impl Query<Merging> {
    pub fn new_merge(path: impl Into<PathFragment>) -> Self {
        Self::start(Merging(PatternClause::merge().with_path(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Selector;
    use crate::path::PathExpr;
    use crate::sequence::Step;
    use crate::value::{Literal, Param};
    use insta::assert_snapshot;
    use serde_json::json;
    use tracing_test::traced_test;

    #[test]
    fn test_refinements_stay_in_clause() {
        let query = Query::new_match()
            .path(PathExpr::node("n:Name"))
            .path("(p:Person)-->(n)");
        assert_eq!(query.clause_count(), 1);
        assert_eq!(query.render(), "MATCH (n:Name), (p:Person)-->(n)");
    }

    #[test]
    fn test_keywords_append_clauses() {
        let query = Query::new_with()
            .select(Selector::new("9"))
            .opt_match()
            .path(PathExpr::node("n"))
            .match_()
            .path(PathExpr::node("k"));
        assert_eq!(query.clause_count(), 3);
        assert_eq!(query.render(), "WITH 9 OPTIONAL MATCH (n) MATCH (k)");
    }

    #[test]
    fn test_modifier_drops_alias_position() {
        let query = Query::new_with()
            .select("n")
            .order_by("n.name")
            .select("m")
            .as_("other");
        assert_eq!(query.render(), "WITH n, m AS other ORDER BY n.name");
    }

    #[test]
    fn test_render_does_not_consume() {
        let query = Query::new_match()
            .path(PathExpr::node("n"))
            .returns(Selector::new("n").prop("name"))
            .skip(1)
            .limit(1);
        let first = query.render();
        assert_eq!(first, "MATCH (n) RETURN n.name SKIP 1 LIMIT 1");
        assert_eq!(query.render(), first);
        assert_eq!(query.to_string(), first);
    }

    #[test]
    fn test_merge_actions_render_match_first() {
        let query = Query::new_merge(PathExpr::node("n:Name").props("name", "'Fred'"))
            .on_create(Selector::new("n.updateDate").set(Param::new("date")))
            .on_match(Selector::new("n.createDate").set(Param::new("date")));
        assert_snapshot!(
            query.render(),
            @"MERGE (n:Name {name: 'Fred'}) ON MATCH SET n.createDate = $date ON CREATE SET n.updateDate = $date"
        );
    }

    #[test]
    fn test_try_select_rejects_numbers() {
        let result = Query::new_with().try_select(json!(3));
        assert!(result.is_err());

        let query = Query::new_with().try_select(json!("n")).unwrap().as_("m");
        assert_eq!(query.render(), "WITH n AS m");
    }

    #[test]
    fn test_into_sequence_continues_dynamically() {
        let mut sequence = Query::new_match()
            .path(PathExpr::node("n"))
            .where_("n.age > 30")
            .into_sequence();

        sequence
            .apply(Step::Or {
                expr: "n.name = 'Peter'".to_string(),
            })
            .unwrap();
        sequence
            .apply(Step::Returns {
                items: vec![json!("n")],
            })
            .unwrap();

        assert_eq!(
            sequence.render(),
            "MATCH (n) WHERE n.age > 30 OR n.name = 'Peter' RETURN n"
        );
    }

    #[test]
    fn test_render_matches_handed_over_sequence() {
        let query = Query::new_merge(PathExpr::node("n"))
            .on_create("n.a = 1")
            .on_match("n.b = 2")
            .returns("n")
            .order_by_desc("n.a");
        let rendered = query.render();
        assert_eq!(
            rendered,
            "MERGE (n) ON MATCH SET n.b = 2 ON CREATE SET n.a = 1 RETURN n ORDER BY n.a DESC"
        );
        assert_eq!(query.into_sequence().render(), rendered);
    }

    #[test]
    #[traced_test]
    fn test_refinement_is_logged() {
        let _ = Query::new_match().path(PathExpr::node("n"));
        assert!(logs_contain("refining clause"));
    }

    #[test]
    fn test_multiline_render() {
        let query = Query::new_create(PathExpr::node("n:Name"))
            .returns(Literal::new(1).as_("one"));
        assert_snapshot!(query.render_with(&RenderConfig::multiline()), @r"
        CREATE (n:Name)
        RETURN 1 AS one
        ");
    }
}
