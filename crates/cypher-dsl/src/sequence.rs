//! Ordered clause list and the dynamic (string-driven) step interface.
//!
//! [`ClauseSequence`] is what every builder ultimately renders: the clauses
//! in call order, joined by the configured separator. It can also be driven
//! directly by [`Step`] values, e.g. deserialized from JSON, in which case
//! every step is checked against the last clause at runtime:
//!
//! ```
//! use cypher_dsl::{ClauseSequence, Step};
//!
//! let steps: Vec<Step> = serde_json::from_str(r#"[
//!     {"op": "match", "paths": ["(n:Person)"]},
//!     {"op": "where", "expr": "n.age > 30"},
//!     {"op": "returns", "items": ["n"]}
//! ]"#).unwrap();
//!
//! let sequence = ClauseSequence::from_steps(steps).unwrap();
//! assert_eq!(sequence.render(), "MATCH (n:Person) WHERE n.age > 30 RETURN n");
//! ```
//!
//! Clauses only enter a sequence through checked steps:
//!
//! ```compile_fail
//! use cypher_dsl::{ClauseSequence, PatternClause, ProjectionClause};
//!
//! let mut sequence = ClauseSequence::new(ProjectionClause::returns());
//! sequence.push(PatternClause::match_());
//! ```

use crate::clause::{
    Clause, ClauseKind, ConditionClause, PatternClause, ProjectionClause, Selection, SortItem,
};
use crate::config::{MergeActionOrder, RenderConfig};
use crate::error::{DslError, DslResult};
use crate::logical::LogicalOperator;
use crate::value::Bound;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, trace, warn};

/// One fluent call, expressed as data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Match {
        #[serde(default)]
        paths: Vec<String>,
    },
    OptMatch {
        #[serde(default)]
        paths: Vec<String>,
    },
    With,
    Where {
        expr: String,
    },
    And {
        expr: String,
    },
    Or {
        expr: String,
    },
    Xor {
        expr: String,
    },
    Path {
        pattern: String,
    },
    Select {
        expr: Value,
    },
    As {
        alias: String,
    },
    OrderBy {
        expr: String,
        #[serde(default)]
        descending: bool,
    },
    Skip {
        value: Value,
    },
    Limit {
        value: Value,
    },
    Returns {
        items: Vec<Value>,
    },
    Create {
        #[serde(default)]
        paths: Vec<String>,
    },
    Merge {
        #[serde(default)]
        paths: Vec<String>,
    },
    OnCreate {
        expr: String,
    },
    OnMatch {
        expr: String,
    },
}

impl Step {
    /// Name of the call this step stands for
    pub fn name(&self) -> &'static str {
        match self {
            Step::Match { .. } => "match",
            Step::OptMatch { .. } => "opt_match",
            Step::With => "with",
            Step::Where { .. } => "where",
            Step::And { .. } => "and",
            Step::Or { .. } => "or",
            Step::Xor { .. } => "xor",
            Step::Path { .. } => "path",
            Step::Select { .. } => "select",
            Step::As { .. } => "as",
            Step::OrderBy { .. } => "order_by",
            Step::Skip { .. } => "skip",
            Step::Limit { .. } => "limit",
            Step::Returns { .. } => "returns",
            Step::Create { .. } => "create",
            Step::Merge { .. } => "merge",
            Step::OnCreate { .. } => "on_create",
            Step::OnMatch { .. } => "on_match",
        }
    }

    /// Whether this step may follow a clause of kind `last`.
    ///
    /// Mirrors the capabilities of the typestate builder.
    pub fn permitted_after(&self, last: ClauseKind) -> bool {
        use ClauseKind::*;

        match self {
            Step::Match { .. } | Step::OptMatch { .. } => {
                matches!(last, Match | OptionalMatch | With | Where)
            }
            Step::Where { .. } => matches!(last, Match | OptionalMatch | With),
            Step::With | Step::Returns { .. } | Step::Create { .. } | Step::Merge { .. } => {
                last != Return
            }
            Step::Path { .. } => matches!(last, Match | OptionalMatch | Create | Merge),
            Step::Select { .. } | Step::As { .. } => last == With,
            Step::And { .. } | Step::Or { .. } | Step::Xor { .. } => last == Where,
            Step::OrderBy { .. } | Step::Skip { .. } | Step::Limit { .. } => {
                matches!(last, With | Return)
            }
            Step::OnCreate { .. } | Step::OnMatch { .. } => {
                matches!(last, Merge | OnCreate | OnMatch)
            }
        }
    }
}

/// Non-empty, ordered list of clauses. Order equals call order.
///
/// Not synchronized: build on one thread, then share the rendered string.
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseSequence {
    clauses: Vec<Clause>,
}

impl ClauseSequence {
    /// Seed a sequence with its first clause
    pub fn new(first: impl Into<Clause>) -> Self {
        let first = first.into();
        debug!(kind = %first.kind(), "seeding clause sequence");
        Self {
            clauses: vec![first],
        }
    }

    /// Build a sequence from steps; the first step must open a clause that
    /// can start a query (MATCH, OPTIONAL MATCH, WITH, CREATE, MERGE).
    pub fn from_steps(steps: impl IntoIterator<Item = Step>) -> DslResult<Self> {
        let mut steps = steps.into_iter();
        let first = steps.next().ok_or(DslError::EmptySequence)?;
        let mut sequence = Self::new(entry_clause(first)?);
        for step in steps {
            sequence.apply(step)?;
        }
        Ok(sequence)
    }

    /// Callers guarantee `clauses` is non-empty
    pub(crate) fn from_clauses(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Always false: a sequence is seeded at construction
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn last_kind(&self) -> Option<ClauseKind> {
        self.clauses.last().map(Clause::kind)
    }

    /// Append a clause without any transition check
    pub(crate) fn push(&mut self, clause: impl Into<Clause>) {
        let clause = clause.into();
        debug!(kind = %clause.kind(), position = self.clauses.len(), "appending clause");
        self.clauses.push(clause);
    }

    /// Apply one step, checking it against the last clause.
    ///
    /// On error the sequence is left unchanged.
    pub fn apply(&mut self, step: Step) -> DslResult<()> {
        let result = self.try_apply(step);
        if let Err(err) = &result {
            warn!(error = %err, "rejected clause step");
        }
        result
    }

    fn try_apply(&mut self, step: Step) -> DslResult<()> {
        let last = self.last_kind();
        let call = step.name();
        match last {
            Some(kind) if step.permitted_after(kind) => {}
            Some(kind) => return Err(DslError::illegal_transition(kind.to_string(), call)),
            None => return Err(DslError::illegal_transition("<empty>", call)),
        }

        match step {
            Step::Match { .. }
            | Step::OptMatch { .. }
            | Step::With
            | Step::Create { .. }
            | Step::Merge { .. }
            | Step::Where { .. }
            | Step::OnCreate { .. }
            | Step::OnMatch { .. } => {
                let clause = keyword_clause(step)?;
                self.push(clause);
                return Ok(());
            }
            Step::Returns { items } => {
                if items.is_empty() {
                    return Err(DslError::unsupported(call, "no items"));
                }
                let mut clause = ProjectionClause::returns();
                for item in &items {
                    clause.add_selection(Selection::from_value("returns", item)?);
                }
                self.push(clause);
                return Ok(());
            }
            Step::Path { pattern } => {
                self.last_pattern_mut(call)?.add_path(pattern);
            }
            Step::Select { expr } => {
                let selection = Selection::from_value("select", &expr)?;
                self.last_projection_mut(call)?.add_selection(selection);
            }
            Step::As { alias } => {
                let projection = self.last_projection_mut(call)?;
                if projection.items().is_empty() {
                    return Err(DslError::illegal_transition("empty WITH", call));
                }
                if !projection.alias_last(alias) {
                    return Err(DslError::illegal_transition("closed WITH selection", call));
                }
            }
            Step::OrderBy { expr, descending } => {
                let item = if descending {
                    SortItem::descending(expr)
                } else {
                    SortItem::ascending(expr)
                };
                self.last_projection_mut(call)?.add_sort(item);
            }
            Step::Skip { value } => {
                let bound = Bound::from_value("skip", &value)?;
                self.last_projection_mut(call)?.set_skip(bound);
            }
            Step::Limit { value } => {
                let bound = Bound::from_value("limit", &value)?;
                self.last_projection_mut(call)?.set_limit(bound);
            }
            Step::And { expr } => self.last_condition_mut(call)?.combine(LogicalOperator::And, expr),
            Step::Or { expr } => self.last_condition_mut(call)?.combine(LogicalOperator::Or, expr),
            Step::Xor { expr } => self.last_condition_mut(call)?.combine(LogicalOperator::Xor, expr),
        }
        debug!(call, position = self.clauses.len().saturating_sub(1), "refining clause");
        Ok(())
    }

    fn last_pattern_mut(&mut self, call: &'static str) -> DslResult<&mut PatternClause> {
        match self.clauses.last_mut() {
            Some(Clause::Pattern(clause)) => Ok(clause),
            other => Err(mismatch(other.map(|c| c.kind()), call)),
        }
    }

    fn last_projection_mut(&mut self, call: &'static str) -> DslResult<&mut ProjectionClause> {
        match self.clauses.last_mut() {
            Some(Clause::Projection(clause)) => Ok(clause),
            other => Err(mismatch(other.map(|c| c.kind()), call)),
        }
    }

    fn last_condition_mut(&mut self, call: &'static str) -> DslResult<&mut ConditionClause> {
        match self.clauses.last_mut() {
            Some(Clause::Condition(clause)) => Ok(clause),
            other => Err(mismatch(other.map(|c| c.kind()), call)),
        }
    }

    /// Render with the default configuration
    pub fn render(&self) -> String {
        self.render_with(&RenderConfig::default())
    }

    pub fn render_with(&self, config: &RenderConfig) -> String {
        render_clauses(self.clauses.iter().map(|c| (c.kind(), c.to_string())), config)
    }
}

impl fmt::Display for ClauseSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn mismatch(last: Option<ClauseKind>, call: &'static str) -> DslError {
    match last {
        Some(kind) => DslError::illegal_transition(kind.to_string(), call),
        None => DslError::illegal_transition("<empty>", call),
    }
}

fn entry_clause(step: Step) -> DslResult<Clause> {
    match step {
        Step::Match { .. }
        | Step::OptMatch { .. }
        | Step::With
        | Step::Create { .. }
        | Step::Merge { .. } => keyword_clause(step),
        other => {
            let err = DslError::illegal_transition("<empty>", other.name());
            warn!(error = %err, "rejected entry step");
            Err(err)
        }
    }
}

/// Clause opened by a keyword step
fn keyword_clause(step: Step) -> DslResult<Clause> {
    let pattern = |mut clause: PatternClause, paths: Vec<String>| {
        for path in paths {
            clause.add_path(path);
        }
        Clause::Pattern(clause)
    };

    let clause = match step {
        Step::Match { paths } => pattern(PatternClause::match_(), paths),
        Step::OptMatch { paths } => pattern(PatternClause::optional_match(), paths),
        Step::Create { paths } => pattern(PatternClause::create(), paths),
        Step::Merge { paths } => pattern(PatternClause::merge(), paths),
        Step::With => ProjectionClause::with().into(),
        Step::Where { expr } => ConditionClause::where_(expr).into(),
        Step::OnCreate { expr } => ConditionClause::on_create(expr).into(),
        Step::OnMatch { expr } => ConditionClause::on_match(expr).into(),
        other => return Err(DslError::illegal_transition("<keyword>", other.name())),
    };
    Ok(clause)
}

/// Join rendered clauses, in order, with the configured separator.
///
/// Consecutive ON CREATE / ON MATCH clauses form one run; with
/// [`MergeActionOrder::MatchFirst`] each run lists its ON MATCH clauses first.
pub(crate) fn render_clauses(
    clauses: impl IntoIterator<Item = (ClauseKind, String)>,
    config: &RenderConfig,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut run: Vec<(ClauseKind, String)> = Vec::new();

    for (kind, text) in clauses {
        if kind.is_merge_action() {
            run.push((kind, text));
            continue;
        }
        flush_merge_actions(&mut run, &mut parts, config.merge_action_order);
        parts.push(text);
    }
    flush_merge_actions(&mut run, &mut parts, config.merge_action_order);

    let rendered = parts.join(&config.separator);
    trace!(clauses = parts.len(), len = rendered.len(), "rendered clause sequence");
    rendered
}

fn flush_merge_actions(
    run: &mut Vec<(ClauseKind, String)>,
    parts: &mut Vec<String>,
    order: MergeActionOrder,
) {
    if order == MergeActionOrder::MatchFirst {
        run.sort_by_key(|(kind, _)| *kind != ClauseKind::OnMatch);
    }
    parts.extend(run.drain(..).map(|(_, text)| text));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;
    use tracing_test::traced_test;

    fn seq(steps: Value) -> DslResult<ClauseSequence> {
        let steps: Vec<Step> = serde_json::from_value(steps).unwrap();
        ClauseSequence::from_steps(steps)
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    #[test]
    fn test_render_joins_in_call_order() {
        let sequence = seq(json!([
            {"op": "match", "paths": ["(s)"]},
            {"op": "where", "expr": "s.name = 'Foo'"},
            {"op": "and", "expr": "s.code in ['Foo', 'Bar']"},
            {"op": "returns", "items": ["s"]}
        ]))
        .unwrap();

        assert_eq!(
            sequence.render(),
            "MATCH (s) WHERE s.name = 'Foo' AND s.code in ['Foo', 'Bar'] RETURN s"
        );
        assert_eq!(sequence.len(), 3);
    }

    #[test]
    fn test_render_is_idempotent() {
        let sequence = seq(json!([
            {"op": "with"},
            {"op": "select", "expr": "1"},
            {"op": "as", "alias": "x"},
            {"op": "returns", "items": ["x"]}
        ]))
        .unwrap();

        let first = sequence.render();
        assert_eq!(first, "WITH 1 AS x RETURN x");
        assert_eq!(sequence.render(), first);
        assert_eq!(sequence.to_string(), first);
    }

    #[test]
    fn test_merge_actions_render_match_first() {
        let sequence = seq(json!([
            {"op": "merge", "paths": ["(n:Name {name: 'Fred'})"]},
            {"op": "on_create", "expr": "n.updateDate = $date"},
            {"op": "on_match", "expr": "n.createDate = $date"}
        ]))
        .unwrap();

        assert_eq!(
            sequence.render(),
            "MERGE (n:Name {name: 'Fred'}) ON MATCH SET n.createDate = $date ON CREATE SET n.updateDate = $date"
        );
    }

    #[test]
    fn test_merge_actions_call_order_config() {
        let sequence = seq(json!([
            {"op": "merge", "paths": ["(n)"]},
            {"op": "on_create", "expr": "n.a = 1"},
            {"op": "on_match", "expr": "n.b = 2"}
        ]))
        .unwrap();

        let config = RenderConfig::default().with_merge_action_order(MergeActionOrder::CallOrder);
        assert_eq!(
            sequence.render_with(&config),
            "MERGE (n) ON CREATE SET n.a = 1 ON MATCH SET n.b = 2"
        );
    }

    #[test]
    fn test_merge_action_runs_are_independent() {
        let sequence = seq(json!([
            {"op": "merge", "paths": ["(a)"]},
            {"op": "on_create", "expr": "a.x = 1"},
            {"op": "merge", "paths": ["(b)"]},
            {"op": "on_create", "expr": "b.x = 1"},
            {"op": "on_match", "expr": "b.y = 1"}
        ]))
        .unwrap();

        assert_eq!(
            sequence.render(),
            "MERGE (a) ON CREATE SET a.x = 1 MERGE (b) ON MATCH SET b.y = 1 ON CREATE SET b.x = 1"
        );
    }

    #[test]
    fn test_multiline_separator() {
        let sequence = seq(json!([
            {"op": "match", "paths": ["(n)"]},
            {"op": "returns", "items": ["n"]}
        ]))
        .unwrap();

        assert_eq!(sequence.render_with(&RenderConfig::multiline()), "MATCH (n)\nRETURN n");
    }

    #[test]
    fn test_projection_modifiers_from_steps() {
        let sequence = seq(json!([
            {"op": "match", "paths": ["(s)"]},
            {"op": "with"},
            {"op": "select", "expr": "s"},
            {"op": "order_by", "expr": "s.name", "descending": true},
            {"op": "skip", "value": "$skip"},
            {"op": "limit", "value": 10},
            {"op": "returns", "items": ["s"]}
        ]))
        .unwrap();

        assert_eq!(
            sequence.render(),
            "MATCH (s) WITH s ORDER BY s.name DESC SKIP $skip LIMIT 10 RETURN s"
        );
    }

    // =========================================================================
    // Rejections
    // =========================================================================

    #[test_case(json!([{"op": "match"}, {"op": "returns", "items": ["n"]}, {"op": "where", "expr": "x"}]), "where", "RETURN" ; "where after return")]
    #[test_case(json!([{"op": "match"}, {"op": "and", "expr": "x"}]), "and", "MATCH" ; "and without where")]
    #[test_case(json!([{"op": "create"}, {"op": "where", "expr": "x"}]), "where", "CREATE" ; "where after create")]
    #[test_case(json!([{"op": "match"}, {"op": "select", "expr": "n"}]), "select", "MATCH" ; "select after match")]
    #[test_case(json!([{"op": "match"}, {"op": "on_create", "expr": "x"}]), "on_create", "MATCH" ; "on create without merge")]
    #[test_case(json!([{"op": "with"}, {"op": "path", "pattern": "(n)"}]), "path", "WITH" ; "path after with")]
    #[test_case(json!([{"op": "with"}, {"op": "as", "alias": "x"}]), "as", "empty WITH" ; "alias before select")]
    #[test_case(json!([{"op": "match"}, {"op": "returns", "items": ["n"]}, {"op": "returns", "items": ["n"]}]), "returns", "RETURN" ; "return after return")]
    #[test_case(json!([{"op": "with"}, {"op": "select", "expr": "n"}, {"op": "as", "alias": "a"}, {"op": "as", "alias": "b"}]), "as", "closed WITH selection" ; "alias twice")]
    #[test_case(json!([{"op": "with"}, {"op": "select", "expr": "n"}, {"op": "order_by", "expr": "n.name"}, {"op": "as", "alias": "x"}]), "as", "closed WITH selection" ; "alias after order_by")]
    fn test_illegal_transitions(steps: Value, call: &'static str, from: &str) {
        let err = seq(steps).unwrap_err();
        assert_eq!(err, DslError::illegal_transition(from, call));
    }

    #[test]
    fn test_entry_must_open_clause() {
        let err = seq(json!([{"op": "where", "expr": "x"}])).unwrap_err();
        assert_eq!(err, DslError::illegal_transition("<empty>", "where"));

        let err = ClauseSequence::from_steps(Vec::new()).unwrap_err();
        assert_eq!(err, DslError::EmptySequence);
    }

    #[test]
    fn test_unsupported_selection_leaves_sequence_unchanged() {
        let mut sequence = seq(json!([
            {"op": "with"},
            {"op": "select", "expr": "1"},
            {"op": "as", "alias": "x"}
        ]))
        .unwrap();
        let before = sequence.clone();

        let err = sequence
            .apply(Step::Returns {
                items: vec![json!("x"), json!(1)],
            })
            .unwrap_err();

        assert!(matches!(err, DslError::Unsupported { operation: "returns", .. }));
        assert_eq!(sequence, before);
    }

    #[test]
    fn test_unsupported_bound() {
        let mut sequence = seq(json!([{"op": "with"}, {"op": "select", "expr": "n"}])).unwrap();
        let err = sequence
            .apply(Step::Limit {
                value: json!([1, 2]),
            })
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported operation: limit does not accept array of 2 items"
        );
    }

    #[test]
    fn test_returns_requires_items() {
        let err = seq(json!([{"op": "match", "paths": ["(n)"]}, {"op": "returns", "items": []}]))
            .unwrap_err();
        assert_eq!(err, DslError::unsupported("returns", "no items"));

        let missing: Result<Step, _> = serde_json::from_value(json!({"op": "returns"}));
        assert!(missing.is_err());
    }

    #[test]
    fn test_alias_after_reselect() {
        let sequence = seq(json!([
            {"op": "with"},
            {"op": "select", "expr": "n"},
            {"op": "as", "alias": "a"},
            {"op": "select", "expr": "m"},
            {"op": "as", "alias": "b"}
        ]))
        .unwrap();
        assert_eq!(sequence.render(), "WITH n AS a, m AS b");
    }

    #[test]
    #[traced_test]
    fn test_refinement_is_logged() {
        let mut sequence = ClauseSequence::new(PatternClause::match_());
        sequence
            .apply(Step::Path {
                pattern: "(n)".to_string(),
            })
            .unwrap();
        assert!(logs_contain("refining clause"));
    }

    #[test]
    #[traced_test]
    fn test_rejection_is_logged() {
        let mut sequence = ClauseSequence::new(PatternClause::match_());
        let _ = sequence.apply(Step::Xor {
            expr: "a".to_string(),
        });
        assert!(logs_contain("rejected clause step"));
    }

    #[test]
    fn test_step_round_trips_through_json() {
        let step: Step = serde_json::from_value(json!({"op": "order_by", "expr": "n.name"})).unwrap();
        assert_eq!(
            step,
            Step::OrderBy {
                expr: "n.name".to_string(),
                descending: false
            }
        );
        assert_eq!(step.name(), "order_by");
    }
}
