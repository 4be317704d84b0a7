//! Clauses: one keyword-introduced segment of the final query.
//!
//! Each clause owns the state accumulated for it (path fragments,
//! selections, or a condition root) and renders its own keyword-prefixed
//! text. A clause's kind never changes after construction.

use crate::error::{DslError, DslResult};
use crate::expr::{Aliased, Atom, Comparison, Selector};
use crate::logical::{LogicalExpr, LogicalOperator};
use crate::path::{PathExpr, PathFragment};
use crate::value::{describe, Bound, Literal, Param};
use serde_json::Value;
use std::fmt;

/// The fixed set of clause kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    Match,
    OptionalMatch,
    With,
    Where,
    Return,
    Create,
    Merge,
    OnCreate,
    OnMatch,
}

impl ClauseKind {
    /// Text that prefixes the rendered clause
    pub fn keyword(&self) -> &'static str {
        match self {
            ClauseKind::Match => "MATCH",
            ClauseKind::OptionalMatch => "OPTIONAL MATCH",
            ClauseKind::With => "WITH",
            ClauseKind::Where => "WHERE",
            ClauseKind::Return => "RETURN",
            ClauseKind::Create => "CREATE",
            ClauseKind::Merge => "MERGE",
            ClauseKind::OnCreate => "ON CREATE SET",
            ClauseKind::OnMatch => "ON MATCH SET",
        }
    }

    pub fn is_merge_action(&self) -> bool {
        matches!(self, ClauseKind::OnCreate | ClauseKind::OnMatch)
    }
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClauseKind::OnCreate => f.write_str("ON CREATE"),
            ClauseKind::OnMatch => f.write_str("ON MATCH"),
            other => f.write_str(other.keyword()),
        }
    }
}

// ============================================================================
// Pattern clauses: MATCH, OPTIONAL MATCH, CREATE, MERGE
// ============================================================================

/// `KEYWORD path, path, ...`
#[derive(Debug, Clone, PartialEq)]
pub struct PatternClause {
    kind: ClauseKind,
    paths: Vec<PathFragment>,
}

impl PatternClause {
    fn new(kind: ClauseKind) -> Self {
        Self {
            kind,
            paths: Vec::new(),
        }
    }

    pub fn match_() -> Self {
        Self::new(ClauseKind::Match)
    }

    pub fn optional_match() -> Self {
        Self::new(ClauseKind::OptionalMatch)
    }

    pub fn create() -> Self {
        Self::new(ClauseKind::Create)
    }

    pub fn merge() -> Self {
        Self::new(ClauseKind::Merge)
    }

    pub fn kind(&self) -> ClauseKind {
        self.kind
    }

    pub fn add_path(&mut self, path: impl Into<PathFragment>) {
        self.paths.push(path.into());
    }

    pub fn with_path(mut self, path: impl Into<PathFragment>) -> Self {
        self.add_path(path);
        self
    }

    pub fn paths(&self) -> &[PathFragment] {
        &self.paths
    }
}

impl fmt::Display for PatternClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.keyword())?;
        write_list(f, " ", &self.paths)
    }
}

// ============================================================================
// Projection clauses: WITH, RETURN
// ============================================================================

/// One projected expression with an optional alias
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    atom: Atom,
    alias: Option<String>,
}

impl Selection {
    pub fn new(atom: impl Into<Atom>) -> Self {
        Self {
            atom: atom.into(),
            alias: None,
        }
    }

    /// Convert a dynamically typed value. Only strings (raw passthrough) are accepted.
    pub fn from_value(operation: &'static str, value: &Value) -> DslResult<Self> {
        match value {
            Value::String(s) => Ok(Self::new(s.as_str())),
            other => Err(DslError::unsupported(operation, describe(other))),
        }
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} AS {}", self.atom, alias),
            None => fmt::Display::fmt(&self.atom, f),
        }
    }
}

macro_rules! selection_from_atom {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Selection {
                fn from(value: $ty) -> Self {
                    Selection::new(value)
                }
            }
        )*
    };
}

selection_from_atom!(&str, String, Literal, Param, Selector, Comparison, PathExpr);

impl From<Aliased> for Selection {
    fn from(aliased: Aliased) -> Self {
        Self {
            atom: aliased.atom,
            alias: Some(aliased.alias),
        }
    }
}

/// ORDER BY entry
#[derive(Debug, Clone, PartialEq)]
pub struct SortItem {
    atom: Atom,
    descending: bool,
}

impl SortItem {
    pub fn ascending(atom: impl Into<Atom>) -> Self {
        Self {
            atom: atom.into(),
            descending: false,
        }
    }

    pub fn descending(atom: impl Into<Atom>) -> Self {
        Self {
            atom: atom.into(),
            descending: true,
        }
    }
}

impl fmt::Display for SortItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.atom, f)?;
        if self.descending {
            f.write_str(" DESC")?;
        }
        Ok(())
    }
}

/// `KEYWORD sel, sel [ORDER BY ...] [SKIP n] [LIMIT n]`
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionClause {
    kind: ClauseKind,
    items: Vec<Selection>,
    order_by: Vec<SortItem>,
    skip: Option<Bound>,
    limit: Option<Bound>,
    /// The last selection is still open for `AS`
    aliasable: bool,
}

impl ProjectionClause {
    fn new(kind: ClauseKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
            order_by: Vec::new(),
            skip: None,
            limit: None,
            aliasable: false,
        }
    }

    pub fn with() -> Self {
        Self::new(ClauseKind::With)
    }

    pub fn returns() -> Self {
        Self::new(ClauseKind::Return)
    }

    pub fn kind(&self) -> ClauseKind {
        self.kind
    }

    pub fn add_selection(&mut self, selection: impl Into<Selection>) {
        self.items.push(selection.into());
        self.aliasable = true;
    }

    /// Whether the most recent selection may still take an alias
    pub fn can_alias(&self) -> bool {
        self.aliasable
    }

    /// Alias the most recent selection.
    ///
    /// Returns false when nothing is selected yet, or the last selection was
    /// already aliased or closed by a modifier.
    pub fn alias_last(&mut self, alias: impl Into<String>) -> bool {
        if !self.aliasable {
            return false;
        }
        match self.items.last_mut() {
            Some(last) => {
                last.alias = Some(alias.into());
                self.aliasable = false;
                true
            }
            None => false,
        }
    }

    pub fn add_sort(&mut self, item: SortItem) {
        self.order_by.push(item);
        self.aliasable = false;
    }

    pub fn set_skip(&mut self, bound: impl Into<Bound>) {
        self.skip = Some(bound.into());
        self.aliasable = false;
    }

    pub fn set_limit(&mut self, bound: impl Into<Bound>) {
        self.limit = Some(bound.into());
        self.aliasable = false;
    }

    pub fn items(&self) -> &[Selection] {
        &self.items
    }
}

impl fmt::Display for ProjectionClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.keyword())?;
        write_list(f, " ", &self.items)?;
        if !self.order_by.is_empty() {
            write_list(f, " ORDER BY ", &self.order_by)?;
        }
        if let Some(skip) = &self.skip {
            write!(f, " SKIP {}", skip)?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        Ok(())
    }
}

// ============================================================================
// Condition clauses: WHERE, ON CREATE, ON MATCH
// ============================================================================

/// `KEYWORD <expr>` where the expression root is replaced on each refinement
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionClause {
    kind: ClauseKind,
    root: LogicalExpr,
}

impl ConditionClause {
    fn new(kind: ClauseKind, root: impl Into<LogicalExpr>) -> Self {
        Self {
            kind,
            root: root.into(),
        }
    }

    pub fn where_(root: impl Into<LogicalExpr>) -> Self {
        Self::new(ClauseKind::Where, root)
    }

    pub fn on_create(root: impl Into<LogicalExpr>) -> Self {
        Self::new(ClauseKind::OnCreate, root)
    }

    pub fn on_match(root: impl Into<LogicalExpr>) -> Self {
        Self::new(ClauseKind::OnMatch, root)
    }

    pub fn kind(&self) -> ClauseKind {
        self.kind
    }

    pub fn root(&self) -> &LogicalExpr {
        &self.root
    }

    /// Replace the root with `root op operand`
    pub fn combine(&mut self, op: LogicalOperator, operand: impl Into<LogicalExpr>) {
        self.root = self.root.clone().combine(op, operand);
    }
}

impl fmt::Display for ConditionClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.keyword(), self.root.render())
    }
}

// ============================================================================
// Clause
// ============================================================================

/// A clause of any kind
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Pattern(PatternClause),
    Projection(ProjectionClause),
    Condition(ConditionClause),
}

impl Clause {
    pub fn kind(&self) -> ClauseKind {
        match self {
            Clause::Pattern(c) => c.kind(),
            Clause::Projection(c) => c.kind(),
            Clause::Condition(c) => c.kind(),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Pattern(c) => fmt::Display::fmt(c, f),
            Clause::Projection(c) => fmt::Display::fmt(c, f),
            Clause::Condition(c) => fmt::Display::fmt(c, f),
        }
    }
}

impl From<PatternClause> for Clause {
    fn from(clause: PatternClause) -> Self {
        Clause::Pattern(clause)
    }
}

impl From<ProjectionClause> for Clause {
    fn from(clause: ProjectionClause) -> Self {
        Clause::Projection(clause)
    }
}

impl From<ConditionClause> for Clause {
    fn from(clause: ConditionClause) -> Self {
        Clause::Condition(clause)
    }
}

/// Writes `prefix item, item, ...`; writes nothing for an empty list
fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, prefix: &str, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        f.write_str(if i == 0 { prefix } else { ", " })?;
        fmt::Display::fmt(item, f)?;
    }
    Ok(())
}
