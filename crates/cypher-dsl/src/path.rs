//! Path fragments: node patterns joined by relationships.
//!
//! ```
//! use cypher_dsl::node;
//!
//! let path = node("p:Person").right().node("n");
//! assert_eq!(path.to_string(), "(p:Person)-->(n)");
//!
//! let path = node("n:Name").props("name", "'Fred'");
//! assert_eq!(path.to_string(), "(n:Name {name: 'Fred'})");
//! ```

use crate::expr::Atom;
use std::fmt;

/// Relationship direction, read left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `-->`
    Right,
    /// `<--`
    Left,
    /// `--`
    Both,
}

/// `(alias:Label {key: value})`
#[derive(Debug, Clone, PartialEq)]
pub struct NodePattern {
    spec: String,
    properties: Vec<(String, Atom)>,
}

impl NodePattern {
    fn new(spec: impl Into<String>) -> Self {
        Self {
            spec: spec.into(),
            properties: Vec::new(),
        }
    }
}

impl fmt::Display for NodePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        f.write_str(&self.spec)?;
        if !self.properties.is_empty() {
            if !self.spec.is_empty() {
                f.write_str(" ")?;
            }
            f.write_str("{")?;
            for (i, (key, value)) in self.properties.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}: {}", key, value)?;
            }
            f.write_str("}")?;
        }
        f.write_str(")")
    }
}

/// `-->`, `<-[r:KNOWS]-`, ...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelPattern {
    direction: Direction,
    detail: Option<String>,
}

impl fmt::Display for RelPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.detail, self.direction) {
            (None, Direction::Right) => f.write_str("-->"),
            (None, Direction::Left) => f.write_str("<--"),
            (None, Direction::Both) => f.write_str("--"),
            (Some(detail), Direction::Right) => write!(f, "-[{}]->", detail),
            (Some(detail), Direction::Left) => write!(f, "<-[{}]-", detail),
            (Some(detail), Direction::Both) => write!(f, "-[{}]-", detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PathElement {
    Node(NodePattern),
    Rel(RelPattern),
}

/// A path: a node optionally followed by relationship/node pairs.
///
/// Always starts and ends with a node; [`PathStep`] is the only way to add a
/// relationship and it must be closed with [`PathStep::node`].
#[derive(Debug, Clone, PartialEq)]
pub struct PathExpr {
    elements: Vec<PathElement>,
}

impl PathExpr {
    /// Start a path at a node. An empty spec renders `()`.
    pub fn node(spec: impl Into<String>) -> Self {
        Self {
            elements: vec![PathElement::Node(NodePattern::new(spec))],
        }
    }

    /// Add a property to the last node. `&str` values are inserted verbatim.
    pub fn props(mut self, key: impl Into<String>, value: impl Into<Atom>) -> Self {
        let last_node = self.elements.iter_mut().rev().find_map(|e| match e {
            PathElement::Node(node) => Some(node),
            PathElement::Rel(_) => None,
        });
        if let Some(node) = last_node {
            node.properties.push((key.into(), value.into()));
        }
        self
    }

    pub fn right(self) -> PathStep {
        self.rel(Direction::Right, None)
    }

    pub fn left(self) -> PathStep {
        self.rel(Direction::Left, None)
    }

    pub fn dash(self) -> PathStep {
        self.rel(Direction::Both, None)
    }

    /// `-[detail]->`
    pub fn right_via(self, detail: impl Into<String>) -> PathStep {
        self.rel(Direction::Right, Some(detail.into()))
    }

    /// `<-[detail]-`
    pub fn left_via(self, detail: impl Into<String>) -> PathStep {
        self.rel(Direction::Left, Some(detail.into()))
    }

    /// `-[detail]-`
    pub fn dash_via(self, detail: impl Into<String>) -> PathStep {
        self.rel(Direction::Both, Some(detail.into()))
    }

    fn rel(self, direction: Direction, detail: Option<String>) -> PathStep {
        PathStep {
            path: self,
            rel: RelPattern { direction, detail },
        }
    }

    /// Number of node patterns in the path
    pub fn node_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| matches!(e, PathElement::Node(_)))
            .count()
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.elements {
            match element {
                PathElement::Node(node) => fmt::Display::fmt(node, f)?,
                PathElement::Rel(rel) => fmt::Display::fmt(rel, f)?,
            }
        }
        Ok(())
    }
}

/// A path with a pending relationship, waiting for its target node
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a relationship must be closed with .node(..)"]
pub struct PathStep {
    path: PathExpr,
    rel: RelPattern,
}

impl PathStep {
    pub fn node(self, spec: impl Into<String>) -> PathExpr {
        let mut path = self.path;
        path.elements.push(PathElement::Rel(self.rel));
        path.elements.push(PathElement::Node(NodePattern::new(spec)));
        path
    }
}

/// An entry of a MATCH / CREATE / MERGE pattern list
#[derive(Debug, Clone, PartialEq)]
pub enum PathFragment {
    Raw(String),
    Path(PathExpr),
}

impl fmt::Display for PathFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathFragment::Raw(raw) => f.write_str(raw),
            PathFragment::Path(path) => fmt::Display::fmt(path, f),
        }
    }
}

impl From<&str> for PathFragment {
    fn from(raw: &str) -> Self {
        PathFragment::Raw(raw.to_string())
    }
}

impl From<String> for PathFragment {
    fn from(raw: String) -> Self {
        PathFragment::Raw(raw)
    }
}

impl From<PathExpr> for PathFragment {
    fn from(path: PathExpr) -> Self {
        PathFragment::Path(path)
    }
}
