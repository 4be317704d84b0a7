//! Glob-importable set of everything needed to write queries.

pub use crate::facade::{
    create, literal, match_, merge, node, not, opt_match, param, select, var, with,
};
pub use crate::logical::Condition;
pub use crate::{DslError, DslResult, RenderConfig, Selection};
