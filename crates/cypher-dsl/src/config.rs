//! Render configuration.

use crate::error::{DslError, DslResult};
use serde::{Deserialize, Serialize};

/// How runs of ON CREATE / ON MATCH clauses following a MERGE are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeActionOrder {
    /// ON MATCH before ON CREATE, whatever the call order
    #[default]
    MatchFirst,
    /// Exactly as called
    CallOrder,
}

/// Settings applied when a clause sequence is turned into text.
///
/// The defaults reproduce the canonical single-line form:
///
/// ```
/// use cypher_dsl::RenderConfig;
///
/// let config = RenderConfig::from_toml_str(r#"separator = "\n""#).unwrap();
/// assert_eq!(config.separator, "\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Text placed between rendered clauses
    pub separator: String,
    /// Ordering of merge actions
    pub merge_action_order: MergeActionOrder,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            separator: " ".to_string(),
            merge_action_order: MergeActionOrder::MatchFirst,
        }
    }
}

impl RenderConfig {
    /// One clause per line
    pub fn multiline() -> Self {
        Self {
            separator: "\n".to_string(),
            ..Self::default()
        }
    }

    /// Keep merge actions in call order
    pub fn with_merge_action_order(mut self, order: MergeActionOrder) -> Self {
        self.merge_action_order = order;
        self
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(input: &str) -> DslResult<Self> {
        toml::from_str(input).map_err(|e| DslError::config(e.to_string()))
    }

    /// Parse configuration from JSON text
    pub fn from_json_str(input: &str) -> DslResult<Self> {
        serde_json::from_str(input).map_err(|e| DslError::config(e.to_string()))
    }
}
