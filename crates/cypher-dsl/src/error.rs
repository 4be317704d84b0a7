//! Error types for query construction.

use thiserror::Error;

/// Errors raised while building or configuring a query.
///
/// The typestate builder rules out sequencing mistakes at compile time, so
/// these only surface through the dynamic entry points: [`ClauseSequence::apply`],
/// the `try_*` builder methods and configuration parsing.
///
/// [`ClauseSequence::apply`]: crate::ClauseSequence::apply
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DslError {
    /// A refinement was handed a value it cannot render
    #[error("Unsupported operation: {operation} does not accept {found}")]
    Unsupported {
        /// The refinement that rejected the value (`select`, `skip`, ...)
        operation: &'static str,
        /// Short description of the rejected value
        found: String,
    },

    /// A step is not legal after the current last clause
    #[error("Illegal clause transition: {call} cannot follow {from}")]
    IllegalTransition {
        /// Keyword of the last clause, or `<empty>`
        from: String,
        /// The rejected call
        call: &'static str,
    },

    /// No clause-introducing step was supplied
    #[error("Clause sequence is empty")]
    EmptySequence,

    /// Render configuration could not be parsed
    #[error("Config error: {0}")]
    Config(String),
}

/// Specialized Result type for query construction
pub type DslResult<T> = Result<T, DslError>;

impl DslError {
    /// Create an unsupported-value error
    pub fn unsupported(operation: &'static str, found: impl Into<String>) -> Self {
        Self::Unsupported {
            operation,
            found: found.into(),
        }
    }

    /// Create an illegal transition error
    pub fn illegal_transition(from: impl Into<String>, call: &'static str) -> Self {
        Self::IllegalTransition {
            from: from.into(),
            call,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for errors caused by calling steps in the wrong order
    pub fn is_sequencing(&self) -> bool {
        matches!(self, Self::IllegalTransition { .. } | Self::EmptySequence)
    }
}
