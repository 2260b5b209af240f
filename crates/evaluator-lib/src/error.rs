//! Error types for the evaluators
//!
//! Only malformed input is an error. A missing quota or a missing limit
//! field is a valid state and is modelled with `Option`.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, EvaluatorError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluatorError {
    /// A size or CPU string could not be parsed
    #[error("invalid quantity {value:?}: {reason}")]
    InvalidQuantity { value: String, reason: String },

    /// A value violates the invariants of the entity being built
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

impl EvaluatorError {
    pub(crate) fn quantity(value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidQuantity {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
