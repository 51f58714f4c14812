//! Error types for the rule engine

use thiserror::Error;

/// Main error type for the rule engine
///
/// Every variant describes bad caller input; nothing here is a system fault
/// and nothing is retried internally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleEngineError {
    /// Condition string that cannot be turned into a tree
    #[error("Invalid rule expression: {0}")]
    InvalidExpression(String),

    /// Structured rule description with a missing key or wrong shape
    #[error("Invalid rule structure: {0}")]
    InvalidStructure(String),

    #[error("Rule list cannot be empty")]
    EmptyCombination,

    /// Leaf condition text that does not match `field comparator literal`
    #[error("Invalid operand format: {0}")]
    InvalidOperand(String),

    #[error("Invalid numeric literal: {0}")]
    InvalidLiteral(String),

    #[error("Operator '{comparator}' is not supported for string field '{field}'")]
    UnsupportedOperator { comparator: String, field: String },

    #[error("Unsupported data type for field: {0}")]
    UnsupportedFieldType(String),

    #[error("Unknown logical operator: {0}")]
    UnknownConnective(String),
}

#[cfg(feature = "python")]
impl From<RuleEngineError> for pyo3::PyErr {
    fn from(err: RuleEngineError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

/// Result type alias for the rule engine
pub type Result<T> = std::result::Result<T, RuleEngineError>;
