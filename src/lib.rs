//! Rule Engine Core - boolean eligibility rules as compiled trees
//!
//! Conditions such as `age > 30 AND department = 'Sales'` are compiled into a
//! [`Node`] tree, optionally combined with other trees, and evaluated against a
//! [`DataRecord`] to a single `bool`.
//!
//! ```
//! use rule_engine_core::{combine_rules, create_rule, evaluate_rule, DataRecord};
//!
//! let rule = combine_rules(
//!     create_rule("age > 30 AND department = 'Sales'").unwrap(),
//!     create_rule("salary > 50000").unwrap(),
//!     "AND",
//! );
//! let data = DataRecord::new()
//!     .with("age", 35)
//!     .with("department", "Sales")
//!     .with("salary", 60000);
//!
//! assert!(evaluate_rule(&rule, &data).unwrap());
//! ```
//!
//! With the `python` feature the same entry points are exported as a Python
//! extension module via PyO3.

pub mod error;
pub mod rule;

#[cfg(feature = "python")]
mod python;

pub use crate::error::{Result, RuleEngineError};
pub use crate::rule::{combine_all, Comparator, Condition, Connective, DataRecord, Node, NodeKind};

use serde_json::Value;

// ============================================================================
// Entry Points
// ============================================================================

/// Compile a condition string into a tree
///
/// `AND` and `OR` have equal precedence and group left to right.
///
/// # Errors
/// [`RuleEngineError::InvalidExpression`] for blank input, a misplaced
/// connective, or a token that is not a comparison.
pub fn create_rule(rule: &str) -> Result<Node> {
    rule::parse(rule)
}

/// Build a tree from a structured description `{"rules": {...} | [...]}`
///
/// # Errors
/// [`RuleEngineError::InvalidStructure`] when a key is missing or a value has
/// the wrong shape.
pub fn create_rule_from_json(description: &Value) -> Result<Node> {
    rule::from_json(description)
}

/// Join two trees under a connective. The connective is checked at evaluation.
pub fn combine_rules(left: Node, right: Node, operator: &str) -> Node {
    rule::combine(left, right, operator)
}

/// Evaluate a tree against a data record
///
/// # Errors
/// Malformed leaf text, a comparator that does not fit the field's type, a
/// missing or non string/number field, or an unknown connective.
pub fn evaluate_rule(rule: &Node, data: &DataRecord) -> Result<bool> {
    rule::evaluate(rule, data)
}
