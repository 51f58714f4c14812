//! Rule evaluator

use crate::error::{Result, RuleEngineError};
use crate::rule::ast::{Connective, Node};
use crate::rule::record::DataRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use tracing::trace;

/// Leaf condition grammar: `<field> <comparator> <literal>`.
///
/// - field: one or more word characters
/// - comparator: `=`, `>` or `<`, optionally surrounded by whitespace
/// - literal: anything without quote characters, optionally wrapped in `'` or `"`
static CONDITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(\w+)\s*(=|>|<)\s*['"]?([^'"]+)['"]?$"#).unwrap());

/// Comparison operators allowed in a leaf condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// Equal (=)
    Equal,
    /// Greater than (>)
    Greater,
    /// Less than (<)
    Less,
}

impl Comparator {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Comparator::Equal),
            ">" => Some(Comparator::Greater),
            "<" => Some(Comparator::Less),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Equal => "=",
            Comparator::Greater => ">",
            Comparator::Less => "<",
        }
    }

    /// Exact IEEE comparison, no tolerance on `=`. Both sides are finite.
    #[allow(clippy::float_cmp)]
    fn compare(self, actual: f64, expected: f64) -> bool {
        match self {
            Comparator::Equal => actual == expected,
            Comparator::Greater => actual > expected,
            Comparator::Less => actual < expected,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A decomposed leaf condition, borrowing from the operand text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition<'a> {
    pub field: &'a str,
    pub comparator: Comparator,
    /// Literal with surrounding quotes and whitespace removed
    pub literal: &'a str,
}

impl<'a> Condition<'a> {
    pub fn parse(text: &'a str) -> Result<Self> {
        let invalid = || RuleEngineError::InvalidOperand(text.to_string());

        let caps = CONDITION.captures(text.trim()).ok_or_else(invalid)?;
        let (Some(field), Some(symbol), Some(literal)) = (caps.get(1), caps.get(2), caps.get(3))
        else {
            return Err(invalid());
        };
        let comparator = Comparator::from_symbol(symbol.as_str()).ok_or_else(invalid)?;

        Ok(Condition {
            field: field.as_str(),
            comparator,
            literal: literal.as_str().trim(),
        })
    }
}

/// Evaluate a tree against a data record
///
/// Both sides of every connective are evaluated, so an error anywhere in the
/// tree is reported even when one side already decides the result.
pub fn evaluate(node: &Node, record: &DataRecord) -> Result<bool> {
    match node {
        Node::Operand(text) => check_operand(text, record),
        Node::Operator {
            connective,
            left,
            right,
        } => {
            let left_result = evaluate(left, record)?;
            let right_result = evaluate(right, record)?;
            let connective = Connective::parse(connective)
                .ok_or_else(|| RuleEngineError::UnknownConnective(connective.clone()))?;

            let result = connective.apply(left_result, right_result);
            trace!(%connective, left_result, right_result, result, "evaluated operator");
            Ok(result)
        }
    }
}

fn check_operand(text: &str, record: &DataRecord) -> Result<bool> {
    let cond = Condition::parse(text)?;

    let result = match record.get(cond.field) {
        Some(Value::String(actual)) => check_text(&cond, actual)?,
        Some(Value::Number(actual)) => {
            let actual = actual
                .as_f64()
                .ok_or_else(|| RuleEngineError::UnsupportedFieldType(cond.field.to_string()))?;
            check_number(&cond, actual)?
        }
        _ => return Err(RuleEngineError::UnsupportedFieldType(cond.field.to_string())),
    };

    trace!(operand = text, result, "evaluated operand");
    Ok(result)
}

fn check_text(cond: &Condition<'_>, actual: &str) -> Result<bool> {
    match cond.comparator {
        Comparator::Equal => Ok(actual == cond.literal),
        other => Err(RuleEngineError::UnsupportedOperator {
            comparator: other.symbol().to_string(),
            field: cond.field.to_string(),
        }),
    }
}

/// Numeric literals must be finite; `inf` and `NaN` spellings are rejected.
fn check_number(cond: &Condition<'_>, actual: f64) -> Result<bool> {
    let expected = cond
        .literal
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| RuleEngineError::InvalidLiteral(cond.literal.to_string()))?;
    Ok(cond.comparator.compare(actual, expected))
}
