//! Rule construction from a structured (JSON) description
//!
//! Expected shape:
//!
//! ```json
//! {
//!   "rules": {
//!     "operator": "AND",
//!     "left":  { "operand": "age > 30" },
//!     "right": { "operand": "income > 50000" }
//!   }
//! }
//! ```
//!
//! `rules` may also be a list of such objects; the list is folded under `AND`.
//! `left` and `right` are always read as leaves.

use crate::error::{Result, RuleEngineError};
use crate::rule::ast::{Connective, Node};
use crate::rule::combine::combine_all;
use serde_json::{Map, Value};
use tracing::debug;

const RULES_KEY: &str = "rules";

/// Build a tree from a structured rule description
pub fn from_json(description: &Value) -> Result<Node> {
    let rules = description
        .as_object()
        .and_then(|root| root.get(RULES_KEY))
        .filter(|rules| !rules.is_null())
        .ok_or_else(|| invalid("Invalid JSON structure for rules"))?;

    let tree = match rules {
        Value::Array(list) => {
            let nodes = list
                .iter()
                .map(|rule| {
                    rule.as_object()
                        .ok_or_else(|| invalid("Each rule must be a valid JSON object"))
                        .and_then(process_rule)
                })
                .collect::<Result<Vec<_>>>()?;
            if nodes.is_empty() {
                return Err(invalid("Rules list cannot be empty"));
            }
            combine_all(nodes, Connective::And.as_str())?
        }
        Value::Object(rule) => process_rule(rule)?,
        _ => return Err(invalid("Rules must be a valid JSON object or a list")),
    };

    debug!(leaves = tree.leaf_count(), "rule built from structured description");
    Ok(tree)
}

/// Parse JSON text, then build the tree as [`from_json`] does
pub fn from_json_str(text: &str) -> Result<Node> {
    let description: Value = serde_json::from_str(text)
        .map_err(|e| invalid(&format!("Malformed JSON: {}", e)))?;
    from_json(&description)
}

fn process_rule(rule: &Map<String, Value>) -> Result<Node> {
    let left = operand(rule, "left")?;
    let right = operand(rule, "right")?;

    let connective = rule
        .get("operator")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("operator must be a string"))?;

    Ok(Node::operator(connective, left, right))
}

fn operand(rule: &Map<String, Value>, key: &str) -> Result<Node> {
    let side = rule
        .get(key)
        .and_then(Value::as_object)
        .ok_or_else(|| invalid(&format!("{} must be a valid JSON object", key)))?;

    side.get("operand")
        .and_then(Value::as_str)
        .map(Node::operand)
        .ok_or_else(|| invalid(&format!("{}.operand must be a string", key)))
}

fn invalid(message: &str) -> RuleEngineError {
    RuleEngineError::InvalidStructure(message.to_string())
}
