//! Combining existing trees under a connective

use crate::error::{Result, RuleEngineError};
use crate::rule::ast::Node;

/// Join two trees under `connective`.
///
/// The connective is taken as-is; an unknown token is only reported when the
/// combined tree is evaluated.
pub fn combine(left: Node, right: Node, connective: &str) -> Node {
    Node::operator(connective, left, right)
}

/// Fold an ordered list of trees left to right under one connective
pub fn combine_all<I>(rules: I, connective: &str) -> Result<Node>
where
    I: IntoIterator<Item = Node>,
{
    let mut rules = rules.into_iter();
    let first = rules.next().ok_or(RuleEngineError::EmptyCombination)?;
    Ok(rules.fold(first, |acc, rule| combine(acc, rule, connective)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_two() {
        let node = combine(Node::operand("a = 1"), Node::operand("b = 2"), "OR");
        assert_eq!(node.value(), "OR");
        assert_eq!(node.left(), Some(&Node::operand("a = 1")));
        assert_eq!(node.right(), Some(&Node::operand("b = 2")));
    }

    #[test]
    fn test_combine_all_is_left_fold() {
        let node = combine_all(
            vec![
                Node::operand("a = 1"),
                Node::operand("b = 2"),
                Node::operand("c = 3"),
            ],
            "AND",
        )
        .unwrap();

        assert_eq!(node.to_string(), "((a = 1 AND b = 2) AND c = 3)");
    }

    #[test]
    fn test_combine_all_single() {
        let node = combine_all([Node::operand("a = 1")], "AND").unwrap();
        assert_eq!(node, Node::operand("a = 1"));
    }

    #[test]
    fn test_combine_all_empty() {
        assert_eq!(
            combine_all(Vec::new(), "AND"),
            Err(RuleEngineError::EmptyCombination)
        );
    }
}
