//! Rule string parser
//!
//! Turns `"age > 30 AND department = 'Sales' OR salary > 50000"` into a tree.
//! There is no precedence between `AND` and `OR` and no parentheses: the
//! conditions are grouped strictly left to right, so the example above becomes
//! `((age > 30 AND department = 'Sales') OR salary > 50000)`.

use crate::error::{Result, RuleEngineError};
use crate::rule::ast::{Connective, Node};
use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;
use tracing::debug;

/// Whitespace-separated words of a rule string
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());

/// Characters that make a token a comparison condition
const COMPARATORS: [char; 3] = ['=', '>', '<'];

/// Parse a rule string into an AST
pub fn parse(rule: &str) -> Result<Node> {
    let lexemes = lex(rule)?;

    let tree = lexemes
        .iter()
        .try_fold(Fold::Empty, |state, lexeme| state.push(lexeme))?
        .finish(rule)?;

    debug!(rule, leaves = tree.leaf_count(), "rule parsed");
    Ok(tree)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Lexeme<'a> {
    Condition(&'a str),
    Connective(Connective),
}

/// Split a rule string into conditions and connectives.
///
/// A connective is a whole word `AND` or `OR`; every run of other words
/// between connectives is one condition, kept with its inner spacing.
fn lex(rule: &str) -> Result<SmallVec<[Lexeme<'_>; 8]>> {
    let mut lexemes = SmallVec::new();
    let mut span: Option<(usize, usize)> = None;

    for word in WORD.find_iter(rule) {
        match Connective::parse(word.as_str()) {
            Some(connective) => {
                if let Some((start, end)) = span.take() {
                    lexemes.push(condition(&rule[start..end])?);
                }
                lexemes.push(Lexeme::Connective(connective));
            }
            None => {
                span = Some(match span {
                    Some((start, _)) => (start, word.end()),
                    None => (word.start(), word.end()),
                });
            }
        }
    }

    if let Some((start, end)) = span {
        lexemes.push(condition(&rule[start..end])?);
    }

    Ok(lexemes)
}

fn condition(token: &str) -> Result<Lexeme<'_>> {
    if token.contains(COMPARATORS) {
        Ok(Lexeme::Condition(token))
    } else {
        Err(RuleEngineError::InvalidExpression(format!(
            "Invalid token format: {}",
            token
        )))
    }
}

/// Left fold state over the lexeme stream
enum Fold {
    /// Nothing consumed yet
    Empty,
    /// A complete tree, waiting for a connective or the end
    Complete(Node),
    /// A tree followed by a connective, waiting for its right operand
    Dangling(Node, Connective),
}

impl Fold {
    fn push(self, lexeme: &Lexeme<'_>) -> Result<Fold> {
        match (self, *lexeme) {
            (Fold::Empty, Lexeme::Condition(cond)) => Ok(Fold::Complete(Node::operand(cond))),
            (Fold::Dangling(left, connective), Lexeme::Condition(cond)) => Ok(Fold::Complete(
                Node::operator(connective.as_str(), left, Node::operand(cond)),
            )),
            (Fold::Complete(left), Lexeme::Connective(connective)) => {
                Ok(Fold::Dangling(left, connective))
            }
            (Fold::Empty | Fold::Dangling(..), Lexeme::Connective(connective)) => {
                Err(RuleEngineError::InvalidExpression(format!(
                    "Not enough operands before operator: {}",
                    connective
                )))
            }
            // The lexer merges adjacent condition words, so this only happens
            // for hand-built lexeme streams.
            (Fold::Complete(_), Lexeme::Condition(cond)) => {
                Err(RuleEngineError::InvalidExpression(format!(
                    "Missing operator before: {}",
                    cond
                )))
            }
        }
    }

    fn finish(self, rule: &str) -> Result<Node> {
        match self {
            Fold::Complete(tree) => Ok(tree),
            Fold::Empty | Fold::Dangling(..) => Err(RuleEngineError::InvalidExpression(
                rule.trim().to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::ast::NodeKind;

    #[test]
    fn test_parse_single_condition() {
        let ast = parse("age > 30").unwrap();
        assert_eq!(ast, Node::operand("age > 30"));
    }

    #[test]
    fn test_parse_trims_outer_whitespace() {
        let ast = parse("   age > 30 \n").unwrap();
        assert_eq!(ast, Node::operand("age > 30"));
    }

    #[test]
    fn test_parse_and_condition() {
        let ast = parse("age > 30 AND department = 'Sales'").unwrap();
        assert_eq!(
            ast,
            Node::operator(
                "AND",
                Node::operand("age > 30"),
                Node::operand("department = 'Sales'")
            )
        );
    }

    #[test]
    fn test_parse_is_left_associative() {
        // A AND B OR C groups as (A AND B) OR C
        let ast = parse("a > 1 AND b > 2 OR c > 3").unwrap();
        match &ast {
            Node::Operator {
                connective,
                left,
                right,
            } => {
                assert_eq!(connective, "OR");
                assert_eq!(**right, Node::operand("c > 3"));
                assert_eq!(left.value(), "AND");
                assert_eq!(left.kind(), NodeKind::Operator);
            }
            _ => panic!("Expected OR at the root"),
        }

        // A OR B AND C groups as (A OR B) AND C, no precedence
        let ast = parse("a > 1 OR b > 2 AND c > 3").unwrap();
        assert_eq!(ast.value(), "AND");
        assert_eq!(ast.left().map(Node::value), Some("OR"));
    }

    #[test]
    fn test_parse_keeps_inner_spacing() {
        let ast = parse("city = 'New  York' OR age>30").unwrap();
        assert_eq!(ast.left().map(Node::value), Some("city = 'New  York'"));
        assert_eq!(ast.right().map(Node::value), Some("age>30"));
    }

    #[test]
    fn test_connectives_are_case_sensitive() {
        // "and" is just another word inside the condition
        let ast = parse("age > 30 and x = 1").unwrap();
        assert_eq!(ast, Node::operand("age > 30 and x = 1"));
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert!(matches!(
            parse(""),
            Err(RuleEngineError::InvalidExpression(_))
        ));
        assert!(matches!(
            parse("   "),
            Err(RuleEngineError::InvalidExpression(_))
        ));
    }

    #[test]
    fn test_leading_connective_is_error() {
        let err = parse("AND age > 30").unwrap_err();
        assert_eq!(
            err,
            RuleEngineError::InvalidExpression("Not enough operands before operator: AND".into())
        );
    }

    #[test]
    fn test_consecutive_connectives_is_error() {
        let err = parse("age > 30 AND OR salary > 1").unwrap_err();
        assert_eq!(
            err,
            RuleEngineError::InvalidExpression("Not enough operands before operator: OR".into())
        );
    }

    #[test]
    fn test_trailing_connective_is_error() {
        let err = parse("age > 30 AND").unwrap_err();
        assert_eq!(err, RuleEngineError::InvalidExpression("age > 30 AND".into()));
    }

    #[test]
    fn test_token_without_comparator_is_error() {
        let err = parse("age > 30 AND sales").unwrap_err();
        assert_eq!(
            err,
            RuleEngineError::InvalidExpression("Invalid token format: sales".into())
        );
    }

    #[test]
    fn test_long_chain_parses_and_drops() {
        let rule = vec!["age > 1"; 100_000].join(" AND ");
        let tree = parse(&rule).unwrap();
        assert_eq!(tree.leaf_count(), 100_000);
        assert_eq!(tree.depth(), 100_000);
        drop(tree);
    }

    #[test]
    fn test_adjacent_conditions_in_fold() {
        let result = Fold::Complete(Node::operand("a = 1")).push(&Lexeme::Condition("b = 2"));
        assert!(matches!(
            result,
            Err(RuleEngineError::InvalidExpression(_))
        ));
    }
}
