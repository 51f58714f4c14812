//! Abstract Syntax Tree for rule expressions

use once_cell::sync::Lazy;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::mem;
use std::sync::Arc;

/// AST node for rule expressions
///
/// Children sit behind `Arc`, so combining an existing tree into a larger one
/// never copies it and a finished tree can be shared across threads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "NodeRepr")]
pub enum Node {
    /// Leaf condition like "age > 30"
    Operand(String),
    /// Logical connective joining two subtrees
    Operator {
        /// Stored verbatim; only `AND` and `OR` survive evaluation
        connective: String,
        left: Arc<Node>,
        right: Arc<Node>,
    },
}

/// Node kind as exposed to callers and in the wire form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Operand,
    Operator,
}

/// Logical connectives understood by the parser and evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    /// AND
    And,
    /// OR
    Or,
}

impl Connective {
    /// Match a token exactly (case-sensitive)
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "AND" => Some(Connective::And),
            "OR" => Some(Connective::Or),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }

    #[inline]
    pub fn apply(self, left: bool, right: bool) -> bool {
        match self {
            Connective::And => left && right,
            Connective::Or => left || right,
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Node {
    /// Build a leaf from a condition string. The text is not validated here.
    pub fn operand(condition: impl Into<String>) -> Self {
        Node::Operand(condition.into())
    }

    /// Build an internal node. The connective is not validated here.
    pub fn operator(connective: impl Into<String>, left: Node, right: Node) -> Self {
        Node::Operator {
            connective: connective.into(),
            left: Arc::new(left),
            right: Arc::new(right),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Operand(_) => NodeKind::Operand,
            Node::Operator { .. } => NodeKind::Operator,
        }
    }

    /// Condition text for leaves, connective token for internal nodes
    pub fn value(&self) -> &str {
        match self {
            Node::Operand(condition) => condition,
            Node::Operator { connective, .. } => connective,
        }
    }

    pub fn left(&self) -> Option<&Node> {
        match self {
            Node::Operand(_) => None,
            Node::Operator { left, .. } => Some(left),
        }
    }

    pub fn right(&self) -> Option<&Node> {
        match self {
            Node::Operand(_) => None,
            Node::Operator { right, .. } => Some(right),
        }
    }

    /// Number of levels; a single leaf has depth 1
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(&Node, usize)> = vec![(self, 1)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            if let Node::Operator { left, right, .. } = node {
                stack.push((left.as_ref(), level + 1));
                stack.push((right.as_ref(), level + 1));
            }
        }
        deepest
    }

    pub fn leaf_count(&self) -> usize {
        let mut leaves = 0;
        let mut stack: Vec<&Node> = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Node::Operand(_) => leaves += 1,
                Node::Operator { left, right, .. } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
        leaves
    }
}

/// Shared leaf swapped in for children while a tree is torn down
static DETACHED: Lazy<Arc<Node>> = Lazy::new(|| Arc::new(Node::Operand(String::new())));

/// Move both children of an operator onto `stack`, leaving placeholders behind
fn detach_children(node: &mut Node, stack: &mut Vec<Arc<Node>>) {
    if let Node::Operator { left, right, .. } = node {
        stack.push(mem::replace(left, Arc::clone(&DETACHED)));
        stack.push(mem::replace(right, Arc::clone(&DETACHED)));
    }
}

// Parsed chains are left-deep, one level per condition; the generated drop
// glue would recurse once per level.
impl Drop for Node {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        detach_children(self, &mut stack);
        while let Some(child) = stack.pop() {
            // Subtrees still shared elsewhere just lose a reference.
            if let Some(mut node) = Arc::into_inner(child) {
                detach_children(&mut node, &mut stack);
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Operand(condition) => f.write_str(condition),
            Node::Operator {
                connective,
                left,
                right,
            } => write!(f, "({} {} {})", left, connective, right),
        }
    }
}

// ============================================================================
// Wire form
// ============================================================================

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Node", 4)?;
        state.serialize_field("nodeType", &self.kind())?;
        state.serialize_field("value", self.value())?;
        state.serialize_field("left", &self.left())?;
        state.serialize_field("right", &self.right())?;
        state.end()
    }
}

/// Flat JSON shape of a node: `{"nodeType", "value", "left", "right"}`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeRepr {
    node_type: NodeKind,
    value: String,
    #[serde(default)]
    left: Option<Node>,
    #[serde(default)]
    right: Option<Node>,
}

impl TryFrom<NodeRepr> for Node {
    type Error = String;

    fn try_from(repr: NodeRepr) -> std::result::Result<Self, Self::Error> {
        match (repr.node_type, repr.left, repr.right) {
            (NodeKind::Operand, None, None) => Ok(Node::Operand(repr.value)),
            (NodeKind::Operand, _, _) => {
                Err(format!("operand node '{}' must not have children", repr.value))
            }
            (NodeKind::Operator, Some(left), Some(right)) => {
                Ok(Node::operator(repr.value, left, right))
            }
            (NodeKind::Operator, _, _) => {
                Err(format!("operator node '{}' requires both children", repr.value))
            }
        }
    }
}
