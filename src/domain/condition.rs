//! Condition trees attached to policy rules.
//!
//! Trees are built top-down from parsed policy documents and are immutable
//! afterwards. Matching a tree against a live usage event is done by the
//! external evaluator; this module only carries the structure.

use serde::{Deserialize, Serialize};

/// Comparison operator of a leaf clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    In,
    NotIn,
    SemverLessThan,
    SemverGreaterThan,
    SemverSatisfies,
}

impl ConditionOperator {
    /// Returns true for operators that compare semantic versions.
    pub fn is_semver(&self) -> bool {
        matches!(
            self,
            ConditionOperator::SemverLessThan
                | ConditionOperator::SemverGreaterThan
                | ConditionOperator::SemverSatisfies
        )
    }
}

/// Value a clause compares against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

/// Leaf clause: `field <operator> value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionClause {
    pub field: String,
    pub operator: ConditionOperator,
    pub value: ConditionValue,
}

impl ConditionClause {
    pub fn new(field: impl Into<String>, operator: ConditionOperator, value: ConditionValue) -> Self {
        ConditionClause {
            field: field.into(),
            operator,
            value,
        }
    }
}

/// Boolean connective of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
}

/// Child of a tree node: either a leaf clause or a nested tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionNode {
    Clause(ConditionClause),
    Tree(ConditionTree),
}

/// Recursive AND/OR tree of clauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionTree {
    pub operator: LogicalOperator,
    #[serde(default)]
    pub clauses: Vec<ConditionNode>,
}

impl ConditionTree {
    /// AND node over the given children.
    pub fn all(clauses: Vec<ConditionNode>) -> Self {
        ConditionTree {
            operator: LogicalOperator::And,
            clauses,
        }
    }

    /// OR node over the given children.
    pub fn any(clauses: Vec<ConditionNode>) -> Self {
        ConditionTree {
            operator: LogicalOperator::Or,
            clauses,
        }
    }

    /// Nesting depth; a tree holding only clauses has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .clauses
            .iter()
            .map(|node| match node {
                ConditionNode::Clause(_) => 0,
                ConditionNode::Tree(tree) => tree.depth(),
            })
            .max()
            .unwrap_or(0)
    }

    /// Number of leaf clauses in the whole tree.
    pub fn clause_count(&self) -> usize {
        self.clauses
            .iter()
            .map(|node| match node {
                ConditionNode::Clause(_) => 1,
                ConditionNode::Tree(tree) => tree.clause_count(),
            })
            .sum()
    }

    /// Returns true if this node or any nested node has no children.
    pub fn has_empty_node(&self) -> bool {
        self.clauses.is_empty()
            || self.clauses.iter().any(|node| match node {
                ConditionNode::Clause(_) => false,
                ConditionNode::Tree(tree) => tree.has_empty_node(),
            })
    }

    /// Fields referenced by leaf clauses, depth-first.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        for node in &self.clauses {
            match node {
                ConditionNode::Clause(clause) => out.push(clause.field.as_str()),
                ConditionNode::Tree(tree) => tree.collect_fields(out),
            }
        }
    }
}

impl From<ConditionClause> for ConditionNode {
    fn from(clause: ConditionClause) -> Self {
        ConditionNode::Clause(clause)
    }
}

impl From<ConditionTree> for ConditionNode {
    fn from(tree: ConditionTree) -> Self {
        ConditionNode::Tree(tree)
    }
}
