use serde::{Deserialize, Serialize};

use super::condition::ConditionTree;
use super::DecisionStatus;

/// Outcome a rule prescribes when its conditions match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDecision {
    pub status: DecisionStatus,

    /// Human-readable explanation shown to the submitter
    #[serde(default)]
    pub reason: String,

    /// Whether a match must be written to the audit trail
    #[serde(default)]
    pub audit_trigger: bool,
}

/// A policy rule owned by one governing context.
///
/// Rules are versioned by the policy store; everything here treats a rule
/// as an immutable snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Unique rule identifier
    pub rule_id: String,

    /// Rule name; together with `context_id` identifies the real-world
    /// condition the rule governs across rule sets
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Lower value means higher precedence
    #[serde(default = "default_priority")]
    pub priority: i32,

    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Governing scope this rule belongs to
    pub context_id: String,

    pub conditions: ConditionTree,

    pub decision: RuleDecision,
}

fn default_priority() -> i32 {
    100
}

fn default_true() -> bool {
    true
}

impl PolicyRule {
    /// Decision status of this rule.
    #[inline]
    pub fn status(&self) -> DecisionStatus {
        self.decision.status
    }

    /// Strictness rank of this rule's decision status.
    #[inline]
    pub fn strictness(&self) -> u8 {
        self.decision.status.rank()
    }

    /// Grouping key used to identify the same rule across rule sets.
    pub fn group_key(&self) -> String {
        format!("{}::{}", self.context_id, self.name)
    }
}
