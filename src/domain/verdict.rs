use serde::{Deserialize, Serialize};

use super::DecisionStatus;

/// One check performed while producing a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictCheck {
    /// The rule or clause that was checked
    pub name: String,

    pub passed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl VerdictCheck {
    pub fn new(name: impl Into<String>, passed: bool) -> Self {
        VerdictCheck {
            name: name.into(),
            passed,
            detail: None,
        }
    }
}

/// Result of evaluating one or more rules against a usage event.
///
/// Produced by the external evaluator; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: DecisionStatus,

    pub reason: String,

    /// Rule that decided the verdict, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,

    /// Effective policy snapshot the verdict was computed against
    #[serde(rename = "policySnapshotId")]
    pub policy_snapshot_id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<VerdictCheck>,
}

impl Verdict {
    /// Verdict with no deciding rule and no checks.
    pub fn new(
        status: DecisionStatus,
        reason: impl Into<String>,
        policy_snapshot_id: impl Into<String>,
    ) -> Self {
        Verdict {
            status,
            reason: reason.into(),
            rule_id: None,
            policy_snapshot_id: policy_snapshot_id.into(),
            checks: Vec::new(),
        }
    }

    /// Attach the deciding rule.
    pub fn with_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    /// Pick the strictest verdict. The first one wins on equal status.
    pub fn strictest<I>(verdicts: I) -> Option<Verdict>
    where
        I: IntoIterator<Item = Verdict>,
    {
        verdicts.into_iter().fold(None, |best, v| match best {
            Some(b) if b.status >= v.status => Some(b),
            _ => Some(v),
        })
    }
}
