//! Routing of composed decisions to human reviewers.
//!
//! Evaluated top to bottom, first match wins. A policy conflict always
//! outranks a risk signal.

use crate::domain::{Escalation, EscalationLevel};

use super::harmonizer::Conflict;

/// Risk at or above which a compliance lead must look at the decision.
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Risk at or above which a reviewer must look at the decision.
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.5;

pub const CONFLICT_REASON: &str = "Policy conflict detected during harmonization";
pub const HIGH_RISK_REASON: &str = "High predicted failure risk";
pub const MEDIUM_RISK_REASON: &str = "Medium predicted failure risk";

/// Decide whether a composed decision needs escalation.
pub fn escalate_if_needed(conflicts: &[Conflict], risk: f64) -> Option<Escalation> {
    if let Some(first) = conflicts.first() {
        return Some(
            Escalation::new(EscalationLevel::ComplianceLead, CONFLICT_REASON)
                .with("conflicts", conflicts.len())
                .with("example_rule", &first.rule_a),
        );
    }

    if risk >= HIGH_RISK_THRESHOLD {
        return Some(
            Escalation::new(EscalationLevel::ComplianceLead, HIGH_RISK_REASON).with("risk", risk),
        );
    }

    if risk >= MEDIUM_RISK_THRESHOLD {
        return Some(Escalation::new(EscalationLevel::Reviewer, MEDIUM_RISK_REASON).with("risk", risk));
    }

    None
}
