use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{Escalation, PolicyRule, TelemetryAtom};

use super::escalation::escalate_if_needed;
use super::harmonizer::{harmonize_all, HarmonizeResult};
use super::risk::{risk_profile, RiskFilter, RiskProfile};

/// Everything decided for one set of governing rule sets and telemetry.
#[derive(Debug, Clone, Serialize)]
pub struct GovernanceOutcome {
    pub harmonized: HarmonizeResult,
    pub risk: RiskProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation: Option<Escalation>,
}

impl GovernanceOutcome {
    #[inline]
    pub fn requires_escalation(&self) -> bool {
        self.escalation.is_some()
    }
}

/// Harmonize the rule sets, score the telemetry and route the result.
///
/// Harmonization and scoring are independent; both feed the escalation
/// router.
pub fn evaluate(
    rule_sets: &[&[PolicyRule]],
    atoms: &[TelemetryAtom],
    filter: &RiskFilter,
) -> GovernanceOutcome {
    let harmonized = harmonize_all(rule_sets);
    debug!(
        combined = harmonized.stats.combined_count,
        conflicts = harmonized.stats.conflict_count,
        "Rule sets harmonized"
    );

    let risk = risk_profile(atoms, filter);
    debug!(
        sample_size = risk.sample_size,
        score = risk.score,
        "Risk scored"
    );

    let escalation = escalate_if_needed(&harmonized.conflicts, risk.score);

    if let Some(esc) = &escalation {
        info!(level = %esc.level, reason = %esc.reason, "Decision escalated");
    }

    GovernanceOutcome {
        harmonized,
        risk,
        escalation,
    }
}
