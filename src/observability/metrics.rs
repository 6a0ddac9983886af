use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::{Escalation, EscalationLevel};
use crate::engine::{GovernanceOutcome, HarmonizeResult};

/// Metrics registry for the engine.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Harmonization runs
    pub harmonizations_total: AtomicU64,
    pub rules_combined_total: AtomicU64,
    pub conflicts_total: AtomicU64,

    /// Risk scores computed
    pub risk_scores_total: AtomicU64,

    /// Escalation decisions by outcome
    pub escalations_none: AtomicU64,
    pub escalations_reviewer: AtomicU64,
    pub escalations_compliance_lead: AtomicU64,
    pub escalations_legal: AtomicU64,

    /// Policy reloads
    pub policy_reloads_total: AtomicU64,
    pub policy_reload_errors: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        MetricsRegistry::default()
    }

    /// Record a harmonization run.
    pub fn record_harmonization(&self, result: &HarmonizeResult) {
        self.harmonizations_total.fetch_add(1, Ordering::Relaxed);
        self.rules_combined_total
            .fetch_add(result.stats.combined_count as u64, Ordering::Relaxed);
        self.conflicts_total
            .fetch_add(result.stats.conflict_count as u64, Ordering::Relaxed);
    }

    /// Record a risk score computation.
    pub fn record_risk_score(&self) {
        self.risk_scores_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an escalation decision (including "no escalation").
    pub fn record_escalation(&self, escalation: Option<&Escalation>) {
        let counter = match escalation.map(|e| e.level) {
            None => &self.escalations_none,
            Some(EscalationLevel::Reviewer) => &self.escalations_reviewer,
            Some(EscalationLevel::ComplianceLead) => &self.escalations_compliance_lead,
            Some(EscalationLevel::Legal) => &self.escalations_legal,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record every stage of a pipeline run.
    pub fn record_outcome(&self, outcome: &GovernanceOutcome) {
        self.record_harmonization(&outcome.harmonized);
        self.record_risk_score();
        self.record_escalation(outcome.escalation.as_ref());
    }

    /// Record a policy reload attempt.
    pub fn record_policy_reload(&self, success: bool) {
        if success {
            self.policy_reloads_total.fetch_add(1, Ordering::Relaxed);
        } else {
            self.policy_reload_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Export metrics in Prometheus text format.
    pub fn to_prometheus(&self) -> String {
        format!(
            r#"# HELP govrisk_harmonizations_total Harmonization runs
# TYPE govrisk_harmonizations_total counter
govrisk_harmonizations_total {}

# HELP govrisk_rules_combined_total Rules emitted by harmonization
# TYPE govrisk_rules_combined_total counter
govrisk_rules_combined_total {}

# HELP govrisk_conflicts_total Rules overridden by a stricter rule
# TYPE govrisk_conflicts_total counter
govrisk_conflicts_total {}

# HELP govrisk_risk_scores_total Risk scores computed
# TYPE govrisk_risk_scores_total counter
govrisk_risk_scores_total {}

# HELP govrisk_escalations Escalation decisions by level
# TYPE govrisk_escalations counter
govrisk_escalations{{level="none"}} {}
govrisk_escalations{{level="reviewer"}} {}
govrisk_escalations{{level="compliance_lead"}} {}
govrisk_escalations{{level="legal"}} {}

# HELP govrisk_policy_reloads_total Policy reload operations
# TYPE govrisk_policy_reloads_total counter
govrisk_policy_reloads_total {}

# HELP govrisk_policy_reload_errors_total Policy reload errors
# TYPE govrisk_policy_reload_errors_total counter
govrisk_policy_reload_errors_total {}
"#,
            self.harmonizations_total.load(Ordering::Relaxed),
            self.rules_combined_total.load(Ordering::Relaxed),
            self.conflicts_total.load(Ordering::Relaxed),
            self.risk_scores_total.load(Ordering::Relaxed),
            self.escalations_none.load(Ordering::Relaxed),
            self.escalations_reviewer.load(Ordering::Relaxed),
            self.escalations_compliance_lead.load(Ordering::Relaxed),
            self.escalations_legal.load(Ordering::Relaxed),
            self.policy_reloads_total.load(Ordering::Relaxed),
            self.policy_reload_errors.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{evaluate, RiskFilter};

    #[test]
    fn test_record_escalation() {
        let metrics = MetricsRegistry::new();

        metrics.record_escalation(None);
        metrics.record_escalation(Some(&Escalation::new(EscalationLevel::Reviewer, "r")));
        metrics.record_escalation(Some(&Escalation::new(EscalationLevel::Reviewer, "r")));

        assert_eq!(metrics.escalations_none.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.escalations_reviewer.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.escalations_legal.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_outcome() {
        let metrics = MetricsRegistry::new();
        let outcome = evaluate(&[], &[], &RiskFilter::default());

        metrics.record_outcome(&outcome);

        assert_eq!(metrics.harmonizations_total.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.risk_scores_total.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.escalations_none.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = MetricsRegistry::new();
        metrics.record_policy_reload(true);
        metrics.record_escalation(None);

        let output = metrics.to_prometheus();

        assert!(output.contains("govrisk_policy_reloads_total 1"));
        assert!(output.contains("govrisk_escalations{level=\"none\"} 1"));
    }
}
