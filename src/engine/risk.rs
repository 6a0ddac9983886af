//! Failure-risk estimate from historical outcome telemetry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Context, TelemetryAtom, Tool};

/// Risk reported when no telemetry matches the filter.
pub const NEUTRAL_RISK: f64 = 0.2;

/// Lower bound of any reported risk.
pub const MIN_RISK: f64 = 0.05;

/// Upper bound of any reported risk.
pub const MAX_RISK: f64 = 0.95;

/// Weight of the failure rate in the raw score.
pub const FAIL_WEIGHT: f64 = 0.7;

/// Weight of the non-remediated share in the raw score.
pub const REMEDIATION_WEIGHT: f64 = 0.3;

/// Which atoms count toward a score. `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFilter {
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub tool_id: Option<String>,

    /// Ignore atoms older than this
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
}

impl RiskFilter {
    /// Filter scoped to a tool in the region of a governance context.
    pub fn for_context(tool: &Tool, context: &Context) -> Self {
        RiskFilter {
            region: Some(context.region.as_str().to_string()),
            tool_id: Some(tool.id.as_str().to_string()),
            since: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_tool(mut self, tool_id: impl Into<String>) -> Self {
        self.tool_id = Some(tool_id.into());
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Check whether an atom passes this filter.
    pub fn matches(&self, atom: &TelemetryAtom) -> bool {
        if let Some(region) = &self.region {
            if !atom.region_id.matches(region) {
                return false;
            }
        }

        if let Some(tool_id) = &self.tool_id {
            if atom.tool_id.as_str() != tool_id {
                return false;
            }
        }

        match self.since {
            Some(since) => atom.ts >= since,
            None => true,
        }
    }
}

/// Score together with the rates it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    /// Atoms that passed the filter
    pub sample_size: usize,
    pub fail_rate: f64,
    pub remediated_rate: f64,
    pub score: f64,
}

impl RiskProfile {
    fn neutral() -> Self {
        RiskProfile {
            sample_size: 0,
            fail_rate: 0.0,
            remediated_rate: 0.0,
            score: NEUTRAL_RISK,
        }
    }
}

/// Compute the risk profile of the atoms matching `filter`.
pub fn risk_profile(atoms: &[TelemetryAtom], filter: &RiskFilter) -> RiskProfile {
    let mut total = 0usize;
    let mut fails = 0usize;
    let mut remediated = 0usize;

    for atom in atoms.iter().filter(|a| filter.matches(a)) {
        total += 1;
        if atom.is_fail() {
            fails += 1;
        } else if atom.is_remediated() {
            remediated += 1;
        }
    }

    // Sparse data should not raise false alarms
    if total == 0 {
        return RiskProfile::neutral();
    }

    let fail_rate = fails as f64 / total as f64;
    let remediated_rate = remediated as f64 / total as f64;
    let raw = fail_rate * FAIL_WEIGHT + (1.0 - remediated_rate) * REMEDIATION_WEIGHT;

    RiskProfile {
        sample_size: total,
        fail_rate,
        remediated_rate,
        score: raw.clamp(MIN_RISK, MAX_RISK),
    }
}

/// Risk probability in `[MIN_RISK, MAX_RISK]` for the atoms matching `filter`.
pub fn score_risk(atoms: &[TelemetryAtom], filter: &RiskFilter) -> f64 {
    risk_profile(atoms, filter).score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Outcome, RegionId, ToolId};
    use chrono::Duration;

    fn atom(tool: &str, region: &str, outcome: Outcome) -> TelemetryAtom {
        TelemetryAtom::new(ToolId::new(tool), RegionId::new(region), outcome)
    }

    fn repeat(n: usize, tool: &str, region: &str, outcome: Outcome) -> Vec<TelemetryAtom> {
        (0..n).map(|_| atom(tool, region, outcome)).collect()
    }

    #[test]
    fn test_empty_is_neutral() {
        assert_eq!(score_risk(&[], &RiskFilter::default()), NEUTRAL_RISK);

        let atoms = repeat(5, "T1", "EU", Outcome::Fail);
        let filter = RiskFilter::default().with_tool("T2");
        assert_eq!(score_risk(&atoms, &filter), 0.2);
    }

    #[test]
    fn test_mixed_outcomes() {
        let mut atoms = repeat(3, "T1", "EU", Outcome::Fail);
        atoms.extend(repeat(2, "T1", "EU", Outcome::Remediated));
        atoms.extend(repeat(5, "T1", "EU", Outcome::Pass));

        let profile = risk_profile(&atoms, &RiskFilter::default().with_tool("T1"));

        assert_eq!(profile.sample_size, 10);
        assert!((profile.fail_rate - 0.3).abs() < 1e-12);
        assert!((profile.remediated_rate - 0.2).abs() < 1e-12);
        // 0.3 * 0.7 + 0.8 * 0.3
        assert!((profile.score - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_low() {
        // No failures and everything remediated gives a raw score of 0
        let atoms = repeat(4, "T1", "EU", Outcome::Remediated);
        assert_eq!(score_risk(&atoms, &RiskFilter::default()), MIN_RISK);
    }

    #[test]
    fn test_clamped_high() {
        // All failures gives a raw score of 1
        let atoms = repeat(4, "T1", "EU", Outcome::Fail);
        assert_eq!(score_risk(&atoms, &RiskFilter::default()), MAX_RISK);
    }

    #[test]
    fn test_all_pass_scores_remediation_weight() {
        let atoms = repeat(4, "T1", "EU", Outcome::Pass);
        assert!((score_risk(&atoms, &RiskFilter::default()) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_deviation_counts_in_denominator_only() {
        let mut atoms = repeat(1, "T1", "EU", Outcome::Fail);
        atoms.extend(repeat(1, "T1", "EU", Outcome::Deviation));

        let profile = risk_profile(&atoms, &RiskFilter::default());
        assert_eq!(profile.sample_size, 2);
        assert!((profile.fail_rate - 0.5).abs() < 1e-12);
        assert!((profile.score - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_region_filter_case_insensitive() {
        let mut atoms = repeat(2, "T1", "EU", Outcome::Fail);
        atoms.extend(repeat(2, "T1", "US", Outcome::Pass));

        let profile = risk_profile(&atoms, &RiskFilter::default().with_region("eu"));
        assert_eq!(profile.sample_size, 2);
        assert_eq!(profile.score, MAX_RISK);
    }

    #[test]
    fn test_non_ascii_region_filter() {
        let atoms = repeat(3, "T1", "é", Outcome::Fail);

        let profile = risk_profile(&atoms, &RiskFilter::default().with_region("é"));
        assert_eq!(profile.sample_size, 3);
        assert_eq!(profile.score, MAX_RISK);
    }

    #[test]
    fn test_since_filter() {
        let mut old = atom("T1", "EU", Outcome::Fail);
        old.ts = Utc::now() - Duration::days(90);
        let atoms = vec![old, atom("T1", "EU", Outcome::Pass)];

        let filter = RiskFilter::default().since(Utc::now() - Duration::days(30));
        let profile = risk_profile(&atoms, &filter);
        assert_eq!(profile.sample_size, 1);
        assert_eq!(profile.fail_rate, 0.0);
    }

    #[test]
    fn test_bounds_hold_for_any_mix() {
        let outcomes = [Outcome::Pass, Outcome::Fail, Outcome::Deviation, Outcome::Remediated];
        for n in 1..40usize {
            let atoms: Vec<TelemetryAtom> = (0..n)
                .map(|i| atom("T1", "EU", outcomes[(i * i + n) % 4]))
                .collect();
            let score = score_risk(&atoms, &RiskFilter::default());
            assert!((MIN_RISK..=MAX_RISK).contains(&score), "score {} out of bounds", score);
        }
    }
}
