use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::context::{RegionId, ToolId};

/// Outcome recorded for a historical tool run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Deviation,
    Remediated,
}

/// De-identified historical outcome record.
///
/// Telemetry is append-only; the risk scorer only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryAtom {
    /// When the run completed
    pub ts: DateTime<Utc>,

    pub tool_id: ToolId,

    pub tool_version: String,

    pub use_case_id: String,

    /// Policy clauses that applied to the run.
    /// SmallVec optimizes for the common case of a handful of clauses
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub clause_ids: SmallVec<[String; 4]>,

    pub outcome: Outcome,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_id: Option<String>,

    /// Medical/legal/regulatory review result
    pub mlr_result: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_s: Option<f64>,

    pub region_id: RegionId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_hash: Option<String>,
}

impl TelemetryAtom {
    /// Create an atom stamped with the current time.
    pub fn new(tool_id: ToolId, region_id: RegionId, outcome: Outcome) -> Self {
        TelemetryAtom {
            ts: Utc::now(),
            tool_id,
            tool_version: String::new(),
            use_case_id: String::new(),
            clause_ids: SmallVec::new(),
            outcome,
            remediation_id: None,
            mlr_result: String::new(),
            duration_s: None,
            region_id,
            run_hash: None,
        }
    }

    #[inline]
    pub fn is_fail(&self) -> bool {
        self.outcome == Outcome::Fail
    }

    #[inline]
    pub fn is_remediated(&self) -> bool {
        self.outcome == Outcome::Remediated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_deserialization() {
        let json = r#"{
            "ts": "2025-03-01T12:00:00Z",
            "tool_id": "T1",
            "tool_version": "2.1.0",
            "use_case_id": "uc-social-copy",
            "clause_ids": ["c1", "c2"],
            "outcome": "remediated",
            "remediation_id": "rem-9",
            "mlr_result": "approved_with_changes",
            "duration_s": 42.5,
            "region_id": "eu"
        }"#;

        let atom: TelemetryAtom = serde_json::from_str(json).unwrap();
        assert_eq!(atom.tool_id.as_str(), "T1");
        assert_eq!(atom.region_id.as_str(), "EU");
        assert_eq!(atom.outcome, Outcome::Remediated);
        assert!(atom.is_remediated());
        assert!(!atom.is_fail());
        assert_eq!(atom.clause_ids.len(), 2);
        assert!(atom.run_hash.is_none());
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&Outcome::Deviation).unwrap();
        assert_eq!(json, "\"deviation\"");
    }
}
