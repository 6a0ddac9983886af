use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::PolicyRule;
use crate::engine::{Conflict, HarmonizeResult};

use super::loader::RuleSetDocument;

/// Version string of an empty snapshot.
pub const EMPTY_VERSION: &str = "0000000000000000";

/// Where a snapshot's rules came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSource {
    pub set_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub rule_count: usize,
}

impl From<&RuleSetDocument> for SnapshotSource {
    fn from(doc: &RuleSetDocument) -> Self {
        SnapshotSource {
            set_id: doc.set_id.clone(),
            version: doc.version.clone(),
            rule_count: doc.rules.len(),
        }
    }
}

/// Candidate effective policy for a context, generated from a harmonization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveSnapshot {
    /// Unique id of this generated snapshot
    pub snapshot_id: Uuid,

    /// Content hash of the combined rules; equal content means equal version
    pub version: String,

    pub generated_at: DateTime<Utc>,

    pub sources: Vec<SnapshotSource>,

    pub rules: Vec<PolicyRule>,

    #[serde(default)]
    pub conflicts: Vec<Conflict>,
}

impl EffectiveSnapshot {
    /// Build a snapshot from harmonized rule sets.
    pub fn from_harmonized(sources: &[RuleSetDocument], harmonized: HarmonizeResult) -> Self {
        EffectiveSnapshot {
            snapshot_id: Uuid::new_v4(),
            version: compute_version(&harmonized.combined),
            generated_at: Utc::now(),
            sources: sources.iter().map(SnapshotSource::from).collect(),
            rules: harmonized.combined,
            conflicts: harmonized.conflicts,
        }
    }

    /// Snapshot with no rules, used until a valid policy has been loaded.
    pub fn empty() -> Self {
        EffectiveSnapshot {
            snapshot_id: Uuid::new_v4(),
            version: EMPTY_VERSION.to_string(),
            generated_at: Utc::now(),
            sources: Vec::new(),
            rules: Vec::new(),
            conflicts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Hash of the full content of every rule, in order.
///
/// Any edit to a rule (conditions, decision, reason, priority) yields a new
/// version; reloading identical files keeps the version.
pub fn compute_version(rules: &[PolicyRule]) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    if rules.is_empty() {
        return EMPTY_VERSION.to_string();
    }

    let mut hasher = DefaultHasher::new();
    for rule in rules {
        // Rules hold only strings, numbers and enums, so encoding cannot fail
        match serde_json::to_vec(rule) {
            Ok(bytes) => bytes.hash(&mut hasher),
            Err(_) => rule.rule_id.hash(&mut hasher),
        }
    }
    format!("{:016x}", hasher.finish())
}
