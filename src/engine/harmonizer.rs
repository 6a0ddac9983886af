//! Stricter-wins merge of rule sets owned by different governing parties.
//!
//! Rules from all sets are grouped by `context_id::name`. Each group keeps
//! exactly one rule: the one with the strictest decision status, then the
//! lowest priority value. On a full tie the rule seen first wins, so callers
//! that need reproducible output across runs must supply a stable input
//! order.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::PolicyRule;

/// Field reported on every harmonization conflict.
pub const CONFLICT_FIELD: &str = "decision.status";

/// A rule that was overridden by a stricter rule with the same group key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// The overridden (less strict) rule
    pub rule_a: String,

    /// The selected (stricter) rule
    pub rule_b: String,

    pub field: String,

    pub detail: String,
}

impl Conflict {
    fn overridden(loser: &PolicyRule, winner: &PolicyRule) -> Self {
        Conflict {
            rule_a: loser.rule_id.clone(),
            rule_b: winner.rule_id.clone(),
            field: CONFLICT_FIELD.to_string(),
            detail: format!(
                "{} overridden by {} from rule {} ({})",
                loser.status(),
                winner.status(),
                winner.rule_id,
                winner.group_key()
            ),
        }
    }
}

/// Counters describing one harmonization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarmonizeStats {
    /// Rule count of each input set, in argument order
    pub input_counts: Vec<usize>,
    pub combined_count: usize,
    pub conflict_count: usize,
}

/// Composite rule set plus the conflicts resolved while building it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarmonizeResult {
    pub combined: Vec<PolicyRule>,
    pub conflicts: Vec<Conflict>,
    pub stats: HarmonizeStats,
}

impl HarmonizeResult {
    #[inline]
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Ordering that puts the stricter rule first: higher status rank, then
/// lower priority value.
pub fn strictness_order(a: &PolicyRule, b: &PolicyRule) -> Ordering {
    b.strictness()
        .cmp(&a.strictness())
        .then_with(|| a.priority.cmp(&b.priority))
}

/// Harmonize two rule sets.
pub fn harmonize(rules_a: &[PolicyRule], rules_b: &[PolicyRule]) -> HarmonizeResult {
    harmonize_all(&[rules_a, rules_b])
}

/// Harmonize any number of rule sets (e.g. enterprise, partner, brand).
pub fn harmonize_all(rule_sets: &[&[PolicyRule]]) -> HarmonizeResult {
    // Groups in first-seen order; the map only indexes into `groups`.
    let mut index: AHashMap<String, usize> = AHashMap::new();
    let mut groups: Vec<Vec<&PolicyRule>> = Vec::new();

    for rule in rule_sets.iter().flat_map(|set| set.iter()) {
        let i = *index.entry(rule.group_key()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[i].push(rule);
    }

    let mut combined = Vec::with_capacity(groups.len());
    let mut conflicts = Vec::new();

    for group in groups {
        // min_by returns the first of several equal minima
        let Some(strictest) = group.iter().copied().min_by(|a, b| strictness_order(a, b)) else {
            continue;
        };

        conflicts.extend(
            group
                .iter()
                .filter(|r| r.strictness() < strictest.strictness())
                .map(|r| Conflict::overridden(r, strictest)),
        );

        combined.push(strictest.clone());
    }

    let stats = HarmonizeStats {
        input_counts: rule_sets.iter().map(|set| set.len()).collect(),
        combined_count: combined.len(),
        conflict_count: conflicts.len(),
    };

    HarmonizeResult {
        combined,
        conflicts,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConditionTree, DecisionStatus, RuleDecision};
    use std::collections::HashMap;

    fn rule(id: &str, ctx: &str, name: &str, status: DecisionStatus, priority: i32) -> PolicyRule {
        PolicyRule {
            rule_id: id.to_string(),
            name: name.to_string(),
            description: None,
            priority,
            is_active: true,
            context_id: ctx.to_string(),
            conditions: ConditionTree::all(vec![]),
            decision: RuleDecision {
                status,
                reason: format!("{} says {}", id, status),
                audit_trigger: false,
            },
        }
    }

    #[test]
    fn test_empty_inputs() {
        let result = harmonize(&[], &[]);

        assert!(result.combined.is_empty());
        assert!(result.conflicts.is_empty());
        assert_eq!(result.stats.input_counts, vec![0, 0]);
    }

    #[test]
    fn test_prohibited_overrides_approved() {
        let a = vec![rule("a1", "ctx1", "RuleX", DecisionStatus::Approved, 5)];
        let b = vec![rule("b1", "ctx1", "RuleX", DecisionStatus::Prohibited, 1)];

        let result = harmonize(&a, &b);

        assert_eq!(result.combined.len(), 1);
        assert_eq!(result.combined[0].rule_id, "b1");
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].rule_a, "a1");
        assert_eq!(result.conflicts[0].rule_b, "b1");
        assert_eq!(result.conflicts[0].field, CONFLICT_FIELD);
        assert!(result.conflicts[0].detail.contains("Approved overridden by Prohibited"));
    }

    #[test]
    fn test_strictness_beats_priority() {
        // Lower priority value does not rescue a less strict rule
        let a = vec![rule("a1", "ctx", "R", DecisionStatus::RequiresReview, 1)];
        let b = vec![rule("b1", "ctx", "R", DecisionStatus::Prohibited, 50)];

        let result = harmonize(&a, &b);
        assert_eq!(result.combined[0].rule_id, "b1");
    }

    #[test]
    fn test_priority_breaks_equal_strictness() {
        let a = vec![rule("a1", "ctx", "R", DecisionStatus::RequiresReview, 10)];
        let b = vec![rule("b1", "ctx", "R", DecisionStatus::RequiresReview, 2)];

        let result = harmonize(&a, &b);

        assert_eq!(result.combined[0].rule_id, "b1");
        // Equal strictness is not a conflict
        assert!(result.conflicts.is_empty());
    }

    #[test]
    fn test_full_tie_first_seen_wins() {
        let a = vec![rule("a1", "ctx", "R", DecisionStatus::Approved, 3)];
        let b = vec![rule("b1", "ctx", "R", DecisionStatus::Approved, 3)];

        assert_eq!(harmonize(&a, &b).combined[0].rule_id, "a1");
        assert_eq!(harmonize(&b, &a).combined[0].rule_id, "b1");
    }

    #[test]
    fn test_distinct_keys_pass_through() {
        let a = vec![
            rule("a1", "ctx1", "R", DecisionStatus::Approved, 1),
            rule("a2", "ctx2", "R", DecisionStatus::Prohibited, 1),
        ];
        let b = vec![rule("b1", "ctx1", "S", DecisionStatus::RequiresReview, 1)];

        let result = harmonize(&a, &b);

        let ids: Vec<&str> = result.combined.iter().map(|r| r.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "b1"]);
        assert!(result.conflicts.is_empty());
        assert_eq!(result.combined[0], a[0]);
    }

    #[test]
    fn test_duplicates_within_one_set() {
        let a = vec![
            rule("a1", "ctx", "R", DecisionStatus::Approved, 1),
            rule("a2", "ctx", "R", DecisionStatus::RequiresReview, 1),
        ];

        let result = harmonize(&a, &[]);

        assert_eq!(result.combined.len(), 1);
        assert_eq!(result.combined[0].rule_id, "a2");
        assert_eq!(result.conflicts.len(), 1);
    }

    #[test]
    fn test_three_party_harmonization() {
        let enterprise = vec![rule("e1", "acme", "GenAI images", DecisionStatus::Approved, 10)];
        let partner = vec![rule("p1", "acme", "GenAI images", DecisionStatus::RequiresReview, 5)];
        let brand = vec![
            rule("br1", "acme", "GenAI images", DecisionStatus::Prohibited, 20),
            rule("br2", "acme", "Voice cloning", DecisionStatus::Prohibited, 1),
        ];

        let result = harmonize_all(&[enterprise.as_slice(), partner.as_slice(), brand.as_slice()]);

        assert_eq!(result.combined.len(), 2);
        assert_eq!(result.combined[0].rule_id, "br1");
        assert_eq!(result.conflicts.len(), 2);
        let overridden: Vec<&str> = result.conflicts.iter().map(|c| c.rule_a.as_str()).collect();
        assert_eq!(overridden, vec!["e1", "p1"]);
        assert_eq!(result.stats.input_counts, vec![1, 1, 2]);
        assert_eq!(result.stats.combined_count, 2);
        assert_eq!(result.stats.conflict_count, 2);
    }

    #[test]
    fn test_strictness_monotonicity_and_conflict_completeness() {
        let statuses = [
            DecisionStatus::Approved,
            DecisionStatus::RequiresReview,
            DecisionStatus::Prohibited,
        ];
        let mut a = Vec::new();
        let mut b = Vec::new();
        for i in 0..30 {
            let status = statuses[(i * 7) % 3];
            let key = format!("K{}", i % 6);
            let r = rule(&format!("r{}", i), "ctx", &key, status, (i % 4) as i32);
            if i % 2 == 0 {
                a.push(r);
            } else {
                b.push(r);
            }
        }

        let result = harmonize(&a, &b);

        let mut max_rank: HashMap<String, u8> = HashMap::new();
        let mut below_max: HashMap<String, usize> = HashMap::new();
        for r in a.iter().chain(b.iter()) {
            let e = max_rank.entry(r.group_key()).or_insert(0);
            *e = (*e).max(r.strictness());
        }
        for r in a.iter().chain(b.iter()) {
            if r.strictness() < max_rank[&r.group_key()] {
                *below_max.entry(r.group_key()).or_insert(0) += 1;
            }
        }

        assert_eq!(result.combined.len(), max_rank.len());
        for r in &result.combined {
            assert_eq!(r.strictness(), max_rank[&r.group_key()]);
        }
        let expected_conflicts: usize = below_max.values().sum();
        assert_eq!(result.conflicts.len(), expected_conflicts);
    }

    #[test]
    fn test_idempotence() {
        let a = vec![
            rule("a1", "ctx", "R", DecisionStatus::Approved, 1),
            rule("a2", "ctx", "S", DecisionStatus::Prohibited, 1),
        ];
        let b = vec![rule("b1", "ctx", "R", DecisionStatus::Prohibited, 4)];

        let first = harmonize(&a, &b);
        let second = harmonize(&first.combined, &[]);

        assert_eq!(second.combined, first.combined);
        assert!(second.conflicts.is_empty());
    }
}
