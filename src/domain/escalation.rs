use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Who a composed decision is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EscalationLevel {
    Reviewer,
    ComplianceLead,
    Legal,
}

impl EscalationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationLevel::Reviewer => "Reviewer",
            EscalationLevel::ComplianceLead => "ComplianceLead",
            EscalationLevel::Legal => "Legal",
        }
    }
}

impl fmt::Display for EscalationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request for human attention on a composed decision.
///
/// Persisting and notifying is up to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escalation {
    pub level: EscalationLevel,

    pub reason: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Escalation {
    pub fn new(level: EscalationLevel, reason: impl Into<String>) -> Self {
        Escalation {
            level,
            reason: reason.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.metadata.insert(key.into(), value.to_string());
        self
    }
}
