use serde::{Deserialize, Serialize};
use std::fmt;

/// Global AI tool identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolId(pub String);

impl ToolId {
    pub fn new(id: impl Into<String>) -> Self {
        ToolId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Region identifier (e.g., "EU", "US-EAST"), stored ASCII-uppercased.
///
/// Only ASCII letters are folded; other characters must match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RegionId(String);

impl RegionId {
    /// Create a new region id, normalizing ASCII letters to uppercase.
    pub fn new(region: impl Into<String>) -> Self {
        let mut region = region.into();
        region.make_ascii_uppercase();
        RegionId(region)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ASCII case-insensitive match against a raw region string.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl From<String> for RegionId {
    fn from(region: String) -> Self {
        RegionId::new(region)
    }
}

impl From<RegionId> for String {
    fn from(region: RegionId) -> Self {
        region.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An AI tool as registered in the external tool registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub id: ToolId,

    /// Display name
    pub name: String,

    /// Semantic version string
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// The person or role performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Role string (e.g., "Senior Copywriter")
    pub role: String,

    /// Opaque user id, only meaningful inside the owning tenant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Actor {
    pub fn new(role: impl Into<String>) -> Self {
        Actor {
            role: role.into(),
            user_id: None,
        }
    }

    /// Copy of this actor with the user id stripped, safe to hand to
    /// anything outside the owning tenant.
    pub fn redacted(&self) -> Self {
        Actor {
            role: self.role.clone(),
            user_id: None,
        }
    }
}

/// Governance scope of a single tool-usage event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub tenant_id: String,
    pub enterprise_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    pub region: RegionId,
    pub channel: String,

    /// Effective policy snapshot in force for this event
    #[serde(rename = "policySnapshotId")]
    pub policy_snapshot_id: String,
}
