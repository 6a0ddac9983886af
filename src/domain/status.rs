use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy decision status with strictness ordering.
///
/// Statuses are ordered from least to most strict. When rules from
/// different governing parties cover the same condition, the strictest
/// status wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DecisionStatus {
    /// Tool usage is allowed
    Approved = 1,
    /// Tool usage needs a human review before it is allowed
    RequiresReview = 2,
    /// Tool usage is not allowed
    Prohibited = 3,
}

impl DecisionStatus {
    /// Returns the stricter of two statuses.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        std::cmp::max(self, other)
    }

    /// Returns the strictness rank (1-3).
    #[inline]
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Returns true if this status blocks usage outright.
    #[inline]
    pub fn is_prohibited(&self) -> bool {
        *self == DecisionStatus::Prohibited
    }

    /// Returns true if this status allows usage without review.
    #[inline]
    pub fn is_approved(&self) -> bool {
        *self == DecisionStatus::Approved
    }

    /// Parse from string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().replace(['_', ' '], "").as_str() {
            "approved" => Some(DecisionStatus::Approved),
            "requiresreview" => Some(DecisionStatus::RequiresReview),
            "prohibited" => Some(DecisionStatus::Prohibited),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionStatus::Approved => "Approved",
            DecisionStatus::RequiresReview => "RequiresReview",
            DecisionStatus::Prohibited => "Prohibited",
        }
    }
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
