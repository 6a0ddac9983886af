pub mod escalation;
pub mod harmonizer;
pub mod pipeline;
pub mod risk;

pub use escalation::{escalate_if_needed, HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD};
pub use harmonizer::{harmonize, harmonize_all, Conflict, HarmonizeResult, HarmonizeStats};
pub use pipeline::{evaluate, GovernanceOutcome};
pub use risk::{risk_profile, score_risk, RiskFilter, RiskProfile};
