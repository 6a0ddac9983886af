pub mod config;
pub mod domain;
pub mod engine;
pub mod observability;
pub mod policy;

pub use config::Config;
pub use domain::{DecisionStatus, Escalation, PolicyRule, TelemetryAtom};
pub use engine::{escalate_if_needed, harmonize, score_risk, GovernanceOutcome};
