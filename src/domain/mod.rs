pub mod condition;
pub mod context;
pub mod escalation;
pub mod rule;
pub mod status;
pub mod telemetry;
pub mod verdict;

pub use condition::{ConditionClause, ConditionNode, ConditionOperator, ConditionTree, ConditionValue};
pub use context::{Actor, Context, RegionId, Tool, ToolId};
pub use escalation::{Escalation, EscalationLevel};
pub use rule::{PolicyRule, RuleDecision};
pub use status::DecisionStatus;
pub use telemetry::{Outcome, TelemetryAtom};
pub use verdict::{Verdict, VerdictCheck};
