pub mod hot_reload;
pub mod loader;
pub mod snapshot;

pub use hot_reload::PolicyWatcher;
pub use loader::{load_rule_set, load_telemetry, PolicyError, PolicyLoader, RuleSetDocument};
pub use snapshot::EffectiveSnapshot;
