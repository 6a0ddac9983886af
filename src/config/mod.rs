use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

use crate::engine::RiskFilter;

/// Engine configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "govrisk")]
#[command(about = "Policy harmonization, risk scoring and escalation engine")]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "GOVRISK_LOG_LEVEL")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true, env = "GOVRISK_LOG_JSON")]
    pub log_json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Merge rule sets into one stricter-wins composite
    Harmonize(RuleSetArgs),

    /// Score failure risk from telemetry
    Score(ScoreArgs),

    /// Harmonize, score and decide escalation in one pass
    Evaluate(EvaluateArgs),

    /// Re-harmonize whenever rule-set files change
    Watch(WatchArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RuleSetArgs {
    /// Rule-set files (YAML or JSON), one per governing party
    #[arg(long = "rules", required = true, num_args = 1.., value_delimiter = ',', env = "GOVRISK_RULES")]
    pub rules: Vec<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Only count telemetry from this region
    #[arg(long, env = "GOVRISK_REGION")]
    pub region: Option<String>,

    /// Only count telemetry for this tool
    #[arg(long, env = "GOVRISK_TOOL_ID")]
    pub tool_id: Option<String>,

    /// Ignore telemetry older than this RFC 3339 timestamp
    #[arg(long)]
    pub since: Option<DateTime<Utc>>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> RiskFilter {
        RiskFilter {
            region: self.region.clone(),
            tool_id: self.tool_id.clone(),
            since: self.since,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ScoreArgs {
    /// Telemetry file (JSON array or JSON lines)
    #[arg(long, env = "GOVRISK_TELEMETRY")]
    pub telemetry: PathBuf,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Clone, Args)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub rule_sets: RuleSetArgs,

    /// Telemetry file (JSON array or JSON lines); without it risk is neutral
    #[arg(long, env = "GOVRISK_TELEMETRY")]
    pub telemetry: Option<PathBuf>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub rule_sets: RuleSetArgs,

    /// Policy reload check interval in seconds
    #[arg(
        long,
        default_value = "30",
        env = "GOVRISK_POLICY_RELOAD_SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub policy_reload_secs: u64,
}

impl WatchArgs {
    /// Get policy reload interval as Duration.
    pub fn policy_reload_interval(&self) -> Duration {
        Duration::from_secs(self.policy_reload_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_evaluate() {
        let config = Config::try_parse_from([
            "govrisk",
            "evaluate",
            "--rules",
            "enterprise.yaml,brand.yaml",
            "--telemetry",
            "atoms.jsonl",
            "--region",
            "EU",
            "--pretty",
        ])
        .unwrap();

        assert!(config.pretty);
        match config.command {
            Command::Evaluate(args) => {
                assert_eq!(args.rule_sets.rules.len(), 2);
                assert_eq!(args.telemetry, Some(PathBuf::from("atoms.jsonl")));
                let filter = args.filter.to_filter();
                assert_eq!(filter.region.as_deref(), Some("EU"));
                assert!(filter.tool_id.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_score_since() {
        let config = Config::try_parse_from([
            "govrisk",
            "score",
            "--telemetry",
            "atoms.json",
            "--since",
            "2025-01-01T00:00:00Z",
        ])
        .unwrap();

        match config.command {
            Command::Score(args) => {
                let since = args.filter.to_filter().since.unwrap();
                assert_eq!(since.to_rfc3339(), "2025-01-01T00:00:00+00:00");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_watch_interval() {
        let config = Config::try_parse_from([
            "govrisk",
            "watch",
            "--rules",
            "a.yaml",
            "--policy-reload-secs",
            "60",
        ])
        .unwrap();

        match config.command {
            Command::Watch(args) => {
                assert_eq!(args.policy_reload_interval(), Duration::from_secs(60));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_watch_interval_rejects_zero() {
        let result = Config::try_parse_from([
            "govrisk",
            "watch",
            "--rules",
            "a.yaml",
            "--policy-reload-secs",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rules_required() {
        assert!(Config::try_parse_from(["govrisk", "harmonize"]).is_err());
    }
}
