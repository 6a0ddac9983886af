use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use serde::Serialize;
use tokio::signal;
use tracing::{info, warn};

use govrisk::config::{Command, Config, EvaluateArgs, RuleSetArgs, ScoreArgs, WatchArgs};
use govrisk::engine::{evaluate, harmonize_all, risk_profile};
use govrisk::observability::{init_tracing, MetricsRegistry};
use govrisk::policy::{load_telemetry, PolicyLoader, PolicyWatcher, RuleSetDocument};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Initialize tracing
    init_tracing(&config.log_level, config.log_json);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting govrisk");

    let metrics = Arc::new(MetricsRegistry::new());

    match &config.command {
        Command::Harmonize(args) => run_harmonize(&config, args, &metrics)?,
        Command::Score(args) => run_score(&config, args, &metrics)?,
        Command::Evaluate(args) => run_evaluate(&config, args, &metrics)?,
        Command::Watch(args) => run_watch(args, metrics.clone()).await?,
    }

    Ok(())
}

fn print_json<T: Serialize>(config: &Config, value: &T) -> anyhow::Result<()> {
    let out = if config.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

fn load_rule_sets(args: &RuleSetArgs) -> anyhow::Result<Vec<RuleSetDocument>> {
    let docs = PolicyLoader::new(args.rules.clone())
        .load_rule_sets()
        .context("Failed to load rule sets")?;

    for doc in &docs {
        info!(set_id = %doc.set_id, rules = doc.rules.len(), "Loaded rule set");
    }

    Ok(docs)
}

fn run_harmonize(
    config: &Config,
    args: &RuleSetArgs,
    metrics: &MetricsRegistry,
) -> anyhow::Result<()> {
    let docs = load_rule_sets(args)?;
    let sets: Vec<&[_]> = docs.iter().map(|d| d.rules.as_slice()).collect();

    let result = harmonize_all(&sets);
    metrics.record_harmonization(&result);

    if result.has_conflicts() {
        warn!(conflicts = result.conflicts.len(), "Harmonization overrode less strict rules");
    }

    print_json(config, &result)
}

fn run_score(config: &Config, args: &ScoreArgs, metrics: &MetricsRegistry) -> anyhow::Result<()> {
    let atoms = load_telemetry(&args.telemetry)
        .with_context(|| format!("Failed to load telemetry from {}", args.telemetry.display()))?;

    let profile = risk_profile(&atoms, &args.filter.to_filter());
    metrics.record_risk_score();

    info!(
        atoms = atoms.len(),
        sample_size = profile.sample_size,
        score = profile.score,
        "Risk scored"
    );

    print_json(config, &profile)
}

fn run_evaluate(
    config: &Config,
    args: &EvaluateArgs,
    metrics: &MetricsRegistry,
) -> anyhow::Result<()> {
    let docs = load_rule_sets(&args.rule_sets)?;
    let sets: Vec<&[_]> = docs.iter().map(|d| d.rules.as_slice()).collect();

    let atoms = match &args.telemetry {
        Some(path) => load_telemetry(path)
            .with_context(|| format!("Failed to load telemetry from {}", path.display()))?,
        None => Vec::new(),
    };

    let outcome = evaluate(&sets, &atoms, &args.filter.to_filter());
    metrics.record_outcome(&outcome);

    print_json(config, &outcome)
}

async fn run_watch(args: &WatchArgs, metrics: Arc<MetricsRegistry>) -> anyhow::Result<()> {
    let loader = PolicyLoader::new(args.rule_sets.rules.clone());

    let watcher = PolicyWatcher::new(loader, args.policy_reload_interval(), metrics.clone());
    let (mut snapshot_rx, policy_handle) = watcher.start();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        {
            let snapshot = snapshot_rx.borrow_and_update();
            info!(
                snapshot_id = %snapshot.snapshot_id,
                version = %snapshot.version,
                rules = snapshot.rules.len(),
                conflicts = snapshot.conflicts.len(),
                "Effective policy snapshot"
            );
            for conflict in &snapshot.conflicts {
                warn!(
                    overridden = %conflict.rule_a,
                    selected = %conflict.rule_b,
                    detail = %conflict.detail,
                    "Policy conflict"
                );
            }
        }

        tokio::select! {
            changed = snapshot_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = &mut shutdown => break,
        }
    }

    // Cleanup
    info!("Shutting down...");
    policy_handle.abort();

    eprint!("{}", metrics.to_prometheus());

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
