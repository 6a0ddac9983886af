use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::engine::{harmonize_all, HarmonizeResult};
use crate::observability::MetricsRegistry;

use super::loader::{PolicyError, PolicyLoader, RuleSetDocument};
use super::snapshot::{compute_version, EffectiveSnapshot};

/// Shortest allowed reload interval; tokio intervals cannot be zero.
pub const MIN_CHECK_INTERVAL: Duration = Duration::from_millis(10);

/// Watch rule-set files and publish a new effective snapshot whenever the
/// harmonized content changes.
pub struct PolicyWatcher {
    loader: PolicyLoader,
    check_interval: Duration,
    metrics: Arc<MetricsRegistry>,
    last_version: Option<String>,
}

impl PolicyWatcher {
    /// Create a new policy watcher. Intervals below [`MIN_CHECK_INTERVAL`]
    /// are raised to it.
    pub fn new(loader: PolicyLoader, check_interval: Duration, metrics: Arc<MetricsRegistry>) -> Self {
        if check_interval < MIN_CHECK_INTERVAL {
            warn!(
                requested = ?check_interval,
                using = ?MIN_CHECK_INTERVAL,
                "Policy reload interval too short"
            );
        }

        PolicyWatcher {
            loader,
            check_interval: check_interval.max(MIN_CHECK_INTERVAL),
            metrics,
            last_version: None,
        }
    }

    /// Start watching for policy changes.
    ///
    /// Returns a receiver holding the current snapshot; it is updated each
    /// time the harmonized rules change. A failed initial load publishes an
    /// empty snapshot.
    pub fn start(
        mut self,
    ) -> (
        watch::Receiver<Arc<EffectiveSnapshot>>,
        tokio::task::JoinHandle<()>,
    ) {
        let initial = match self.load_harmonized() {
            Ok((docs, harmonized)) => {
                let snapshot = self.snapshot(&docs, harmonized);
                self.last_version = Some(snapshot.version.clone());
                info!(
                    version = %snapshot.version,
                    rules = snapshot.rules.len(),
                    conflicts = snapshot.conflicts.len(),
                    "Loaded initial effective policy"
                );
                Arc::new(snapshot)
            }
            Err(e) => {
                error!(error = %e, "Failed to load initial policy");
                Arc::new(EffectiveSnapshot::empty())
            }
        };

        let (tx, rx) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            let mut interval = interval(self.check_interval);
            // First tick completes immediately and the initial load already ran
            interval.tick().await;

            loop {
                interval.tick().await;

                match self.check_for_updates(&tx) {
                    Ok(true) => info!("Effective policy reloaded"),
                    Ok(false) => {}
                    Err(e) => warn!(error = %e, "Error checking for policy updates"),
                }
            }
        });

        (rx, handle)
    }

    /// Load and harmonize all rule sets.
    fn load_harmonized(&self) -> Result<(Vec<RuleSetDocument>, HarmonizeResult), PolicyError> {
        let docs = self.loader.load_rule_sets()?;
        let sets: Vec<&[_]> = docs.iter().map(|d| d.rules.as_slice()).collect();
        let harmonized = harmonize_all(&sets);
        Ok((docs, harmonized))
    }

    /// Turn a harmonization into a published snapshot. Only published
    /// harmonizations are counted.
    fn snapshot(&self, docs: &[RuleSetDocument], harmonized: HarmonizeResult) -> EffectiveSnapshot {
        self.metrics.record_harmonization(&harmonized);
        EffectiveSnapshot::from_harmonized(docs, harmonized)
    }

    /// Reload the rule sets and publish a snapshot if the version changed.
    fn check_for_updates(
        &mut self,
        tx: &watch::Sender<Arc<EffectiveSnapshot>>,
    ) -> Result<bool, PolicyError> {
        let (docs, harmonized) = match self.load_harmonized() {
            Ok(loaded) => loaded,
            Err(e) => {
                self.metrics.record_policy_reload(false);
                return Err(e);
            }
        };

        let version = compute_version(&harmonized.combined);
        if self.last_version.as_ref() == Some(&version) {
            return Ok(false);
        }

        let snapshot = self.snapshot(&docs, harmonized);
        info!(
            previous = ?self.last_version,
            version = %snapshot.version,
            conflicts = snapshot.conflicts.len(),
            "Effective policy version changed"
        );

        self.last_version = Some(snapshot.version.clone());
        self.metrics.record_policy_reload(true);
        let _ = tx.send(Arc::new(snapshot));

        Ok(true)
    }
}
