use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::domain::{PolicyRule, TelemetryAtom};

/// Deepest condition tree accepted from a rule-set document.
pub const MAX_CONDITION_DEPTH: usize = 32;

/// Errors that can occur during policy loading.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Rule set published by one governing party.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSetDocument {
    /// Governing party that owns the set (e.g. "enterprise", "partner")
    pub set_id: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Load a rule set from a YAML or JSON file (chosen by extension).
pub fn load_rule_set(path: impl AsRef<Path>) -> Result<RuleSetDocument, PolicyError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let doc: RuleSetDocument = if is_json(path) {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    validate_rule_set(&doc)?;

    Ok(doc)
}

/// Load telemetry atoms from a file.
///
/// Accepts a JSON array or JSON lines (one atom per line, blank lines and
/// `#` comments skipped).
pub fn load_telemetry(path: impl AsRef<Path>) -> Result<Vec<TelemetryAtom>, PolicyError> {
    let content = fs::read_to_string(path)?;

    if content.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(&content)?);
    }

    let mut atoms = Vec::new();
    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        atoms.push(serde_json::from_str(line)?);
    }

    Ok(atoms)
}

/// Validate a rule-set document before it reaches the harmonizer.
fn validate_rule_set(doc: &RuleSetDocument) -> Result<(), PolicyError> {
    if doc.set_id.trim().is_empty() {
        return Err(PolicyError::Validation(
            "Rule set id cannot be empty".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    for rule in &doc.rules {
        validate_rule(rule)?;

        // Duplicates are tolerated; the harmonizer groups them like any other rule
        if !seen_ids.insert(&rule.rule_id) {
            warn!(set_id = %doc.set_id, rule_id = %rule.rule_id, "Duplicate rule ID in rule set");
        }
    }

    Ok(())
}

fn validate_rule(rule: &PolicyRule) -> Result<(), PolicyError> {
    if rule.rule_id.trim().is_empty() {
        return Err(PolicyError::Validation("Rule ID cannot be empty".to_string()));
    }

    if rule.name.trim().is_empty() {
        return Err(PolicyError::Validation(format!(
            "Rule {} has an empty name",
            rule.rule_id
        )));
    }

    if rule.context_id.trim().is_empty() {
        return Err(PolicyError::Validation(format!(
            "Rule {} has an empty context_id",
            rule.rule_id
        )));
    }

    let depth = rule.conditions.depth();
    if depth > MAX_CONDITION_DEPTH {
        return Err(PolicyError::Validation(format!(
            "Rule {} condition tree depth {} exceeds {}",
            rule.rule_id, depth, MAX_CONDITION_DEPTH
        )));
    }

    if rule.conditions.has_empty_node() {
        return Err(PolicyError::Validation(format!(
            "Rule {} has an empty AND/OR node",
            rule.rule_id
        )));
    }

    Ok(())
}

/// Loader for the rule sets of all governing parties plus optional telemetry.
#[derive(Debug, Clone)]
pub struct PolicyLoader {
    rule_set_paths: Vec<PathBuf>,
    telemetry_path: Option<PathBuf>,
}

impl PolicyLoader {
    /// Create a new loader over rule-set files, in precedence-free order.
    pub fn new(rule_set_paths: Vec<PathBuf>) -> Self {
        PolicyLoader {
            rule_set_paths,
            telemetry_path: None,
        }
    }

    /// Also load telemetry from the given file.
    pub fn with_telemetry(mut self, path: impl Into<PathBuf>) -> Self {
        self.telemetry_path = Some(path.into());
        self
    }

    /// Load every rule set, failing on the first invalid one.
    pub fn load_rule_sets(&self) -> Result<Vec<RuleSetDocument>, PolicyError> {
        self.rule_set_paths.iter().map(load_rule_set).collect()
    }

    /// Load telemetry, or nothing if no telemetry file is configured.
    pub fn load_telemetry(&self) -> Result<Vec<TelemetryAtom>, PolicyError> {
        match &self.telemetry_path {
            Some(path) => load_telemetry(path),
            None => Ok(Vec::new()),
        }
    }

    pub fn rule_set_paths(&self) -> &[PathBuf] {
        &self.rule_set_paths
    }

    pub fn telemetry_path(&self) -> Option<&Path> {
        self.telemetry_path.as_deref()
    }
}
