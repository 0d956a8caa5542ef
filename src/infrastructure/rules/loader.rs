//! Append-only rule file loading
//!
//! Rule files (TOML or JSON, dispatched by extension) let deployments add
//! detection signatures without code changes. Loaded rules are appended
//! after the built-in table and never reorder or replace it. Entries with
//! invalid patterns are skipped with a warning rather than failing the load.

use std::path::Path;

use regex::Regex;
use tracing::{info, warn};

use crate::domain::finding::Severity;
use crate::domain::rule::{Rule, RuleFile, RuleSpec};

/// Errors that can occur while loading a rule file
#[derive(Debug, thiserror::Error)]
pub enum RuleLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("Unsupported rule file format: {0}")]
    UnsupportedFormat(String),
}

/// Load user rules from a TOML or JSON file
pub fn load_rule_file<P: AsRef<Path>>(path: P) -> Result<Vec<Rule>, RuleLoadError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase());

    let file: RuleFile = match extension.as_deref() {
        Some("toml") => toml::from_str(&content)?,
        Some("json") => serde_json::from_str(&content)?,
        Some(ext) => {
            return Err(RuleLoadError::UnsupportedFormat(format!(
                "unsupported extension: .{}",
                ext
            )));
        }
        None => {
            return Err(RuleLoadError::UnsupportedFormat(
                "no file extension provided".to_string(),
            ));
        }
    };

    let mut rules = Vec::with_capacity(file.rules.len());
    for spec in file.rules {
        match compile_spec(spec) {
            Some(rule) => rules.push(rule),
            None => continue,
        }
    }

    info!(path = %path.display(), rule_count = rules.len(), "Loaded user rule file");
    Ok(rules)
}

fn compile_spec(spec: RuleSpec) -> Option<Rule> {
    let pattern = match Regex::new(&spec.pattern) {
        Ok(pattern) => pattern,
        Err(e) => {
            warn!(rule_id = %spec.id, error = %e, "Skipping rule with invalid pattern");
            return None;
        }
    };

    let severity = spec
        .severity
        .as_deref()
        .map(Severity::parse_lossy)
        .unwrap_or_default();

    Some(Rule {
        id: spec.id,
        pattern,
        message: spec.message,
        severity,
        category: spec.category,
        cwe_id: spec.cwe_id,
        remediation: spec.remediation.unwrap_or_default(),
    })
}
