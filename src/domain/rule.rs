//! Detection rule types
//!
//! A rule pairs a compiled text pattern with the finding template emitted
//! on a match. The built-in set is fixed at build time; rule files may
//! append entries but never mutate or reorder the built-in table.

use regex::Regex;
use serde::Deserialize;

use super::finding::Severity;

/// A single detection rule: pattern plus finding template
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    /// Compiled once at catalog construction; match iterators are created
    /// fresh per scan, never shared across calls
    pub pattern: Regex,
    pub message: String,
    pub severity: Severity,
    pub category: String,
    /// Standard weakness identifier (e.g. "CWE-89")
    pub cwe_id: String,
    pub remediation: String,
}

impl Rule {
    pub fn new(
        id: &str,
        pattern: &str,
        message: &str,
        severity: Severity,
        category: &str,
        cwe_id: &str,
        remediation: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            // Built-in patterns are fixed and reviewed; a failure here is a
            // programming error caught by the catalog tests.
            pattern: Regex::new(pattern).expect("built-in rule pattern must compile"),
            message: message.to_string(),
            severity,
            category: category.to_string(),
            cwe_id: cwe_id.to_string(),
            remediation: remediation.to_string(),
        }
    }
}

/// Serialized shape of one rule in a user-supplied rule file
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    pub id: String,
    pub pattern: String,
    pub message: String,
    #[serde(default)]
    pub severity: Option<String>,
    pub category: String,
    pub cwe_id: String,
    #[serde(default)]
    pub remediation: Option<String>,
}

/// Top-level shape of a TOML/JSON rule file
#[derive(Debug, Clone, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}
