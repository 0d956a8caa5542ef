//! Finding types for security analysis
//!
//! Core types for findings, taint flow tracking, and cross-file issues.

use serde::{Deserialize, Serialize};

/// Finding severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Severity {
    /// Fixed severity-to-score table used by every producer of findings
    pub fn base_score(&self) -> f64 {
        match self {
            Severity::Critical => 9.0,
            Severity::High => 7.5,
            Severity::Medium => 5.0,
            Severity::Low => 2.5,
        }
    }

    /// Parse a severity string; unknown values fall back to Medium
    pub fn parse_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Medium,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

/// A single reported vulnerability occurrence at a specific line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    /// Opaque file identifier supplied by the caller (e.g. a URI)
    pub file: String,
    /// 1-based line number, always within the source file's line count
    pub line: u32,
    pub message: String,
    pub severity: Severity,
    pub category: String,
    /// Standard weakness identifier (e.g. "CWE-89")
    pub cwe_id: String,
    pub remediation: String,
    /// 0.0-10.0, derived from severity
    pub score: f64,
    /// The offending source line, trimmed
    pub snippet: String,
}

impl Finding {
    /// Identity used for caching and cross-source deduplication
    pub fn dedup_key(&self) -> (&str, u32, &str) {
        (&self.file, self.line, &self.category)
    }
}

/// Kind of untrusted-input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    UserInput,
    External,
    File,
    Network,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::UserInput => write!(f, "user-input"),
            SourceKind::External => write!(f, "external"),
            SourceKind::File => write!(f, "file"),
            SourceKind::Network => write!(f, "network"),
        }
    }
}

/// Family of dangerous operations that consume tainted data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Sql,
    Command,
    Eval,
    File,
    Xss,
}

impl SinkKind {
    /// Category string shared with the rule catalog vocabulary
    pub fn category(&self) -> &'static str {
        match self {
            SinkKind::Sql => "SQL Injection",
            SinkKind::Command => "Command Injection",
            SinkKind::Eval => "Code Injection",
            SinkKind::File => "Path Traversal",
            SinkKind::Xss => "Cross-Site Scripting",
        }
    }
}

impl std::fmt::Display for SinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkKind::Sql => write!(f, "sql"),
            SinkKind::Command => write!(f, "command"),
            SinkKind::Eval => write!(f, "eval"),
            SinkKind::File => write!(f, "file"),
            SinkKind::Xss => write!(f, "xss"),
        }
    }
}

/// How taint moved at one step of a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlowOperation {
    Assignment,
    FunctionCall,
    Concatenation,
    Interpolation,
}

/// One step in a taint flow trail, chronological by line number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowStep {
    pub line: u32,
    pub operation: FlowOperation,
    /// Set only on the final step of a source-to-sink flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink: Option<SinkKind>,
}

/// Untrusted data reaching a dangerous operation within one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaintVulnerability {
    /// Variable name carrying the taint at the sink
    pub variable: String,
    pub source: SourceKind,
    pub sink: SinkKind,
    /// Line of the sink
    pub line: u32,
    pub severity: Severity,
    pub message: String,
    /// Source-to-sink trail, ordered by line as scanned top-to-bottom
    pub flow: Vec<FlowStep>,
}

/// Class of issue detected by the cross-file analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossFileIssueKind {
    InsecureExportUsage,
    ExposedApiRoute,
    CircularDependency,
}

impl CrossFileIssueKind {
    pub fn category(&self) -> &'static str {
        match self {
            CrossFileIssueKind::InsecureExportUsage => "Insecure Export Usage",
            CrossFileIssueKind::ExposedApiRoute => "Exposed Vulnerable API",
            CrossFileIssueKind::CircularDependency => "Circular Dependency",
        }
    }
}

/// A finding produced by whole-workspace module-graph analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossFileVulnerability {
    pub kind: CrossFileIssueKind,
    /// File where the issue surfaces (the importer, or a cycle member)
    pub source_file: String,
    /// Module on the other end of the edge, when one exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_file: Option<String>,
    /// Imported symbol, for insecure-export-usage findings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Member files of the cycle, for circular-dependency findings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cycle: Vec<String>,
    pub line: u32,
    pub severity: Severity,
    pub message: String,
}
