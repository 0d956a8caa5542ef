//! Standards classification types
//!
//! Maps rule-catalog categories onto CWE identifiers and OWASP Top 10
//! risk categories, and carries the aggregate compliance report shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::finding::Severity;

/// Static classification of one finding category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassificationEntry {
    pub cwe_id: &'static str,
    pub cwe_name: &'static str,
    pub owasp_id: &'static str,
    pub owasp_name: &'static str,
    pub severity: Severity,
}

/// Counts by severity for a finding set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeveritySummary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
}

/// One OWASP risk category's share of a finding set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwaspBreakdown {
    pub owasp_id: String,
    pub owasp_name: String,
    pub count: usize,
    pub percentage: f64,
}

/// One CWE's coverage within a finding set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CweCoverage {
    pub cwe_id: String,
    pub cwe_name: String,
    pub count: usize,
    pub severity: Severity,
}

/// Aggregate security posture for a finding set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub summary: SeveritySummary,
    /// Sorted descending by count; zero-count categories dropped
    pub owasp_breakdown: Vec<OwaspBreakdown>,
    /// Sorted descending by count
    pub cwe_coverage: Vec<CweCoverage>,
    pub recommendations: Vec<String>,
    /// 0-100 heuristic; the formula is fixed for compatibility with
    /// stored historical scores
    pub compliance_score: u32,
    pub generated_at: DateTime<Utc>,
}
