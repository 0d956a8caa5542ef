//! Classification and compliance reporting
//!
//! Attaches CWE / OWASP identifiers to finding categories and aggregates a
//! finding set into a compliance summary. The classification table is the
//! single severity/score authority; other components request entries here
//! instead of keeping their own copies.

use std::collections::HashMap;

use chrono::Utc;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::domain::classification::{
    ClassificationEntry, ClassificationReport, CweCoverage, OwaspBreakdown, SeveritySummary,
};
use crate::domain::finding::{Finding, Severity};

/// Pseudo-bucket for categories missing from the table. Classification
/// never errors; unknown categories degrade to this medium bucket.
const UNCLASSIFIED_OWASP_ID: &str = "A00";
const UNCLASSIFIED_OWASP_NAME: &str = "Unclassified";

static CLASSIFICATION_TABLE: Lazy<HashMap<&'static str, ClassificationEntry>> = Lazy::new(|| {
    let mut table = HashMap::new();
    let mut add = |category: &'static str, entry: ClassificationEntry| {
        let previous = table.insert(category, entry);
        debug_assert!(previous.is_none(), "duplicate classification category");
    };

    add("SQL Injection", entry("CWE-89", "SQL Injection", "A03:2021", "Injection", Severity::Critical));
    add("NoSQL Injection", entry("CWE-943", "Improper Neutralization of Special Elements in Data Query Logic", "A03:2021", "Injection", Severity::High));
    add("Command Injection", entry("CWE-78", "OS Command Injection", "A03:2021", "Injection", Severity::Critical));
    add("Code Injection", entry("CWE-94", "Improper Control of Generation of Code", "A03:2021", "Injection", Severity::Critical));
    add("Cross-Site Scripting", entry("CWE-79", "Cross-site Scripting", "A03:2021", "Injection", Severity::High));
    add("Hardcoded Credentials", entry("CWE-798", "Use of Hard-coded Credentials", "A07:2021", "Identification and Authentication Failures", Severity::Critical));
    add("Weak Cryptography", entry("CWE-327", "Use of a Broken or Risky Cryptographic Algorithm", "A02:2021", "Cryptographic Failures", Severity::High));
    add("Insecure Randomness", entry("CWE-330", "Use of Insufficiently Random Values", "A02:2021", "Cryptographic Failures", Severity::Medium));
    add("Insecure Transport", entry("CWE-319", "Cleartext Transmission of Sensitive Information", "A02:2021", "Cryptographic Failures", Severity::Medium));
    add("Path Traversal", entry("CWE-22", "Path Traversal", "A01:2021", "Broken Access Control", Severity::High));
    add("Insecure Deserialization", entry("CWE-502", "Deserialization of Untrusted Data", "A08:2021", "Software and Data Integrity Failures", Severity::High));
    add("Open Redirect", entry("CWE-601", "URL Redirection to Untrusted Site", "A01:2021", "Broken Access Control", Severity::Medium));
    add("Permissive CORS", entry("CWE-942", "Permissive Cross-domain Policy", "A05:2021", "Security Misconfiguration", Severity::Medium));
    add("Debug Exposure", entry("CWE-489", "Active Debug Code", "A05:2021", "Security Misconfiguration", Severity::Medium));
    add("XML External Entities", entry("CWE-611", "Improper Restriction of XML External Entity Reference", "A05:2021", "Security Misconfiguration", Severity::High));
    add("Insecure Export Usage", entry("CWE-829", "Inclusion of Functionality from Untrusted Control Sphere", "A08:2021", "Software and Data Integrity Failures", Severity::High));
    add("Exposed Vulnerable API", entry("CWE-668", "Exposure of Resource to Wrong Sphere", "A01:2021", "Broken Access Control", Severity::High));
    add("Circular Dependency", entry("CWE-1047", "Modules with Circular Dependencies", "A04:2021", "Insecure Design", Severity::Medium));

    table
});

fn entry(
    cwe_id: &'static str,
    cwe_name: &'static str,
    owasp_id: &'static str,
    owasp_name: &'static str,
    severity: Severity,
) -> ClassificationEntry {
    ClassificationEntry {
        cwe_id,
        cwe_name,
        owasp_id,
        owasp_name,
        severity,
    }
}

/// Look up the classification for a finding category
pub fn classify_category(category: &str) -> Option<&'static ClassificationEntry> {
    CLASSIFICATION_TABLE.get(category)
}

/// Build the aggregate compliance report for a finding set
pub fn build_report(findings: &[Finding]) -> ClassificationReport {
    let summary = summarize(findings);
    let owasp_breakdown = owasp_breakdown(findings);
    let cwe_coverage = cwe_coverage(findings);
    let recommendations = recommendations(findings, &summary);
    let compliance_score = compliance_score(&summary, owasp_breakdown.len());

    debug!(
        total = summary.total,
        compliance_score, "Classification report built"
    );

    ClassificationReport {
        summary,
        owasp_breakdown,
        cwe_coverage,
        recommendations,
        compliance_score,
        generated_at: Utc::now(),
    }
}

fn summarize(findings: &[Finding]) -> SeveritySummary {
    let mut summary = SeveritySummary::default();
    for finding in findings {
        match finding.severity {
            Severity::Critical => summary.critical += 1,
            Severity::High => summary.high += 1,
            Severity::Medium => summary.medium += 1,
            Severity::Low => summary.low += 1,
        }
    }
    summary.total = findings.len();
    summary
}

fn owasp_breakdown(findings: &[Finding]) -> Vec<OwaspBreakdown> {
    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
    for finding in findings {
        let key = match classify_category(&finding.category) {
            Some(entry) => (entry.owasp_id, entry.owasp_name),
            None => (UNCLASSIFIED_OWASP_ID, UNCLASSIFIED_OWASP_NAME),
        };
        *counts.entry(key).or_default() += 1;
    }

    let total = findings.len();
    let mut breakdown: Vec<OwaspBreakdown> = counts
        .into_iter()
        .map(|((id, name), count)| OwaspBreakdown {
            owasp_id: id.to_string(),
            owasp_name: name.to_string(),
            count,
            percentage: (count as f64 / total as f64) * 100.0,
        })
        .collect();
    breakdown.sort_by(|a, b| b.count.cmp(&a.count).then(a.owasp_id.cmp(&b.owasp_id)));
    breakdown
}

fn cwe_coverage(findings: &[Finding]) -> Vec<CweCoverage> {
    let mut counts: HashMap<String, CweCoverage> = HashMap::new();
    for finding in findings {
        let (cwe_id, cwe_name, severity) = match classify_category(&finding.category) {
            Some(entry) => (entry.cwe_id.to_string(), entry.cwe_name.to_string(), entry.severity),
            // Pass the finding's own identifier through; unknown categories
            // land in the default medium bucket.
            None => (finding.cwe_id.clone(), finding.category.clone(), Severity::Medium),
        };
        counts
            .entry(cwe_id.clone())
            .or_insert(CweCoverage {
                cwe_id,
                cwe_name,
                count: 0,
                severity,
            })
            .count += 1;
    }

    let mut coverage: Vec<CweCoverage> = counts.into_values().collect();
    coverage.sort_by(|a, b| b.count.cmp(&a.count).then(a.cwe_id.cmp(&b.cwe_id)));
    coverage
}

fn recommendations(findings: &[Finding], summary: &SeveritySummary) -> Vec<String> {
    let has_category = |names: &[&str]| {
        findings
            .iter()
            .any(|f| names.contains(&f.category.as_str()))
    };
    let mut notes = Vec::new();

    if has_category(&["SQL Injection", "NoSQL Injection", "Command Injection", "Code Injection"]) {
        notes.push(
            "Use parameterized queries and avoid constructing commands or code from user input."
                .to_string(),
        );
    }
    if has_category(&["Cross-Site Scripting"]) {
        notes.push(
            "Apply context-aware output encoding and sanitize HTML before rendering.".to_string(),
        );
    }
    if has_category(&["Hardcoded Credentials"]) {
        notes.push(
            "Move secrets to environment configuration or a secret manager and rotate exposed values."
                .to_string(),
        );
    }
    if has_category(&["Weak Cryptography", "Insecure Randomness"]) {
        notes.push(
            "Replace weak algorithms with modern primitives (SHA-256+, AES-GCM, CSPRNG).".to_string(),
        );
    }
    if has_category(&["Insecure Deserialization"]) {
        notes.push("Deserialize only data-only formats or use safe loaders.".to_string());
    }
    if summary.critical > 0 {
        notes.push("Critical findings present: address them immediately.".to_string());
    }
    if summary.high > 5 {
        notes.push("More than five high-severity findings: prioritize remediation.".to_string());
    }

    notes
}

/// Fixed scoring formula; reproduced exactly for compatibility with
/// stored historical scores.
fn compliance_score(summary: &SeveritySummary, distinct_owasp_categories: usize) -> u32 {
    let mut score: i64 = 100;
    score -= 15 * summary.critical as i64;
    score -= 8 * summary.high as i64;
    score -= 3 * summary.medium as i64;
    score -= summary.low as i64;
    if distinct_owasp_categories <= 2 {
        score += 10;
    }
    score.clamp(0, 100) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn finding(category: &str, severity: Severity) -> Finding {
        let cwe_id = classify_category(category)
            .map(|e| e.cwe_id.to_string())
            .unwrap_or_else(|| "CWE-0".to_string());
        Finding {
            id: Uuid::new_v4().to_string(),
            file: "a.js".to_string(),
            line: 1,
            message: "m".to_string(),
            severity,
            category: category.to_string(),
            cwe_id,
            remediation: String::new(),
            score: severity.base_score(),
            snippet: String::new(),
        }
    }

    #[test]
    fn empty_set_scores_one_hundred() {
        let report = build_report(&[]);
        assert_eq!(report.compliance_score, 100);
        assert_eq!(report.summary.total, 0);
        assert_eq!(report.summary.critical, 0);
        assert!(report.owasp_breakdown.is_empty());
    }

    #[test]
    fn one_critical_one_high_scores_per_formula() {
        let findings = vec![
            finding("SQL Injection", Severity::Critical),
            finding("Cross-Site Scripting", Severity::High),
        ];
        let report = build_report(&findings);
        // Both categories map to A03:2021, so the <=2-category bonus applies.
        assert_eq!(report.compliance_score, 100 - 15 - 8 + 10);
    }

    #[test]
    fn score_clamps_to_zero() {
        let findings: Vec<Finding> = (0..10)
            .map(|_| finding("SQL Injection", Severity::Critical))
            .collect();
        let report = build_report(&findings);
        assert_eq!(report.compliance_score, 0);
    }

    #[test]
    fn unknown_category_never_errors() {
        let findings = vec![finding("Quantum Entanglement Leak", Severity::Medium)];
        let report = build_report(&findings);
        assert_eq!(report.summary.total, 1);
        assert_eq!(report.owasp_breakdown[0].owasp_id, "A00");
        assert_eq!(report.cwe_coverage[0].severity, Severity::Medium);
    }

    #[test]
    fn breakdown_sorted_by_count_with_percentages() {
        let findings = vec![
            finding("SQL Injection", Severity::Critical),
            finding("Code Injection", Severity::Critical),
            finding("Debug Exposure", Severity::Medium),
            finding("Cross-Site Scripting", Severity::High),
        ];
        let report = build_report(&findings);
        assert_eq!(report.owasp_breakdown[0].owasp_id, "A03:2021");
        assert_eq!(report.owasp_breakdown[0].count, 3);
        assert!((report.owasp_breakdown[0].percentage - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn recommendations_are_gated_on_categories() {
        let report = build_report(&[finding("SQL Injection", Severity::Critical)]);
        assert!(report.recommendations.iter().any(|r| r.contains("parameterized")));
        assert!(report.recommendations.iter().any(|r| r.contains("immediately")));

        let report = build_report(&[finding("Debug Exposure", Severity::Medium)]);
        assert!(!report.recommendations.iter().any(|r| r.contains("parameterized")));
    }

    #[test]
    fn more_than_five_high_triggers_prioritize_note() {
        let findings: Vec<Finding> = (0..6)
            .map(|_| finding("Cross-Site Scripting", Severity::High))
            .collect();
        let report = build_report(&findings);
        assert!(report.recommendations.iter().any(|r| r.contains("prioritize")));
    }
}
