//! Rule-based pattern scanner
//!
//! Runs the rule catalog against raw document text. Each rule is searched
//! globally over the full text (matches are located by absolute offset and
//! mapped back to 1-based lines), then filtered through the document
//! language's comment syntax. Scanning never fails: malformed content is
//! treated as best-effort text.

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::finding::Finding;
use crate::domain::language::Language;
use crate::infrastructure::rules::RuleCatalog;

/// Scan one document with the built-in catalog
pub fn scan_document(file: &str, text: &str, language: Language) -> Vec<Finding> {
    scan_document_with(RuleCatalog::builtin(), file, text, language)
}

/// Scan one document with an explicit catalog
#[instrument(skip(catalog, text), fields(rule_count = catalog.len()))]
pub fn scan_document_with(
    catalog: &RuleCatalog,
    file: &str,
    text: &str,
    language: Language,
) -> Vec<Finding> {
    let lines: Vec<&str> = text.lines().collect();
    let line_starts = compute_line_starts(text);
    let mut findings = Vec::new();

    for rule in catalog.all_rules() {
        // A fresh match iterator per rule per call; no scan state is ever
        // shared across invocations.
        for m in rule.pattern.find_iter(text) {
            let line_idx = line_index_of(&line_starts, m.start());
            let Some(line_text) = lines.get(line_idx) else {
                continue;
            };
            if language.line_is_comment(line_text) {
                continue;
            }

            findings.push(Finding {
                id: Uuid::new_v4().to_string(),
                file: file.to_string(),
                line: (line_idx + 1) as u32,
                message: rule.message.clone(),
                severity: rule.severity,
                category: rule.category.clone(),
                cwe_id: rule.cwe_id.clone(),
                remediation: rule.remediation.clone(),
                score: rule.severity.base_score(),
                snippet: line_text.trim().to_string(),
            });
        }
    }

    debug!(
        file,
        finding_count = findings.len(),
        line_count = lines.len(),
        "Pattern scan completed"
    );
    findings
}

/// Byte offsets where each line begins
fn compute_line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (idx, b) in text.bytes().enumerate() {
        if b == b'\n' {
            starts.push(idx + 1);
        }
    }
    starts
}

/// 0-based index of the line containing a byte offset
fn line_index_of(line_starts: &[usize], offset: usize) -> usize {
    line_starts.partition_point(|&start| start <= offset) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_map_to_lines() {
        let text = "first\nsecond\nthird";
        let starts = compute_line_starts(text);
        assert_eq!(line_index_of(&starts, 0), 0);
        assert_eq!(line_index_of(&starts, 5), 0); // the newline itself
        assert_eq!(line_index_of(&starts, 6), 1);
        assert_eq!(line_index_of(&starts, 13), 2);
    }

    #[test]
    fn commented_match_is_discarded() {
        let findings = scan_document("a.js", "// eval(x)", Language::JavaScript);
        assert!(findings.is_empty());
    }

    #[test]
    fn uncommented_match_is_reported_once() {
        let findings = scan_document("a.js", "eval(x)", Language::JavaScript);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, "Code Injection");
        assert_eq!(findings[0].line, 1);
        assert_eq!(findings[0].score, 9.0);
        assert_eq!(findings[0].snippet, "eval(x)");
    }

    #[test]
    fn plain_language_has_no_comment_filtering() {
        let findings = scan_document("notes.txt", "# eval(x)", Language::Plain);
        assert_eq!(findings.len(), 1);
    }
}
