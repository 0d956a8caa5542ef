//! Integration tests for the workspace scan use case and reporting

use async_trait::async_trait;
use vigil::{
    merge_findings, AnalyzeFileUseCase, AnalyzeWorkspaceUseCase, EngineConfig, ExternalAnalysis,
    ExternalAnalysisError, Finding, Severity,
};

fn workspace(files: &[(&str, &str)]) -> Vec<(String, String)> {
    files
        .iter()
        .map(|(p, c)| (p.to_string(), c.to_string()))
        .collect()
}

#[tokio::test]
async fn workspace_scan_combines_all_analyzers() {
    let files = workspace(&[
        (
            "src/db.js",
            "export function runQuery(q) {\n  return connection.query(q);\n}\n",
        ),
        (
            "src/api/users.js",
            "import { runQuery } from '../db';\nconst id = req.query.id;\nrunQuery('SELECT * FROM users WHERE id = ' + id);\n",
        ),
    ]);

    let result = AnalyzeWorkspaceUseCase::new().execute(files).await;

    assert_eq!(result.stats.files_scanned, 2);
    assert_eq!(result.stats.files_cached, 0);
    assert_eq!(result.stats.finding_count, result.findings.len());
    // pattern scan catches the SQL concatenation
    assert!(result
        .findings
        .iter()
        .any(|f| f.category == "SQL Injection"));
    // graph pass catches the vulnerable import in an api directory
    assert!(result
        .findings
        .iter()
        .any(|f| f.category == "Insecure Export Usage"));
    assert!(result
        .findings
        .iter()
        .any(|f| f.category == "Exposed Vulnerable API"));
    assert!(result.report.compliance_score < 100);
}

#[tokio::test]
async fn findings_are_sorted_by_file_then_line() {
    let files = workspace(&[
        ("b.js", "eval(x);\nconst password = \"hunter2secret\";\n"),
        ("a.js", "document.write(data);\n"),
    ]);

    let result = AnalyzeWorkspaceUseCase::new().execute(files).await;
    let keys: Vec<(String, u32)> = result
        .findings
        .iter()
        .map(|f| (f.file.clone(), f.line))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(result.findings[0].file, "a.js");
}

#[tokio::test]
async fn rescanning_unchanged_files_hits_the_cache() {
    let files = workspace(&[
        ("a.js", "eval(x);\n"),
        ("b.js", "document.write(data);\n"),
    ]);

    let use_case = AnalyzeWorkspaceUseCase::new();
    let first = use_case.execute(files.clone()).await;
    assert_eq!(first.stats.files_cached, 0);

    let second = use_case.execute(files).await;
    assert_eq!(second.stats.files_cached, 2);
    assert_eq!(second.stats.finding_count, first.stats.finding_count);
}

#[tokio::test]
async fn empty_workspace_scores_full_compliance() {
    let result = AnalyzeWorkspaceUseCase::new().execute(Vec::new()).await;
    assert!(result.findings.is_empty());
    assert_eq!(result.report.compliance_score, 100);
    assert_eq!(result.stats.files_scanned, 0);
}

#[tokio::test]
async fn unknown_extensions_fall_back_to_plain_scanning() {
    // No comment filtering for unknown file types, so the match is kept.
    let files = workspace(&[("notes.cfg", "password = \"topsecretvalue\"\n")]);
    let result = AnalyzeWorkspaceUseCase::new().execute(files).await;
    assert!(result
        .findings
        .iter()
        .any(|f| f.category == "Hardcoded Credentials"));
}

#[tokio::test]
async fn concurrency_limit_of_one_still_scans_everything() {
    let config = EngineConfig {
        max_concurrent_files: 1,
        ..EngineConfig::default()
    };
    let files: Vec<(String, String)> = (0..12)
        .map(|i| (format!("f{i}.js"), "eval(payload);".to_string()))
        .collect();

    let result = AnalyzeWorkspaceUseCase::with_config(&config).execute(files).await;
    assert_eq!(result.stats.files_scanned, 12);
    assert_eq!(
        result
            .findings
            .iter()
            .filter(|f| f.category == "Code Injection")
            .count(),
        12
    );
}

#[test]
fn sql_concatenation_classifies_end_to_end() {
    let engine = AnalyzeFileUseCase::new();
    let text = "const sql = 'SELECT * FROM users WHERE id = ' + userId; db.query(sql);\n";
    let findings = engine.execute("app.js", text, "javascript");

    let sql: Vec<_> = findings
        .iter()
        .filter(|f| f.category == "SQL Injection")
        .collect();
    assert!(!sql.is_empty());
    assert!(sql.iter().all(|f| f.cwe_id == "CWE-89"));
}

struct StubAnalyzer {
    findings: Vec<Finding>,
    fail: bool,
}

#[async_trait]
impl ExternalAnalysis for StubAnalyzer {
    async fn analyze(
        &self,
        _file: &str,
        _text: &str,
    ) -> Result<Vec<Finding>, ExternalAnalysisError> {
        if self.fail {
            return Err(ExternalAnalysisError::Unavailable("offline".to_string()));
        }
        Ok(self.findings.clone())
    }
}

fn external_finding(file: &str, line: u32, category: &str) -> Finding {
    Finding {
        id: "ext-1".to_string(),
        file: file.to_string(),
        line,
        message: "reported by external analyzer".to_string(),
        severity: Severity::Medium,
        category: category.to_string(),
        cwe_id: "CWE-89".to_string(),
        remediation: String::new(),
        score: 5.0,
        snippet: String::new(),
    }
}

#[tokio::test]
async fn external_findings_merge_without_duplicates() {
    let engine = AnalyzeFileUseCase::new();
    let text = "db.query('SELECT * FROM t WHERE id = ' + id);\n";
    let local = engine.execute("app.js", text, "javascript");
    assert!(!local.is_empty());
    let local_line = local[0].line;
    let local_count = local.len();

    let stub = StubAnalyzer {
        findings: vec![
            external_finding("app.js", local_line, "SQL Injection"),
            external_finding("app.js", 99, "SQL Injection"),
        ],
        fail: false,
    };
    let external = stub.analyze("app.js", text).await.unwrap();
    let merged = merge_findings(local, external);

    // collision with the local finding dropped, novel one appended
    assert_eq!(merged.len(), local_count + 1);
    assert!(merged.iter().any(|f| f.line == 99));
    assert!(merged
        .iter()
        .filter(|f| f.line == local_line && f.category == "SQL Injection")
        .all(|f| f.id != "ext-1"));
}

#[tokio::test]
async fn external_failure_leaves_local_findings_intact() {
    let engine = AnalyzeFileUseCase::new();
    let text = "eval(payload);\n";
    let local = engine.execute("app.js", text, "javascript");

    let stub = StubAnalyzer {
        findings: Vec::new(),
        fail: true,
    };
    let merged = match stub.analyze("app.js", text).await {
        Ok(external) => merge_findings(local.clone(), external),
        Err(_) => local.clone(),
    };
    assert_eq!(merged.len(), local.len());
}
