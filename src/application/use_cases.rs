//! Analysis use cases
//!
//! `AnalyzeFileUseCase` runs the full single-file pipeline (cache check,
//! pattern scan, taint tracking, validation, cache write) and
//! `AnalyzeWorkspaceUseCase` fans it out over a file set with bounded
//! concurrency before adding the cross-file graph pass. Findings from an
//! optional external analyzer are merged through `merge_findings`.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::reporting::{build_report, classify_category};
use crate::config::EngineConfig;
use crate::domain::classification::ClassificationReport;
use crate::domain::finding::{CrossFileVulnerability, Finding, TaintVulnerability};
use crate::domain::language::Language;
use crate::infrastructure::cache::ResultCache;
use crate::infrastructure::cross_file::analyze_workspace;
use crate::infrastructure::pattern_scanner::scan_document_with;
use crate::infrastructure::rules::RuleCatalog;
use crate::infrastructure::taint::analyze_taint;

/// Single-file analysis pipeline with a content-addressed result cache
#[derive(Debug)]
pub struct AnalyzeFileUseCase {
    catalog: RuleCatalog,
    cache: ResultCache,
}

impl AnalyzeFileUseCase {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    /// Builds the engine from configuration. A rule file that fails to load
    /// degrades to the built-in catalog rather than failing construction.
    pub fn with_config(config: &EngineConfig) -> Self {
        Self::with_cache_ttl(config, Duration::from_secs(config.file_cache_ttl_secs))
    }

    fn with_cache_ttl(config: &EngineConfig, ttl: Duration) -> Self {
        let catalog = match &config.rule_file_path {
            Some(path) => match RuleCatalog::with_rule_file(path) {
                Ok(catalog) => catalog,
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        %error,
                        "Rule file failed to load, using built-in catalog only"
                    );
                    RuleCatalog::builtin().clone()
                }
            },
            None => RuleCatalog::builtin().clone(),
        };
        Self {
            catalog,
            cache: ResultCache::new(ttl),
        }
    }

    /// Analyzes one document, taking the language as a caller-facing
    /// identifier string (e.g. "javascript", "py").
    pub fn execute(&self, file: &str, text: &str, language_id: &str) -> Vec<Finding> {
        self.execute_document(file, text, Language::from_identifier(language_id))
    }

    /// Analyzes one document with a resolved language.
    pub fn execute_document(&self, file: &str, text: &str, language: Language) -> Vec<Finding> {
        self.execute_tracking_cache(file, text, language).0
    }

    /// Same as `execute_document`, also reporting whether the result came
    /// from the cache. Feeds the workspace scan statistics.
    #[instrument(skip(self, text), fields(bytes = text.len()))]
    fn execute_tracking_cache(
        &self,
        file: &str,
        text: &str,
        language: Language,
    ) -> (Vec<Finding>, bool) {
        if let Some(hit) = self.cache.get(file, text) {
            debug!(file, findings = hit.len(), "Returning cached analysis");
            return (hit, true);
        }

        let mut findings = scan_document_with(&self.catalog, file, text, language);
        findings.extend(
            analyze_taint(file, text)
                .into_iter()
                .map(|vuln| taint_to_finding(file, text, vuln)),
        );

        // Reported lines must exist in the document.
        let line_count = text.lines().count() as u32;
        findings.retain(|f| f.line >= 1 && f.line <= line_count);

        info!(file, findings = findings.len(), "Analysis complete");
        self.cache.put(file, text, findings.clone());
        (findings, false)
    }
}

impl Default for AnalyzeFileUseCase {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate statistics for a workspace scan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    pub files_scanned: usize,
    /// Files whose per-file results were served from the cache
    pub files_cached: usize,
    pub finding_count: usize,
}

/// Everything a workspace scan produces: the flat finding list plus the
/// aggregate classification report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceScanResult {
    pub findings: Vec<Finding>,
    pub stats: ScanStats,
    pub report: ClassificationReport,
}

/// Workspace-wide analysis: per-file pipeline under bounded concurrency,
/// then the cross-file module-graph pass over the whole set.
#[derive(Debug)]
pub struct AnalyzeWorkspaceUseCase {
    file_use_case: Arc<AnalyzeFileUseCase>,
    max_concurrent: usize,
}

impl AnalyzeWorkspaceUseCase {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        // Workspace results are stable for longer than interactive ones.
        let ttl = Duration::from_secs(config.workspace_cache_ttl_secs);
        Self {
            file_use_case: Arc::new(AnalyzeFileUseCase::with_cache_ttl(config, ttl)),
            max_concurrent: config.max_concurrent_files.max(1),
        }
    }

    /// Scans a set of (path, content) pairs. Output ordering is stable:
    /// findings are sorted by file, then line, then category.
    #[instrument(skip(self, files), fields(file_count = files.len()))]
    pub async fn execute(&self, files: Vec<(String, String)>) -> WorkspaceScanResult {
        let per_file = stream::iter(files.clone())
            .map(|(path, text)| {
                let engine = Arc::clone(&self.file_use_case);
                async move {
                    let language = Language::from_filename(&path).unwrap_or(Language::Plain);
                    engine.execute_tracking_cache(&path, &text, language)
                }
            })
            .buffer_unordered(self.max_concurrent)
            .collect::<Vec<_>>()
            .await;

        let files_cached = per_file.iter().filter(|(_, cached)| *cached).count();
        let mut findings: Vec<Finding> = per_file
            .into_iter()
            .flat_map(|(findings, _)| findings)
            .collect();
        findings.extend(
            analyze_workspace(&files)
                .into_iter()
                .map(cross_file_to_finding),
        );
        findings.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then(a.line.cmp(&b.line))
                .then(a.category.cmp(&b.category))
        });

        let stats = ScanStats {
            files_scanned: files.len(),
            files_cached,
            finding_count: findings.len(),
        };
        info!(
            files = stats.files_scanned,
            cached = stats.files_cached,
            findings = stats.finding_count,
            "Workspace scan complete"
        );
        let report = build_report(&findings);
        WorkspaceScanResult {
            findings,
            stats,
            report,
        }
    }
}

impl Default for AnalyzeWorkspaceUseCase {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors surfaced by an external analysis backend
#[derive(Debug, Error)]
pub enum ExternalAnalysisError {
    #[error("external analyzer unavailable: {0}")]
    Unavailable(String),
    #[error("external analyzer returned malformed results: {0}")]
    Malformed(String),
}

/// Seam for an out-of-process analyzer whose findings are merged with the
/// local pipeline's. The engine never depends on one being present.
#[async_trait]
pub trait ExternalAnalysis: Send + Sync {
    async fn analyze(&self, file: &str, text: &str) -> Result<Vec<Finding>, ExternalAnalysisError>;
}

/// Merges external findings into local ones. On a collision (same file,
/// line, and category) the local finding wins.
pub fn merge_findings(local: Vec<Finding>, external: Vec<Finding>) -> Vec<Finding> {
    let seen: HashSet<(String, u32, String)> = local
        .iter()
        .map(|f| {
            let (file, line, category) = f.dedup_key();
            (file.to_string(), line, category.to_string())
        })
        .collect();

    let mut merged = local;
    for finding in external {
        let (file, line, category) = finding.dedup_key();
        if !seen.contains(&(file.to_string(), line, category.to_string())) {
            merged.push(finding);
        }
    }
    merged
}

fn taint_to_finding(file: &str, text: &str, vuln: TaintVulnerability) -> Finding {
    let category = vuln.sink.category();
    let cwe_id = classify_category(category)
        .map(|entry| entry.cwe_id.to_string())
        .unwrap_or_else(|| "CWE-20".to_string());
    let snippet = text
        .lines()
        .nth(vuln.line.saturating_sub(1) as usize)
        .map(|l| l.trim().to_string())
        .unwrap_or_default();
    let trail: Vec<String> = vuln.flow.iter().map(|s| format!("L{}", s.line)).collect();

    Finding {
        id: Uuid::new_v4().to_string(),
        file: file.to_string(),
        line: vuln.line,
        message: format!("{} (flow: {})", vuln.message, trail.join(" -> ")),
        severity: vuln.severity,
        category: category.to_string(),
        cwe_id,
        remediation: format!(
            "Validate or sanitize `{}` before it reaches this operation",
            vuln.variable
        ),
        score: vuln.severity.base_score(),
        snippet,
    }
}

fn cross_file_to_finding(vuln: CrossFileVulnerability) -> Finding {
    let category = vuln.kind.category();
    let cwe_id = classify_category(category)
        .map(|entry| entry.cwe_id.to_string())
        .unwrap_or_else(|| "CWE-20".to_string());
    let severity = vuln.severity;

    Finding {
        id: Uuid::new_v4().to_string(),
        file: vuln.source_file,
        line: vuln.line,
        message: vuln.message,
        severity,
        category: category.to_string(),
        cwe_id,
        remediation: remediation_for_cross_file(&vuln.kind),
        score: severity.base_score(),
        snippet: vuln.symbol.unwrap_or_default(),
    }
}

fn remediation_for_cross_file(kind: &crate::domain::finding::CrossFileIssueKind) -> String {
    use crate::domain::finding::CrossFileIssueKind::*;
    match kind {
        InsecureExportUsage => {
            "Add input validation to the exported function or to every call site".to_string()
        }
        ExposedApiRoute => {
            "Validate request data before passing it to the vulnerable export".to_string()
        }
        CircularDependency => {
            "Break the import cycle by extracting shared code into a separate module".to_string()
        }
    }
}
